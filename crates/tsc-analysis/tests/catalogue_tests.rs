//! Integration tests for README command catalogue checks

use tsc_analysis::{Catalogue, Issue, Tool};
use tsc_core::RewardFunction;

const README: &str = r#"
# Reward comparison

## cologne8

```
python plot.py -f results/train/cologne8-PPO-ideal-avgwait_conn1 results/train/cologne8-PPO-ideal-default_conn1
```

![alt text](image.png)

```
python rank.py -f "[avgwait, default]_cologne8_conn1.csv"
```

## ingolstadt7

```
python plot.py -f results/train/ingolstadt7-PPO-ideal-all3_conn1_ep12 \
    results/train/ingolstadt7-PPO-ideal-defandmaxgreen_conn1_ep12 \
    results/train/ingolstadt7-PPO-ideal-defandaccumlatedspeed_conn1_ep12
python rank.py -f "[all3, defandmaxgreen, defandaccumlatedspeed]_ingolstadt7_conn1_ep12.csv"
```
"#;

#[test]
fn test_consistent_readme_has_no_issues() {
    let catalogue = Catalogue::parse(README);

    assert_eq!(catalogue.plots().count(), 2);
    assert_eq!(catalogue.ranks().count(), 2);
    assert_eq!(catalogue.invocations[2].files.len(), 3);
    assert_eq!(catalogue.invocations[2].line, 19);
    assert!(catalogue.check().is_empty(), "{:?}", catalogue.check());
}

#[test]
fn test_every_reward_in_readme_is_declared() {
    let catalogue = Catalogue::parse(README);
    for plot in catalogue.plots() {
        for file in &plot.files {
            let key = tsc_core::ResultKey::parse(file).unwrap();
            assert!(RewardFunction::ALL.contains(&key.reward));
        }
    }
}

#[test]
fn test_order_mismatch_is_reported() {
    let doc = "\
python plot.py -f r/cologne8-PPO-ideal-speed_conn1 r/cologne8-PPO-ideal-defandspeed_conn1
python rank.py -f \"[defandspeed, speed]_cologne8_conn1.csv\"
";
    let issues = Catalogue::parse(doc).check();

    assert_eq!(
        issues,
        vec![Issue::RewardMismatch {
            plot_line: 1,
            rank_line: 2,
            plot: vec!["speed".to_string(), "defandspeed".to_string()],
            rank: vec!["defandspeed".to_string(), "speed".to_string()],
        }]
    );
}

#[test]
fn test_undeclared_reward_names_are_reported() {
    let doc = "\
python plot.py -f r/cologne8-PPO-ideal-custom_conn1 r/cologne8-PPO-ideal-avgwait_conn1
python rank.py -f \"[custom, avgwait, pressure]_cologne8_conn1.csv\"
";
    let issues = Catalogue::parse(doc).check();

    assert!(issues.contains(&Issue::UnknownReward {
        line: 1,
        name: "custom".to_string()
    }));
    assert!(issues.contains(&Issue::UnknownReward {
        line: 2,
        name: "pressure".to_string()
    }));
    assert!(issues
        .iter()
        .any(|i| matches!(i, Issue::RewardMismatch { .. })));
}

#[test]
fn test_unpaired_invocations() {
    let doc = "\
tsc rank -f \"[avgwait]_cologne8_conn1.csv\"
tsc plot -f r/cologne8-PPO-ideal-avgwait_conn1
tsc plot -f r/cologne8-PPO-ideal-speed_conn1
";
    let catalogue = Catalogue::parse(doc);
    assert!(catalogue.invocations.iter().all(|i| i.files.len() == 1));
    assert_eq!(catalogue.invocations[0].tool, Tool::Rank);

    let issues = catalogue.check();
    assert_eq!(
        issues,
        vec![
            Issue::UnpairedRank { line: 1 },
            Issue::UnpairedPlot { line: 2 },
            Issue::UnpairedPlot { line: 3 },
        ]
    );
}

#[test]
fn test_malformed_series_and_missing_list() {
    let doc = "\
python plot.py -f results/greedy/cologne1-camera_conn1
python rank.py -f ranking.csv
python plot.py
";
    let issues = Catalogue::parse(doc).check();

    assert!(matches!(&issues[0], Issue::MalformedSeries { line: 1, .. }));
    assert_eq!(
        issues[1],
        Issue::MissingRewardList {
            line: 2,
            path: "ranking.csv".to_string()
        }
    );
    assert!(issues.contains(&Issue::MissingFiles {
        line: 3,
        tool: Tool::Plot
    }));
    assert!(issues.iter().all(|i| !i.to_string().is_empty()));
}

#[test]
fn test_prose_mentions_are_ignored() {
    let doc = "\
The `plot.py` script renders curves and `rank.py` ranks them.
Use tsc plot to draw and tsc rank to order.

python plot.py -f r/cologne8-PPO-ideal-avgwait_conn1
python rank.py -f \"[avgwait]_cologne8_conn1.csv\"
";
    let catalogue = Catalogue::parse(doc);

    assert_eq!(catalogue.invocations.len(), 2);
    assert_eq!(catalogue.invocations[0].line, 4);
    assert!(catalogue.check().is_empty(), "{:?}", catalogue.check());
}

#[test]
fn test_inline_commands_end_at_the_code_span() {
    let doc = "\
Run `python plot.py -f r/cologne8-PPO-ideal-avgwait_conn1`.
Then `python rank.py -f \"[avgwait]_cologne8_conn1.csv\"`.
";
    let catalogue = Catalogue::parse(doc);

    assert_eq!(
        catalogue.invocations[0].files,
        vec!["r/cologne8-PPO-ideal-avgwait_conn1".to_string()]
    );
    assert!(catalogue.check().is_empty(), "{:?}", catalogue.check());
}

#[test]
fn test_unquoted_rank_path_is_reported_and_still_compared() {
    let doc = "\
python plot.py -f r/cologne8-PPO-ideal-avgwait_conn1 r/cologne8-PPO-ideal-default_conn1
python rank.py -f ['avgwait', 'default']_cologne8_conn1.csv
";
    let issues = Catalogue::parse(doc).check();

    assert_eq!(
        issues,
        vec![Issue::SplitRankPath {
            line: 2,
            path: "[avgwait, default]_cologne8_conn1.csv".to_string()
        }]
    );
    assert!(issues[0].to_string().contains("quote it"));
}
