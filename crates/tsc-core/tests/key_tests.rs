//! Integration tests for result keys, rewards and metrics
//! Complements the inline unit tests in src/key.rs and src/reward.rs

use std::collections::HashSet;
use std::path::Path;

use tsc_core::{
    Algorithm, Controller, Direction, Environment, Metric, Mode, ResultKey, RewardFunction,
    TscError,
};

#[test]
fn test_every_declared_reward_parses_in_a_key() {
    for reward in RewardFunction::ALL {
        let name = format!("cologne8-PPO-ideal-{reward}_conn1_ep3.csv");
        let key = ResultKey::parse(&name).unwrap();
        assert_eq!(key.reward, reward);
        assert_eq!(key.ep, Some(3));
    }
}

#[test]
fn test_reward_names_are_unique_and_case_insensitive() {
    let names: HashSet<&str> = RewardFunction::ALL.iter().map(|r| r.as_str()).collect();
    assert_eq!(names.len(), RewardFunction::ALL.len());

    let test_cases = vec![
        ("ALL3", RewardFunction::All3),
        ("DefAndMaxGreen", RewardFunction::DefAndMaxGreen),
        (" avgwaitavgspeed ", RewardFunction::AvgWaitAvgSpeed),
        ("defandaccumlatedspeed", RewardFunction::DefAndAccumlatedSpeed),
    ];
    for (input, expected) in test_cases {
        assert_eq!(input.parse::<RewardFunction>().unwrap(), expected, "{input}");
    }
}

#[test]
fn test_unknown_reward_is_rejected() {
    let err = "pressure".parse::<RewardFunction>().unwrap_err();
    assert!(matches!(err, TscError::UnknownRewardFunction(name) if name == "pressure"));

    let err = ResultKey::parse("cologne8-PPO-ideal-pressure_conn1").unwrap_err();
    assert!(matches!(err, TscError::InvalidResultKey { .. }));
}

#[test]
fn test_malformed_keys() {
    for name in [
        "cologne8-PPO-ideal-default",
        "cologne8-PPO-default_conn1",
        "cologne8--ideal-default_conn1",
        "cologne8-PPO-ideal-default_conn0",
        "cologne8-PPO-ideal-default_connx",
    ] {
        let err = ResultKey::parse(name).unwrap_err();
        assert!(
            matches!(&err, TscError::InvalidResultKey { name: n, .. } if n == name),
            "{name}: {err:?}"
        );
    }
}

#[test]
fn test_key_preserves_unknown_components() {
    let key = ResultKey::parse("results/train/grid4x4-A2C-lidar-speed_conn2").unwrap();
    assert_eq!(key.environment, Environment::new("grid4x4"));
    assert!(!key.environment.is_known());
    assert_eq!(key.algorithm, Algorithm::from("A2C"));
    assert_eq!(key.mode, Mode::from("lidar"));
    assert_eq!(key.to_string(), "grid4x4-A2C-lidar-speed_conn2");
    assert_eq!(key.qualified_label(), "speed_conn2");
}

#[test]
fn test_keys_distinguish_episodes_but_share_prefix() {
    let ep1 = ResultKey::parse("cologne8-PPO-ideal-default_conn1_ep1.csv").unwrap();
    let ep2 = ResultKey::parse("cologne8-PPO-ideal-default_conn1_ep2.csv").unwrap();
    assert_ne!(ep1, ep2);
    assert_eq!(ep1.series_prefix(), ep2.series_prefix());

    let set: HashSet<ResultKey> = [ep1.clone(), ep2, ep1].into_iter().collect();
    assert_eq!(set.len(), 2);
}

#[test]
fn test_key_serializes_reward_by_name() {
    let key = ResultKey::parse("cologne8-DQN-camera-defandpress_conn1").unwrap();
    let json = serde_json::to_value(&key).unwrap();
    assert_eq!(json["reward"], "defandpress");
    assert_eq!(json["conn"], 1);

    let back: ResultKey = serde_json::from_value(json).unwrap();
    assert_eq!(back, key);
}

#[test]
fn test_controller_from_baseline_path() {
    assert_eq!(
        Controller::from_path(Path::new("results/greedy/cologne1-camera_conn1.csv")),
        Some(Controller::Greedy)
    );
    assert_eq!(
        Controller::from_path(Path::new("results/train/cologne8-PPO-ideal-all3_conn1")),
        None
    );
}

#[test]
fn test_metric_directions() {
    assert_eq!(Metric::default().direction, Direction::LowerIsBetter);
    assert_eq!(
        Metric::from_column("system_mean_speed").direction,
        Direction::HigherIsBetter
    );
    assert_eq!(
        Metric::from_column("episode_reward").direction,
        Direction::HigherIsBetter
    );
    assert_eq!(
        Metric::from_column("agents_total_stopped").direction,
        Direction::LowerIsBetter
    );

    assert!(Direction::LowerIsBetter.is_better(1.0, 2.0));
    assert!(Direction::HigherIsBetter.is_better(2.0, 1.0));
}
