//! Consistency checks for documents that list `plot` / `rank` invocations
//!
//! Experiment READMEs catalogue commands such as
//!
//! ```text
//! python plot.py -f results/train/cologne8-PPO-ideal-avgwait_conn1 results/train/cologne8-PPO-ideal-default_conn1
//! python rank.py -f "[avgwait, default]_cologne8_conn1.csv"
//! ```
//!
//! Each plot invocation must be followed by a rank invocation whose CSV name
//! carries the same reward names in the same order, and every reward name
//! must come from the declared catalogue.

use tsc_core::{RewardFunction, ResultKey};

/// Which tool an invocation runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Plot,
    Rank,
}

impl std::fmt::Display for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tool::Plot => write!(f, "plot"),
            Tool::Rank => write!(f, "rank"),
        }
    }
}

/// A command found in the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub tool: Tool,
    /// 1-based line the command starts on
    pub line: usize,
    /// Arguments of `-f`
    pub files: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    RewardMismatch {
        plot_line: usize,
        rank_line: usize,
        plot: Vec<String>,
        rank: Vec<String>,
    },
    UnknownReward {
        line: usize,
        name: String,
    },
    MalformedSeries {
        line: usize,
        path: String,
        reason: String,
    },
    MissingRewardList {
        line: usize,
        path: String,
    },
    /// An unquoted rank path the shell splits into several arguments
    SplitRankPath {
        line: usize,
        path: String,
    },
    MissingFiles {
        line: usize,
        tool: Tool,
    },
    UnpairedPlot {
        line: usize,
    },
    UnpairedRank {
        line: usize,
    },
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Issue::RewardMismatch {
                plot_line,
                rank_line,
                plot,
                rank,
            } => write!(
                f,
                "line {rank_line}: rank list [{}] does not match plot on line {plot_line} [{}]",
                rank.join(", "),
                plot.join(", ")
            ),
            Issue::UnknownReward { line, name } => {
                write!(f, "line {line}: unknown reward function '{name}'")
            }
            Issue::MalformedSeries { line, path, reason } => {
                write!(f, "line {line}: malformed series '{path}': {reason}")
            }
            Issue::MissingRewardList { line, path } => {
                write!(f, "line {line}: '{path}' has no bracketed reward list")
            }
            Issue::SplitRankPath { line, path } => {
                write!(f, "line {line}: rank path '{path}' is split into several arguments; quote it")
            }
            Issue::MissingFiles { line, tool } => {
                write!(f, "line {line}: {tool} invocation has no -f arguments")
            }
            Issue::UnpairedPlot { line } => {
                write!(f, "line {line}: plot invocation has no following rank")
            }
            Issue::UnpairedRank { line } => {
                write!(f, "line {line}: rank invocation has no preceding plot")
            }
        }
    }
}

/// Every invocation in a document, in order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalogue {
    pub invocations: Vec<Invocation>,
}

impl Catalogue {
    pub fn parse(markdown: &str) -> Self {
        let invocations = logical_lines(markdown)
            .into_iter()
            .flat_map(|(line, text)| {
                command_spans(&text)
                    .into_iter()
                    .filter_map(move |span| {
                        let tokens = shell_words(&span);
                        let (tool, at) = detect_tool(&tokens)?;
                        Some(Invocation {
                            tool,
                            line,
                            files: file_arguments(&tokens[at + 1..]),
                        })
                    })
                    .collect::<Vec<_>>()
            })
            .collect();

        Self { invocations }
    }

    pub fn plots(&self) -> impl Iterator<Item = &Invocation> {
        self.invocations.iter().filter(|i| i.tool == Tool::Plot)
    }

    pub fn ranks(&self) -> impl Iterator<Item = &Invocation> {
        self.invocations.iter().filter(|i| i.tool == Tool::Rank)
    }

    /// All consistency issues; empty when the document is consistent
    pub fn check(&self) -> Vec<Issue> {
        let mut issues = Vec::new();
        let mut pending: Option<&Invocation> = None;

        for invocation in &self.invocations {
            if invocation.files.is_empty() {
                issues.push(Issue::MissingFiles {
                    line: invocation.line,
                    tool: invocation.tool,
                });
            }
            match invocation.tool {
                Tool::Plot => {
                    if let Some(previous) = pending.replace(invocation) {
                        issues.push(Issue::UnpairedPlot {
                            line: previous.line,
                        });
                        check_plot(previous, &mut issues);
                    }
                }
                Tool::Rank => match pending.take() {
                    Some(plot) => check_pair(plot, invocation, &mut issues),
                    None => {
                        issues.push(Issue::UnpairedRank {
                            line: invocation.line,
                        });
                        check_rank(invocation, &mut issues);
                    }
                },
            }
        }

        if let Some(plot) = pending {
            issues.push(Issue::UnpairedPlot { line: plot.line });
            check_plot(plot, &mut issues);
        }

        issues
    }
}

fn check_pair(plot: &Invocation, rank: &Invocation, issues: &mut Vec<Issue>) {
    let plot_names = check_plot(plot, issues);
    let rank_names = check_rank(rank, issues);

    if let (Some(plot_names), Some(rank_names)) = (plot_names, rank_names) {
        if plot_names != rank_names {
            issues.push(Issue::RewardMismatch {
                plot_line: plot.line,
                rank_line: rank.line,
                plot: plot_names,
                rank: rank_names,
            });
        }
    }
}

/// Reward names of a plot's series, or `None` when any series is malformed
fn check_plot(plot: &Invocation, issues: &mut Vec<Issue>) -> Option<Vec<String>> {
    let mut names = Vec::with_capacity(plot.files.len());
    let mut complete = !plot.files.is_empty();

    for path in &plot.files {
        match ResultKey::parse(path) {
            Ok(key) => names.push(key.reward.to_string()),
            Err(err) => match loose_reward_token(path) {
                Some(token) if !RewardFunction::is_declared(&token) => {
                    issues.push(Issue::UnknownReward {
                        line: plot.line,
                        name: token.clone(),
                    });
                    names.push(token);
                }
                _ => {
                    issues.push(Issue::MalformedSeries {
                        line: plot.line,
                        path: path.clone(),
                        reason: err.to_string(),
                    });
                    complete = false;
                }
            },
        }
    }

    complete.then_some(names)
}

fn check_rank(rank: &Invocation, issues: &mut Vec<Issue>) -> Option<Vec<String>> {
    let path = match rank.files.as_slice() {
        [] => return None,
        [path] => path.clone(),
        words => {
            let joined = words.join(" ");
            issues.push(Issue::SplitRankPath {
                line: rank.line,
                path: joined.clone(),
            });
            joined
        }
    };
    let Some(names) = bracketed_names(&path) else {
        issues.push(Issue::MissingRewardList {
            line: rank.line,
            path,
        });
        return None;
    };

    for name in names.iter().filter(|n| !RewardFunction::is_declared(n)) {
        issues.push(Issue::UnknownReward {
            line: rank.line,
            name: name.clone(),
        });
    }

    Some(names)
}

/// Names inside the first `[...]` of a path's file name.
///
/// Quotes and whitespace around each name are dropped, so both
/// `[avgwait, default]` and `['avgwait', 'default']` yield the same list.
pub fn bracketed_names(path: &str) -> Option<Vec<String>> {
    let name = path.rsplit('/').next().unwrap_or(path);
    let open = name.find('[')?;
    let close = open + name[open..].find(']')?;

    Some(
        name[open + 1..close]
            .split(',')
            .map(|n| n.trim().trim_matches(|c| c == '\'' || c == '"').trim().to_string())
            .filter(|n| !n.is_empty())
            .collect(),
    )
}

/// Fourth dash-separated component of the file stem, used when a path fails
/// strict parsing
fn loose_reward_token(path: &str) -> Option<String> {
    let name = path.rsplit('/').next().unwrap_or(path);
    let prefix = name.split('_').next()?;
    prefix
        .split('-')
        .nth(3)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Join backslash-continued lines, keeping the starting line number
fn logical_lines(text: &str) -> Vec<(usize, String)> {
    let mut lines = Vec::new();
    let mut current: Option<(usize, String)> = None;

    for (idx, raw) in text.lines().enumerate() {
        let trimmed = raw.trim_end();
        let (content, continues) = match trimmed.strip_suffix('\\') {
            Some(head) => (head, true),
            None => (trimmed, false),
        };

        let entry = current.get_or_insert_with(|| (idx + 1, String::new()));
        if !entry.1.is_empty() {
            entry.1.push(' ');
        }
        entry.1.push_str(content);

        if !continues {
            lines.extend(current.take());
        }
    }
    lines.extend(current);

    lines
}

/// Split a command line into words, honouring single and double quotes and
/// backslash escapes outside single quotes
fn shell_words(line: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut word = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some('"') | None, '\\') => {
                if let Some(next) = chars.next() {
                    word.push(next);
                    in_word = true;
                }
            }
            (Some(_), c) => word.push(c),
            (None, '\'' | '"') => {
                quote = Some(c);
                in_word = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut word));
                    in_word = false;
                }
            }
            (None, c) => {
                word.push(c);
                in_word = true;
            }
        }
    }
    if in_word {
        words.push(word);
    }

    words
}

/// Inline code spans of a line, or the whole line when it has none
fn command_spans(text: &str) -> Vec<String> {
    if text.matches('`').count() < 2 {
        return vec![text.to_string()];
    }
    text.split('`').skip(1).step_by(2).map(str::to_string).collect()
}

fn base_name(token: &str) -> &str {
    token.rsplit('/').next().unwrap_or(token)
}

/// Tool run by a command and the index of its name.
///
/// The words must start like a command: an optional `$` prompt, then either
/// `[python|python3] <dir/>plot.py|rank.py` or `<dir/>tsc plot|rank`. A bare
/// script name counts only when a flag follows it.
fn detect_tool(tokens: &[String]) -> Option<(Tool, usize)> {
    let mut at = usize::from(tokens.first().is_some_and(|t| t == "$"));

    let interpreted = matches!(base_name(tokens.get(at)?), "python" | "python3");
    if interpreted {
        at += 1;
    }

    let script = match base_name(tokens.get(at)?) {
        "plot.py" => Some(Tool::Plot),
        "rank.py" => Some(Tool::Rank),
        _ => None,
    };
    if let Some(tool) = script {
        let flagged = tokens.get(at + 1).is_some_and(|t| t.starts_with('-'));
        return (interpreted || flagged).then_some((tool, at));
    }

    if interpreted || base_name(&tokens[at]) != "tsc" {
        return None;
    }
    match tokens.get(at + 1).map(String::as_str) {
        Some("plot") => Some((Tool::Plot, at + 1)),
        Some("rank") => Some((Tool::Rank, at + 1)),
        _ => None,
    }
}

fn file_arguments(args: &[String]) -> Vec<String> {
    let Some(start) = args.iter().position(|a| a == "-f" || a == "--files") else {
        return Vec::new();
    };

    args[start + 1..]
        .iter()
        .take_while(|a| {
            let flag = a.starts_with('-') && a.len() > 1;
            // separators such as `&&`, `|`, `;` and stray sentence punctuation
            let punctuation = !a.is_empty() && a.chars().all(|c| c.is_ascii_punctuation());
            !(flag || punctuation)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_words_quotes() {
        assert_eq!(
            shell_words(r#"python rank.py -f "[avgwait, default]_cologne8_conn1.csv""#),
            vec!["python", "rank.py", "-f", "[avgwait, default]_cologne8_conn1.csv"]
        );
        assert_eq!(shell_words("a 'b c' d\\ e"), vec!["a", "b c", "d e"]);
        assert_eq!(shell_words("x ''"), vec!["x", ""]);
    }

    #[test]
    fn test_bracketed_names() {
        assert_eq!(
            bracketed_names("results/['avgwait', 'default']_cologne8_conn1.csv"),
            Some(vec!["avgwait".to_string(), "default".to_string()])
        );
        assert_eq!(
            bracketed_names("[all3,speed].csv"),
            Some(vec!["all3".to_string(), "speed".to_string()])
        );
        assert_eq!(bracketed_names("ranking.csv"), None);
    }

    #[test]
    fn test_logical_lines_join_continuations() {
        let lines = logical_lines("a \\\n  b\nc");
        assert_eq!(lines, vec![(1, "a    b".to_string()), (3, "c".to_string())]);
    }

    #[test]
    fn test_detect_tool() {
        let words = shell_words("python scripts/plot.py -f x");
        assert_eq!(detect_tool(&words), Some((Tool::Plot, 1)));
        let words = shell_words("./target/release/tsc rank -f y");
        assert_eq!(detect_tool(&words), Some((Tool::Rank, 1)));
        assert_eq!(detect_tool(&shell_words("echo plot -f z")), None);
        assert_eq!(detect_tool(&shell_words("$ python3 rank.py -f y")), Some((Tool::Rank, 2)));
    }

    #[test]
    fn test_mentions_are_not_commands() {
        assert_eq!(detect_tool(&shell_words("plot.py")), None);
        assert_eq!(detect_tool(&shell_words("The plot.py script renders curves")), None);
        assert_eq!(detect_tool(&shell_words("Use tsc plot to draw")), None);
        assert_eq!(detect_tool(&shell_words("python train.py plot.py")), None);
        assert_eq!(detect_tool(&shell_words("./plot.py -f x")), Some((Tool::Plot, 0)));
    }

    #[test]
    fn test_command_spans() {
        assert_eq!(
            command_spans("Run `python plot.py -f a_conn1`."),
            vec!["python plot.py -f a_conn1"]
        );
        assert_eq!(command_spans("python plot.py -f a"), vec!["python plot.py -f a"]);
        assert_eq!(command_spans("`a` and `b`"), vec!["a", "b"]);
        assert!(command_spans("```").iter().all(String::is_empty));
    }

    #[test]
    fn test_file_arguments_stop_at_flags() {
        let words = shell_words("-f a b -l x y");
        assert_eq!(file_arguments(&words), vec!["a", "b"]);
        assert!(file_arguments(&shell_words("-l x")).is_empty());
        assert_eq!(file_arguments(&shell_words("-f a b && -f c")), vec!["a", "b"]);
        assert_eq!(file_arguments(&shell_words("-f a .")), vec!["a"]);
    }

    #[test]
    fn test_loose_reward_token() {
        assert_eq!(
            loose_reward_token("results/train/cologne8-PPO-ideal-custom_conn1"),
            Some("custom".to_string())
        );
        assert_eq!(loose_reward_token("cologne1-camera_conn1"), None);
    }
}
