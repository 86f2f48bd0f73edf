//! Utility functions for TSC
//!
//! Environment-file loading shared by the binaries.

use std::path::PathBuf;

/// Locations searched for `tsc.env`, in order.
pub fn env_file_candidates() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/usr/local/etc/tsc/tsc.env")];
    if let Some(config) = dirs::config_dir() {
        paths.push(config.join("tsc").join("tsc.env"));
    }
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".config").join("tsc").join("tsc.env"));
    }
    paths
}

/// Load the first `tsc.env` found. Variables already set are left alone.
pub fn load_env_file() {
    let Some(path) = env_file_candidates().into_iter().find(|p| p.exists()) else {
        return;
    };
    if let Ok(contents) = std::fs::read_to_string(&path) {
        for (key, value) in parse_env_file(&contents) {
            if std::env::var(&key).is_err() {
                std::env::set_var(key, value);
            }
        }
    }
}

/// Parse env file contents into key/value pairs.
/// Supports formats:
/// - `KEY=value`
/// - `export KEY=value`
/// - `KEY="quoted value"`
/// - `KEY='single quoted'`
/// - Comments starting with #
pub fn parse_env_file(contents: &str) -> Vec<(String, String)> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| line.strip_prefix("export ").unwrap_or(line))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            (key.trim().to_string(), value.to_string())
        })
        .filter(|(key, _)| !key.is_empty())
        .collect()
}
