//! Check documented plot/rank invocations for consistency

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tracing::debug;

use tsc_analysis::Catalogue;

pub async fn run(files: Vec<PathBuf>) -> Result<()> {
    let mut total = 0;

    for file in &files {
        let markdown = std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read {}", file.display()))?;
        let catalogue = Catalogue::parse(&markdown);
        debug!(
            "{}: {} plot and {} rank invocations",
            file.display(),
            catalogue.plots().count(),
            catalogue.ranks().count()
        );

        let issues = catalogue.check();
        for issue in &issues {
            println!("{}: {issue}", file.display());
        }
        total += issues.len();
    }

    if total > 0 {
        bail!("{total} issue(s) found in {} file(s)", files.len());
    }

    println!("No issues found in {} file(s)", files.len());
    Ok(())
}
