//! Discover: resolve the `--input` argument to a list of log files.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

/// A file is used as-is. A directory contributes its files matching each
/// extension, grouped by extension in the given order and sorted by path
/// within a group. Subdirectories are not searched.
pub fn find_inputs(input: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if !input.is_dir() {
        anyhow::bail!("Input path does not exist: {}", input.display());
    }

    let base = glob::Pattern::escape(&input.to_string_lossy());
    let mut files = Vec::new();

    for ext in extensions {
        let pattern = format!("{}/*.{}", base, ext);
        let mut matched: Vec<PathBuf> = glob::glob(&pattern)
            .with_context(|| format!("Invalid glob pattern: {}", pattern))?
            .filter_map(|entry| entry.ok())
            .filter(|path| path.is_file())
            .collect();
        matched.sort();
        debug!(pattern = %pattern, matched = matched.len(), "Scanned input directory");
        files.extend(matched);
    }

    Ok(files)
}
