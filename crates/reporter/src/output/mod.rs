//! Output: report files written under a per-run directory.

pub mod console;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use engine::{FailedLine, Summary};
use tracing::info;

pub const SUMMARY_FILE: &str = "summary.json";
pub const FAILED_FILE: &str = "events_failed.csv";

pub struct ReportWriter {
    run_dir: PathBuf,
    max_line_chars: usize,
}

impl ReportWriter {
    /// Creates `<base>/<run_id>` (and any missing parents).
    pub fn create(base: &Path, run_id: &str, max_line_chars: usize) -> Result<Self> {
        let run_dir = base.join(run_id);
        fs::create_dir_all(&run_dir)
            .with_context(|| format!("Failed to create output directory {}", run_dir.display()))?;
        Ok(Self {
            run_dir,
            max_line_chars,
        })
    }

    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    pub fn write_summary(&self, summary: &Summary) -> Result<PathBuf> {
        let path = self.run_dir.join(SUMMARY_FILE);
        let file = File::create(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, summary).context("Failed to serialize summary")?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        info!(path = %path.display(), "Wrote summary");
        Ok(path)
    }

    /// Always written, header-only when nothing failed.
    pub fn write_failed(&self, failures: &[FailedLine]) -> Result<PathBuf> {
        let path = self.run_dir.join(FAILED_FILE);
        let file = File::create(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        let mut writer = BufWriter::new(file);

        writeln!(writer, "original_line,error_reason")?;
        for failed in failures {
            let line = truncate_chars(&failed.line, self.max_line_chars);
            writeln!(writer, "{},{}", csv_field(line), csv_field(&failed.reason))?;
        }
        writer.flush()?;

        info!(path = %path.display(), rows = failures.len(), "Wrote failed lines");
        Ok(path)
    }
}

fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Quote a field when it holds a comma, quote, or line break.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
