//! Run: read every input file through one ingestor into one analyzer.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use engine::{Analyzer, FinalizedAnalysis, IngestReport, Ingestor};
use tracing::info;

use crate::conf::ReporterConfig;
use crate::discover::find_inputs;

pub struct RunOutput {
    pub analysis: FinalizedAnalysis,
    pub ingest: IngestReport,
    pub files: Vec<PathBuf>,
    pub elapsed: Duration,
}

pub fn execute(input: &Path, config: &ReporterConfig) -> Result<RunOutput> {
    let started = Instant::now();

    let files = find_inputs(input, &config.ingest.extensions)?;
    if files.is_empty() {
        anyhow::bail!("No log files found in {}", input.display());
    }
    info!(
        files = files.len(),
        mode = ?config.ingest.mode,
        "Starting analysis"
    );

    let mut analyzer = Analyzer::new(config.analysis.top_n);
    let mut ingestor = Ingestor::new(config.ingest.mode);

    for path in &files {
        let source = path.display().to_string();
        let file = File::open(path).with_context(|| format!("Failed to open {}", source))?;

        let mut read_error: Option<io::Error> = None;
        let lines = read_lines(BufReader::new(file)).map_while(|line| match line {
            Ok(line) => Some(line),
            Err(e) => {
                read_error = Some(e);
                None
            }
        });

        let accepted = ingestor.ingest_lines(&source, lines, &mut analyzer)?;

        if let Some(e) = read_error {
            return Err(e).with_context(|| format!("Failed to read {}", source));
        }
        info!(file = %source, events = accepted, "Processed file");
    }

    let analysis = analyzer.finalize(config.anomaly_rule());
    let ingest = ingestor.finish();
    let elapsed = started.elapsed();

    info!(
        events = ingest.events,
        failed = ingest.failures.len(),
        elapsed_ms = elapsed.as_millis() as u64,
        "Analysis complete"
    );

    Ok(RunOutput {
        analysis,
        ingest,
        files,
        elapsed,
    })
}

/// Newline-split lines with invalid UTF-8 replaced rather than rejected.
fn read_lines<R: BufRead>(reader: R) -> impl Iterator<Item = io::Result<String>> {
    reader.split(b'\n').map(|chunk| {
        chunk.map(|bytes| {
            let mut line = String::from_utf8_lossy(&bytes).into_owned();
            if line.ends_with('\r') {
                line.pop();
            }
            line
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::IngestMode;
    use std::fs;

    fn write_logs(dir: &Path) {
        fs::write(
            dir.join("a.log"),
            concat!(
                "2023-01-01T12:00:00 INFO service=api duration_ms=50 msg=\"hello world\"\n",
                "garbage\n",
                "2023-01-01T12:00:05 ERROR service=api status=500 duration_ms=900 msg=boom\n",
            ),
        )
        .unwrap();
        fs::write(
            dir.join("b.jsonl"),
            "{\"timestamp\":\"2023-01-01T12:01:00Z\",\"level\":\"INFO\",\"message\":\"ok\",\"duration_ms\":100}\r\n",
        )
        .unwrap();
    }

    #[test]
    fn test_lenient_run_over_directory() {
        let dir = tempfile::tempdir().unwrap();
        write_logs(dir.path());

        let output = execute(dir.path(), &ReporterConfig::default()).unwrap();
        assert_eq!(output.files.len(), 2);
        assert_eq!(output.ingest.events, 3);
        assert_eq!(output.ingest.failures.len(), 1);
        assert_eq!(output.ingest.failures[0].line_number, 2);
        assert_eq!(output.ingest.failures[0].reason, "Regex no match");

        let summary = output.analysis.summary();
        assert_eq!(summary.total_requests, 3);
        assert_eq!(summary.slowest_requests[0].duration, 900.0);
        assert_eq!(summary.status_codes.get(&500), Some(&1));
    }

    #[test]
    fn test_strict_run_aborts() {
        let dir = tempfile::tempdir().unwrap();
        write_logs(dir.path());

        let mut config = ReporterConfig::default();
        config.ingest.mode = IngestMode::Strict;

        let err = execute(dir.path(), &config).err().unwrap();
        let message = err.to_string();
        assert!(message.starts_with("Strict mode: failed at"));
        assert!(message.contains("a.log:2"));
    }

    #[test]
    fn test_no_inputs_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(execute(dir.path(), &ReporterConfig::default()).is_err());
    }

    #[test]
    fn test_read_lines_replaces_invalid_utf8() {
        let data: &[u8] = b"ok\r\nbad \xff byte\nlast";
        let lines: Vec<String> = read_lines(data).map(|l| l.unwrap()).collect();
        assert_eq!(lines, vec!["ok", "bad \u{fffd} byte", "last"]);
    }
}
