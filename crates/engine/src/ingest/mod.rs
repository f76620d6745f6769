//! Ingest: drives raw lines through the parser chain into the analyzer.
//!
//! Lines are processed in source order. A line that no parser accepts
//! becomes a `FailedLine`; in strict mode the first one ends the run.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::analyzer::Analyzer;
use crate::parser::{ParseMetrics, ParserChain};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestMode {
    /// Abort on the first line that cannot be parsed
    Strict,
    /// Record failures and keep going
    #[default]
    Lenient,
}

/// A line that could not be normalized into an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedLine {
    pub source: String,
    /// 1-based, per source
    pub line_number: usize,
    pub line: String,
    pub reason: String,
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Strict mode: failed at {}:{} -> {}", .failure.source, .failure.line_number, .failure.reason)]
    StrictAbort { failure: FailedLine },
}

/// Everything the driver collected over a run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestReport {
    pub events: u64,
    pub failures: Vec<FailedLine>,
    pub metrics: ParseMetrics,
}

pub struct Ingestor {
    chain: ParserChain,
    mode: IngestMode,
    events: u64,
    failures: Vec<FailedLine>,
    metrics: ParseMetrics,
}

impl Ingestor {
    pub fn new(mode: IngestMode) -> Self {
        Self::with_chain(ParserChain::new(), mode)
    }

    pub fn with_chain(chain: ParserChain, mode: IngestMode) -> Self {
        Self {
            chain,
            mode,
            events: 0,
            failures: Vec::new(),
            metrics: ParseMetrics::new(),
        }
    }

    pub fn mode(&self) -> IngestMode {
        self.mode
    }

    /// Feed one source's lines, in order, into `analyzer`.
    ///
    /// Returns how many events this source contributed. In strict mode the
    /// first failure is recorded and returned as the error; lines after it
    /// are not read.
    pub fn ingest_lines<I, S>(
        &mut self,
        source: &str,
        lines: I,
        analyzer: &mut Analyzer,
    ) -> Result<u64, IngestError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut accepted = 0;

        for (idx, line) in lines.into_iter().enumerate() {
            let line = line.as_ref();
            match self.chain.parse_line_with_format(line) {
                Ok((format, event)) => {
                    self.metrics.record_parse(format);
                    analyzer.process_event(&event);
                    accepted += 1;
                }
                Err(failure) => {
                    self.metrics.record_error(&failure.reason);
                    let failed = FailedLine {
                        source: source.to_string(),
                        line_number: idx + 1,
                        line: failure.line,
                        reason: failure.reason.to_string(),
                    };
                    debug!(
                        source = source,
                        line_number = failed.line_number,
                        reason = %failed.reason,
                        "Skipping unparsed line"
                    );
                    self.failures.push(failed.clone());

                    if self.mode == IngestMode::Strict {
                        warn!(
                            source = source,
                            line_number = failed.line_number,
                            "Strict mode: aborting on first failure"
                        );
                        self.events += accepted;
                        return Err(IngestError::StrictAbort { failure: failed });
                    }
                }
            }
        }

        self.events += accepted;
        Ok(accepted)
    }

    pub fn events(&self) -> u64 {
        self.events
    }

    pub fn failures(&self) -> &[FailedLine] {
        &self.failures
    }

    pub fn metrics(&self) -> &ParseMetrics {
        &self.metrics
    }

    pub fn finish(self) -> IngestReport {
        IngestReport {
            events: self.events,
            failures: self.failures,
            metrics: self.metrics,
        }
    }
}
