use serde::Serialize;

use super::model::{LogFormat, ParseError, ParseErrorKind};

/// Per-format success counters
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FormatCounts {
    pub json: u64,
    pub text: u64,
}

/// Failure counters by error kind
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ErrorCounts {
    pub empty: u64,
    pub syntax: u64,
    pub schema: u64,
}

/// Parsing counters for one run.
///
/// Owned by the ingestion driver and updated once per line, so plain
/// integers are enough.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParseMetrics {
    pub lines: u64,
    pub formats: FormatCounts,
    pub errors: ErrorCounts,
}

impl ParseMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_parse(&mut self, format: LogFormat) {
        self.lines += 1;
        match format {
            LogFormat::Json => self.formats.json += 1,
            LogFormat::Text => self.formats.text += 1,
        }
    }

    #[inline]
    pub fn record_error(&mut self, error: &ParseError) {
        self.lines += 1;
        match error.kind() {
            ParseErrorKind::Empty => self.errors.empty += 1,
            ParseErrorKind::Syntax => self.errors.syntax += 1,
            ParseErrorKind::Schema => self.errors.schema += 1,
        }
    }

    pub fn parsed(&self) -> u64 {
        self.formats.json + self.formats.text
    }

    pub fn failed(&self) -> u64 {
        self.errors.empty + self.errors.syntax + self.errors.schema
    }

    /// Fraction of lines that produced an event (0.0 when nothing was seen)
    pub fn success_rate(&self) -> f64 {
        if self.lines == 0 {
            return 0.0;
        }
        self.parsed() as f64 / self.lines as f64
    }
}
