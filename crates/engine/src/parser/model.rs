use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::event::{LogEvent, SchemaError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// One JSON object per line
    Json,
    /// `<timestamp> <level> key=value ...` text lines
    Text,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Json => "json",
            LogFormat::Text => "text",
        }
    }
}

/// Why a single line could not be turned into an event.
///
/// The `Display` output is the failure reason recorded for the line.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("Empty line")]
    Empty,

    /// JSON decode failure or text outer-shape mismatch
    #[error("{0}")]
    Syntax(String),

    #[error("Schema Error: {0}")]
    Schema(#[from] SchemaError),
}

impl ParseError {
    pub fn invalid_json() -> Self {
        ParseError::Syntax("Invalid JSON".to_string())
    }

    pub fn shape_mismatch() -> Self {
        ParseError::Syntax("Regex no match".to_string())
    }

    pub fn kind(&self) -> ParseErrorKind {
        match self {
            ParseError::Empty => ParseErrorKind::Empty,
            ParseError::Syntax(_) => ParseErrorKind::Syntax,
            ParseError::Schema(_) => ParseErrorKind::Schema,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    Empty,
    Syntax,
    Schema,
}

/// A line no parser accepted, with the reason from the last one tried.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{reason}")]
pub struct ParseFailure {
    pub line: String,
    pub reason: ParseError,
}

pub type ParseOutcome = Result<LogEvent, ParseFailure>;
