pub use super::model::{LogFormat, ParseError, ParseFailure, ParseOutcome};
pub use crate::event::{EventBuilder, LogEvent, LogLevel, SchemaError};

pub trait LogParser: Send + Sync {
    /// parse one raw line into a normalized event
    fn parse_line(&self, line: &str) -> Result<LogEvent, ParseError>;
    fn format(&self) -> LogFormat;
}
