use crate::parser::traits::*;
use serde_json::Value;

/// Parser for one-object-per-line JSON logs.
///
/// Field names must match the event schema (`timestamp`, `level`,
/// `message`, ...); extra keys are ignored.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonParser;

impl JsonParser {
    pub fn new() -> Self {
        Self
    }
}

impl LogParser for JsonParser {
    fn parse_line(&self, line: &str) -> Result<LogEvent, ParseError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(ParseError::Empty);
        }

        let value: Value = serde_json::from_str(line).map_err(|_| ParseError::invalid_json())?;

        let obj = value.as_object().ok_or_else(|| {
            ParseError::Schema(SchemaError::single(
                "record",
                crate::event::Violation::Invalid("JSON is not an object".to_string()),
            ))
        })?;

        Ok(LogEvent::from_fields(obj)?)
    }

    fn format(&self) -> LogFormat {
        LogFormat::Json
    }
}
