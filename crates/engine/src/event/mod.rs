//! Event: the canonical record every parser produces and the analyzer consumes.

pub mod level;
pub mod schema;
pub mod timestamp;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

pub use level::LogLevel;
pub use schema::{EventBuilder, FieldViolation, SchemaError, Violation};

pub const DEFAULT_SERVICE: &str = "unknown";

/// One normalized log record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEvent {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    pub service: String,
    pub request_id: Option<String>,
    pub status_code: Option<i32>,
    pub duration_ms: Option<f64>,
}

impl LogEvent {
    pub fn builder() -> EventBuilder {
        EventBuilder::new()
    }

    /// Build an event from a decoded field mapping.
    ///
    /// Unknown keys are ignored. Values are coerced leniently (numeric
    /// strings for numbers, epoch numbers for timestamps); anything that
    /// cannot be coerced is reported as a schema violation.
    pub fn from_fields(obj: &Map<String, Value>) -> Result<LogEvent, SchemaError> {
        let mut builder = EventBuilder::new().level(extract_level(obj));

        builder = match obj.get("timestamp") {
            None | Some(Value::Null) => builder,
            Some(Value::String(s)) => builder.raw_timestamp(s),
            Some(Value::Number(n)) => {
                let ts = match n.as_i64() {
                    Some(secs) => timestamp::from_epoch(secs),
                    None => n.as_f64().and_then(timestamp::from_epoch_f64),
                };
                match ts {
                    Some(ts) => builder.timestamp(ts),
                    None => builder.invalid("timestamp", format!("epoch out of range: {}", n)),
                }
            }
            Some(other) => builder.invalid("timestamp", expected("a timestamp", other)),
        };

        builder = match obj.get("message") {
            None | Some(Value::Null) => builder,
            Some(Value::String(s)) => builder.message(s.as_str()),
            Some(other) => builder.invalid("message", expected("a string", other)),
        };

        builder = match obj.get("service") {
            None => builder,
            Some(Value::String(s)) => builder.service(s.as_str()),
            Some(other) => builder.invalid("service", expected("a string", other)),
        };

        builder = match obj.get("request_id") {
            None | Some(Value::Null) => builder,
            Some(Value::String(s)) => builder.request_id(s.as_str()),
            Some(other) => builder.invalid("request_id", expected("a string", other)),
        };

        builder = match obj.get("status_code") {
            None | Some(Value::Null) => builder,
            Some(value) => match coerce_status(value) {
                Some(code) => builder.status_code(code),
                None => builder.invalid("status_code", expected("an integer", value)),
            },
        };

        builder = match obj.get("duration_ms") {
            None | Some(Value::Null) => builder,
            Some(value) => match coerce_f64(value) {
                Some(duration) => builder.duration_ms(duration),
                None => builder.invalid("duration_ms", expected("a number", value)),
            },
        };

        builder.build()
    }
}

fn extract_level(obj: &Map<String, Value>) -> LogLevel {
    obj.get("level")
        .and_then(Value::as_str)
        .map(LogLevel::parse_lenient)
        .unwrap_or(LogLevel::Unknown)
}

fn coerce_status(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .and_then(|code| i32::try_from(code).ok()),
        Value::String(s) => s.trim().parse::<i32>().ok(),
        _ => None,
    }
}

fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn expected(what: &str, got: &Value) -> String {
    let kind = match got {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    };
    format!("expected {}, got {}", what, kind)
}
