use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::{LogEvent, LogLevel, DEFAULT_SERVICE};

/// What went wrong with a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    Missing,
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: &'static str,
    pub violation: Violation,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.violation {
            Violation::Missing => write!(f, "{}: field required", self.field),
            Violation::Invalid(why) => write!(f, "{}: {}", self.field, why),
        }
    }
}

/// A record that decoded fine but does not fit the event schema.
///
/// Carries every violated field, not just the first one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", render(.violations))]
pub struct SchemaError {
    pub violations: Vec<FieldViolation>,
}

impl SchemaError {
    pub fn single(field: &'static str, violation: Violation) -> Self {
        Self {
            violations: vec![FieldViolation { field, violation }],
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.violations.iter().map(|v| v.field)
    }
}

fn render(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Collects event fields and validates them in one place.
///
/// `build` is the only way a `LogEvent` comes into existence, so a
/// half-populated event can never leak out of a parser.
#[derive(Debug, Default)]
pub struct EventBuilder {
    timestamp: Option<DateTime<Utc>>,
    level: Option<LogLevel>,
    message: Option<String>,
    service: Option<String>,
    request_id: Option<String>,
    status_code: Option<i32>,
    duration_ms: Option<f64>,
    violations: Vec<FieldViolation>,
}

impl EventBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timestamp(mut self, ts: DateTime<Utc>) -> Self {
        self.timestamp = Some(ts);
        self
    }

    /// Parse and set the timestamp, recording a violation when it is unusable.
    pub fn raw_timestamp(self, raw: &str) -> Self {
        match super::timestamp::parse_timestamp(raw) {
            Some(ts) => self.timestamp(ts),
            None => self.invalid("timestamp", format!("invalid timestamp {:?}", raw)),
        }
    }

    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = Some(level);
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    pub fn request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn status_code(mut self, status: i32) -> Self {
        self.status_code = Some(status);
        self
    }

    pub fn duration_ms(mut self, duration: f64) -> Self {
        self.duration_ms = Some(duration);
        self
    }

    pub fn invalid(mut self, field: &'static str, why: impl Into<String>) -> Self {
        self.violations.push(FieldViolation {
            field,
            violation: Violation::Invalid(why.into()),
        });
        self
    }

    pub fn build(mut self) -> Result<LogEvent, SchemaError> {
        let has_violation = |violations: &[FieldViolation], field: &str| {
            violations.iter().any(|v| v.field == field)
        };

        if self.timestamp.is_none() && !has_violation(&self.violations, "timestamp") {
            self.violations.push(FieldViolation {
                field: "timestamp",
                violation: Violation::Missing,
            });
        }
        if self.message.is_none() && !has_violation(&self.violations, "message") {
            self.violations.push(FieldViolation {
                field: "message",
                violation: Violation::Missing,
            });
        }
        if let Some(duration) = self.duration_ms {
            if !duration.is_finite() || duration < 0.0 {
                self.violations.push(FieldViolation {
                    field: "duration_ms",
                    violation: Violation::Invalid(format!(
                        "must be a finite non-negative number, got {}",
                        duration
                    )),
                });
            }
        }

        match (self.timestamp, self.message) {
            (Some(timestamp), Some(message)) if self.violations.is_empty() => Ok(LogEvent {
                timestamp,
                level: self.level.unwrap_or(LogLevel::Unknown),
                message,
                service: self.service.unwrap_or_else(|| DEFAULT_SERVICE.to_string()),
                request_id: self.request_id,
                status_code: self.status_code,
                duration_ms: self.duration_ms,
            }),
            _ => Err(SchemaError {
                violations: self.violations,
            }),
        }
    }
}
