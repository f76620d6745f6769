use crate::parser::traits::*;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Outer shape: `<timestamp> <level> <rest>`
pub const DEFAULT_PATTERN: &str = r"^(?P<timestamp>\S+)\s+(?P<level>\w+)\s+(?P<rest>.*)$";

const KV_PATTERN: &str = r#"(?P<key>\w+)=(?:"(?P<quoted_val>[^"]*)"|(?P<val>\S+))"#;

const REQUIRED_GROUPS: [&str; 3] = ["timestamp", "level", "rest"];

static DEFAULT_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(DEFAULT_PATTERN).expect("default line pattern is valid"));

static KV_RE: Lazy<Regex> = Lazy::new(|| Regex::new(KV_PATTERN).expect("kv pattern is valid"));

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("invalid line pattern: {0}")]
    Regex(#[from] regex::Error),

    #[error("line pattern is missing the named group `{0}`")]
    MissingGroup(&'static str),
}

/// Parser for `<timestamp> <level> key=value ... msg="..."` lines.
#[derive(Debug, Clone)]
pub struct TextParser {
    line_pattern: Regex,
}

impl TextParser {
    pub fn new() -> Self {
        Self {
            line_pattern: DEFAULT_LINE_RE.clone(),
        }
    }

    /// Use a custom outer pattern. It must define the `timestamp`,
    /// `level` and `rest` named groups.
    pub fn with_pattern(pattern: &str) -> Result<Self, PatternError> {
        let line_pattern = Regex::new(pattern)?;
        let names: Vec<&str> = line_pattern.capture_names().flatten().collect();
        for group in REQUIRED_GROUPS {
            if !names.contains(&group) {
                return Err(PatternError::MissingGroup(group));
            }
        }
        Ok(Self { line_pattern })
    }
}

impl Default for TextParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LogParser for TextParser {
    fn parse_line(&self, line: &str) -> Result<LogEvent, ParseError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(ParseError::Empty);
        }

        let caps = self
            .line_pattern
            .captures(line)
            .ok_or_else(ParseError::shape_mismatch)?;

        let level = caps
            .name("level")
            .map(|m| LogLevel::parse_lenient(m.as_str()))
            .unwrap_or(LogLevel::Unknown);
        let rest = caps.name("rest").map_or("", |m| m.as_str());

        let mut builder = EventBuilder::new().level(level);
        if let Some(ts) = caps.name("timestamp") {
            builder = builder.raw_timestamp(ts.as_str());
        }

        let mut message: Option<&str> = None;
        for (key, value) in kv_pairs(rest) {
            match key {
                "msg" | "message" => message = Some(value),
                // Non-numeric values are dropped, not errors
                "duration_ms" => {
                    if let Ok(duration) = value.parse::<f64>() {
                        builder = builder.duration_ms(duration);
                    }
                }
                "status" => {
                    if let Ok(status) = value.parse::<i32>() {
                        builder = builder.status_code(status);
                    }
                }
                "service" => builder = builder.service(value),
                "request_id" => builder = builder.request_id(value),
                _ => {}
            }
        }

        let message = message.filter(|m| !m.is_empty()).unwrap_or(rest);

        Ok(builder.message(message).build()?)
    }

    fn format(&self) -> LogFormat {
        LogFormat::Text
    }
}

/// Scan `key=value` and `key="quoted value"` tokens left to right.
/// Text between tokens is skipped.
fn kv_pairs(text: &str) -> impl Iterator<Item = (&str, &str)> + '_ {
    KV_RE.captures_iter(text).filter_map(|caps| {
        let key = caps.name("key")?.as_str();
        let value = caps.name("quoted_val").or_else(|| caps.name("val"))?.as_str();
        Some((key, value))
    })
}
