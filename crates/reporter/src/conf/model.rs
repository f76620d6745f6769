use engine::analyzer::DEFAULT_TOP_N;
use engine::IngestMode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReporterConfig {
    pub analysis: AnalysisConfig,
    pub ingest: IngestConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalysisConfig {
    /// How many slow requests the summary keeps
    pub top_n: usize,
    /// Error ratio a minute bucket must exceed to be reported
    pub anomaly_threshold: f64,
    /// Buckets with fewer requests are never reported
    pub anomaly_min_requests: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IngestConfig {
    pub mode: IngestMode,
    /// File extensions picked up when the input is a directory, in order
    pub extensions: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    pub dir: String,
    /// Failed lines are cut to this many characters in events_failed.csv
    pub max_failed_line_chars: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogStyle,
    pub output: LogOutput,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStyle {
    Json,
    Pretty,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    Stderr,
    File { path: String },
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            analysis: AnalysisConfig {
                top_n: DEFAULT_TOP_N,
                anomaly_threshold: 0.1,
                anomaly_min_requests: 10,
            },
            ingest: IngestConfig {
                mode: IngestMode::Lenient,
                extensions: vec!["log".to_string(), "jsonl".to_string(), "txt".to_string()],
            },
            output: OutputConfig {
                dir: "out".to_string(),
                max_failed_line_chars: 1000,
            },
            logging: LoggingConfig {
                level: "warn,log_reporter=info,engine=info".to_string(),
                format: LogStyle::Pretty,
                output: LogOutput::Stderr,
            },
        }
    }
}
