// Log normalization and single-pass analytics.

// Core model
pub mod event;
pub mod parser;

// Aggregation and driving
pub mod analyzer;
pub mod ingest;

pub use analyzer::{Analyzer, AnomalyRule, FinalizedAnalysis, Summary};
pub use event::{LogEvent, LogLevel};
pub use ingest::{FailedLine, IngestError, IngestMode, IngestReport, Ingestor};
pub use parser::{LogParser, ParseOutcome, ParserChain};
