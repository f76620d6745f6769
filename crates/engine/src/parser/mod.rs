/// Line parsing and normalization module
///
/// Turns raw log lines into `LogEvent`s, or into a failure carrying the
/// original line and a human-readable reason.
///
/// # Architecture
///
/// - `traits.rs`: the `LogParser` capability every format implements
/// - `formats/`: JSON and `<timestamp> <level> key=value` text parsers
/// - `chain.rs`: fixed-order, first-match-wins parser chain
/// - `metrics.rs`: per-run parse counters
///
/// Parsers never panic on input and never hand out a partially built
/// event: every failure is a `ParseError` value.

pub mod traits;
pub mod chain;
pub mod formats;
pub mod metrics;
pub mod model;

// Re-export commonly used types
pub use traits::LogParser;
pub use chain::ParserChain;
pub use metrics::ParseMetrics;
pub use model::{LogFormat, ParseError, ParseErrorKind, ParseFailure, ParseOutcome};
