/// Individual line format parsers

pub mod json;
pub mod text;

// Re-export parser implementations
pub use json::JsonParser;
pub use text::{PatternError, TextParser};
