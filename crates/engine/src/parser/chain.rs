use super::formats::*;
use super::traits::*;

/// Ordered parser chain: the first parser that succeeds wins.
///
/// When every parser fails, the reason reported is the one from the
/// *last* parser tried, not the most specific one. With the default
/// chain that means a JSON-looking line that is not valid JSON reports
/// the text parser's reason.
pub struct ParserChain {
    parsers: Vec<Box<dyn LogParser>>,
}

impl ParserChain {
    pub fn new() -> Self {
        let parsers: Vec<Box<dyn LogParser>> = vec![
            // Order matters! JSON first, text second
            Box::new(JsonParser::new()),
            Box::new(TextParser::new()),
        ];

        Self { parsers }
    }

    pub fn with_parsers(parsers: Vec<Box<dyn LogParser>>) -> Self {
        Self { parsers }
    }

    pub fn formats(&self) -> Vec<LogFormat> {
        self.parsers.iter().map(|p| p.format()).collect()
    }

    pub fn parse_line(&self, line: &str) -> ParseOutcome {
        self.parse_line_with_format(line).map(|(_, event)| event)
    }

    /// Same as `parse_line`, also reporting which format matched.
    pub fn parse_line_with_format(&self, line: &str) -> Result<(LogFormat, LogEvent), ParseFailure> {
        let mut last_error = None;

        for parser in &self.parsers {
            match parser.parse_line(line) {
                Ok(event) => return Ok((parser.format(), event)),
                Err(e) => last_error = Some(e),
            }
        }

        Err(ParseFailure {
            line: line.trim().to_string(),
            reason: last_error.unwrap_or_else(|| ParseError::Syntax("No parser matched".to_string())),
        })
    }
}

impl Default for ParserChain {
    fn default() -> Self {
        Self::new()
    }
}
