//! Line grammars
//!
//! Both grammars implement [`EntryParser`]; the pipeline picks one once per run
//! through [`LineParser`] and shares it read-only between all workers.

pub mod pattern;
pub mod standard;

pub use pattern::PatternParser;
pub use standard::StandardParser;

use crate::entry::ParseResult;

/// Turns one line (without its terminator) into an entry or a parse error.
///
/// Implementations hold no mutable state, so a single instance can be used
/// from many threads at once.
pub trait EntryParser: Send + Sync {
    fn parse<'a>(&self, line: &'a [u8], line_number: u64) -> ParseResult<'a>;
}

/// The closed set of grammars a run can use
#[derive(Debug, Clone)]
pub enum LineParser {
    Standard(StandardParser),
    Pattern(PatternParser),
}

impl LineParser {
    /// Standard grammar when `pattern` is `None` or blank, otherwise a
    /// compiled token pattern.
    pub fn for_pattern(pattern: Option<&str>) -> Self {
        match pattern.map(str::trim) {
            Some(p) if !p.is_empty() => LineParser::Pattern(PatternParser::new(p)),
            _ => LineParser::Standard(StandardParser),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LineParser::Standard(_) => "standard",
            LineParser::Pattern(_) => "pattern",
        }
    }
}

impl Default for LineParser {
    fn default() -> Self {
        LineParser::Standard(StandardParser)
    }
}

impl EntryParser for LineParser {
    fn parse<'a>(&self, line: &'a [u8], line_number: u64) -> ParseResult<'a> {
        match self {
            LineParser::Standard(parser) => parser.parse(line, line_number),
            LineParser::Pattern(parser) => parser.parse(line, line_number),
        }
    }
}
