use regex::bytes::Regex;
use std::borrow::Cow;

use super::EntryParser;
use crate::entry::{Entry, Level, ParseError, ParseErrorCode, ParseResult};
use crate::timestamp::Timestamp;

const DATE_GROUP: &str = r"(\d{4}[-/]\d{2}[-/]\d{2})";
const TIME_GROUP: &str = r"(\d{2}:\d{2}:\d{2}(?:\.\d+)?)";
const LEVEL_GROUP: &str = r"(\w+)";
// Any byte, so lines that are not valid UTF-8 still match
const MESSAGE_GROUP: &str = r"((?-u:.)*)";

/// What a capture group contributes to the entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldRole {
    Date,
    Time,
    Level,
    Message,
}

/// Parser driven by a small token language
///
/// Tokens:
/// - `%D` date (`YYYY-MM-DD`, `/` also accepted as separator)
/// - `%T` time (`HH:MM:SS`, optional fractional seconds)
/// - `%L` level word, classified leniently (see [`Level::classify`])
/// - `%M` message, greedy to the end of the line
///
/// Every other character matches itself. A pattern that fails to compile
/// degrades to treating the whole line as the message, so construction never
/// fails.
///
/// # Examples
/// ```
/// use loglens::parsers::{EntryParser, PatternParser};
///
/// let parser = PatternParser::new("%T - %L - %M");
/// let entry = parser.parse(b"14:30:15.500 - ERROR - Database connection lost", 1).unwrap();
/// assert_eq!(entry.message, "Database connection lost");
/// ```
#[derive(Debug, Clone)]
pub struct PatternParser {
    pattern: String,
    regex_source: String,
    regex: Regex,
    roles: Vec<FieldRole>,
}

impl PatternParser {
    pub fn new(pattern: &str) -> Self {
        let (regex_source, roles) = Self::compile_tokens(pattern);

        match Regex::new(&format!("^(?:{})$", regex_source)) {
            Ok(regex) => {
                tracing::debug!(pattern, regex = %regex_source, "compiled line pattern");
                Self {
                    pattern: pattern.to_string(),
                    regex_source,
                    regex,
                    roles,
                }
            }
            Err(err) => {
                tracing::warn!(
                    pattern,
                    error = %err,
                    "line pattern failed to compile, treating whole lines as messages"
                );
                Self::whole_line(pattern)
            }
        }
    }

    fn whole_line(pattern: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            regex_source: MESSAGE_GROUP.to_string(),
            regex: Regex::new(&format!("^{}$", MESSAGE_GROUP))
                .expect("whole-line fallback pattern is valid"),
            roles: vec![FieldRole::Message],
        }
    }

    /// Translate the token string into regex source plus the role of each
    /// capture group, in group order.
    fn compile_tokens(pattern: &str) -> (String, Vec<FieldRole>) {
        let mut source = String::with_capacity(pattern.len() * 2);
        let mut roles = Vec::new();
        let mut chars = pattern.chars().peekable();

        while let Some(ch) = chars.next() {
            if ch == '%' {
                let token = match chars.peek() {
                    Some('D') => Some((DATE_GROUP, FieldRole::Date)),
                    Some('T') => Some((TIME_GROUP, FieldRole::Time)),
                    Some('L') => Some((LEVEL_GROUP, FieldRole::Level)),
                    Some('M') => Some((MESSAGE_GROUP, FieldRole::Message)),
                    _ => None,
                };
                if let Some((group, role)) = token {
                    chars.next();
                    source.push_str(group);
                    roles.push(role);
                    continue;
                }
            }
            let mut buf = [0u8; 4];
            source.push_str(&regex::escape(ch.encode_utf8(&mut buf)));
        }

        (source, roles)
    }

    /// The token string this parser was built from
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The regex the tokens compiled to (unanchored)
    pub fn regex_source(&self) -> &str {
        &self.regex_source
    }
}

impl EntryParser for PatternParser {
    fn parse<'a>(&self, line: &'a [u8], line_number: u64) -> ParseResult<'a> {
        let captures = match self.regex.captures(line) {
            Some(caps) => caps,
            None => {
                return Err(ParseError::new(
                    ParseErrorCode::BadFormat,
                    line,
                    line_number,
                ))
            }
        };

        let mut date: &[u8] = &[];
        let mut time: &[u8] = &[];
        let mut level = Level::Info;
        let mut message: Cow<'a, str> = Cow::Borrowed("");

        for (idx, role) in self.roles.iter().enumerate() {
            let Some(matched) = captures.get(idx + 1) else {
                continue;
            };
            let value = matched.as_bytes();
            match role {
                FieldRole::Date => date = value,
                FieldRole::Time => time = value,
                FieldRole::Level => level = Level::classify(&String::from_utf8_lossy(value)),
                FieldRole::Message => message = String::from_utf8_lossy(value),
            }
        }

        // A timestamp that does not parse is left at the default; this grammar
        // has no BadTimestamp outcome.
        let mut timestamp = Timestamp::default();
        if !date.is_empty() && !time.is_empty() {
            let mut combined = Vec::with_capacity(date.len() + 1 + time.len());
            combined.extend_from_slice(date);
            combined.push(b' ');
            combined.extend_from_slice(time);
            if let Some(ts) = Timestamp::parse_bytes(&combined) {
                timestamp = ts;
            }
        }

        Ok(Entry {
            timestamp,
            level,
            raw: String::from_utf8_lossy(line),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse<'a>(parser: &PatternParser, line: &'a str) -> ParseResult<'a> {
        parser.parse(line.as_bytes(), 1)
    }

    #[test]
    fn test_standard_layout_pattern() {
        let parser = PatternParser::new("[%D %T] [%L] %M");
        let entry = parse(&parser, "[2023-10-27 10:00:00] [INFO] System started").unwrap();
        assert_eq!(entry.level, Level::Info);
        assert_eq!(entry.message, "System started");
        assert_eq!(entry.timestamp, Timestamp::parse("2023-10-27 10:00:00").unwrap());
    }

    #[test]
    fn test_time_only_pattern_keeps_default_timestamp() {
        let parser = PatternParser::new("%T - %L - %M");
        let entry = parse(&parser, "14:30:15.500 - ERROR - Database connection lost").unwrap();
        assert_eq!(entry.level, Level::Error);
        assert_eq!(entry.message, "Database connection lost");
        assert_eq!(entry.timestamp, Timestamp::default());
    }

    #[test]
    fn test_literal_metacharacters_are_escaped() {
        let parser = PatternParser::new("|%D| %L ... %M");
        let entry = parse(&parser, "|2023-11-01| WARNING ... Disk space low").unwrap();
        assert_eq!(entry.level, Level::Warning);
        assert_eq!(entry.message, "Disk space low");

        // '.' is literal, so any other character in its place must not match
        assert!(parse(&parser, "|2023-11-01| WARNING xyz Disk space low").is_err());
    }

    #[test]
    fn test_mismatch_is_bad_format() {
        let parser = PatternParser::new("[%D] %M");
        let err = parse(&parser, "2023-10-10 Error message without brackets").unwrap_err();
        assert_eq!(err.code, ParseErrorCode::BadFormat);
    }

    #[test]
    fn test_unparseable_timestamp_is_not_an_error() {
        let parser = PatternParser::new("%D %T %L %M");
        let entry = parse(&parser, "2023/10/27 10:00:00 ERR boom").unwrap();
        assert_eq!(entry.timestamp, Timestamp::default());
        assert_eq!(entry.level, Level::Error);
    }

    #[test]
    fn test_lenient_level_classification() {
        let parser = PatternParser::new("%L: %M");
        assert_eq!(parse(&parser, "warn: x").unwrap().level, Level::Warning);
        assert_eq!(parse(&parser, "Err: x").unwrap().level, Level::Error);
        assert_eq!(parse(&parser, "DEBUG: x").unwrap().level, Level::Info);
    }

    #[test]
    fn test_empty_message_allowed() {
        let parser = PatternParser::new("%L %M");
        let entry = parse(&parser, "INFO ").unwrap();
        assert_eq!(entry.message, "");
    }

    #[test]
    fn test_unknown_token_and_trailing_percent_are_literal() {
        let parser = PatternParser::new("%X %M %");
        let entry = parse(&parser, "%X hello %").unwrap();
        assert_eq!(entry.message, "hello");
    }

    #[test]
    fn test_pattern_without_message_token() {
        let parser = PatternParser::new("%L");
        let entry = parse(&parser, "ERROR").unwrap();
        assert_eq!(entry.message, "");
        assert_eq!(entry.level, Level::Error);
    }

    #[test]
    fn test_introspection() {
        let parser = PatternParser::new("[%L] %M");
        assert_eq!(parser.pattern(), "[%L] %M");
        assert!(parser.regex_source().starts_with(r"\["));
    }

    #[test]
    fn test_whole_line_fallback_matches_everything() {
        let parser = PatternParser::whole_line("anything");
        let entry = parse(&parser, "no structure at all").unwrap();
        assert_eq!(entry.message, "no structure at all");
        assert_eq!(entry.level, Level::Info);
    }
}
