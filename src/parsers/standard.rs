use memchr::memchr;
use std::borrow::Cow;

use super::EntryParser;
use crate::entry::{Entry, Level, ParseError, ParseErrorCode, ParseResult};
use crate::timestamp::{Timestamp, TIMESTAMP_LEN};

/// Shortest well-formed line: `[YYYY-MM-DD HH:MM:SS] [L] m`
const MIN_LINE_LEN: usize = 27;
/// Offset of the timestamp's closing bracket in a well-formed line
const TIMESTAMP_MIN_END: usize = 20;

/// Parser for the fixed grammar `[YYYY-MM-DD HH:MM:SS] [LEVEL] message`
///
/// Level names are case-exact (`INFO`, `WARNING`, `ERROR`) and exactly one
/// space must follow each closing bracket. The message may be empty as long
/// as the separating space is present.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardParser;

impl StandardParser {
    pub fn new() -> Self {
        Self
    }
}

impl EntryParser for StandardParser {
    fn parse<'a>(&self, line: &'a [u8], line_number: u64) -> ParseResult<'a> {
        let fail = |code| Err(ParseError::new(code, line, line_number));

        if line.len() < MIN_LINE_LEN || line[0] != b'[' {
            return fail(ParseErrorCode::BadFormat);
        }

        let ts_end = match memchr(b']', &line[1..]) {
            Some(idx) if idx + 1 >= TIMESTAMP_MIN_END => idx + 1,
            _ => return fail(ParseErrorCode::BadFormat),
        };

        let ts_bytes = &line[1..ts_end];
        if ts_bytes.len() != TIMESTAMP_LEN {
            return fail(ParseErrorCode::BadTimestamp);
        }
        let timestamp = match Timestamp::parse_bytes(ts_bytes) {
            Some(ts) => ts,
            None => return fail(ParseErrorCode::BadTimestamp),
        };

        if ts_end + 2 >= line.len() || line[ts_end + 1] != b' ' || line[ts_end + 2] != b'[' {
            return fail(ParseErrorCode::BadFormat);
        }

        let level_start = ts_end + 3;
        let level_end = match memchr(b']', &line[level_start..]) {
            Some(idx) => level_start + idx,
            None => return fail(ParseErrorCode::BadFormat),
        };

        let level = match Level::from_exact(&line[level_start..level_end]) {
            Some(level) => level,
            None => return fail(ParseErrorCode::BadLevel),
        };

        if level_end + 1 >= line.len() {
            return fail(ParseErrorCode::MissingMessage);
        }
        if line[level_end + 1] != b' ' {
            return fail(ParseErrorCode::BadFormat);
        }

        let message = &line[level_end + 2..];
        Ok(Entry {
            timestamp,
            level,
            raw: String::from_utf8_lossy(line),
            message: if message.is_empty() {
                Cow::Borrowed("")
            } else {
                String::from_utf8_lossy(message)
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> ParseResult<'_> {
        StandardParser.parse(line.as_bytes(), 7)
    }

    fn code(line: &str) -> ParseErrorCode {
        parse(line).unwrap_err().code
    }

    #[test]
    fn test_valid_error_line() {
        let entry = parse("[2026-01-05 10:30:15] [ERROR] Database connection failed").unwrap();
        assert_eq!(entry.level, Level::Error);
        assert_eq!(entry.message, "Database connection failed");
        assert_eq!(entry.timestamp, Timestamp::parse("2026-01-05 10:30:15").unwrap());
        assert_eq!(entry.raw, "[2026-01-05 10:30:15] [ERROR] Database connection failed");
    }

    #[test]
    fn test_all_levels() {
        assert_eq!(parse("[2026-01-05 10:30:15] [INFO] ok").unwrap().level, Level::Info);
        assert_eq!(
            parse("[2026-01-05 10:30:15] [WARNING] careful").unwrap().level,
            Level::Warning
        );
    }

    #[test]
    fn test_missing_message() {
        assert_eq!(code("[2026-01-05 10:30:15] [ERROR]"), ParseErrorCode::MissingMessage);
    }

    #[test]
    fn test_empty_message_after_space_is_valid() {
        let entry = parse("[2026-01-05 10:30:15] [ERROR] ").unwrap();
        assert_eq!(entry.message, "");
    }

    #[test]
    fn test_bad_timestamp() {
        assert_eq!(code("[2026-99-99 10:30:15] [ERROR] x"), ParseErrorCode::BadTimestamp);
        assert_eq!(code("[2026-02-30 10:30:15] [ERROR] x"), ParseErrorCode::BadTimestamp);
        assert_eq!(code("[2026-01-05 10:30:15Z] [ERROR] x"), ParseErrorCode::BadTimestamp);
    }

    #[test]
    fn test_bad_level() {
        assert_eq!(code("[2026-01-05 10:30:15] [UNKNOWN] x"), ParseErrorCode::BadLevel);
        assert_eq!(code("[2026-01-05 10:30:15] [error] x"), ParseErrorCode::BadLevel);
    }

    #[test]
    fn test_bad_format() {
        assert_eq!(code("Not a valid log line"), ParseErrorCode::BadFormat);
        assert_eq!(code("2026-01-05 10:30:15 [ERROR] no brackets"), ParseErrorCode::BadFormat);
        assert_eq!(code("[2026-01-05] [ERROR] short timestamp here"), ParseErrorCode::BadFormat);
        assert_eq!(code("[2026-01-05 10:30:15]  [ERROR] two spaces"), ParseErrorCode::BadFormat);
        assert_eq!(code("[2026-01-05 10:30:15] [ERROR no close"), ParseErrorCode::BadFormat);
        assert_eq!(code("[2026-01-05 10:30:15] [ERROR]x"), ParseErrorCode::BadFormat);
    }

    #[test]
    fn test_error_carries_line_and_number() {
        let err = parse("garbage garbage garbage garbage").unwrap_err();
        assert_eq!(err.line_number, 7);
        assert_eq!(err.raw_line, "garbage garbage garbage garbage");
    }

    #[test]
    fn test_message_borrows_from_input() {
        let line = "[2026-01-05 10:30:15] [INFO] borrowed".to_string();
        let entry = StandardParser.parse(line.as_bytes(), 1).unwrap();
        assert!(matches!(entry.message, Cow::Borrowed(_)));
    }

    #[test]
    fn test_invalid_utf8_message_is_lossy() {
        let mut line = b"[2026-01-05 10:30:15] [ERROR] bad ".to_vec();
        line.push(0xff);
        let entry = StandardParser.parse(&line, 1).unwrap();
        assert_eq!(entry.message, "bad \u{fffd}");
    }
}
