//! Parsed-line data model
//!
//! `Entry` is the successful outcome of parsing one line and `ParseError` the
//! failed one. Entries borrow from the line they were parsed from, so they
//! live only as long as the processing of that line.

use serde::Serialize;
use std::borrow::Cow;
use std::fmt;

use crate::timestamp::Timestamp;

/// Severity of a log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Info,
    Warning,
    Error,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::Info, Level::Warning, Level::Error];

    /// Case-exact match used by the fixed grammar
    pub fn from_exact(text: &[u8]) -> Option<Self> {
        match text {
            b"INFO" => Some(Level::Info),
            b"WARNING" => Some(Level::Warning),
            b"ERROR" => Some(Level::Error),
            _ => None,
        }
    }

    /// Lenient classification used by the pattern grammar; never fails.
    pub fn classify(text: &str) -> Self {
        let upper = text.to_ascii_uppercase();
        // "ERR" also covers "ERROR"
        if upper.contains("ERR") {
            Level::Error
        } else if upper.contains("WARN") {
            Level::Warning
        } else {
            Level::Info
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One successfully parsed line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry<'a> {
    pub timestamp: Timestamp,
    pub level: Level,
    pub raw: Cow<'a, str>,
    pub message: Cow<'a, str>,
}

impl<'a> Entry<'a> {
    pub fn new(
        timestamp: Timestamp,
        level: Level,
        raw: impl Into<Cow<'a, str>>,
        message: impl Into<Cow<'a, str>>,
    ) -> Self {
        Self {
            timestamp,
            level,
            raw: raw.into(),
            message: message.into(),
        }
    }
}

/// Why a line failed to parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ParseErrorCode {
    BadFormat,
    BadTimestamp,
    BadLevel,
    MissingMessage,
}

impl ParseErrorCode {
    pub const ALL: [ParseErrorCode; 4] = [
        ParseErrorCode::BadFormat,
        ParseErrorCode::BadTimestamp,
        ParseErrorCode::BadLevel,
        ParseErrorCode::MissingMessage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ParseErrorCode::BadFormat => "BadFormat",
            ParseErrorCode::BadTimestamp => "BadTimestamp",
            ParseErrorCode::BadLevel => "BadLevel",
            ParseErrorCode::MissingMessage => "MissingMessage",
        }
    }
}

impl fmt::Display for ParseErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A line that violated the grammar. Owns a copy of the offending line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("line {line_number}: {code}")]
pub struct ParseError {
    pub code: ParseErrorCode,
    pub raw_line: String,
    pub line_number: u64,
}

impl ParseError {
    pub fn new(code: ParseErrorCode, line: &[u8], line_number: u64) -> Self {
        Self {
            code,
            raw_line: String::from_utf8_lossy(line).into_owned(),
            line_number,
        }
    }
}

/// Outcome of parsing a single line
pub type ParseResult<'a> = Result<Entry<'a>, ParseError>;
