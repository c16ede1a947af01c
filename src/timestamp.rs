use chrono::{Datelike, NaiveDate};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Width of the only accepted timestamp layout: `YYYY-MM-DD HH:MM:SS`
pub const TIMESTAMP_LEN: usize = 19;

const DAYS_IN_MONTH: [u8; 13] = [0, 31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Calendar-validated wall-clock timestamp with second precision.
///
/// Field order matters: the derived `Ord` compares year, month, day, hour,
/// minute and second lexicographically, which is the chronological order.
/// `Timestamp::default()` is the all-zero value the pattern parser leaves in
/// place when a line carries no usable date; it is not a real calendar date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

/// Error returned when a command-line or settings value is not a valid timestamp
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid timestamp '{0}': expected YYYY-MM-DD HH:MM:SS")]
pub struct TimestampError(pub String);

impl Timestamp {
    /// Build a timestamp from its parts, validating every field.
    pub fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Option<Self> {
        if !(1..=12).contains(&month) || hour > 23 || minute > 59 || second > 59 {
            return None;
        }
        if day == 0 || day > days_in_month(year, month) {
            return None;
        }
        Some(Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        })
    }

    /// Strictly parse `YYYY-MM-DD HH:MM:SS`.
    pub fn parse(text: &str) -> Option<Self> {
        Self::parse_bytes(text.as_bytes())
    }

    /// Byte-level variant of [`Timestamp::parse`], used directly on mapped input.
    pub fn parse_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != TIMESTAMP_LEN {
            return None;
        }
        if bytes[4] != b'-'
            || bytes[7] != b'-'
            || bytes[10] != b' '
            || bytes[13] != b':'
            || bytes[16] != b':'
        {
            return None;
        }

        let year = parse_digits(&bytes[0..4])?;
        let month = parse_digits(&bytes[5..7])?;
        let day = parse_digits(&bytes[8..10])?;
        let hour = parse_digits(&bytes[11..13])?;
        let minute = parse_digits(&bytes[14..16])?;
        let second = parse_digits(&bytes[17..19])?;

        Self::new(
            year,
            month as u8,
            day as u8,
            hour as u8,
            minute as u8,
            second as u8,
        )
    }

    /// Same timestamp with the seconds cleared, used as the timeline bucket key
    pub fn truncate_to_minute(self) -> Self {
        Self { second: 0, ..self }
    }

    /// Day of week with 0 = Sunday .. 6 = Saturday.
    ///
    /// Returns `None` for values that are not real calendar dates (such as
    /// the default timestamp).
    pub fn weekday_from_sunday(&self) -> Option<usize> {
        NaiveDate::from_ymd_opt(self.year as i32, self.month as u32, self.day as u32)
            .map(|date| date.weekday().num_days_from_sunday() as usize)
    }
}

pub fn is_leap_year(year: u16) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

pub fn days_in_month(year: u16, month: u8) -> u8 {
    if month == 2 && is_leap_year(year) {
        29
    } else {
        DAYS_IN_MONTH.get(month as usize).copied().unwrap_or(0)
    }
}

// Every byte must be an ASCII digit; no sign, no padding, no overflow past u16.
fn parse_digits(bytes: &[u8]) -> Option<u16> {
    bytes.iter().try_fold(0u16, |acc, &b| {
        if b.is_ascii_digit() {
            acc.checked_mul(10)?.checked_add((b - b'0') as u16)
        } else {
            None
        }
    })
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

impl FromStr for Timestamp {
    type Err = TimestampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| TimestampError(s.to_string()))
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
