//! The analysis accumulator and its merge rules
//!
//! Scalar counters, the per-code and per-level maps and the heatmap merge by
//! plain addition, so any grouping or order of partial results gives the same
//! totals. Two fields are exceptions:
//!
//! - `top_errors` is re-ranked from the union of the two top lists only. A
//!   message that never made the top list of any partial is undercounted.
//! - `timeline` is concatenated as-is; use [`AnalysisResult::sorted_timeline`]
//!   to coalesce and order it for display.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::entry::{Level, ParseError, ParseErrorCode};
use crate::timestamp::Timestamp;

/// Maximum number of entries in `top_errors`
pub const TOP_ERRORS_LIMIT: usize = 10;
/// Maximum number of parse errors kept as examples
pub const ERROR_SAMPLES_LIMIT: usize = 5;

pub const HEATMAP_DAYS: usize = 7;
pub const HEATMAP_HOURS: usize = 24;

/// Activity grid indexed by `[day_of_week][hour]`, 0 = Sunday
pub type Heatmap = [[u64; HEATMAP_HOURS]; HEATMAP_DAYS];

/// One ranked ERROR message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorCount {
    pub message: String,
    pub count: u64,
}

impl ErrorCount {
    pub fn new(message: impl Into<String>, count: u64) -> Self {
        Self {
            message: message.into(),
            count,
        }
    }
}

/// Error and warning counts for one minute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimelineBucket {
    pub minute: Timestamp,
    pub errors: u64,
    pub warnings: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub total_lines: u64,
    pub parsed_lines: u64,
    pub invalid_lines: u64,
    pub keyword_hits: u64,
    pub time_range_matched: u64,
    pub parse_errors: BTreeMap<ParseErrorCode, u64>,
    pub level_counts: BTreeMap<Level, u64>,
    pub top_errors: Vec<ErrorCount>,
    pub timeline: Vec<TimelineBucket>,
    pub heatmap: Heatmap,
    pub error_samples: Vec<ParseError>,
}

impl AnalysisResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a rejected line and keep it as an example while there is room
    pub fn record_parse_error(&mut self, error: ParseError) {
        self.invalid_lines += 1;
        *self.parse_errors.entry(error.code).or_insert(0) += 1;
        if self.error_samples.len() < ERROR_SAMPLES_LIMIT {
            self.error_samples.push(error);
        }
    }

    /// Shift sample line numbers by the number of lines that precede this
    /// partial's chunk in the input.
    pub fn offset_line_numbers(&mut self, base: u64) {
        for sample in &mut self.error_samples {
            sample.line_number += base;
        }
    }

    /// Fold `other` into `self`.
    pub fn merge(&mut self, other: AnalysisResult) {
        self.total_lines += other.total_lines;
        self.parsed_lines += other.parsed_lines;
        self.invalid_lines += other.invalid_lines;
        self.keyword_hits += other.keyword_hits;
        self.time_range_matched += other.time_range_matched;

        for (code, count) in other.parse_errors {
            *self.parse_errors.entry(code).or_insert(0) += count;
        }
        for (level, count) in other.level_counts {
            *self.level_counts.entry(level).or_insert(0) += count;
        }

        for (day, row) in other.heatmap.iter().enumerate() {
            for (hour, count) in row.iter().enumerate() {
                self.heatmap[day][hour] += count;
            }
        }

        self.timeline.extend(other.timeline);

        let mut combined: HashMap<String, u64> = HashMap::new();
        for ErrorCount { message, count } in self.top_errors.drain(..).chain(other.top_errors) {
            *combined.entry(message).or_insert(0) += count;
        }
        self.top_errors = rank_top_errors(combined);

        self.error_samples.extend(other.error_samples);
        self.error_samples.sort_by(|a, b| {
            a.line_number
                .cmp(&b.line_number)
                .then_with(|| a.raw_line.cmp(&b.raw_line))
        });
        self.error_samples.truncate(ERROR_SAMPLES_LIMIT);
    }

    /// Timeline with duplicate minutes combined, in ascending minute order
    pub fn sorted_timeline(&self) -> Vec<TimelineBucket> {
        let mut by_minute: BTreeMap<Timestamp, (u64, u64)> = BTreeMap::new();
        for bucket in &self.timeline {
            let slot = by_minute.entry(bucket.minute).or_insert((0, 0));
            slot.0 += bucket.errors;
            slot.1 += bucket.warnings;
        }
        by_minute
            .into_iter()
            .map(|(minute, (errors, warnings))| TimelineBucket {
                minute,
                errors,
                warnings,
            })
            .collect()
    }

    pub fn level_count(&self, level: Level) -> u64 {
        self.level_counts.get(&level).copied().unwrap_or(0)
    }

    pub fn parse_error_count(&self, code: ParseErrorCode) -> u64 {
        self.parse_errors.get(&code).copied().unwrap_or(0)
    }

    /// Busiest (day, hour) cell; earliest cell wins ties. `None` if empty.
    pub fn peak_heatmap_cell(&self) -> Option<(usize, usize, u64)> {
        let mut best: Option<(usize, usize, u64)> = None;
        for (day, row) in self.heatmap.iter().enumerate() {
            for (hour, &count) in row.iter().enumerate() {
                if count > 0 && best.map_or(true, |(_, _, c)| count > c) {
                    best = Some((day, hour, count));
                }
            }
        }
        best
    }
}

/// Order by count descending, then message ascending, and keep the first
/// [`TOP_ERRORS_LIMIT`].
pub fn rank_top_errors(counts: impl IntoIterator<Item = (String, u64)>) -> Vec<ErrorCount> {
    let mut ranked: Vec<ErrorCount> = counts
        .into_iter()
        .map(|(message, count)| ErrorCount { message, count })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.message.cmp(&b.message)));
    ranked.truncate(TOP_ERRORS_LIMIT);
    ranked
}
