//! Time-based activity: the per-minute error/warning timeline and the
//! weekday-by-hour heatmap.
//!
//! Entries whose timestamp is not a real calendar date are skipped; the
//! pattern grammar leaves such defaults in place when a line has no usable
//! date.

use std::collections::BTreeMap;

use super::result::{Heatmap, TimelineBucket};
use super::{AnalysisResult, Analyzer};
use crate::entry::{Entry, Level};
use crate::timestamp::Timestamp;

#[derive(Debug, Default)]
pub struct TimelineAnalyzer {
    buckets: BTreeMap<Timestamp, (u64, u64)>,
}

impl TimelineAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Analyzer for TimelineAnalyzer {
    fn process(&mut self, entry: &Entry<'_>) {
        if !matches!(entry.level, Level::Error | Level::Warning) {
            return;
        }
        if entry.timestamp.weekday_from_sunday().is_none() {
            return;
        }
        let slot = self
            .buckets
            .entry(entry.timestamp.truncate_to_minute())
            .or_insert((0, 0));
        match entry.level {
            Level::Error => slot.0 += 1,
            _ => slot.1 += 1,
        }
    }

    fn finalize(&mut self, result: &mut AnalysisResult) {
        result.timeline = std::mem::take(&mut self.buckets)
            .into_iter()
            .map(|(minute, (errors, warnings))| TimelineBucket {
                minute,
                errors,
                warnings,
            })
            .collect();
    }
}

#[derive(Debug, Default)]
pub struct HeatmapAnalyzer {
    grid: Heatmap,
}

impl HeatmapAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Analyzer for HeatmapAnalyzer {
    fn process(&mut self, entry: &Entry<'_>) {
        if let Some(day) = entry.timestamp.weekday_from_sunday() {
            self.grid[day][entry.timestamp.hour as usize] += 1;
        }
    }

    fn finalize(&mut self, result: &mut AnalysisResult) {
        result.heatmap = self.grid;
    }
}
