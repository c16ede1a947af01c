use std::collections::BTreeMap;

use super::{AnalysisResult, Analyzer};
use crate::entry::{Entry, Level};

/// Counts entries per level
#[derive(Debug, Default)]
pub struct LevelCountAnalyzer {
    counts: BTreeMap<Level, u64>,
}

impl LevelCountAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Analyzer for LevelCountAnalyzer {
    fn process(&mut self, entry: &Entry<'_>) {
        *self.counts.entry(entry.level).or_insert(0) += 1;
    }

    fn finalize(&mut self, result: &mut AnalysisResult) {
        result.level_counts = std::mem::take(&mut self.counts);
    }
}
