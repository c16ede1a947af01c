use std::collections::HashMap;

use super::result::rank_top_errors;
use super::{AnalysisResult, Analyzer};
use crate::entry::{Entry, Level};

/// Tracks the most frequent ERROR messages.
///
/// The full frequency map is kept until `finalize`, which ranks it and keeps
/// the top [`TOP_ERRORS_LIMIT`](super::result::TOP_ERRORS_LIMIT).
#[derive(Debug, Default)]
pub struct TopErrorAnalyzer {
    counts: HashMap<String, u64>,
}

impl TopErrorAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Analyzer for TopErrorAnalyzer {
    fn process(&mut self, entry: &Entry<'_>) {
        if entry.level != Level::Error {
            return;
        }
        // Avoid allocating a key for messages already seen
        if let Some(count) = self.counts.get_mut(&*entry.message) {
            *count += 1;
        } else {
            self.counts.insert(entry.message.to_string(), 1);
        }
    }

    fn finalize(&mut self, result: &mut AnalysisResult) {
        result.top_errors = rank_top_errors(std::mem::take(&mut self.counts));
    }
}
