use super::{AnalysisResult, Analyzer};
use crate::entry::Entry;

/// Counts entries whose message contains a fixed keyword (case-sensitive)
#[derive(Debug)]
pub struct KeywordHitAnalyzer {
    keyword: String,
    hits: u64,
}

impl KeywordHitAnalyzer {
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            hits: 0,
        }
    }
}

impl Analyzer for KeywordHitAnalyzer {
    fn process(&mut self, entry: &Entry<'_>) {
        if entry.message.contains(self.keyword.as_str()) {
            self.hits += 1;
        }
    }

    fn finalize(&mut self, result: &mut AnalysisResult) {
        result.keyword_hits = self.hits;
    }
}
