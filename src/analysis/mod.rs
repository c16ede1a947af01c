//! Streaming analysis of parsed entries
//!
//! Analyzers consume accepted entries one at a time and write their totals
//! into an [`AnalysisResult`] on `finalize`. Every worker owns its own
//! [`AnalyzerSet`] and [`TimeRangeFilter`], built from the shared read-only
//! [`AnalysisContext`].

mod activity;
mod context;
mod filter;
mod keyword;
mod level;
pub mod report;
pub mod result;
mod top_errors;

pub use activity::{HeatmapAnalyzer, TimelineAnalyzer};
pub use context::AnalysisContext;
pub use filter::TimeRangeFilter;
pub use keyword::KeywordHitAnalyzer;
pub use level::LevelCountAnalyzer;
pub use report::TextReport;
pub use result::{AnalysisResult, ErrorCount, Heatmap, TimelineBucket};
pub use top_errors::TopErrorAnalyzer;

use crate::entry::Entry;

/// A streaming consumer of entries with a private accumulator
pub trait Analyzer: Send {
    /// Called once per accepted entry
    fn process(&mut self, entry: &Entry<'_>);

    /// Called once after the last entry; writes into the worker's result
    fn finalize(&mut self, result: &mut AnalysisResult);
}

/// The analyzers one worker runs, in a fixed order
pub struct AnalyzerSet {
    analyzers: Vec<Box<dyn Analyzer>>,
}

impl AnalyzerSet {
    pub fn new(analyzers: Vec<Box<dyn Analyzer>>) -> Self {
        Self { analyzers }
    }

    /// The standard set: level counts, top errors, timeline, heatmap, and a
    /// keyword counter when the context names a keyword.
    pub fn from_context(context: &AnalysisContext) -> Self {
        let mut analyzers: Vec<Box<dyn Analyzer>> = vec![
            Box::new(LevelCountAnalyzer::new()),
            Box::new(TopErrorAnalyzer::new()),
            Box::new(TimelineAnalyzer::new()),
            Box::new(HeatmapAnalyzer::new()),
        ];
        if let Some(keyword) = &context.keyword {
            analyzers.push(Box::new(KeywordHitAnalyzer::new(keyword.clone())));
        }
        Self { analyzers }
    }

    pub fn len(&self) -> usize {
        self.analyzers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.analyzers.is_empty()
    }

    pub fn process(&mut self, entry: &Entry<'_>) {
        for analyzer in &mut self.analyzers {
            analyzer.process(entry);
        }
    }

    pub fn finalize(&mut self, result: &mut AnalysisResult) {
        for analyzer in &mut self.analyzers {
            analyzer.finalize(result);
        }
    }
}

#[cfg(test)]
pub(crate) fn test_entry(level: crate::entry::Level, message: &str) -> Entry<'_> {
    let ts = crate::timestamp::Timestamp::parse("2026-01-05 10:30:15")
        .expect("valid test timestamp");
    Entry::new(ts, level, message, message)
}
