//! Per-chunk scanning
//!
//! A [`ChunkScanner`] owns one worker's filter, analyzers and partial result.
//! [`scan_chunk`] drives it over a byte range; the sequential reader drives
//! the same scanner one owned line at a time.

use crate::analysis::{AnalysisContext, AnalysisResult, AnalyzerSet, TimeRangeFilter};
use crate::parsers::{EntryParser, LineParser};

use super::tracker::ProgressTracker;

/// Bytes a worker consumes between flushes to the shared progress counter
pub const PROGRESS_FLUSH_BYTES: u64 = 1024 * 1024;

pub struct ChunkScanner<'p> {
    parser: &'p LineParser,
    filter: TimeRangeFilter,
    analyzers: AnalyzerSet,
    result: AnalysisResult,
    line_number: u64,
}

impl<'p> ChunkScanner<'p> {
    pub fn new(parser: &'p LineParser, context: &AnalysisContext) -> Self {
        Self {
            parser,
            filter: TimeRangeFilter::new(context.from, context.to),
            analyzers: AnalyzerSet::from_context(context),
            result: AnalysisResult::new(),
            line_number: 0,
        }
    }

    /// Process one line without its `\n`. A trailing `\r` is dropped.
    ///
    /// Lines are numbered from 1 within this scanner.
    pub fn scan_line(&mut self, line: &[u8]) {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        self.line_number += 1;
        self.result.total_lines += 1;

        match self.parser.parse(line, self.line_number) {
            Ok(entry) => {
                self.result.parsed_lines += 1;
                if !self.filter.accept(&entry.timestamp) {
                    return;
                }
                if self.filter.is_active() {
                    self.result.time_range_matched += 1;
                }
                self.analyzers.process(&entry);
            }
            Err(error) => self.result.record_parse_error(error),
        }
    }

    pub fn lines_scanned(&self) -> u64 {
        self.line_number
    }

    /// Finalize every analyzer into the partial result.
    pub fn finish(mut self) -> AnalysisResult {
        self.analyzers.finalize(&mut self.result);
        self.result
    }
}

/// Scan every line of `data`, stopping early at a line boundary once the
/// tracker is cancelled. The partial result covers the lines seen so far.
pub fn scan_chunk(
    data: &[u8],
    parser: &LineParser,
    context: &AnalysisContext,
    tracker: &ProgressTracker,
) -> AnalysisResult {
    let mut scanner = ChunkScanner::new(parser, context);
    let mut pos = 0;
    let mut unflushed = 0u64;

    while pos < data.len() {
        if tracker.is_cancelled() {
            break;
        }
        let end = memchr::memchr(b'\n', &data[pos..]).map_or(data.len(), |i| pos + i);
        scanner.scan_line(&data[pos..end]);

        let next = (end + 1).min(data.len());
        unflushed += (next - pos) as u64;
        pos = next;

        if unflushed >= PROGRESS_FLUSH_BYTES {
            tracker.add_bytes(unflushed);
            unflushed = 0;
        }
    }
    tracker.add_bytes(unflushed);

    scanner.finish()
}
