//! Fork-join execution of planned chunks
//!
//! One scoped thread per chunk; partial results come back over a channel
//! while the calling thread polls progress. Partials are merged in chunk
//! order after rebasing their sample line numbers.

use crossbeam_channel::RecvTimeoutError;
use std::any::Any;
use std::ops::Range;
use std::panic::{self, AssertUnwindSafe};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

use crate::analysis::{AnalysisContext, AnalysisResult};
use crate::parsers::LineParser;

use super::tracker::ProgressTracker;
use super::worker::scan_chunk;

/// Default interval between progress callback invocations
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Merged output of one fork-join run
#[derive(Debug, Default)]
pub struct ChunkRun {
    pub result: AnalysisResult,
    pub failed_chunks: usize,
}

pub struct ParallelProcessor<'a> {
    parser: &'a LineParser,
    context: &'a AnalysisContext,
    poll_interval: Duration,
}

impl<'a> ParallelProcessor<'a> {
    pub fn new(parser: &'a LineParser, context: &'a AnalysisContext) -> Self {
        Self {
            parser,
            context,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Scan every chunk of `data` in parallel and merge the partials.
    ///
    /// `progress` is only ever called from the current thread: once as the
    /// workers start, then whenever a poll interval has elapsed. Once it
    /// returns `false` the tracker is cancelled and it is not called again.
    pub fn process<F>(
        &self,
        data: &[u8],
        chunks: &[Range<usize>],
        tracker: &ProgressTracker,
        progress: &mut F,
    ) -> ChunkRun
    where
        F: FnMut(f64) -> bool + ?Sized,
    {
        let (parser, context) = (self.parser, self.context);
        self.process_with(data, chunks, tracker, progress, |_, chunk| {
            scan_chunk(chunk, parser, context, tracker)
        })
    }

    fn process_with<F, S>(
        &self,
        data: &[u8],
        chunks: &[Range<usize>],
        tracker: &ProgressTracker,
        progress: &mut F,
        scan: S,
    ) -> ChunkRun
    where
        F: FnMut(f64) -> bool + ?Sized,
        S: Fn(usize, &[u8]) -> AnalysisResult + Sync,
    {
        let mut partials: Vec<Option<AnalysisResult>> = vec![None; chunks.len()];
        let mut failed = vec![false; chunks.len()];

        thread::scope(|scope| {
            let (sender, receiver) = crossbeam_channel::unbounded();

            for (index, range) in chunks.iter().enumerate() {
                let sender = sender.clone();
                let chunk = &data[range.clone()];
                let range = range.clone();
                let scan = &scan;

                scope.spawn(move || {
                    debug!(chunk = index, start = range.start, end = range.end, "worker started");
                    let outcome = panic::catch_unwind(AssertUnwindSafe(|| scan(index, chunk)));
                    let partial = match outcome {
                        Ok(result) => {
                            debug!(chunk = index, lines = result.total_lines, "worker finished");
                            Some(result)
                        }
                        Err(payload) => {
                            error!(
                                chunk = index,
                                "worker panicked, chunk contributes nothing: {}",
                                panic_message(payload.as_ref())
                            );
                            None
                        }
                    };
                    let _ = sender.send((index, partial));
                });
            }
            drop(sender);

            if !chunks.is_empty() && !tracker.report(progress) {
                info!("cancellation requested before scanning started");
            }

            let mut next_report = Instant::now() + self.poll_interval;
            let mut remaining = chunks.len();
            while remaining > 0 {
                let wait = next_report.saturating_duration_since(Instant::now());
                match receiver.recv_timeout(wait) {
                    Ok((index, partial)) => {
                        match partial {
                            Some(result) => partials[index] = Some(result),
                            None => failed[index] = true,
                        }
                        remaining -= 1;
                    }
                    Err(RecvTimeoutError::Timeout) => {}
                    Err(RecvTimeoutError::Disconnected) => break,
                }

                // a steady stream of partials must not starve the callback
                if remaining > 0 && Instant::now() >= next_report {
                    if !tracker.is_cancelled() && !tracker.report(progress) {
                        info!("cancellation requested, waiting for workers");
                    }
                    next_report = Instant::now() + self.poll_interval;
                }
            }
        });

        // Line bases come from the chunk bytes, not from what a worker
        // scanned, so numbering stays exact after a cancel or a panic.
        let mut run = ChunkRun::default();
        let mut line_base = 0u64;
        for (index, partial) in partials.into_iter().enumerate() {
            match partial {
                Some(mut partial) => {
                    partial.offset_line_numbers(line_base);
                    run.result.merge(partial);
                }
                None if failed[index] => run.failed_chunks += 1,
                None => {}
            }
            line_base += count_lines(&data[chunks[index].clone()]);
        }
        run
    }
}

fn count_lines(chunk: &[u8]) -> u64 {
    let newlines = memchr::memchr_iter(b'\n', chunk).count() as u64;
    match chunk.last() {
        Some(b'\n') | None => newlines,
        Some(_) => newlines + 1,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{Level, ParseErrorCode};
    use crate::parallel::chunks::plan_chunks;

    fn sample_log(lines: usize) -> Vec<u8> {
        let mut data = Vec::new();
        for i in 0..lines {
            let line = match i % 5 {
                0 => format!("[2026-01-05 10:{:02}:00] [ERROR] failure {}\n", i % 60, i % 3),
                1 => format!("[2026-01-05 11:{:02}:00] [WARNING] slow\n", i % 60),
                2 => "not a log line\n".to_string(),
                _ => format!("[2026-01-05 12:{:02}:30] [INFO] ok\n", i % 60),
            };
            data.extend_from_slice(line.as_bytes());
        }
        data
    }

    fn run(data: &[u8], workers: usize) -> ChunkRun {
        let parser = LineParser::default();
        let context = AnalysisContext::new();
        let tracker = ProgressTracker::new(data.len() as u64);
        let chunks = plan_chunks(data, workers);
        let mut progress = |_: f64| true;
        ParallelProcessor::new(&parser, &context).process(data, &chunks, &tracker, &mut progress)
    }

    #[test]
    fn test_worker_count_does_not_change_counters() {
        let data = sample_log(1000);
        let single = run(&data, 1).result;
        for workers in [2, 3, 7, 16] {
            let multi = run(&data, workers).result;
            assert_eq!(multi.total_lines, single.total_lines);
            assert_eq!(multi.parsed_lines, single.parsed_lines);
            assert_eq!(multi.invalid_lines, single.invalid_lines);
            assert_eq!(multi.level_counts, single.level_counts);
            assert_eq!(multi.parse_errors, single.parse_errors);
            assert_eq!(multi.heatmap, single.heatmap);
            assert_eq!(multi.sorted_timeline(), single.sorted_timeline());
            // three distinct messages always fit every partial's top list
            assert_eq!(multi.top_errors, single.top_errors);
        }
        assert_eq!(single.total_lines, 1000);
        assert_eq!(single.level_count(Level::Error), 200);
        assert_eq!(single.parse_error_count(ParseErrorCode::BadFormat), 200);
    }

    #[test]
    fn test_sample_line_numbers_are_global() {
        let data = sample_log(1000);
        for workers in [1, 4, 9] {
            let result = run(&data, workers).result;
            let lines: Vec<u64> = result.error_samples.iter().map(|e| e.line_number).collect();
            assert_eq!(lines, vec![3, 8, 13, 18, 23], "workers = {}", workers);
        }
    }

    #[test]
    fn test_cancel_from_callback() {
        let data = sample_log(20_000);
        let parser = LineParser::default();
        let context = AnalysisContext::new();
        let tracker = ProgressTracker::new(data.len() as u64);
        let chunks = plan_chunks(&data, 4);
        let mut stop = |_: f64| false;

        let run = ParallelProcessor::new(&parser, &context)
            .with_poll_interval(Duration::from_millis(1))
            .process(&data, &chunks, &tracker, &mut stop);

        assert!(tracker.is_cancelled());
        assert!(run.result.total_lines <= 20_000);
        assert_eq!(run.failed_chunks, 0);
    }

    /// 400 equal-width lines, so four chunks hold exactly 100 lines each.
    /// Lines 50, 150, 250 and 350 are invalid.
    fn fixed_width_log() -> Vec<u8> {
        let mut data = Vec::new();
        for n in 1..=400 {
            let line = if n % 100 == 50 {
                format!("{:<38}\n", "garbage")
            } else {
                format!("[2026-01-05 10:{:02}:00] [INFO] line {:04}\n", n % 60, n)
            };
            data.extend_from_slice(line.as_bytes());
        }
        data
    }

    const FIXED_LINE_LEN: usize = 39;

    #[test]
    fn test_panicking_chunk_is_skipped_and_counted() {
        let data = fixed_width_log();
        let parser = LineParser::default();
        let context = AnalysisContext::new();
        let tracker = ProgressTracker::new(data.len() as u64);
        let chunks = plan_chunks(&data, 4);
        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks[1].start, 100 * FIXED_LINE_LEN);
        let mut progress = |_: f64| true;

        let run = ParallelProcessor::new(&parser, &context).process_with(
            &data,
            &chunks,
            &tracker,
            &mut progress,
            |index, chunk| {
                if index == 1 {
                    panic!("chunk {} failed", index);
                }
                scan_chunk(chunk, &parser, &context, &tracker)
            },
        );

        assert_eq!(run.failed_chunks, 1);
        let r = &run.result;
        assert_eq!(r.total_lines, 300);
        assert_eq!(r.invalid_lines, 3);
        assert_eq!(r.level_count(Level::Info), 297);
        let lines: Vec<u64> = r.error_samples.iter().map(|e| e.line_number).collect();
        assert_eq!(lines, vec![50, 250, 350]);
    }

    #[test]
    fn test_partially_scanned_chunk_keeps_later_numbering() {
        let data = fixed_width_log();
        let parser = LineParser::default();
        let context = AnalysisContext::new();
        let tracker = ProgressTracker::new(data.len() as u64);
        let chunks = plan_chunks(&data, 4);
        let mut progress = |_: f64| true;

        // the first chunk stops after ten lines, as a cancelled worker would
        let run = ParallelProcessor::new(&parser, &context).process_with(
            &data,
            &chunks,
            &tracker,
            &mut progress,
            |index, chunk| {
                let chunk = if index == 0 { &chunk[..10 * FIXED_LINE_LEN] } else { chunk };
                scan_chunk(chunk, &parser, &context, &tracker)
            },
        );

        assert_eq!(run.failed_chunks, 0);
        assert_eq!(run.result.total_lines, 310);
        let lines: Vec<u64> = run.result.error_samples.iter().map(|e| e.line_number).collect();
        assert_eq!(lines, vec![150, 250, 350]);
    }

    #[test]
    fn test_progress_reported_while_partials_keep_arriving() {
        let data = fixed_width_log();
        let parser = LineParser::default();
        let context = AnalysisContext::new();
        let tracker = ProgressTracker::new(data.len() as u64);
        let chunks = plan_chunks(&data, 8);
        assert_eq!(chunks.len(), 8);
        let mut calls = 0;
        let mut progress = |_: f64| {
            calls += 1;
            true
        };

        // chunks finish 10ms apart, closer than the poll interval
        ParallelProcessor::new(&parser, &context)
            .with_poll_interval(Duration::from_millis(25))
            .process_with(&data, &chunks, &tracker, &mut progress, |index, chunk| {
                thread::sleep(Duration::from_millis(10 * index as u64));
                scan_chunk(chunk, &parser, &context, &tracker)
            });

        assert!(calls >= 2, "calls = {}", calls);
    }

    #[test]
    fn test_count_lines() {
        assert_eq!(count_lines(b""), 0);
        assert_eq!(count_lines(b"a"), 1);
        assert_eq!(count_lines(b"a\n"), 1);
        assert_eq!(count_lines(b"a\nb"), 2);
        assert_eq!(count_lines(b"\n\n"), 2);
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");
        let payload: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }
}
