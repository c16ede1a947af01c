//! Run orchestration
//!
//! [`Pipeline`] ties a grammar, an [`AnalysisContext`] and tuning options to
//! an input. File and byte inputs are scanned in parallel over line-aligned
//! chunks; reader inputs are scanned sequentially on the calling thread. All
//! modes share the same per-line logic and produce the same counters.

use std::io::BufRead;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::analysis::{AnalysisContext, AnalysisResult};
use crate::error::PipelineError;
use crate::parallel::{
    plan_chunks, worker_count, ChunkScanner, ParallelProcessor, ProgressTracker,
    DEFAULT_POLL_INTERVAL, DEFAULT_SMALL_INPUT_THRESHOLD, PROGRESS_FLUSH_BYTES,
};
use crate::parsers::LineParser;
use crate::readers::MappedInput;
use crate::stats::RunStats;

/// Tuning knobs that do not affect results
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    /// `None` or `Some(0)` uses every core
    pub workers: Option<usize>,
    /// Inputs below this many bytes use one worker
    pub small_input_threshold: u64,
    pub poll_interval: Duration,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            workers: None,
            small_input_threshold: DEFAULT_SMALL_INPUT_THRESHOLD,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Result of a finished or cancelled run
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub result: AnalysisResult,
    /// True when the progress callback stopped the run; `result` is partial
    pub cancelled: bool,
    pub stats: RunStats,
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    context: AnalysisContext,
    parser: LineParser,
    options: PipelineOptions,
}

impl Pipeline {
    /// The grammar is chosen once here from the context's pattern.
    pub fn new(context: AnalysisContext) -> Self {
        let parser = LineParser::for_pattern(context.pattern.as_deref());
        Self {
            context,
            parser,
            options: PipelineOptions::default(),
        }
    }

    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn parser(&self) -> &LineParser {
        &self.parser
    }

    /// Memory-map `path` and scan it in parallel.
    ///
    /// Fails before any scanning if the file cannot be opened or mapped. The
    /// mapping is released before this returns.
    pub fn run_file<F>(&self, path: impl AsRef<Path>, progress: F) -> Result<RunOutcome, PipelineError>
    where
        F: FnMut(f64) -> bool,
    {
        let input = MappedInput::open(path)?;
        info!(
            path = %input.path().display(),
            bytes = input.len(),
            parser = self.parser.name(),
            "starting analysis"
        );
        Ok(self.run_bytes(input.as_bytes(), progress))
    }

    /// Scan an in-memory buffer with the parallel machinery.
    ///
    /// `progress` receives fractions in `0.0..=1.0` from the calling thread
    /// and can return `false` to cancel. It gets a final `1.0` unless the run
    /// was cancelled.
    pub fn run_bytes<F>(&self, data: &[u8], mut progress: F) -> RunOutcome
    where
        F: FnMut(f64) -> bool,
    {
        let started = Instant::now();
        let bytes_total = data.len() as u64;
        let tracker = ProgressTracker::new(bytes_total);

        let workers = worker_count(
            bytes_total,
            self.options.workers,
            self.options.small_input_threshold,
        );
        let chunks = plan_chunks(data, workers);
        debug!(workers, chunks = chunks.len(), "planned chunks");

        let run = ParallelProcessor::new(&self.parser, &self.context)
            .with_poll_interval(self.options.poll_interval)
            .process(data, &chunks, &tracker, &mut progress);

        let cancelled = tracker.is_cancelled();
        if cancelled {
            info!(lines = run.result.total_lines, "analysis cancelled");
        } else {
            progress(1.0);
        }

        RunOutcome {
            result: run.result,
            cancelled,
            stats: RunStats {
                bytes_total,
                bytes_processed: tracker.bytes_processed(),
                workers,
                chunks: chunks.len(),
                failed_chunks: run.failed_chunks,
                elapsed: started.elapsed(),
            },
        }
    }

    /// Scan a line reader sequentially on the calling thread.
    ///
    /// `bytes_total` is used only for progress fractions; pass `None` when it
    /// is unknown. The callback is consulted once before the first line, then
    /// after every MiB read or poll interval, whichever comes first.
    pub fn run_reader<R, F>(
        &self,
        mut reader: R,
        bytes_total: Option<u64>,
        mut progress: F,
    ) -> Result<RunOutcome, PipelineError>
    where
        R: BufRead,
        F: FnMut(f64) -> bool,
    {
        let started = Instant::now();
        let tracker = ProgressTracker::new(bytes_total.unwrap_or(0));
        let mut scanner = ChunkScanner::new(&self.parser, &self.context);
        let mut line = Vec::new();
        let mut unreported = 0u64;

        debug!(parser = self.parser.name(), "starting sequential analysis");
        tracker.report(&mut progress);
        let mut next_report = Instant::now() + self.options.poll_interval;

        while !tracker.is_cancelled() {
            line.clear();
            let read = reader
                .read_until(b'\n', &mut line)
                .map_err(|source| PipelineError::Read { source })?;
            if read == 0 {
                break;
            }
            let content = line.strip_suffix(b"\n").unwrap_or(&line[..]);
            scanner.scan_line(content);

            unreported += read as u64;
            if unreported >= PROGRESS_FLUSH_BYTES || Instant::now() >= next_report {
                tracker.add_bytes(unreported);
                unreported = 0;
                tracker.report(&mut progress);
                next_report = Instant::now() + self.options.poll_interval;
            }
        }
        tracker.add_bytes(unreported);

        let cancelled = tracker.is_cancelled();
        let result = scanner.finish();
        if cancelled {
            info!(lines = result.total_lines, "analysis cancelled");
        } else {
            progress(1.0);
        }

        Ok(RunOutcome {
            result,
            cancelled,
            stats: RunStats {
                bytes_total: bytes_total.unwrap_or(tracker.bytes_processed()),
                bytes_processed: tracker.bytes_processed(),
                workers: 1,
                chunks: 1,
                failed_chunks: 0,
                elapsed: started.elapsed(),
            },
        })
    }
}
