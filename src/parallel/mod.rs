//! Parallel scanning of a memory-mapped input
//!
//! # Module Structure
//!
//! - `chunks`: line-aligned chunk planning and worker sizing
//! - `tracker`: shared progress counter and cancel flag
//! - `worker`: per-chunk line loop (parse, filter, analyze)
//! - `processor`: fork-join orchestration and ordered merge

mod chunks;
mod processor;
mod tracker;
mod worker;

pub use chunks::{plan_chunks, worker_count, DEFAULT_SMALL_INPUT_THRESHOLD};
pub use processor::{ChunkRun, ParallelProcessor, DEFAULT_POLL_INTERVAL};
pub use tracker::ProgressTracker;
pub use worker::{scan_chunk, ChunkScanner, PROGRESS_FLUSH_BYTES};
