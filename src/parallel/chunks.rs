//! Line-aligned chunk planning
//!
//! Splits a byte buffer into contiguous ranges, one per worker, such that
//! every chunk boundary is a line start. A line is never split across two
//! chunks and no byte belongs to more than one chunk.

use std::ops::Range;

/// Inputs smaller than this are scanned by a single worker.
pub const DEFAULT_SMALL_INPUT_THRESHOLD: u64 = 1024 * 1024;

/// Number of workers for an input of `input_size` bytes.
///
/// `requested` of `None` or `Some(0)` means "use every core". Small inputs
/// always get one worker.
pub fn worker_count(input_size: u64, requested: Option<usize>, small_input_threshold: u64) -> usize {
    if input_size < small_input_threshold {
        return 1;
    }
    requested
        .filter(|&n| n > 0)
        .unwrap_or_else(num_cpus::get)
        .max(1)
}

/// Plan at most `workers` line-aligned chunks covering all of `data`.
///
/// Interior split `i` starts at the nominal offset `i * len / workers` and
/// moves forward to the next line start. Splits that do not move strictly
/// past the previous one are dropped, so one giant line collapses into a
/// single chunk. An empty buffer yields no chunks.
pub fn plan_chunks(data: &[u8], workers: usize) -> Vec<Range<usize>> {
    let len = data.len();
    if len == 0 {
        return Vec::new();
    }
    let workers = workers.max(1);

    let mut starts = Vec::with_capacity(workers);
    starts.push(0usize);
    for i in 1..workers {
        let nominal = ((i as u128 * len as u128) / workers as u128) as usize;
        let split = next_line_start(data, nominal);
        let previous = starts[starts.len() - 1];
        if split > previous && split < len {
            starts.push(split);
        }
    }

    let mut chunks = Vec::with_capacity(starts.len());
    for (idx, &start) in starts.iter().enumerate() {
        let end = starts.get(idx + 1).copied().unwrap_or(len);
        chunks.push(start..end);
    }
    chunks
}

/// First line start at or after `offset`, or `data.len()` if there is none.
fn next_line_start(data: &[u8], offset: usize) -> usize {
    if offset == 0 || offset >= data.len() {
        return offset.min(data.len());
    }
    if data[offset - 1] == b'\n' {
        return offset;
    }
    match memchr::memchr(b'\n', &data[offset..]) {
        Some(pos) => offset + pos + 1,
        None => data.len(),
    }
}
