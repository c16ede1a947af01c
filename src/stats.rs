use serde::Serialize;
use std::time::Duration;

/// Statistics about how a run was executed, as opposed to what it found
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunStats {
    pub bytes_total: u64,
    pub bytes_processed: u64,
    pub workers: usize,
    pub chunks: usize,
    pub failed_chunks: usize,
    #[serde(serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

impl RunStats {
    pub fn format_stats(&self, total_lines: u64) -> String {
        let mut output = format!(
            "Bytes processed: {} of {}; {} lines with {} worker{} over {} chunk{}",
            self.bytes_processed,
            self.bytes_total,
            total_lines,
            self.workers,
            if self.workers == 1 { "" } else { "s" },
            self.chunks,
            if self.chunks == 1 { "" } else { "s" },
        );

        if self.failed_chunks > 0 {
            output.push_str(&format!(", {} failed", self.failed_chunks));
        }

        let elapsed_ms = self.elapsed.as_millis();
        output.push_str(&format!(" in {}ms", elapsed_ms));

        if elapsed_ms > 0 {
            let mib_per_sec =
                (self.bytes_processed as f64 / (1024.0 * 1024.0)) / self.elapsed.as_secs_f64();
            let lines_per_sec = (total_lines as f64 * 1000.0) / elapsed_ms as f64;
            output.push_str(&format!(
                " ({:.1} MiB/s, {:.0} lines/s)",
                mib_per_sec, lines_per_sec
            ));
        }

        output
    }
}

fn serialize_millis<S: serde::Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(elapsed.as_millis() as u64)
}
