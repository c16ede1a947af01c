// tests/common/mod.rs
// Shared test utilities for integration tests
#![allow(dead_code)]

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};
use tempfile::{NamedTempFile, TempDir};

pub const SAMPLE_LOG: &str = "\
[2026-01-05 10:30:15] [INFO] Server started
[2026-01-05 10:30:16] [ERROR] Database connection failed
[2026-01-05 10:30:17] [WARNING] Slow query detected
[2026-01-05 10:30:18] [ERROR] Database connection failed
Not a valid log line
[2026-01-05 10:30:19] [ERROR]
[2026-01-05 10:31:20] [ERROR] Disk full
[2026-01-05 10:31:21] [INFO] Request served
";

/// Write `content` to a fresh temporary file
pub fn temp_log(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write to temp file");
    file.flush().expect("Failed to flush temp file");
    file
}

/// Deterministic synthetic log of `lines` lines mixing every level and some
/// unparseable lines
pub fn synthetic_log(lines: usize) -> String {
    let mut out = String::with_capacity(lines * 60);
    for i in 0..lines {
        let minute = (i / 60) % 60;
        let second = i % 60;
        match i % 7 {
            0 | 3 => out.push_str(&format!(
                "[2026-01-05 10:{:02}:{:02}] [ERROR] failure code {}\n",
                minute,
                second,
                i % 5
            )),
            1 => out.push_str(&format!(
                "[2026-01-05 11:{:02}:{:02}] [WARNING] retrying request {}\n",
                minute, second, i
            )),
            2 => out.push_str("corrupted entry\n"),
            4 => out.push_str(&format!("[2026-01-05 12:{:02}:{:02}] [DEBUG] x\n", minute, second)),
            _ => out.push_str(&format!(
                "[2026-01-05 13:{:02}:{:02}] [INFO] handled request {}\n",
                minute, second, i
            )),
        }
    }
    out
}

/// Run the loglens binary with `args`, isolated from any settings file in
/// the working directory. Returns (stdout, stderr, exit code).
pub fn run_loglens(args: &[&str]) -> (String, String, i32) {
    let settings_dir = TempDir::new().expect("Failed to create temp dir");
    run_loglens_with_settings(args, &settings_dir.path().join("loglens.ini"))
}

/// Run the loglens binary with an explicit settings file path
pub fn run_loglens_with_settings(args: &[&str], settings: &Path) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_loglens"))
        .args(args)
        .env("LOGLENS_CONFIG", settings)
        .env_remove("RUST_LOG")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .expect("Failed to execute loglens");

    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.code().unwrap_or(-1),
    )
}

/// Run loglens on a temporary file holding `file_content`
pub fn run_loglens_with_file(args: &[&str], file_content: &str) -> (String, String, i32) {
    let file = temp_log(file_content);
    let mut full_args = vec![file.path().to_str().expect("utf-8 temp path")];
    full_args.extend_from_slice(args);
    run_loglens(&full_args)
}
