//! Report rendering for analysis results
//!
//! Formats a finished [`AnalysisResult`] as plain text or JSON. Rendering is
//! read-only; nothing here feeds back into the pipeline.

use super::result::{AnalysisResult, TOP_ERRORS_LIMIT};
use crate::entry::Level;

const WEEKDAYS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// A finished result plus the metadata shown in the report header
#[derive(Debug, Clone)]
pub struct TextReport<'a> {
    pub result: &'a AnalysisResult,
    pub input: String,
    pub run_time: String,
    pub filters: String,
    pub cancelled: bool,
}

impl<'a> TextReport<'a> {
    pub fn new(result: &'a AnalysisResult, input: impl Into<String>) -> Self {
        Self {
            result,
            input: input.into(),
            run_time: String::new(),
            filters: String::new(),
            cancelled: false,
        }
    }

    pub fn with_run_time(mut self, run_time: impl Into<String>) -> Self {
        self.run_time = run_time.into();
        self
    }

    pub fn with_filters(mut self, filters: impl Into<String>) -> Self {
        self.filters = filters.into();
        self
    }

    pub fn with_cancelled(mut self, cancelled: bool) -> Self {
        self.cancelled = cancelled;
        self
    }

    /// Human-readable report
    pub fn format(&self) -> String {
        let r = self.result;
        let mut output = String::new();

        output.push_str("=== Log Analysis Report ===\n");
        output.push_str(&format!("Input: {}\n", self.input));
        if !self.run_time.is_empty() {
            output.push_str(&format!("Run: {}\n", self.run_time));
        }
        if !self.filters.is_empty() {
            output.push_str(&format!("Filters: {}\n", self.filters));
        }
        if self.cancelled {
            output.push_str("Status: cancelled (partial results)\n");
        }
        output.push('\n');

        output.push_str("--- Counters ---\n");
        output.push_str(&format!("Total lines: {}\n", r.total_lines));
        output.push_str(&format!("Parsed lines: {}\n", r.parsed_lines));
        output.push_str(&format!("Invalid lines: {}\n", r.invalid_lines));
        output.push('\n');

        if !r.parse_errors.is_empty() {
            output.push_str("--- Parse Errors ---\n");
            for (code, count) in &r.parse_errors {
                output.push_str(&format!("{}: {}\n", code, count));
            }
            output.push('\n');
        }

        if !r.level_counts.is_empty() {
            output.push_str("--- Level Counts ---\n");
            for level in [Level::Error, Level::Warning, Level::Info] {
                if let Some(count) = r.level_counts.get(&level) {
                    output.push_str(&format!("{}: {}\n", level, count));
                }
            }
            output.push('\n');
        }

        if r.time_range_matched > 0 {
            output.push_str("--- Time Range ---\n");
            output.push_str(&format!("Matched: {}\n", r.time_range_matched));
            output.push('\n');
        }

        if r.keyword_hits > 0 {
            output.push_str("--- Keyword Hits ---\n");
            output.push_str(&format!("Count: {}\n", r.keyword_hits));
            output.push('\n');
        }

        if !r.top_errors.is_empty() {
            output.push_str(&format!("--- Top {} ERROR Messages ---\n", TOP_ERRORS_LIMIT));
            for (rank, error) in r.top_errors.iter().enumerate() {
                output.push_str(&format!("{}. {} ({})\n", rank + 1, error.message, error.count));
            }
            output.push('\n');
        }

        if !r.error_samples.is_empty() {
            output.push_str("--- Parse Error Samples ---\n");
            for sample in &r.error_samples {
                output.push_str(&format!(
                    "line {} [{}]: {}\n",
                    sample.line_number, sample.code, sample.raw_line
                ));
            }
            output.push('\n');
        }

        let timeline = r.sorted_timeline();
        if let Some(peak) = timeline
            .iter()
            .max_by(|a, b| {
                (a.errors + a.warnings)
                    .cmp(&(b.errors + b.warnings))
                    // earliest minute wins ties
                    .then_with(|| b.minute.cmp(&a.minute))
            })
        {
            output.push_str("--- Timeline ---\n");
            output.push_str(&format!("Active minutes: {}\n", timeline.len()));
            output.push_str(&format!(
                "Peak minute: {} ({} errors, {} warnings)\n",
                peak.minute, peak.errors, peak.warnings
            ));
            output.push('\n');
        }

        if let Some((day, hour, count)) = r.peak_heatmap_cell() {
            output.push_str("--- Activity ---\n");
            output.push_str(&format!(
                "Busiest hour: {} {:02}:00-{:02}:59 ({} entries)\n",
                WEEKDAYS[day], hour, hour, count
            ));
            output.push('\n');
        }

        output
    }

    /// Machine-readable report containing the full result
    pub fn format_json(&self) -> serde_json::Result<String> {
        let value = serde_json::json!({
            "input": self.input,
            "run_time": self.run_time,
            "filters": self.filters,
            "cancelled": self.cancelled,
            "result": self.result,
        });
        serde_json::to_string_pretty(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::result::{ErrorCount, TimelineBucket};
    use crate::entry::{ParseError, ParseErrorCode};
    use crate::timestamp::Timestamp;

    fn sample_result() -> AnalysisResult {
        let mut r = AnalysisResult::new();
        r.total_lines = 5;
        r.parsed_lines = 4;
        r.record_parse_error(ParseError::new(ParseErrorCode::BadLevel, b"[..] [X] y", 3));
        r.level_counts.insert(Level::Error, 3);
        r.level_counts.insert(Level::Info, 1);
        r.keyword_hits = 2;
        r.top_errors = vec![ErrorCount::new("db down", 2), ErrorCount::new("disk", 1)];
        r.timeline = vec![TimelineBucket {
            minute: Timestamp::parse("2026-01-05 10:30:00").unwrap(),
            errors: 3,
            warnings: 0,
        }];
        r.heatmap[1][10] = 4;
        r
    }

    #[test]
    fn test_report_contains_all_sections() {
        let result = sample_result();
        let text = TextReport::new(&result, "app.log")
            .with_run_time("2026-01-06 08:00:00")
            .with_filters("keyword=\"db\"")
            .format();

        assert!(text.starts_with("=== Log Analysis Report ===\nInput: app.log\n"));
        assert!(text.contains("Run: 2026-01-06 08:00:00\n"));
        assert!(text.contains("Filters: keyword=\"db\"\n"));
        assert!(text.contains("Total lines: 5\nParsed lines: 4\nInvalid lines: 1\n"));
        assert!(text.contains("--- Parse Errors ---\nBadLevel: 1\n"));
        assert!(text.contains("--- Level Counts ---\nERROR: 3\nINFO: 1\n"));
        assert!(text.contains("--- Keyword Hits ---\nCount: 2\n"));
        assert!(text.contains("1. db down (2)\n2. disk (1)\n"));
        assert!(text.contains("line 3 [BadLevel]: [..] [X] y\n"));
        assert!(text.contains("Peak minute: 2026-01-05 10:30:00 (3 errors, 0 warnings)"));
        assert!(text.contains("Busiest hour: Monday 10:00-10:59 (4 entries)"));
        assert!(!text.contains("--- Time Range ---"));
        assert!(!text.contains("cancelled"));
    }

    #[test]
    fn test_report_marks_cancelled_runs() {
        let result = AnalysisResult::new();
        let text = TextReport::new(&result, "big.log").with_cancelled(true).format();
        assert!(text.contains("Status: cancelled (partial results)"));
        assert!(!text.contains("--- Top"));
    }

    #[test]
    fn test_json_output_is_valid() {
        let result = sample_result();
        let json = TextReport::new(&result, "app.log").format_json().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["input"], "app.log");
        assert_eq!(parsed["cancelled"], false);
        assert_eq!(parsed["result"]["total_lines"], 5);
        assert_eq!(parsed["result"]["level_counts"]["ERROR"], 3);
        assert_eq!(parsed["result"]["parse_errors"]["BadLevel"], 1);
        assert_eq!(parsed["result"]["top_errors"][0]["message"], "db down");
        assert_eq!(parsed["result"]["timeline"][0]["minute"], "2026-01-05 10:30:00");
        assert_eq!(parsed["result"]["heatmap"][1][10], 4);
    }
}
