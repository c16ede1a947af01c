// Core library for the loglens log analyzer

pub mod analysis;
pub mod cli;
pub mod config;
pub mod entry;
pub mod error;
pub mod parallel;
pub mod parsers;
pub mod pipeline;
pub mod platform;
pub mod readers;
pub mod settings;
pub mod stats;
pub mod timestamp;

pub use analysis::{AnalysisContext, AnalysisResult, TextReport, TimeRangeFilter};
pub use config::LogLensConfig;
pub use entry::{Entry, Level, ParseError, ParseErrorCode, ParseResult};
pub use error::{PipelineError, RunStatus};
pub use parsers::{EntryParser, LineParser, PatternParser, StandardParser};
pub use pipeline::{Pipeline, PipelineOptions, RunOutcome};
pub use settings::Settings;
pub use stats::RunStats;
pub use timestamp::Timestamp;
