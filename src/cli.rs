// Command-line interface definitions

use clap::Parser;

use crate::timestamp::Timestamp;

#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "loglens")]
#[command(about = "Fast, deterministic statistics for large structured log files")]
#[command(
    long_about = "Fast, deterministic statistics for large structured log files\n\nLines are expected as '[YYYY-MM-DD HH:MM:SS] [LEVEL] message' unless a\ncustom pattern is given with --pattern (tokens: %D date, %T time, %L level,\n%M message).\n\nCOMMON EXAMPLES:\n  loglens app.log\n  loglens app.log -o report.txt --keyword timeout\n  loglens app.log --from '2026-01-05 10:00:00' --to '2026-01-05 11:00:00'\n  loglens service.log -p '%D %T %L: %M' -F json"
)]
#[command(version)]
#[command(args_override_self = true)]
pub struct Cli {
    /// Log file to analyze (falls back to input_path from the settings file)
    pub input: Option<String>,

    /// Only count entries at or after this timestamp (YYYY-MM-DD HH:MM:SS)
    #[arg(long, value_parser = parse_timestamp, help_heading = "Filtering Options")]
    pub from: Option<Timestamp>,

    /// Only count entries at or before this timestamp (YYYY-MM-DD HH:MM:SS)
    #[arg(long, value_parser = parse_timestamp, help_heading = "Filtering Options")]
    pub to: Option<Timestamp>,

    /// Count entries whose message contains this text (case-sensitive)
    #[arg(short = 'k', long, help_heading = "Filtering Options")]
    pub keyword: Option<String>,

    /// Custom line pattern using %D, %T, %L and %M tokens
    #[arg(short = 'p', long, help_heading = "Input Options")]
    pub pattern: Option<String>,

    /// Read the file line by line on one thread instead of memory-mapping it
    #[arg(long, help_heading = "Input Options")]
    pub sequential: bool,

    /// Write the report to this file instead of stdout
    #[arg(short = 'o', long = "report", help_heading = "Output Options")]
    pub report: Option<String>,

    /// Report format
    #[arg(
        short = 'F',
        long = "output-format",
        value_enum,
        default_value = "text",
        help_heading = "Output Options"
    )]
    pub output_format: OutputFormat,

    /// Print run statistics to stderr when done
    #[arg(short = 's', long, help_heading = "Output Options")]
    pub stats: bool,

    /// Do not draw the progress line on stderr
    #[arg(long = "no-progress", help_heading = "Output Options")]
    pub no_progress: bool,

    /// Worker threads (0 = one per core)
    #[arg(long, help_heading = "Performance Options")]
    pub threads: Option<usize>,

    /// Settings file (default: $LOGLENS_CONFIG or ./loglens.ini)
    #[arg(long, help_heading = "Configuration Options")]
    pub config: Option<String>,

    /// Store the input path, pattern and thread count in the settings file
    #[arg(long = "save-settings", help_heading = "Configuration Options")]
    pub save_settings: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long, action = clap::ArgAction::Count, help_heading = "Logging Options")]
    pub verbose: u8,

    /// Only log errors
    #[arg(short = 'q', long, conflicts_with = "verbose", help_heading = "Logging Options")]
    pub quiet: bool,
}

fn parse_timestamp(value: &str) -> Result<Timestamp, String> {
    value.parse::<Timestamp>().map_err(|e| e.to_string())
}
