use anyhow::{Context, Result};
use clap::Parser;
use is_terminal::IsTerminal;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use loglens::cli::{Cli, OutputFormat};
use loglens::platform::{ExitCode, SignalHandler};
use loglens::readers::open_line_reader;
use loglens::{
    LineParser, LogLensConfig, Pipeline, PipelineError, RunOutcome, RunStatus, Settings, TextReport,
};

/// A fatal error together with the exit code it maps to
struct Failure {
    code: ExitCode,
    error: anyhow::Error,
}

impl Failure {
    fn new(code: ExitCode, error: impl Into<anyhow::Error>) -> Self {
        Self {
            code,
            error: error.into(),
        }
    }
}

impl From<PipelineError> for Failure {
    fn from(error: PipelineError) -> Self {
        Failure::new(error.status().into(), error)
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let code = match run(&cli) {
        Ok(code) => code,
        Err(failure) => {
            eprintln!("Error: {:#}", failure.error);
            failure.code
        }
    };
    code.exit();
}

/// `RUST_LOG` wins; otherwise -q means errors only and each -v raises the level.
fn init_tracing(verbose: u8, quiet: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<ExitCode, Failure> {
    let settings_path = cli
        .config
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(Settings::default_path);
    let mut settings =
        Settings::load(&settings_path).map_err(|e| Failure::new(ExitCode::GeneralError, e))?;

    let config = LogLensConfig::from_cli(cli, &settings)
        .map_err(|e| Failure::new(RunStatus::InvalidArgs.into(), e))?;

    if cli.save_settings {
        config.store_in(&mut settings);
        settings
            .save(&settings_path)
            .map_err(|e| Failure::new(RunStatus::OutputIoError.into(), e))?;
    }

    let _signals = match SignalHandler::install() {
        Ok(handler) => Some(handler),
        Err(e) => {
            warn!("failed to install signal handler: {}", e);
            None
        }
    };

    let pipeline = Pipeline::new(config.analysis_context()).with_options(config.pipeline_options());
    if let LineParser::Pattern(pattern) = pipeline.parser() {
        info!(
            pattern = pattern.pattern(),
            regex = pattern.regex_source(),
            "using custom line pattern"
        );
    }

    let show_progress = config.output.progress && io::stderr().is_terminal();
    let outcome = analyze(&pipeline, &config, show_progress)?;

    let rendered = render(&outcome, &config)
        .map_err(|e| Failure::new(ExitCode::GeneralError, e))?;
    write_report(&rendered, config.output.report_path.as_deref())
        .map_err(|e| Failure::new(RunStatus::OutputIoError.into(), e))?;

    if config.output.stats {
        eprintln!("{}", outcome.stats.format_stats(outcome.result.total_lines));
    }
    if outcome.stats.failed_chunks > 0 {
        eprintln!(
            "Warning: {} chunk(s) failed during analysis; counts are incomplete",
            outcome.stats.failed_chunks
        );
    }

    if outcome.cancelled {
        eprintln!("Analysis interrupted; report contains partial results");
        return Ok(ExitCode::SignalInt);
    }
    Ok(RunStatus::Ok.into())
}

fn analyze(pipeline: &Pipeline, config: &LogLensConfig, show_progress: bool) -> Result<RunOutcome, Failure> {
    let mut last_percent = None;
    let progress = |fraction: f64| {
        if show_progress {
            let percent = (fraction * 100.0).round() as u32;
            if last_percent != Some(percent) {
                eprint!("\rAnalyzing... {:>3}%", percent);
                last_percent = Some(percent);
            }
        }
        !SignalHandler::should_terminate()
    };

    let path = &config.input.path;
    let outcome = if config.input.sequential {
        let (reader, len) = open_line_reader(path)?;
        pipeline.run_reader(reader, Some(len), progress)?
    } else {
        pipeline.run_file(path, progress)?
    };

    if show_progress {
        eprint!("\r{:20}\r", "");
    }
    Ok(outcome)
}

fn render(outcome: &RunOutcome, config: &LogLensConfig) -> Result<String> {
    let context = config.analysis_context();
    let report = TextReport::new(&outcome.result, config.input.path.display().to_string())
        .with_run_time(chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string())
        .with_filters(context.describe_filters())
        .with_cancelled(outcome.cancelled);

    match config.output.format {
        OutputFormat::Text => Ok(report.format()),
        OutputFormat::Json => report.format_json().context("Failed to serialize report"),
    }
}

fn write_report(rendered: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, rendered)
                .with_context(|| format!("Cannot write report '{}'", path.display()))?;
            println!("Analysis complete. Report written to: {}", path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            match stdout.write_all(rendered.as_bytes()).and_then(|_| stdout.flush()) {
                Ok(()) => {}
                // reader went away, e.g. `loglens big.log | head`
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {}
                Err(e) => return Err(e).context("Failed to write report to stdout"),
            }
        }
    }
    Ok(())
}
