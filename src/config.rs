use anyhow::{anyhow, Result};
use std::path::PathBuf;

use crate::analysis::AnalysisContext;
use crate::cli::{Cli, OutputFormat};
use crate::pipeline::PipelineOptions;
use crate::settings::{
    Settings, KEY_CUSTOM_PATTERN, KEY_INPUT_PATH, KEY_THREADS, KEY_USE_CUSTOM_PARSER,
};
use crate::timestamp::Timestamp;

/// Resolved run configuration for loglens
///
/// Precedence: command line, then settings file, then built-in defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct LogLensConfig {
    pub input: InputConfig,
    pub analysis: AnalysisConfig,
    pub performance: PerformanceConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputConfig {
    pub path: PathBuf,
    pub pattern: Option<String>,
    pub sequential: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisConfig {
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
    pub keyword: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PerformanceConfig {
    /// `None` or `Some(0)` means one worker per core
    pub threads: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputConfig {
    /// stdout when `None`
    pub report_path: Option<PathBuf>,
    pub format: OutputFormat,
    pub stats: bool,
    pub progress: bool,
}

impl LogLensConfig {
    pub fn from_cli(cli: &Cli, settings: &Settings) -> Result<Self> {
        let path = cli
            .input
            .clone()
            .or_else(|| settings.get_string(KEY_INPUT_PATH).map(str::to_string))
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| anyhow!("no input file given and no input_path in settings"))?;

        let pattern = match &cli.pattern {
            Some(pattern) => Some(pattern.clone()),
            None if settings.get_bool(KEY_USE_CUSTOM_PARSER) == Some(true) => settings
                .get_string(KEY_CUSTOM_PATTERN)
                .map(str::to_string),
            None => None,
        }
        .filter(|p| !p.trim().is_empty());

        let threads = cli.threads.or_else(|| {
            settings
                .get_int(KEY_THREADS)
                .and_then(|n| usize::try_from(n).ok())
        });

        if let (Some(from), Some(to)) = (&cli.from, &cli.to) {
            if from > to {
                return Err(anyhow!("--from {} is after --to {}", from, to));
            }
        }

        Ok(Self {
            input: InputConfig {
                path: PathBuf::from(path),
                pattern,
                sequential: cli.sequential,
            },
            analysis: AnalysisConfig {
                from: cli.from,
                to: cli.to,
                keyword: cli.keyword.clone(),
            },
            performance: PerformanceConfig { threads },
            output: OutputConfig {
                report_path: cli.report.as_ref().map(PathBuf::from),
                format: cli.output_format,
                stats: cli.stats,
                progress: !cli.no_progress,
            },
        })
    }

    pub fn analysis_context(&self) -> AnalysisContext {
        AnalysisContext::new()
            .with_from(self.analysis.from)
            .with_to(self.analysis.to)
            .with_keyword(self.analysis.keyword.clone())
            .with_pattern(self.input.pattern.clone())
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            workers: self.performance.threads,
            ..PipelineOptions::default()
        }
    }

    /// Record the input, pattern and thread count for the next run.
    pub fn store_in(&self, settings: &mut Settings) {
        settings.set_string(KEY_INPUT_PATH, self.input.path.to_string_lossy());
        match &self.input.pattern {
            Some(pattern) => {
                settings.set_string(KEY_CUSTOM_PATTERN, pattern.as_str());
                settings.set_bool(KEY_USE_CUSTOM_PARSER, true);
            }
            None => settings.set_bool(KEY_USE_CUSTOM_PARSER, false),
        }
        if let Some(threads) = self.performance.threads {
            settings.set_int(KEY_THREADS, threads as i64);
        }
    }
}
