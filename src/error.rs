//! Run-level failures
//!
//! Per-line problems are [`crate::entry::ParseError`] values and never abort a
//! run. The errors here do: they are reported before any result exists.

use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("cannot open input '{}'", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot map input '{}'", path.display())]
    Map {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed reading input")]
    Read {
        #[source]
        source: io::Error,
    },
}

/// Coarse outcome category of a run, used by the binary to choose an exit code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Ok,
    InvalidArgs,
    InputIoError,
    OutputIoError,
}

impl PipelineError {
    pub fn status(&self) -> RunStatus {
        match self {
            PipelineError::Open { .. } | PipelineError::Map { .. } | PipelineError::Read { .. } => {
                RunStatus::InputIoError
            }
        }
    }
}
