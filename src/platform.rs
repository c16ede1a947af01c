use anyhow::Result;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

#[cfg(unix)]
use signal_hook::{consts::SIGINT, consts::SIGTERM, iterator::Signals};

#[cfg(windows)]
use signal_hook::{consts::SIGINT, flag};

use crate::error::RunStatus;

/// Process exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    InvalidUsage = 2,
    InputIoError = 3,
    OutputIoError = 4,
    SignalInt = 130,  // 128 + SIGINT (2)
    SignalTerm = 143, // 128 + SIGTERM (15)
}

impl ExitCode {
    pub fn exit(self) -> ! {
        process::exit(self as i32)
    }
}

impl From<RunStatus> for ExitCode {
    fn from(status: RunStatus) -> Self {
        match status {
            RunStatus::Ok => ExitCode::Success,
            RunStatus::InvalidArgs => ExitCode::InvalidUsage,
            RunStatus::InputIoError => ExitCode::InputIoError,
            RunStatus::OutputIoError => ExitCode::OutputIoError,
        }
    }
}

/// Set once the first SIGINT/SIGTERM arrives; the progress callback turns it
/// into a cooperative cancel.
pub static SHOULD_TERMINATE: AtomicBool = AtomicBool::new(false);

/// Signal handling for graceful shutdown. A second signal exits immediately.
pub struct SignalHandler {
    _handle: thread::JoinHandle<()>,
}

impl SignalHandler {
    pub fn install() -> Result<Self> {
        #[cfg(unix)]
        {
            let mut signals = Signals::new([SIGINT, SIGTERM])?;
            let handle = thread::spawn(move || {
                for sig in signals.forever() {
                    let already = SHOULD_TERMINATE.swap(true, Ordering::Relaxed);
                    tracing::info!(signal = sig, "received termination signal");
                    if already {
                        match sig {
                            SIGTERM => ExitCode::SignalTerm.exit(),
                            _ => ExitCode::SignalInt.exit(),
                        }
                    }
                }
            });
            Ok(SignalHandler { _handle: handle })
        }

        #[cfg(windows)]
        {
            let term_flag = std::sync::Arc::new(AtomicBool::new(false));
            flag::register(SIGINT, std::sync::Arc::clone(&term_flag))?;

            let handle = thread::spawn(move || loop {
                thread::sleep(std::time::Duration::from_millis(100));
                if term_flag.swap(false, Ordering::Relaxed)
                    && SHOULD_TERMINATE.swap(true, Ordering::Relaxed)
                {
                    ExitCode::SignalInt.exit();
                }
            });
            Ok(SignalHandler { _handle: handle })
        }
    }

    pub fn should_terminate() -> bool {
        SHOULD_TERMINATE.load(Ordering::Relaxed)
    }
}
