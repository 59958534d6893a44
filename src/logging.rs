//! Log output setup
//!
//! Logs go to stderr except while the full-screen view owns the terminal.
//! The writer is picked per event, so output resumes as soon as the
//! [`QuietGuard`] is dropped, including on the error path.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing_subscriber::EnvFilter;

static QUIET: AtomicBool = AtomicBool::new(false);

pub fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(log_writer)
        .init();
}

fn log_writer() -> Box<dyn Write> {
    if is_quiet() {
        Box::new(io::sink())
    } else {
        Box::new(io::stderr())
    }
}

pub fn is_quiet() -> bool {
    QUIET.load(Ordering::SeqCst)
}

/// Silences log output until dropped
#[must_use = "logging is restored as soon as the guard is dropped"]
pub struct QuietGuard {
    previous: bool,
}

pub fn quiet() -> QuietGuard {
    QuietGuard {
        previous: QUIET.swap(true, Ordering::SeqCst),
    }
}

impl Drop for QuietGuard {
    fn drop(&mut self) {
        QUIET.store(self.previous, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failing_step() -> Result<(), String> {
        let _quiet = quiet();
        assert!(is_quiet());
        Err("output already exists".to_string())
    }

    #[test]
    fn test_quiet_guard_restores_stderr_after_error() {
        assert!(!is_quiet());
        assert!(failing_step().is_err());
        assert!(!is_quiet());

        {
            let _outer = quiet();
            {
                let _inner = quiet();
            }
            assert!(is_quiet());
        }
        assert!(!is_quiet());
    }
}
