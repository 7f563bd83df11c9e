//! Ctrl-C handling
//!
//! The signal handler only flips a shared flag. The follower checks the flag
//! while it sleeps between polls, so the main loop unwinds normally and every
//! file handle is dropped on the way out.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};

/// Shared cancellation flag
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Checks if cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Exit status when a second Ctrl-C arrives before the loop has unwound.
/// Interrupting is a normal way to stop following.
const FORCED_EXIT_CODE: i32 = 0;

/// Install a Ctrl-C handler that cancels `token`.
///
/// A second Ctrl-C exits immediately, still with status 0.
pub fn install(token: &CancelToken) -> Result<()> {
    let token = token.clone();
    ctrlc::set_handler(move || {
        if let Some(code) = on_interrupt(&token) {
            std::process::exit(code);
        }
    })
    .context("Failed to set Ctrl-C handler")
}

/// Cancel `token`, or return the exit status if it was already cancelled
fn on_interrupt(token: &CancelToken) -> Option<i32> {
    if token.is_cancelled() {
        return Some(FORCED_EXIT_CODE);
    }
    token.cancel();
    None
}
