// src/os/signals.rs

//! Cooperative cancellation.
//!
//! A [`CancellationToken`] is a shared flag. Blocking orders poll it between
//! frames and sleep through it, so a pending cancel cuts a delay short. The
//! only thing the signal handler does is set the installed token.

use anyhow::{Context, Result};
use log::{debug, trace};
use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

/// Granularity of [`CancellationToken::sleep`].
const POLL_SLICE: Duration = Duration::from_millis(5);

/// Signals that request a clean shutdown.
pub const QUIT_SIGNALS: [Signal; 3] = [Signal::SIGINT, Signal::SIGTERM, Signal::SIGQUIT];

static INSTALLED: OnceLock<CancellationToken> = OnceLock::new();

#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Sleeps for `duration` unless cancelled first. Returns `false` when the
    /// sleep was cut short (or the token was already cancelled).
    pub fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        loop {
            if self.is_cancelled() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            std::thread::sleep((deadline - now).min(POLL_SLICE));
        }
    }
}

extern "C" fn on_quit_signal(_signal: libc::c_int) {
    // Only async-signal-safe work here: an atomic load and an atomic store.
    if let Some(token) = INSTALLED.get() {
        token.cancel();
    }
}

/// Routes SIGINT, SIGTERM and SIGQUIT to `token`.
///
/// Handlers are one-shot (`SA_RESETHAND`): a second signal gets the default
/// disposition and terminates the process. Only one token can be installed
/// per process.
pub fn install(token: &CancellationToken) -> Result<()> {
    INSTALLED
        .set(token.clone())
        .map_err(|_| anyhow::anyhow!("signal handlers are already installed"))?;

    let action = SigAction::new(
        SigHandler::Handler(on_quit_signal),
        SaFlags::SA_RESETHAND | SaFlags::SA_RESTART,
        SigSet::empty(),
    );
    for signal in QUIT_SIGNALS {
        // SAFETY: the handler only touches an initialised OnceLock and an atomic.
        unsafe { sigaction(signal, &action) }
            .with_context(|| format!("failed to install handler for {}", signal))?;
        trace!("Installed cancellation handler for {}", signal);
    }
    debug!("Quit signals now cancel the running orders");
    Ok(())
}
