//! Cooperative cancellation
//!
//! A sampling loop checks a [`CancellationToken`] once per period. The
//! token is an atomic flag, so it can live in a `static` and be set from a
//! signal handler or another thread.

use core::sync::atomic::{AtomicBool, Ordering};

use embedded_hal::delay::DelayNs;

use crate::error::Result;

/// Request to stop a running loop
#[derive(Debug, Default)]
pub struct CancellationToken {
    cancelled: AtomicBool,
}

impl CancellationToken {
    /// Create a token that is not cancelled
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cancelled: AtomicBool::new(false),
        }
    }

    /// Ask every loop watching this token to stop
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Check whether cancellation was requested
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Clear the request so the token can be reused
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::Release);
    }
}

/// Call `sample` once every `period_ms` until `token` is cancelled.
///
/// The token is checked before every call, so a token cancelled up front
/// runs nothing. Returns the number of completed calls.
///
/// # Errors
///
/// The first error returned by `sample` stops the loop and is propagated.
pub fn run_sampling<D, F>(token: &CancellationToken, delay: &mut D, period_ms: u32, mut sample: F) -> Result<u32>
where
    D: DelayNs,
    F: FnMut() -> Result<()>,
{
    let mut completed: u32 = 0;
    while !token.is_cancelled() {
        sample()?;
        completed = completed.saturating_add(1);
        delay.delay_ms(period_ms);
    }
    debug!("sampling stopped after {} iterations", completed);
    Ok(completed)
}
