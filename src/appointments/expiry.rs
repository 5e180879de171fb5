//! Timed purge of the confirmed-appointments list
//!
//! While the doctor profile view is active an [`ExpirySweep`] is armed. If
//! it is still armed when the interval elapses, the confirmed list is
//! cleared. Tearing the view down cancels the sweep; nothing is cleared in
//! that case.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::confirmation::ConfirmationCache;
use crate::error::{DermascanError, Result};

/// How long confirmed appointments survive while the profile view is open.
pub const CONFIRMED_APPOINTMENTS_TTL: Duration = Duration::from_secs(120);

/// Single-shot timer that clears a [`ConfirmationCache`]
pub struct ExpirySweep {
    cache: ConfirmationCache,
    interval: Duration,
    armed: Option<(CancellationToken, JoinHandle<bool>)>,
}

impl ExpirySweep {
    /// Creates a disarmed sweep using [`CONFIRMED_APPOINTMENTS_TTL`].
    pub fn new(cache: ConfirmationCache) -> Self {
        Self::with_interval(cache, CONFIRMED_APPOINTMENTS_TTL)
    }

    /// Creates a disarmed sweep with a custom interval.
    pub fn with_interval(cache: ConfirmationCache, interval: Duration) -> Self {
        Self {
            cache,
            interval,
            armed: None,
        }
    }

    /// Starts the timer. Arming an armed sweep restarts it.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn arm(&mut self) {
        self.cancel();

        let token = CancellationToken::new();
        let deadline = Instant::now() + self.interval;
        let cache = self.cache.clone();
        let cancelled = token.clone();

        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = cancelled.cancelled() => false,
                _ = tokio::time::sleep_until(deadline) => {
                    match cache.clear().await {
                        Ok(()) => {
                            tracing::info!("Confirmed appointments expired");
                            true
                        }
                        Err(e) => {
                            tracing::warn!("Failed to clear confirmed appointments: {}", e);
                            false
                        }
                    }
                }
            }
        });

        tracing::debug!(interval_secs = self.interval.as_secs(), "Expiry sweep armed");
        self.armed = Some((token, handle));
    }

    /// Cancels a pending sweep. No-op when disarmed.
    pub fn cancel(&mut self) {
        if let Some((token, handle)) = self.armed.take() {
            token.cancel();
            handle.abort();
            tracing::debug!("Expiry sweep cancelled");
        }
    }

    /// Whether a sweep is pending or has fired without being awaited.
    pub fn is_armed(&self) -> bool {
        self.armed
            .as_ref()
            .map(|(token, _)| !token.is_cancelled())
            .unwrap_or(false)
    }

    /// Waits for the armed sweep to finish and disarms it.
    ///
    /// Returns `true` if the list was cleared, `false` if the sweep was
    /// cancelled or nothing was armed. The sweep stays armed until the task
    /// completes, so dropping this future early leaves `cancel` effective.
    ///
    /// # Errors
    ///
    /// Returns an error if the sweep task panicked.
    pub async fn wait(&mut self) -> Result<bool> {
        let Some((_, handle)) = self.armed.as_mut() else {
            return Ok(false);
        };
        let outcome = handle.await;
        self.armed = None;
        match outcome {
            Ok(cleared) => Ok(cleared),
            Err(e) if e.is_cancelled() => Ok(false),
            Err(e) => Err(DermascanError::Storage(format!("Expiry sweep failed: {}", e)).into()),
        }
    }
}

impl Drop for ExpirySweep {
    fn drop(&mut self) {
        self.cancel();
    }
}
