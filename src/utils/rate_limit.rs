//! Minimum-spacing rate limiter, one instance per throttled source.
//!
//! A limiter configured for `C` calls per minute admits calls no closer than
//! `60 / C` seconds apart, measured from the start of one admitted call to the
//! start of the next. A caller that arrives early sleeps for exactly the
//! remaining deficit; a caller that arrives late is admitted immediately.
//!
//! There is no queue. Two tasks racing on the *same* limiter may compute the
//! same deficit and be admitted together; only the earliest admission is
//! bounded. Distinct sources own distinct limiters, so pacing on one source
//! never delays another.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;

/// Pacing state for one throttled operation
#[derive(Debug, Clone)]
pub struct RateLimiter {
    id: Arc<str>,
    spacing: Duration,
    last_admitted: Arc<Mutex<Option<Instant>>>,
}

impl RateLimiter {
    /// Create a limiter admitting at most `calls_per_minute` calls per minute.
    ///
    /// A budget of `0` disables throttling.
    pub fn per_minute(id: impl Into<Arc<str>>, calls_per_minute: u32) -> Self {
        let spacing = if calls_per_minute == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(60.0 / f64::from(calls_per_minute))
        };

        Self::with_spacing(id, spacing)
    }

    /// Create a limiter with an explicit minimum spacing between admissions
    pub fn with_spacing(id: impl Into<Arc<str>>, spacing: Duration) -> Self {
        Self {
            id: id.into(),
            spacing,
            last_admitted: Arc::new(Mutex::new(None)),
        }
    }

    /// A limiter that never waits
    pub fn unlimited(id: impl Into<Arc<str>>) -> Self {
        Self::with_spacing(id, Duration::ZERO)
    }

    /// Identifier of the throttled operation
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Minimum spacing between two admitted calls
    pub fn spacing(&self) -> Duration {
        self.spacing
    }

    /// Wait until this limiter admits another call.
    ///
    /// Dropping the returned future before it completes leaves the last
    /// admission timestamp untouched.
    pub async fn acquire(&self) {
        if let Some(wait) = self.deficit(Instant::now()) {
            tracing::debug!(
                limiter = %self.id,
                wait_ms = wait.as_millis() as u64,
                "Rate limit: delaying call"
            );
            tokio::time::sleep(wait).await;
        }

        *self.state() = Some(Instant::now());
    }

    /// Remaining time before a call at `now` would be admitted, if any
    pub fn deficit(&self, now: Instant) -> Option<Duration> {
        let last = (*self.state())?;
        let elapsed = now.saturating_duration_since(last);
        self.spacing
            .checked_sub(elapsed)
            .filter(|remaining| !remaining.is_zero())
    }

    fn state(&self) -> MutexGuard<'_, Option<Instant>> {
        // The guarded value is a plain timestamp, so a poisoned lock is still usable.
        self.last_admitted
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
