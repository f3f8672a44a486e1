//! Bounded polling with an injectable clock.
//!
//! [`poll_until`] sleeps in increments capped at [`PollPolicy::interval_cap`],
//! shrinking the final sleep so the deadline is never overshot, and probes
//! after every sleep. The deadline is checked cooperatively once per
//! iteration.

use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};

use thiserror::Error;

/// Default upper bound on a single sleep between probes.
pub const DEFAULT_INTERVAL_CAP: Duration = Duration::from_secs(20);

/// Future returned by [`Clock::sleep`].
pub type SleepFuture<'a> = Pin<Box<dyn Future<Output = ()> + Send + 'a>>;

/// Source of time for the poll loop.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> Instant;

    /// Suspends the caller for `duration`.
    fn sleep(&self, duration: Duration) -> SleepFuture<'_>;
}

/// Wall clock backed by the tokio timer.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) -> SleepFuture<'_> {
        Box::pin(tokio::time::sleep(duration))
    }
}

/// Interval cap and overall deadline for a poll loop.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PollPolicy {
    /// Longest single sleep between probes.
    pub interval_cap: Duration,
    /// Total time allowed before giving up.
    pub timeout: Duration,
}

impl PollPolicy {
    /// Creates a policy with the default 20 second interval cap.
    #[must_use]
    pub const fn with_timeout(timeout: Duration) -> Self {
        Self {
            interval_cap: DEFAULT_INTERVAL_CAP,
            timeout,
        }
    }

    /// Overrides the interval cap.
    #[must_use]
    pub const fn interval_cap(mut self, interval_cap: Duration) -> Self {
        self.interval_cap = interval_cap;
        self
    }
}

/// Reasons a poll loop stops without a value.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum PollError<E> {
    /// The deadline passed before the probe reported readiness.
    #[error("gave up after {waited:?}")]
    Timeout {
        /// Time spent polling.
        waited: Duration,
    },
    /// The probe itself failed.
    #[error(transparent)]
    Probe(E),
}

/// Repeatedly sleeps and probes until the probe yields a value or the
/// policy's timeout elapses.
///
/// The probe returns `Ok(None)` while the awaited condition is not yet met.
///
/// # Errors
///
/// Returns [`PollError::Probe`] as soon as a probe fails, or
/// [`PollError::Timeout`] once the deadline passes.
pub async fn poll_until<K, F, Fut, T, E>(
    clock: &K,
    policy: PollPolicy,
    mut probe: F,
) -> Result<T, PollError<E>>
where
    K: Clock + ?Sized,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
{
    let started = clock.now();
    // A timeout too large to represent as an instant has no deadline.
    let deadline = started.checked_add(policy.timeout);

    loop {
        let next_sleep = deadline.map_or(Some(policy.interval_cap), |at| {
            let remaining = at.saturating_duration_since(clock.now());
            (!remaining.is_zero()).then_some(policy.interval_cap.min(remaining))
        });
        let Some(pause) = next_sleep else {
            break;
        };

        clock.sleep(pause).await;
        if let Some(value) = probe().await.map_err(PollError::Probe)? {
            return Ok(value);
        }
    }

    Err(PollError::Timeout {
        waited: clock.now().saturating_duration_since(started),
    })
}
