//! Rate limiting for outgoing API calls.
//!
//! The Quote/0 service documents a 1 QPS policy per token. The client ships
//! with [`FixedIntervalLimiter`] enforcing that policy by default; callers
//! can swap in their own [`RateLimiter`] or disable throttling entirely via
//! [`Client::without_rate_limiter`].
//!
//! [`Client::without_rate_limiter`]: crate::Client::without_rate_limiter

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::Error;

/// Gates outgoing API calls.
///
/// Implementations must honor the cancellation token so callers can abort
/// pending calls cleanly, and must be safe to share across tasks.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Block until the limiter allows the next request.
    ///
    /// Returns [`Error::Cancelled`] if `cancel` fires before the caller's
    /// scheduled release time.
    async fn wait(&self, cancel: &CancellationToken) -> Result<(), Error>;
}

/// A concurrency-safe limiter enforcing a minimum interval between requests.
///
/// Each call atomically claims the next release slot, so back-to-back
/// callers queue behind one another instead of racing on independent clocks.
/// Intentionally lightweight (mutex + timer) so it can run inside small
/// gateways or embedded controllers.
#[derive(Debug)]
pub struct FixedIntervalLimiter {
    next: Mutex<Option<Instant>>,
    interval: Duration,
}

impl FixedIntervalLimiter {
    /// Create a limiter with the given minimum interval between requests.
    ///
    /// A zero interval is coerced to one second rather than meaning
    /// "unlimited"; use [`Client::without_rate_limiter`] to disable
    /// throttling explicitly.
    ///
    /// [`Client::without_rate_limiter`]: crate::Client::without_rate_limiter
    pub fn new(interval: Duration) -> Self {
        let interval = if interval.is_zero() {
            Duration::from_secs(1)
        } else {
            interval
        };
        Self {
            next: Mutex::new(None),
            interval,
        }
    }

    /// The configured minimum interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Claim the caller's release slot and advance the schedule.
    ///
    /// The lock is held only for the read-and-advance, never across a sleep.
    fn claim_slot(&self) -> Instant {
        let now = Instant::now();
        let mut next = self.next.lock().expect("limiter lock poisoned");
        let release = match *next {
            Some(scheduled) if scheduled > now => scheduled,
            _ => now,
        };
        *next = Some(release + self.interval);
        release
    }
}

#[async_trait]
impl RateLimiter for FixedIntervalLimiter {
    async fn wait(&self, cancel: &CancellationToken) -> Result<(), Error> {
        let release = self.claim_slot();
        if release <= Instant::now() {
            return Ok(());
        }
        tokio::select! {
            _ = cancel.cancelled() => Err(Error::Cancelled),
            _ = tokio::time::sleep_until(release) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_interval_coerced_to_one_second() {
        let limiter = FixedIntervalLimiter::new(Duration::ZERO);
        assert_eq!(limiter.interval(), Duration::from_secs(1));

        let limiter = FixedIntervalLimiter::new(Duration::from_millis(250));
        assert_eq!(limiter.interval(), Duration::from_millis(250));
    }

    #[tokio::test]
    async fn test_first_wait_is_immediate() {
        let limiter = FixedIntervalLimiter::new(Duration::from_secs(5));
        let start = Instant::now();
        limiter.wait(&CancellationToken::new()).await.unwrap();
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sequential_waits_are_spaced() {
        let interval = Duration::from_millis(500);
        let limiter = FixedIntervalLimiter::new(interval);
        let cancel = CancellationToken::new();

        let start = Instant::now();
        limiter.wait(&cancel).await.unwrap();
        limiter.wait(&cancel).await.unwrap();
        limiter.wait(&cancel).await.unwrap();

        // Third release is two full intervals after the first.
        assert!(start.elapsed() >= interval * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slot_measured_from_schedule_not_call_time() {
        // A caller arriving mid-interval waits only until the scheduled
        // release, not a full interval from its own arrival.
        let interval = Duration::from_millis(400);
        let limiter = FixedIntervalLimiter::new(interval);
        let cancel = CancellationToken::new();

        let start = Instant::now();
        limiter.wait(&cancel).await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        limiter.wait(&cancel).await.unwrap();
        assert_eq!(start.elapsed(), interval);
    }

    #[tokio::test]
    async fn test_cancellation_aborts_wait() {
        let limiter = FixedIntervalLimiter::new(Duration::from_secs(60));
        let cancel = CancellationToken::new();

        // First call claims the slot; second would wait a minute.
        limiter.wait(&cancel).await.unwrap();
        cancel.cancel();
        let start = Instant::now();
        let err = limiter.wait(&cancel).await.unwrap_err();
        assert!(matches!(err, Error::Cancelled));
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_waiters_queue() {
        use std::sync::Arc;

        let interval = Duration::from_millis(200);
        let limiter = Arc::new(FixedIntervalLimiter::new(interval));
        let cancel = CancellationToken::new();

        let start = Instant::now();
        let mut handles = Vec::new();
        for _ in 0..4 {
            let limiter = Arc::clone(&limiter);
            let cancel = cancel.clone();
            handles.push(tokio::spawn(async move {
                limiter.wait(&cancel).await.unwrap();
                Instant::now()
            }));
        }

        let mut releases = Vec::new();
        for handle in handles {
            releases.push(handle.await.unwrap());
        }
        releases.sort();

        for pair in releases.windows(2) {
            assert!(pair[1] - pair[0] >= interval);
        }
        assert!(releases[0] >= start);
    }
}
