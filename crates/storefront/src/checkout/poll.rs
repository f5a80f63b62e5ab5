//! Bounded, cancellable status polling.
//!
//! The poller issues one immediate tick, then repeats on an interval.
//! A tick that succeeds but carries no qualifying record is "not yet
//! ready" and resets the failure streak; a tick that errors counts
//! toward a consecutive-failure budget and stretches the delay with a
//! capped exponential backoff. The first qualifying record resolves the
//! poll exactly once. A permanently broken backend therefore terminates
//! in [`PollError::Backend`] instead of spinning forever.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::PollingConfig;
use crate::services::ApiError;

/// Delay doubles per consecutive failed tick, up to 2^4 times the base.
const BACKOFF_CAP_DOUBLINGS: u32 = 4;

/// Terminal outcomes of a polling loop that never saw a qualifying
/// record.
#[derive(Debug, Error)]
pub enum PollError {
    /// The caller cancelled the poll.
    #[error("polling cancelled")]
    Cancelled,

    /// The attempt budget ran out while the backend kept answering
    /// "not yet".
    #[error("no qualifying record after {attempts} poll attempts")]
    AttemptsExhausted { attempts: u32 },

    /// Too many consecutive failed ticks; the backend is broken, not
    /// slow.
    #[error("backend failed {failures} consecutive polls: {last}")]
    Backend {
        failures: u32,
        #[source]
        last: ApiError,
    },
}

/// Poll `tick` until it yields a value, an error budget runs out, or
/// `cancel` fires.
///
/// `tick` returns `Ok(Some(value))` for a qualifying record,
/// `Ok(None)` for "not yet ready", and `Err` for a failed request.
/// Ticks never overlap; each is awaited before the next delay starts.
pub(crate) async fn poll_until<T, F, Fut>(
    config: &PollingConfig,
    cancel: &CancellationToken,
    mut tick: F,
) -> Result<T, PollError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, ApiError>>,
{
    let mut attempts: u32 = 0;
    let mut consecutive_failures: u32 = 0;

    loop {
        if attempts >= config.max_attempts {
            return Err(PollError::AttemptsExhausted { attempts });
        }
        attempts += 1;

        let outcome = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(PollError::Cancelled),
            outcome = tick() => outcome,
        };

        match outcome {
            Ok(Some(value)) => return Ok(value),
            Ok(None) => {
                consecutive_failures = 0;
            }
            Err(err) => {
                consecutive_failures += 1;
                debug!(attempts, consecutive_failures, error = %err, "poll tick failed");
                if consecutive_failures >= config.max_consecutive_failures {
                    return Err(PollError::Backend {
                        failures: consecutive_failures,
                        last: err,
                    });
                }
            }
        }

        let delay = backoff_delay(config.interval, consecutive_failures);
        tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(PollError::Cancelled),
            () = tokio::time::sleep(delay) => {}
        }
    }
}

fn backoff_delay(base: Duration, consecutive_failures: u32) -> Duration {
    let doublings = consecutive_failures.min(BACKOFF_CAP_DOUBLINGS);
    base.saturating_mul(1_u32 << doublings)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn fast_config() -> PollingConfig {
        PollingConfig {
            interval: Duration::from_millis(10),
            max_attempts: 5,
            max_consecutive_failures: 3,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolves_on_first_qualifying_tick() {
        let ticks = Arc::new(AtomicU32::new(0));
        let seen = ticks.clone();
        let cancel = CancellationToken::new();

        let result = poll_until(&fast_config(), &cancel, move || {
            let seen = seen.clone();
            async move {
                let n = seen.fetch_add(1, Ordering::SeqCst) + 1;
                if n >= 3 { Ok(Some(n)) } else { Ok(None) }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(ticks.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_attempts_exhausted() {
        let cancel = CancellationToken::new();
        let result: Result<u32, _> =
            poll_until(&fast_config(), &cancel, || async { Ok(None) }).await;

        assert!(matches!(
            result,
            Err(PollError::AttemptsExhausted { attempts: 5 })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_consecutive_failures_terminate() {
        let cancel = CancellationToken::new();
        let result: Result<u32, _> = poll_until(&fast_config(), &cancel, || async {
            Err(ApiError::Api {
                status: 500,
                message: "boom".to_string(),
            })
        })
        .await;

        assert!(matches!(result, Err(PollError::Backend { failures: 3, .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_resets_failure_streak() {
        let ticks = Arc::new(AtomicU32::new(0));
        let seen = ticks.clone();
        let cancel = CancellationToken::new();
        let config = PollingConfig {
            max_attempts: 20,
            ..fast_config()
        };

        // Alternating error/not-ready never accumulates three
        // consecutive failures; the attempt budget ends it instead.
        let result: Result<u32, _> = poll_until(&config, &cancel, move || {
            let seen = seen.clone();
            async move {
                let n = seen.fetch_add(1, Ordering::SeqCst);
                if n % 2 == 0 {
                    Err(ApiError::Api {
                        status: 503,
                        message: "unavailable".to_string(),
                    })
                } else {
                    Ok(None)
                }
            }
        })
        .await;

        assert!(matches!(
            result,
            Err(PollError::AttemptsExhausted { attempts: 20 })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_resolves_cleanly() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result: Result<u32, _> =
            poll_until(&fast_config(), &cancel, || async { Ok(None) }).await;

        assert!(matches!(result, Err(PollError::Cancelled)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_during_delay() {
        let cancel = CancellationToken::new();
        let handle = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                poll_until(&fast_config(), &cancel, || async { Ok::<Option<u32>, _>(None) })
                    .await
            })
        };

        tokio::task::yield_now().await;
        cancel.cancel();

        let result = handle.await.unwrap();
        assert!(matches!(result, Err(PollError::Cancelled)));
    }

    #[test]
    fn test_backoff_caps() {
        let base = Duration::from_millis(1500);
        assert_eq!(backoff_delay(base, 0), base);
        assert_eq!(backoff_delay(base, 1), base * 2);
        assert_eq!(backoff_delay(base, 4), base * 16);
        assert_eq!(backoff_delay(base, 10), base * 16);
    }
}
