use std::future::Future;
use std::time::Duration;

/// Linear backoff: attempt N is followed by `base_delay * N` before the next
/// try (1s, 2s, ... with the default base).
#[derive(Debug, Clone, Copy)]
pub struct BackoffPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl BackoffPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

/// Run `op` until it succeeds or the policy's attempts are exhausted. The
/// final attempt's error is returned, never swallowed. `op` receives the
/// 1-based attempt number.
pub async fn retry_with_backoff<T, E, F, Fut>(
    policy: &BackoffPolicy,
    mut op: F,
) -> std::result::Result<T, E>
where
    E: std::fmt::Display,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < max_attempts => {
                let delay = policy.delay_after(attempt);
                tracing::warn!(
                    "Attempt {}/{} failed: {}; retrying in {:?}",
                    attempt,
                    max_attempts,
                    e,
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn fails_twice_then_succeeds_with_linear_delays() {
        let attempts = AtomicU32::new(0);
        let start = tokio::time::Instant::now();

        let result = retry_with_backoff(&BackoffPolicy::default(), |attempt| {
            attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 3 {
                    Err("send failed")
                } else {
                    Ok("ack")
                }
            }
        })
        .await;

        assert_eq!(result, Ok("ack"));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        // 1s after the first failure, 2s after the second
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn exhaustion_returns_last_error() {
        let attempts = AtomicU32::new(0);

        let result: Result<(), &str> =
            retry_with_backoff(&BackoffPolicy::default(), |_attempt| {
                attempts.fetch_add(1, Ordering::SeqCst);
                async { Err("still down") }
            })
            .await;

        assert_eq!(result, Err("still down"));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn first_success_needs_no_delay() {
        let result = retry_with_backoff(&BackoffPolicy::default(), |attempt| async move {
            Ok::<u32, &str>(attempt)
        })
        .await;
        assert_eq!(result, Ok(1));
    }

    #[test]
    fn delay_grows_linearly() {
        let policy = BackoffPolicy::default();
        assert_eq!(policy.delay_after(1), Duration::from_secs(1));
        assert_eq!(policy.delay_after(2), Duration::from_secs(2));
        assert_eq!(policy.delay_after(3), Duration::from_secs(3));
    }
}
