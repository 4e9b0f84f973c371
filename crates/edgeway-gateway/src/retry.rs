use std::future::Future;

use edgeway_common::protocol::error::{EdgewayError, RemoteCallError, Result};
use tracing::warn;

use crate::dispatcher::Dispatcher;

/// Configuration for [`with_retry`].
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total number of dispatch attempts, including the first.
    ///
    /// Default: 3. A value of 0 is treated as 1.
    pub max_attempts: usize,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_attempts: 3 }
    }
}

/// Calls `dispatcher.dispatch(operation)` up to `max_attempts` times in
/// sequence and returns the first success.
///
/// Attempts are independent dispatches, so a later attempt may land on a
/// different instance once an earlier one has been evicted. There is no
/// backoff between attempts.
///
/// # Errors
/// `RetriesExhausted` carrying the error of the final attempt.
pub async fn with_retry<F, Fut, T>(
    dispatcher: &Dispatcher,
    operation: F,
    max_attempts: usize,
) -> Result<T>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = std::result::Result<T, RemoteCallError>>,
{
    let attempts = max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match dispatcher.dispatch(&operation).await {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= attempts => {
                warn!(
                    "{}: attempt {}/{} failed, giving up: {}",
                    dispatcher.name(),
                    attempt,
                    attempts,
                    e
                );
                return Err(EdgewayError::RetriesExhausted {
                    attempts,
                    source: Box::new(e),
                });
            }
            Err(e) => {
                warn!(
                    "{}: attempt {}/{} failed: {}",
                    dispatcher.name(),
                    attempt,
                    attempts,
                    e
                );
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::DispatcherConfig;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn dispatcher(addrs: &[&str], max_failures: u32) -> Dispatcher {
        Dispatcher::new(
            "retry-test",
            addrs.iter().map(|a| a.to_string()).collect(),
            DispatcherConfig {
                max_failures,
                timeout: Duration::from_millis(200),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_retry_config_default() {
        assert_eq!(RetryConfig::default().max_attempts, 3);
    }

    #[tokio::test]
    async fn test_fail_fail_succeed() {
        let dispatcher = dispatcher(&["A"], 5);
        let attempts = AtomicUsize::new(0);

        let value = with_retry(
            &dispatcher,
            |addr| {
                let n = attempts.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if n < 3 {
                        Err(RemoteCallError::Transport(format!("attempt {}", n)))
                    } else {
                        Ok(format!("{} on attempt {}", addr, n))
                    }
                }
            },
            3,
        )
        .await
        .unwrap();

        assert_eq!(value, "A on attempt 3");
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_three_failures_surface_the_last_error() {
        let dispatcher = dispatcher(&["A"], 5);
        let attempts = AtomicUsize::new(0);

        let err = with_retry(
            &dispatcher,
            |_addr| {
                let n = attempts.fetch_add(1, Ordering::SeqCst) + 1;
                async move { Err::<(), _>(RemoteCallError::Transport(format!("attempt {}", n))) }
            },
            3,
        )
        .await
        .unwrap_err();

        match err {
            EdgewayError::RetriesExhausted { attempts, source } => {
                assert_eq!(attempts, 3);
                assert_eq!(
                    source.remote_cause(),
                    Some(&RemoteCallError::Transport("attempt 3".into()))
                );
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_later_attempt_lands_on_next_instance() {
        let dispatcher = dispatcher(&["bad", "good"], 1);

        let addr = with_retry(
            &dispatcher,
            |addr| async move {
                if addr == "bad" {
                    Err(RemoteCallError::Transport("refused".into()))
                } else {
                    Ok(addr)
                }
            },
            3,
        )
        .await
        .unwrap();

        assert_eq!(addr, "good");
        assert_eq!(dispatcher.addresses().await, vec!["good"]);
    }

    #[tokio::test]
    async fn test_zero_attempts_still_tries_once() {
        let dispatcher = dispatcher(&["A"], 5);
        let attempts = AtomicUsize::new(0);

        let err = with_retry(
            &dispatcher,
            |_addr| {
                attempts.fetch_add(1, Ordering::SeqCst);
                async { Err::<(), _>(RemoteCallError::Timeout(1)) }
            },
            0,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, EdgewayError::RetriesExhausted { attempts: 1, .. }));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
