use std::future::Future;
use std::time::Duration;

use edgeway_common::protocol::error::{EdgewayError, RemoteCallError, Result};
use tokio::sync::RwLock;
use tracing::{debug, error, warn};

use crate::instance::InstanceStatus;
use crate::pool::{FailureOutcome, InstancePool};

/// Dispatcher (circuit breaker) configuration.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Consecutive failures after which an instance is evicted. Must be > 0.
    pub max_failures: u32,
    /// Hard deadline for a single remote operation
    pub timeout: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            max_failures: 3,
            timeout: Duration::from_millis(3500),
        }
    }
}

/// Fault-tolerant dispatcher over one [`InstancePool`].
///
/// Each call to [`dispatch`](Self::dispatch) runs the caller's operation
/// against the current instance exactly once. There is no internal retry:
/// a failure is counted against the instance, the instance is evicted when
/// it reaches `max_failures`, and the error goes back to the caller. Wrap
/// the dispatcher in [`with_retry`](crate::retry::with_retry) when repeated
/// attempts are wanted.
///
/// # Concurrency
///
/// The pool lock is held while selecting an instance and while recording the
/// outcome, never while the operation runs. Outcomes are recorded against
/// the address that was selected, so a call that finishes after its instance
/// was already evicted by another call changes nothing.
///
/// # Example
/// ```no_run
/// # use edgeway_gateway::{Dispatcher, DispatcherConfig};
/// # use edgeway_common::RemoteCallError;
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dispatcher = Dispatcher::new(
///     "AnimalService",
///     vec!["127.0.0.1:50052".to_string()],
///     DispatcherConfig::default(),
/// )?;
///
/// let echoed = dispatcher
///     .dispatch(|addr| async move { Ok::<_, RemoteCallError>(addr) })
///     .await?;
/// assert_eq!(echoed, "127.0.0.1:50052");
/// # Ok(())
/// # }
/// ```
pub struct Dispatcher {
    name: String,
    pool: RwLock<InstancePool>,
    config: DispatcherConfig,
}

impl Dispatcher {
    /// Creates a dispatcher for the service `name` over `addresses`.
    ///
    /// # Errors
    /// `InvalidConfig` when `max_failures` or `timeout` is 0.
    pub fn new(
        name: impl Into<String>,
        addresses: Vec<String>,
        config: DispatcherConfig,
    ) -> Result<Self> {
        if config.max_failures == 0 {
            return Err(EdgewayError::InvalidConfig(
                "max_failures must be greater than 0".to_string(),
            ));
        }
        if config.timeout.is_zero() {
            return Err(EdgewayError::InvalidConfig(
                "timeout must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            name: name.into(),
            pool: RwLock::new(InstancePool::new(addresses)),
            config,
        })
    }

    /// Runs `operation` against the current instance.
    ///
    /// # Returns
    /// - `Ok(value)` - the operation succeeded; the instance's failure count
    ///   is reset and it stays current
    /// - `Err(CircuitBreakerTripped)` - the operation failed (or timed out)
    ///   and instances remain
    /// - `Err(AllInstancesExhausted)` - the pool was empty, or this failure
    ///   evicted its last instance
    pub async fn dispatch<F, Fut, T>(&self, operation: F) -> Result<T>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = std::result::Result<T, RemoteCallError>>,
    {
        let address = {
            let pool = self.pool.read().await;
            match pool.current() {
                Some(instance) => instance.address.clone(),
                None => {
                    return Err(EdgewayError::AllInstancesExhausted { last_error: None });
                }
            }
        };

        let call = tokio::time::timeout(self.config.timeout, operation(address.clone()));
        let outcome = match call.await {
            Ok(outcome) => outcome,
            Err(_) => Err(RemoteCallError::Timeout(self.config.timeout.as_millis() as u64)),
        };

        match outcome {
            Ok(value) => {
                self.pool.write().await.record_success(&address);
                Ok(value)
            }
            Err(cause) => Err(self.record_failure(&address, cause).await),
        }
    }

    async fn record_failure(&self, address: &str, cause: RemoteCallError) -> EdgewayError {
        let mut pool = self.pool.write().await;

        match pool.record_failure(address, self.config.max_failures) {
            FailureOutcome::Counted(count) => {
                warn!(
                    "{}: call to {} failed ({}/{}): {}",
                    self.name, address, count, self.config.max_failures, cause
                );
            }
            FailureOutcome::Evicted { remaining } => {
                warn!(
                    "{}: evicting {} after {} consecutive failures, {} instance(s) left: {}",
                    self.name, address, self.config.max_failures, remaining, cause
                );
            }
            FailureOutcome::Untracked => {
                debug!("{}: {} already evicted, failure not counted: {}", self.name, address, cause);
            }
        }

        if pool.is_empty() {
            error!("{}: all instances have failed", self.name);
            EdgewayError::AllInstancesExhausted {
                last_error: Some(cause),
            }
        } else {
            EdgewayError::CircuitBreakerTripped(cause)
        }
    }

    /// Adds an instance at the end of the pool. Duplicates are ignored.
    pub async fn add_instance(&self, address: String) -> bool {
        self.pool.write().await.add(address)
    }

    pub async fn instance_count(&self) -> usize {
        self.pool.read().await.len()
    }

    /// Address the next dispatch will use
    pub async fn current_address(&self) -> Option<String> {
        self.pool.read().await.current().map(|i| i.address.clone())
    }

    pub async fn addresses(&self) -> Vec<String> {
        self.pool.read().await.addresses()
    }

    pub async fn snapshot(&self) -> Vec<InstanceStatus> {
        self.pool.read().await.snapshot()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }
}
