//! Edgeway Gateway
//!
//! Fronts a set of interchangeable backend instances. Requests are sent to
//! one instance at a time through a [`Dispatcher`], which counts consecutive
//! failures per instance and evicts an instance for good once it reaches the
//! configured threshold. Reads are served through a [`CacheAside`] layer that
//! every write clears.
//!
//! # Components
//!
//! - [`InstancePool`]: ordered, evictable candidates with failure counters
//! - [`Dispatcher`]: selection, deadline and eviction (no internal retry)
//! - [`with_retry`]: bounded sequential re-dispatch, used for registry lookups
//! - [`CacheAside`]: one snapshot per resource collection
//! - [`ServiceDiscovery`]: resolves the backend through the registry
//! - [`Gateway`] and [`HttpServer`]: the animal-posts HTTP surface

pub mod cache;
pub mod config;
pub mod discovery;
pub mod dispatcher;
pub mod gateway;
pub mod http_server;
pub mod instance;
pub mod pool;
pub mod retry;

pub use cache::{CacheAside, CacheSource};
pub use config::GatewayConfig;
pub use discovery::{resolve_instances, ServiceDiscovery};
pub use dispatcher::{Dispatcher, DispatcherConfig};
pub use gateway::{Gateway, ANIMAL_POSTS_KEY};
pub use http_server::HttpServer;
pub use instance::{Instance, InstanceStatus};
pub use pool::{FailureOutcome, InstancePool};
pub use retry::{with_retry, RetryConfig};
