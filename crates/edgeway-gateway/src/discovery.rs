//! Service discovery through the registry.
//!
//! Lookups go through their own [`Dispatcher`] whose pool is the set of
//! configured registry URLs, wrapped in [`with_retry`]. Registry failures
//! therefore never touch the breaker that guards backend calls.

use edgeway_client::RegistryClient;
use edgeway_common::protocol::error::{EdgewayError, Result};
use edgeway_common::transport::strip_scheme;
use tracing::{info, warn};

use crate::config::GatewayConfig;
use crate::dispatcher::{Dispatcher, DispatcherConfig};
use crate::retry::{with_retry, RetryConfig};

/// Resolves logical service names to addresses via the registry.
pub struct ServiceDiscovery {
    client: RegistryClient,
    dispatcher: Dispatcher,
    retry: RetryConfig,
}

impl ServiceDiscovery {
    pub fn new(
        client: RegistryClient,
        registry_urls: Vec<String>,
        config: DispatcherConfig,
        retry: RetryConfig,
    ) -> Result<Self> {
        Ok(Self {
            client,
            dispatcher: Dispatcher::new("registry", registry_urls, config)?,
            retry,
        })
    }

    /// Looks `name` up and returns its address without a URL scheme.
    ///
    /// # Errors
    /// - `ServiceNotFound` when the last attempt was answered with a 404
    /// - `RetriesExhausted` for any other failure
    pub async fn discover(&self, name: &str) -> Result<String> {
        let client = &self.client;
        let result = with_retry(
            &self.dispatcher,
            |registry| async move { client.lookup(&registry, name).await },
            self.retry.max_attempts,
        )
        .await;

        match result {
            Ok(url) => {
                let address = strip_scheme(&url).to_string();
                info!("Discovered {} at {}", name, address);
                Ok(address)
            }
            Err(e) if e.remote_cause().is_some_and(|c| c.is_not_found()) => {
                Err(EdgewayError::ServiceNotFound(name.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }
}

/// Builds the backend instance list: the static instances followed by the
/// discovered address, without duplicates.
///
/// A discovery failure is only fatal when there are no static instances to
/// fall back on.
pub async fn resolve_instances(config: &GatewayConfig, client: RegistryClient) -> Result<Vec<String>> {
    let mut instances: Vec<String> = Vec::with_capacity(config.instances.len() + 1);
    for instance in &config.instances {
        let instance = strip_scheme(instance).to_string();
        if !instances.contains(&instance) {
            instances.push(instance);
        }
    }

    let discovered = if config.registry_urls.is_empty() {
        Err(EdgewayError::InvalidConfig("no registry configured".to_string()))
    } else {
        let discovery = ServiceDiscovery::new(
            client,
            config.registry_urls.clone(),
            config.registry_dispatcher.clone(),
            config.retry.clone(),
        )?;
        discovery.discover(&config.service_name).await
    };

    match discovered {
        Ok(address) => {
            if !instances.contains(&address) {
                instances.push(address);
            }
        }
        Err(e) if instances.is_empty() => return Err(e),
        Err(e) => warn!(
            "Discovery of {} failed, continuing with {} static instance(s): {}",
            config.service_name,
            instances.len(),
            e
        ),
    }

    Ok(instances)
}
