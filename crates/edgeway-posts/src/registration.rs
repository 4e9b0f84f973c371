use edgeway_client::{HttpClient, RegistryClient};
use tracing::{info, warn};

use crate::config::PostServiceConfig;

/// Registry client whose requests are bounded by `registration_timeout`, so a
/// registry that accepts the connection but never answers cannot stall startup.
pub fn registration_client(config: &PostServiceConfig) -> RegistryClient {
    RegistryClient::new(HttpClient::new().with_timeout(config.registration_timeout))
}

/// Registers this instance with the configured registry.
///
/// A failed registration is logged and otherwise ignored: the backend keeps
/// serving, and gateways with static instance lists can still reach it.
/// Returns whether the registry accepted the registration.
pub async fn announce(client: &RegistryClient, config: &PostServiceConfig) -> bool {
    let Some(registry) = &config.registry_url else {
        return false;
    };

    let url = config.advertised_url();
    match client.register(registry, &config.service_name, &url).await {
        Ok(()) => {
            info!("Registered {} at {} with {}", config.service_name, url, registry);
            true
        }
        Err(e) => {
            warn!("Failed to register service: {}", e);
            false
        }
    }
}
