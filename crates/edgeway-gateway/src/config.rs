use std::net::SocketAddr;
use std::time::Duration;

use crate::dispatcher::DispatcherConfig;
use crate::retry::RetryConfig;

/// Service name the gateway resolves its backend under by default.
pub const DEFAULT_SERVICE_NAME: &str = "AnimalService";

/// Gateway process configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Address the HTTP front end binds to
    pub bind: SocketAddr,
    /// Registry instances used for discovery, tried in order
    pub registry_urls: Vec<String>,
    /// Logical name of the backend service
    pub service_name: String,
    /// Statically known backend instances. The discovered address is
    /// appended after these.
    pub instances: Vec<String>,
    /// Breaker settings for backend calls
    pub dispatcher: DispatcherConfig,
    /// Breaker settings for registry lookups
    pub registry_dispatcher: DispatcherConfig,
    /// Attempts for registry lookups
    pub retry: RetryConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 3000)),
            registry_urls: vec!["http://127.0.0.1:3001".to_string()],
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            instances: Vec::new(),
            dispatcher: DispatcherConfig::default(),
            registry_dispatcher: DispatcherConfig {
                max_failures: 3,
                timeout: Duration::from_millis(5000),
            },
            retry: RetryConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_config_default() {
        let config = GatewayConfig::default();
        assert_eq!(config.bind.port(), 3000);
        assert_eq!(config.service_name, "AnimalService");
        assert!(config.instances.is_empty());
        assert_eq!(config.dispatcher.max_failures, 3);
        assert_eq!(config.dispatcher.timeout, Duration::from_millis(3500));
        assert_eq!(config.registry_dispatcher.timeout, Duration::from_millis(5000));
        assert_eq!(config.retry.max_attempts, 3);
    }
}
