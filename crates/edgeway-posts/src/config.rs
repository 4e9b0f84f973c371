use std::net::SocketAddr;
use std::time::Duration;

/// Posts backend configuration.
#[derive(Debug, Clone)]
pub struct PostServiceConfig {
    /// Address the RPC server binds to
    pub bind: SocketAddr,
    /// Name registered with the registry
    pub service_name: String,
    /// Registry to announce this instance to; `None` skips registration
    pub registry_url: Option<String>,
    /// Address other processes should use to reach this instance. Defaults
    /// to the bind address when unset.
    pub public_url: Option<String>,
    /// Deadline for a single RPC task
    pub task_timeout: Duration,
    /// Added to every task before it runs. Zero outside of tests.
    pub response_delay: Duration,
    /// Deadline for the startup registration call
    pub registration_timeout: Duration,
}

impl Default for PostServiceConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 50052)),
            service_name: "AnimalService".to_string(),
            registry_url: None,
            public_url: None,
            task_timeout: Duration::from_secs(5),
            response_delay: Duration::ZERO,
            registration_timeout: Duration::from_secs(5),
        }
    }
}

impl PostServiceConfig {
    /// The address announced to the registry.
    pub fn advertised_url(&self) -> String {
        self.public_url
            .clone()
            .unwrap_or_else(|| self.bind.to_string())
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.task_timeout.is_zero() {
            return Err("task timeout must be greater than zero".to_string());
        }
        if self.registration_timeout.is_zero() {
            return Err("registration timeout must be greater than zero".to_string());
        }
        if self.service_name.trim().is_empty() {
            return Err("service name must not be empty".to_string());
        }
        Ok(())
    }
}
