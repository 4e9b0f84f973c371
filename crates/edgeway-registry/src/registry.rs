use std::collections::{BTreeMap, HashMap};

use edgeway_common::protocol::error::{EdgewayError, Result};
use tokio::sync::RwLock;
use tracing::info;

/// Name → address mapping with last-registration-wins semantics.
///
/// There is no removal: a stale entry stays until it is overwritten.
#[derive(Default)]
pub struct ServiceRegistry {
    services: RwLock<HashMap<String, String>>,
    loads: RwLock<HashMap<String, f64>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `address` under `name`, replacing any previous address.
    ///
    /// # Returns
    /// The address that was replaced, if any.
    ///
    /// # Errors
    /// `InvalidRegistration` when either argument is empty.
    pub async fn register(&self, name: &str, address: &str) -> Result<Option<String>> {
        if name.is_empty() || address.is_empty() {
            return Err(EdgewayError::InvalidRegistration(
                "Service name and URL are required".to_string(),
            ));
        }

        let previous = self
            .services
            .write()
            .await
            .insert(name.to_string(), address.to_string());

        match &previous {
            Some(old) if old != address => {
                info!("Service re-registered: {} at {} (was {})", name, address, old)
            }
            Some(_) => {}
            None => info!("Service registered: {} at {}", name, address),
        }
        Ok(previous)
    }

    /// Returns the current address of `name`.
    pub async fn lookup(&self, name: &str) -> Result<String> {
        self.services
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| EdgewayError::ServiceNotFound(name.to_string()))
    }

    /// Snapshot of every registration, ordered by name.
    pub async fn list(&self) -> BTreeMap<String, String> {
        self.services
            .read()
            .await
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Records the last load figure reported for `name`.
    ///
    /// Loads are informational; they never influence `lookup`.
    pub async fn report_load(&self, name: &str, load: f64) -> Result<()> {
        if name.is_empty() {
            return Err(EdgewayError::InvalidRegistration(
                "Service name and load value are required".to_string(),
            ));
        }

        info!("Load updated for service: {}, Load: {}", name, load);
        self.loads.write().await.insert(name.to_string(), load);
        Ok(())
    }

    /// Snapshot of the last reported loads, ordered by name.
    pub async fn loads(&self) -> BTreeMap<String, f64> {
        self.loads
            .read()
            .await
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lookup_after_register_and_overwrite() {
        let registry = ServiceRegistry::new();

        let err = registry.lookup("X").await.unwrap_err();
        assert!(matches!(err, EdgewayError::ServiceNotFound(ref n) if n == "X"));

        assert_eq!(registry.register("X", "addr1").await.unwrap(), None);
        assert_eq!(registry.lookup("X").await.unwrap(), "addr1");

        assert_eq!(
            registry.register("X", "addr2").await.unwrap(),
            Some("addr1".to_string())
        );
        assert_eq!(registry.lookup("X").await.unwrap(), "addr2");
    }

    #[tokio::test]
    async fn test_register_rejects_empty_arguments() {
        let registry = ServiceRegistry::new();

        assert!(matches!(
            registry.register("", "addr").await,
            Err(EdgewayError::InvalidRegistration(_))
        ));
        assert!(matches!(
            registry.register("AnimalService", "").await,
            Err(EdgewayError::InvalidRegistration(_))
        ));
        assert!(registry.list().await.is_empty());

        // Only empty values are refused; blank-looking ones are stored as given
        registry.register("AnimalService", "  ").await.unwrap();
        assert_eq!(registry.lookup("AnimalService").await.unwrap(), "  ");
    }

    #[tokio::test]
    async fn test_register_same_address_is_idempotent() {
        let registry = ServiceRegistry::new();
        registry.register("A", "a:1").await.unwrap();
        registry.register("A", "a:1").await.unwrap();
        assert_eq!(registry.list().await.len(), 1);
    }

    #[tokio::test]
    async fn test_list_is_a_snapshot() {
        let registry = ServiceRegistry::new();
        registry.register("B", "b:1").await.unwrap();
        registry.register("A", "a:1").await.unwrap();

        let snapshot = registry.list().await;
        registry.register("C", "c:1").await.unwrap();

        assert_eq!(
            snapshot.keys().cloned().collect::<Vec<_>>(),
            vec!["A".to_string(), "B".to_string()]
        );
        assert_eq!(registry.list().await.len(), 3);
    }

    #[tokio::test]
    async fn test_report_load() {
        let registry = ServiceRegistry::new();
        registry.report_load("AnimalService", 42.0).await.unwrap();
        registry.report_load("AnimalService", 7.5).await.unwrap();
        assert_eq!(registry.loads().await.get("AnimalService"), Some(&7.5));

        assert!(registry.report_load("", 1.0).await.is_err());
        // Loads do not create registrations
        assert!(registry.lookup("AnimalService").await.is_err());
    }
}
