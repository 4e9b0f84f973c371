use std::collections::BTreeMap;

use edgeway_common::transport::base_url;
use edgeway_common::{LoadReport, Registration, RemoteCallError, ServiceLocation};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tracing::debug;

use crate::http::HttpClient;

/// Everything but RFC 3986 unreserved characters is escaped in a path segment.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Client for the registry RPC.
///
/// The registry address is passed per call rather than stored, so a
/// dispatcher can aim the same client at whichever registry instance it
/// currently selects.
#[derive(Clone, Default)]
pub struct RegistryClient {
    http: HttpClient,
}

impl RegistryClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// Resolves `name` to its registered address.
    ///
    /// An unknown name comes back as `RemoteCallError::Status` with status 404.
    pub async fn lookup(&self, registry: &str, name: &str) -> Result<String, RemoteCallError> {
        let url = format!(
            "{}/services/{}",
            base_url(registry),
            utf8_percent_encode(name, PATH_SEGMENT)
        );
        debug!("Looking up {} at {}", name, url);

        let reply = self.http.get(&url).await?;
        if !reply.status.is_success() {
            return Err(reply.into_status_error());
        }
        Ok(reply.json::<ServiceLocation>()?.url)
    }

    /// Registers (or overwrites) the address of `name`.
    pub async fn register(
        &self,
        registry: &str,
        name: &str,
        service_url: &str,
    ) -> Result<(), RemoteCallError> {
        let url = format!("{}/register", base_url(registry));
        let body = Registration {
            service_name: name.to_string(),
            service_url: service_url.to_string(),
        };

        let reply = self.http.post_json(&url, &body).await?;
        if !reply.status.is_success() {
            return Err(reply.into_status_error());
        }
        Ok(())
    }

    /// Fetches the full name → address mapping.
    pub async fn list(&self, registry: &str) -> Result<BTreeMap<String, String>, RemoteCallError> {
        let url = format!("{}/services", base_url(registry));
        let reply = self.http.get(&url).await?;
        if !reply.status.is_success() {
            return Err(reply.into_status_error());
        }
        reply.json()
    }

    /// Reports the current load figure of `name`.
    pub async fn report_load(
        &self,
        registry: &str,
        name: &str,
        load: f64,
    ) -> Result<(), RemoteCallError> {
        let url = format!("{}/services/load", base_url(registry));
        let body = LoadReport {
            service_name: name.to_string(),
            load: Some(load),
        };

        let reply = self.http.post_json(&url, &body).await?;
        if !reply.status.is_success() {
            return Err(reply.into_status_error());
        }
        Ok(())
    }
}
