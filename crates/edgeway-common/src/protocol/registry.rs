//! Registry RPC payloads.
//!
//! Field names follow the registry's JSON surface (`serviceName`,
//! `serviceUrl`). Missing fields decode as empty so the registry can answer
//! with its own validation message instead of a decoder rejection.

use serde::{Deserialize, Serialize};

/// Body of `POST /register`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Registration {
    pub service_name: String,
    pub service_url: String,
}

/// Body of `GET /services/{name}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceLocation {
    pub url: String,
}

/// Body of `POST /services/load`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct LoadReport {
    pub service_name: String,
    pub load: Option<f64>,
}
