//! Edgeway Posts Backend
//!
//! Reference backend for the `AnimalService`: an in-memory post table served
//! over the backend JSON-RPC protocol. On startup the instance announces
//! itself to the registry so gateways can discover it.

pub mod config;
pub mod http_server;
pub mod registration;
pub mod service;
pub mod store;

use std::sync::Arc;

use edgeway_common::protocol::error::{EdgewayError, Result};
use tokio::net::TcpListener;

pub use config::PostServiceConfig;
pub use http_server::HttpServer;
pub use registration::{announce, registration_client};
pub use service::PostService;
pub use store::PostStore;

/// Binds, registers with the registry, and serves until the process exits.
///
/// Registration happens after the listener is bound, so a gateway that
/// discovers this instance can reach it immediately.
pub async fn run(config: PostServiceConfig) -> Result<()> {
    config.validate().map_err(EdgewayError::InvalidConfig)?;

    let listener = TcpListener::bind(config.bind)
        .await
        .map_err(|e| EdgewayError::Transport(format!("Failed to bind to {}: {}", config.bind, e)))?;

    announce(&registration_client(&config), &config).await;

    let service = Arc::new(PostService::new(Arc::new(PostStore::new()), &config));
    HttpServer::new(service).serve(listener).await
}
