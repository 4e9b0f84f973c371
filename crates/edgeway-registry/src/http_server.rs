//! HTTP Server for the Service Registry
//!
//! | Route | Purpose |
//! |---|---|
//! | `POST /register` | upsert `{serviceName, serviceUrl}` |
//! | `GET /services/{name}` | resolve a name to `{url}` (404 when unknown) |
//! | `GET /services` | full name → url mapping |
//! | `POST /services/load` | record `{serviceName, load}` |
//! | `GET /status` | liveness plus the current mapping |

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use edgeway_common::protocol::error::EdgewayError;
use edgeway_common::transport::now_millis;
use edgeway_common::{LoadReport, Registration, ServiceLocation};
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::registry::ServiceRegistry;

/// HTTP server exposing a [`ServiceRegistry`].
pub struct HttpServer {
    registry: Arc<ServiceRegistry>,
}

impl HttpServer {
    pub fn new(registry: Arc<ServiceRegistry>) -> Self {
        Self { registry }
    }

    /// Builds the axum application without binding it.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/register", post(register))
            .route("/services", get(list_services))
            .route("/services/load", post(report_load))
            .route("/services/:name", get(lookup))
            .route("/status", get(status))
            .layer(CorsLayer::permissive())
            .with_state(self.registry.clone())
    }

    /// Binds `addr` and serves until the process exits.
    pub async fn run(self, addr: SocketAddr) -> Result<(), EdgewayError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| EdgewayError::Transport(format!("Failed to bind to {}: {}", addr, e)))?;

        info!(
            "Service registry listening on {}",
            listener
                .local_addr()
                .map_err(|e| EdgewayError::Transport(format!("Failed to get local addr: {}", e)))?
        );

        axum::serve(listener, self.router())
            .await
            .map_err(|e| EdgewayError::Transport(format!("Server error: {}", e)))
    }
}

/// Maps registry errors onto the registry's `{"error": ...}` replies.
struct ApiError(EdgewayError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            EdgewayError::ServiceNotFound(_) => (StatusCode::NOT_FOUND, "Service not found".to_string()),
            EdgewayError::InvalidRegistration(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            other => (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<EdgewayError> for ApiError {
    fn from(err: EdgewayError) -> Self {
        ApiError(err)
    }
}

async fn register(
    State(registry): State<Arc<ServiceRegistry>>,
    Json(body): Json<Registration>,
) -> Result<impl IntoResponse, ApiError> {
    registry.register(&body.service_name, &body.service_url).await?;
    Ok(Json(json!({ "message": "Service registered successfully" })))
}

async fn lookup(
    State(registry): State<Arc<ServiceRegistry>>,
    Path(name): Path<String>,
) -> Result<Json<ServiceLocation>, ApiError> {
    let url = registry.lookup(&name).await?;
    Ok(Json(ServiceLocation { url }))
}

async fn list_services(State(registry): State<Arc<ServiceRegistry>>) -> impl IntoResponse {
    Json(registry.list().await)
}

async fn report_load(
    State(registry): State<Arc<ServiceRegistry>>,
    Json(body): Json<LoadReport>,
) -> Result<impl IntoResponse, ApiError> {
    let load = body.load.ok_or_else(|| {
        EdgewayError::InvalidRegistration("Service name and load value are required".to_string())
    })?;
    registry.report_load(&body.service_name, load).await?;
    Ok(Json(json!({ "message": "Load updated successfully" })))
}

async fn status(State(registry): State<Arc<ServiceRegistry>>) -> impl IntoResponse {
    Json(json!({
        "status": "Service Discovery is running",
        "timestamp": now_millis(),
        "services": registry.list().await,
    }))
}
