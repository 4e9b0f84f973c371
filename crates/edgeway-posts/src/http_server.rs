//! HTTP Server for the posts backend
//!
//! - `POST /` takes a JSON-RPC request and answers with a JSON-RPC response
//! - `GET /__health` answers `OK`
//!
//! Application failures are JSON-RPC error objects inside a `200`. A body that
//! is not JSON gets a `400` with a parse error, and JSON that is not a
//! JSON-RPC 2.0 request gets a `400` with an invalid-request error.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use edgeway_common::protocol::error::EdgewayError;
use edgeway_common::transport::{HttpTransport, HyperResponse};
use edgeway_common::{JsonRpcError, JsonRpcResponse};
use serde_json::error::Category;
use serde_json::Value;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::service::PostService;

/// HTTP server exposing a [`PostService`].
pub struct HttpServer {
    service: Arc<PostService>,
}

impl HttpServer {
    pub fn new(service: Arc<PostService>) -> Self {
        Self { service }
    }

    /// Builds the axum application without binding it.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/", post(handle_jsonrpc))
            .route("/__health", get(health_check))
            .layer(CorsLayer::permissive())
            .with_state(self.service.clone())
    }

    /// Serves on an already bound listener.
    pub async fn serve(self, listener: TcpListener) -> Result<(), EdgewayError> {
        info!(
            "Posts RPC server listening on {}",
            listener
                .local_addr()
                .map_err(|e| EdgewayError::Transport(format!("Failed to get local addr: {}", e)))?
        );

        axum::serve(listener, self.router())
            .await
            .map_err(|e| EdgewayError::Transport(format!("Server error: {}", e)))
    }
}

async fn handle_jsonrpc(State(service): State<Arc<PostService>>, body: Bytes) -> HyperResponse {
    let request = match HttpTransport::parse_jsonrpc(body) {
        Ok(request) if request.jsonrpc == "2.0" => request,
        Ok(request) => {
            error!("Unsupported JSON-RPC version: {}", request.jsonrpc);
            return bad_request(request.id, JsonRpcError::invalid_request());
        }
        // Well-formed JSON that is not a request object
        Err(EdgewayError::JsonSerialization(e)) if e.classify() == Category::Data => {
            error!("Invalid JSON-RPC request: {}", e);
            return bad_request(Value::Null, JsonRpcError::invalid_request());
        }
        Err(e) => {
            error!("Failed to parse JSON-RPC request: {}", e);
            return bad_request(Value::Null, JsonRpcError::parse_error());
        }
    };

    HttpTransport::to_http_response(service.handle_request(request).await)
}

fn bad_request(id: Value, error: JsonRpcError) -> HyperResponse {
    HttpTransport::to_http_response_with_status(
        JsonRpcResponse::error(id, error),
        StatusCode::BAD_REQUEST,
    )
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
