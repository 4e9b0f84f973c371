//! HTTP Server for the Gateway
//!
//! Exposes the animal-posts resource over plain JSON. Every failure of the
//! dispatch layer becomes `503 {"error": "Service unavailable"}`; the cause is
//! logged and never returned to the caller. Malformed payloads and ids are
//! answered with `400` before anything is dispatched.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use edgeway_common::protocol::error::EdgewayError;
use edgeway_common::transport::now_millis;
use edgeway_common::{NewPost, UpdatePost};
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::gateway::Gateway;

/// HTTP front end for a [`Gateway`].
pub struct HttpServer {
    gateway: Arc<Gateway>,
}

impl HttpServer {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    /// Builds the axum application without binding it.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/animal-posts", get(list_posts).post(create_post))
            .route("/animal-posts/status", get(service_status))
            .route(
                "/animal-posts/:post_id",
                axum::routing::put(update_post).delete(delete_post),
            )
            .route("/status", get(status))
            .layer(CorsLayer::permissive())
            .with_state(self.gateway.clone())
    }

    /// Binds `addr` and serves until the process exits.
    pub async fn run(self, addr: SocketAddr) -> Result<(), EdgewayError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| EdgewayError::Transport(format!("Failed to bind to {}: {}", addr, e)))?;

        info!(
            "Gateway HTTP server listening on {}",
            listener
                .local_addr()
                .map_err(|e| EdgewayError::Transport(format!("Failed to get local addr: {}", e)))?
        );

        axum::serve(listener, self.router())
            .await
            .map_err(|e| EdgewayError::Transport(format!("Server error: {}", e)))
    }
}

struct ApiError(EdgewayError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            EdgewayError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            e if e.is_unavailable() => {
                error!("Backend call failed: {}", e);
                (StatusCode::SERVICE_UNAVAILABLE, "Service unavailable".to_string())
            }
            e => {
                error!("Request failed: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<EdgewayError> for ApiError {
    fn from(err: EdgewayError) -> Self {
        ApiError(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(EdgewayError::InvalidRequest(rejection.body_text()))
    }
}

fn parse_post_id(raw: &str) -> Result<u64, ApiError> {
    raw.parse()
        .map_err(|_| ApiError(EdgewayError::InvalidRequest(format!("Invalid postId: {}", raw))))
}

async fn create_post(
    State(gateway): State<Arc<Gateway>>,
    body: Result<Json<NewPost>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(post) = body?;
    let created = gateway.create_post(post).await?;
    Ok(Json(json!({ "message": created.message, "postId": created.post_id })))
}

async fn update_post(
    State(gateway): State<Arc<Gateway>>,
    Path(post_id): Path<String>,
    body: Result<Json<NewPost>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let post_id = parse_post_id(&post_id)?;
    let Json(fields) = body?;
    let ack = gateway.update_post(UpdatePost::new(post_id, fields)).await?;
    Ok(Json(ack))
}

async fn list_posts(State(gateway): State<Arc<Gateway>>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(gateway.list_posts().await?))
}

async fn delete_post(
    State(gateway): State<Arc<Gateway>>,
    Path(post_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let post_id = parse_post_id(&post_id)?;
    Ok(Json(gateway.delete_post(post_id).await?))
}

async fn service_status(State(gateway): State<Arc<Gateway>>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(gateway.service_status().await?))
}

async fn status(State(gateway): State<Arc<Gateway>>) -> impl IntoResponse {
    Json(json!({
        "status": "Gateway is running",
        "timestamp": now_millis(),
        "service": gateway.dispatcher().name(),
        "instances": gateway.instances().await,
    }))
}
