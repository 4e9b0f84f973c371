use edgeway_common::protocol::posts::methods;
use edgeway_common::transport::base_url;
use edgeway_common::{
    Acknowledged, CreatedPost, DeletePost, JsonRpcRequest, JsonRpcResponse, NewPost, PostList,
    RemoteCallError, ServiceLoad, ServiceStatus, UpdatePost,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;

use crate::http::HttpClient;

/// JSON-RPC client for animal-posts backend instances.
///
/// Like [`RegistryClient`](crate::RegistryClient), the target instance is a
/// per-call argument supplied by the dispatcher.
#[derive(Clone, Default)]
pub struct BackendClient {
    http: HttpClient,
}

impl BackendClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// Invokes `method` on `instance` and decodes its result.
    ///
    /// # Errors
    /// - `Transport` when the instance is unreachable
    /// - `Status` for non-2xx replies
    /// - `Rejected` when the reply carries a JSON-RPC error object
    /// - `InvalidResponse` when the result is missing or has the wrong shape
    pub async fn call<P, R>(&self, instance: &str, method: &str, params: &P) -> Result<R, RemoteCallError>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let params = serde_json::to_value(params)
            .map_err(|e| RemoteCallError::Transport(format!("Failed to encode params: {}", e)))?;
        let request = JsonRpcRequest::new(method, params);
        let url = format!("{}/", base_url(instance));

        let reply = self.http.post_json(&url, &request).await?;
        if !reply.status.is_success() {
            return Err(reply.into_status_error());
        }

        let response: JsonRpcResponse = reply.json()?;
        if let Some(error) = response.error {
            return Err(RemoteCallError::Rejected {
                code: error.code,
                message: error.message,
            });
        }

        let result = response
            .result
            .ok_or_else(|| RemoteCallError::InvalidResponse("Response missing result".to_string()))?;
        serde_json::from_value(result)
            .map_err(|e| RemoteCallError::InvalidResponse(format!("Unexpected result for {}: {}", method, e)))
    }

    pub async fn create_post(&self, instance: &str, post: &NewPost) -> Result<CreatedPost, RemoteCallError> {
        self.call(instance, methods::CREATE, post).await
    }

    pub async fn update_post(&self, instance: &str, update: &UpdatePost) -> Result<Acknowledged, RemoteCallError> {
        self.call(instance, methods::UPDATE, update).await
    }

    pub async fn list_posts(&self, instance: &str) -> Result<PostList, RemoteCallError> {
        self.call(instance, methods::LIST, &json!({})).await
    }

    pub async fn delete_post(&self, instance: &str, delete: &DeletePost) -> Result<Acknowledged, RemoteCallError> {
        self.call(instance, methods::DELETE, delete).await
    }

    pub async fn check_status(&self, instance: &str) -> Result<ServiceStatus, RemoteCallError> {
        self.call(instance, methods::STATUS, &json!({})).await
    }

    pub async fn get_load(&self, instance: &str) -> Result<ServiceLoad, RemoteCallError> {
        self.call(instance, methods::LOAD, &json!({})).await
    }
}
