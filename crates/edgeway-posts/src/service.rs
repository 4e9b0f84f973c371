//! JSON-RPC method dispatch for the posts backend.
//!
//! Every call runs as a task bounded by the configured deadline. A task that
//! overruns it is answered with `-32008`; the caller's own dispatcher may
//! have given up earlier.

use std::sync::Arc;
use std::time::Duration;

use edgeway_common::protocol::posts::methods;
use edgeway_common::{
    Acknowledged, CreatedPost, DeletePost, JsonRpcError, JsonRpcRequest, JsonRpcResponse, NewPost,
    PostList, ServiceLoad, ServiceStatus, UpdatePost,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::PostServiceConfig;
use crate::store::PostStore;

/// Routes backend RPC methods to the [`PostStore`].
pub struct PostService {
    store: Arc<PostStore>,
    task_timeout: Duration,
    response_delay: Duration,
}

impl PostService {
    pub fn new(store: Arc<PostStore>, config: &PostServiceConfig) -> Self {
        Self {
            store,
            task_timeout: config.task_timeout,
            response_delay: config.response_delay,
        }
    }

    /// Handles one JSON-RPC request. Failures are returned as JSON-RPC
    /// error objects, never as transport errors.
    pub async fn handle_request(&self, req: JsonRpcRequest) -> JsonRpcResponse {
        let JsonRpcRequest {
            id, method, params, ..
        } = req;

        let task = async {
            if !self.response_delay.is_zero() {
                tokio::time::sleep(self.response_delay).await;
            }
            self.call(&method, params).await
        };

        match tokio::time::timeout(self.task_timeout, task).await {
            Ok(Ok(result)) => JsonRpcResponse::success(id, result),
            Ok(Err(error)) => {
                debug!("{} failed: {}", method, error.message);
                JsonRpcResponse::error(id, error)
            }
            Err(_) => {
                warn!("{} timed out after {:?}", method, self.task_timeout);
                JsonRpcResponse::error(id, JsonRpcError::timed_out(self.task_timeout.as_millis() as u64))
            }
        }
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, JsonRpcError> {
        match method {
            methods::CREATE => {
                let post: NewPost = parse_params(params)?;
                post.validate()
                    .map_err(|e| JsonRpcError::invalid_params(&e.to_string()))?;
                let stored = self.store.create(post).await;
                to_result(CreatedPost {
                    post_id: stored.post_id,
                    message: "Post created successfully".to_string(),
                })
            }
            methods::UPDATE => {
                let update: UpdatePost = parse_params(params)?;
                update
                    .validate()
                    .map_err(|e| JsonRpcError::invalid_params(&e.to_string()))?;
                if !self.store.update(update).await {
                    return Err(JsonRpcError::not_found("Post not found"));
                }
                to_result(Acknowledged {
                    message: "Post updated successfully".to_string(),
                })
            }
            methods::LIST => to_result(PostList {
                posts: self.store.list().await,
                source: "database".to_string(),
            }),
            methods::DELETE => {
                let delete: DeletePost = parse_params(params)?;
                if !self.store.delete(delete.post_id).await {
                    return Err(JsonRpcError::not_found("Post not found"));
                }
                to_result(Acknowledged {
                    message: "Post deleted successfully".to_string(),
                })
            }
            methods::STATUS => to_result(ServiceStatus {
                status: "Service is running".to_string(),
            }),
            methods::LOAD => to_result(ServiceLoad {
                load: self.store.count().await as u64,
            }),
            _ => Err(JsonRpcError::method_not_found()),
        }
    }

    pub fn store(&self) -> &Arc<PostStore> {
        &self.store
    }
}

fn parse_params<T: DeserializeOwned>(params: Value) -> Result<T, JsonRpcError> {
    serde_json::from_value(params).map_err(|e| JsonRpcError::invalid_params(&e.to_string()))
}

fn to_result<T: Serialize>(value: T) -> Result<Value, JsonRpcError> {
    serde_json::to_value(value).map_err(|e| JsonRpcError::internal_error(&e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use edgeway_common::protocol::jsonrpc::{INVALID_PARAMS, METHOD_NOT_FOUND, NOT_FOUND, TIMED_OUT};
    use serde_json::json;

    fn service() -> PostService {
        PostService::new(Arc::new(PostStore::new()), &PostServiceConfig::default())
    }

    fn request(method: &str, params: Value) -> JsonRpcRequest {
        JsonRpcRequest::new(method, params)
    }

    fn new_post() -> Value {
        json!({
            "title": "Lost cat",
            "description": "Grey, answers to Mitten",
            "location": "Old town",
            "status": "lost"
        })
    }

    #[tokio::test]
    async fn test_create_then_list() {
        let service = service();

        let res = service.handle_request(request(methods::CREATE, new_post())).await;
        assert_eq!(res.result.unwrap(), json!({"postId": 1, "message": "Post created successfully"}));

        let res = service.handle_request(request(methods::LIST, json!({}))).await;
        let list: PostList = serde_json::from_value(res.result.unwrap()).unwrap();
        assert_eq!(list.source, "database");
        assert_eq!(list.posts.len(), 1);
        assert_eq!(list.posts[0].title, "Lost cat");
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_post() {
        let service = service();

        let mut update = new_post();
        update["postId"] = json!(42);
        let res = service.handle_request(request(methods::UPDATE, update)).await;
        assert_eq!(res.error.unwrap().code, NOT_FOUND);

        let res = service
            .handle_request(request(methods::DELETE, json!({"postId": 42})))
            .await;
        let error = res.error.unwrap();
        assert_eq!(error.code, NOT_FOUND);
        assert_eq!(error.message, "Post not found");
    }

    #[tokio::test]
    async fn test_update_existing_post() {
        let service = service();
        service.handle_request(request(methods::CREATE, new_post())).await;

        let mut update = new_post();
        update["postId"] = json!(1);
        update["status"] = json!("found");
        let res = service.handle_request(request(methods::UPDATE, update)).await;
        assert_eq!(res.result.unwrap()["message"], "Post updated successfully");
        assert_eq!(service.store().get(1).await.unwrap().status, "found");
    }

    #[tokio::test]
    async fn test_invalid_params() {
        let service = service();

        let res = service
            .handle_request(request(methods::CREATE, json!({"title": "only"})))
            .await;
        assert_eq!(res.error.unwrap().code, INVALID_PARAMS);

        let res = service
            .handle_request(request(methods::DELETE, json!({"postId": "seven"})))
            .await;
        assert_eq!(res.error.unwrap().code, INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_status_load_and_unknown_method() {
        let service = service();
        service.handle_request(request(methods::CREATE, new_post())).await;
        service.handle_request(request(methods::CREATE, new_post())).await;

        let res = service.handle_request(request(methods::STATUS, json!({}))).await;
        assert_eq!(res.result.unwrap(), json!({"status": "Service is running"}));

        let res = service.handle_request(request(methods::LOAD, json!({}))).await;
        assert_eq!(res.result.unwrap(), json!({"load": 2}));

        let res = service.handle_request(request("drop_table", json!({}))).await;
        assert_eq!(res.error.unwrap().code, METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_slow_task_times_out() {
        let config = PostServiceConfig {
            task_timeout: Duration::from_millis(50),
            response_delay: Duration::from_millis(500),
            ..Default::default()
        };
        let service = PostService::new(Arc::new(PostStore::new()), &config);

        let req = request(methods::STATUS, json!({}));
        let id = req.id.clone();
        let res = service.handle_request(req).await;
        assert_eq!(res.id, id);
        assert_eq!(res.error.unwrap().code, TIMED_OUT);
    }
}
