use std::time::Duration;

use edgeway_common::RemoteCallError;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::{Method, Request, StatusCode};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Raw HTTP reply: status plus the fully collected body.
#[derive(Debug, Clone)]
pub struct HttpReply {
    pub status: StatusCode,
    pub body: Bytes,
}

impl HttpReply {
    /// Decodes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, RemoteCallError> {
        serde_json::from_slice(&self.body)
            .map_err(|e| RemoteCallError::InvalidResponse(format!("Malformed body: {}", e)))
    }

    /// Turns a non-success reply into a [`RemoteCallError::Status`], taking the
    /// message from an `{"error": "..."}` body when one is present.
    pub fn into_status_error(self) -> RemoteCallError {
        let message = serde_json::from_slice::<serde_json::Value>(&self.body)
            .ok()
            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_owned))
            .unwrap_or_else(|| String::from_utf8_lossy(&self.body).into_owned());

        RemoteCallError::Status {
            status: self.status.as_u16(),
            message,
        }
    }
}

/// Thin JSON-over-HTTP/1.1 client.
///
/// Each request goes through hyper's pooled legacy client, so concurrent calls
/// to the same host run in parallel on separate connections.
#[derive(Clone)]
pub struct HttpClient {
    inner: Client<HttpConnector, Full<Bytes>>,
    timeout: Option<Duration>,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    pub fn new() -> Self {
        Self {
            inner: Client::builder(TokioExecutor::new()).build_http(),
            timeout: None,
        }
    }

    /// Bounds every request made through this client.
    ///
    /// Calls that go through a dispatcher are already bounded by its deadline;
    /// this is for standalone use such as startup registration.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub async fn get(&self, url: &str) -> Result<HttpReply, RemoteCallError> {
        self.send(Method::GET, url, Bytes::new()).await
    }

    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &T,
    ) -> Result<HttpReply, RemoteCallError> {
        let body = serde_json::to_vec(body)
            .map_err(|e| RemoteCallError::Transport(format!("Failed to encode body: {}", e)))?;
        self.send(Method::POST, url, Bytes::from(body)).await
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Bytes,
    ) -> Result<HttpReply, RemoteCallError> {
        let mut request = Request::builder()
            .method(method)
            .uri(url)
            .body(Full::new(body))
            .map_err(|e| RemoteCallError::Transport(format!("Failed to build request: {}", e)))?;
        request
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, self.exchange(request))
                .await
                .map_err(|_| RemoteCallError::Timeout(timeout.as_millis() as u64))?,
            None => self.exchange(request).await,
        }
    }

    async fn exchange(&self, request: Request<Full<Bytes>>) -> Result<HttpReply, RemoteCallError> {
        let uri = request.uri().to_string();
        let response = self
            .inner
            .request(request)
            .await
            .map_err(|e| RemoteCallError::Transport(format!("HTTP request to {} failed: {}", uri, e)))?;

        let status = response.status();
        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| RemoteCallError::Transport(format!("Failed to read response: {}", e)))?
            .to_bytes();

        Ok(HttpReply { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_prefers_error_field() {
        let reply = HttpReply {
            status: StatusCode::NOT_FOUND,
            body: Bytes::from_static(br#"{"error":"Service not found"}"#),
        };
        assert_eq!(
            reply.into_status_error(),
            RemoteCallError::Status {
                status: 404,
                message: "Service not found".into()
            }
        );
    }

    #[test]
    fn test_status_error_falls_back_to_raw_body() {
        let reply = HttpReply {
            status: StatusCode::SERVICE_UNAVAILABLE,
            body: Bytes::from_static(b"Node unhealthy"),
        };
        assert_eq!(
            reply.into_status_error(),
            RemoteCallError::Status {
                status: 503,
                message: "Node unhealthy".into()
            }
        );
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        // Reserve a port, then free it so nothing is listening there
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = HttpClient::new();
        let err = client.get(&format!("http://{}/", addr)).await.unwrap_err();
        assert!(matches!(err, RemoteCallError::Transport(_)));
    }

    #[test]
    fn test_malformed_json_is_invalid_response() {
        let reply = HttpReply {
            status: StatusCode::OK,
            body: Bytes::from_static(b"not json"),
        };
        let err = reply.json::<serde_json::Value>().unwrap_err();
        assert!(matches!(err, RemoteCallError::InvalidResponse(_)));
    }
}
