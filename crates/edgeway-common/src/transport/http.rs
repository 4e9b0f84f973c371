//! HTTP Transport Utilities
//!
//! # Example
//!
//! ```
//! use edgeway_common::transport::http::{base_url, strip_scheme, HttpTransport};
//! use hyper::body::Bytes;
//!
//! let body = Bytes::from(r#"{"jsonrpc":"2.0","method":"check_status","params":{},"id":1}"#);
//! let request = HttpTransport::parse_jsonrpc(body).unwrap();
//! assert_eq!(request.method, "check_status");
//!
//! assert_eq!(strip_scheme("http://posts-1:50052"), "posts-1:50052");
//! assert_eq!(base_url("posts-1:50052"), "http://posts-1:50052");
//! ```

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::{Response, StatusCode};

use crate::protocol::error::EdgewayError;
use crate::protocol::{JsonRpcRequest, JsonRpcResponse};

/// Type alias for Hyper responses with full body
pub type HyperResponse = Response<Full<Bytes>>;

/// HTTP transport utility functions
pub struct HttpTransport;

impl HttpTransport {
    /// Parse a JSON-RPC request from an HTTP body
    pub fn parse_jsonrpc(body: Bytes) -> Result<JsonRpcRequest, EdgewayError> {
        serde_json::from_slice(&body).map_err(EdgewayError::JsonSerialization)
    }

    /// Create a `200 OK` HTTP response carrying a JSON-RPC response
    pub fn to_http_response(jsonrpc: JsonRpcResponse) -> HyperResponse {
        Self::to_http_response_with_status(jsonrpc, StatusCode::OK)
    }

    /// Create an HTTP response with a custom status code
    pub fn to_http_response_with_status(
        jsonrpc: JsonRpcResponse,
        status: StatusCode,
    ) -> HyperResponse {
        let body = serde_json::to_vec(&jsonrpc).unwrap_or_default();

        let mut response = Response::new(Full::new(Bytes::from(body)));
        *response.status_mut() = status;
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        response
    }
}

/// Milliseconds since the Unix epoch, used for `timestamp` fields in status
/// replies.
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Drops a leading `http://` or `https://` from an address.
pub fn strip_scheme(addr: &str) -> &str {
    addr.strip_prefix("http://")
        .or_else(|| addr.strip_prefix("https://"))
        .unwrap_or(addr)
        .trim_end_matches('/')
}

/// Turns a bare `host:port` into an `http://` base URL without a trailing slash.
///
/// Addresses that already carry a scheme are kept as they are.
pub fn base_url(addr: &str) -> String {
    let trimmed = addr.trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    }
}
