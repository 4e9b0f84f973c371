use thiserror::Error;

/// Failure of a single remote call against one backend instance.
///
/// This is what a dispatched operation yields when it fails. The dispatcher
/// records it against the instance it selected and never retries it itself.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteCallError {
    /// The instance could not be reached or the connection broke
    #[error("Transport error: {0}")]
    Transport(String),

    /// The call did not complete before the dispatcher deadline
    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    /// The instance answered with a non-success HTTP status
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The instance answered with a JSON-RPC error object
    #[error("Rejected by backend ({code}): {message}")]
    Rejected { code: i32, message: String },

    /// The instance answered with something that could not be decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl RemoteCallError {
    /// Returns `true` when the instance reported that the target does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            RemoteCallError::Status { status, .. } => *status == 404,
            RemoteCallError::Rejected { code, .. } => *code == crate::protocol::jsonrpc::NOT_FOUND,
            _ => false,
        }
    }
}

#[derive(Error, Debug)]
pub enum EdgewayError {
    #[error("Remote call failed: {0}")]
    RemoteCall(#[from] RemoteCallError),

    #[error("Circuit breaker intervened: {0}")]
    CircuitBreakerTripped(#[source] RemoteCallError),

    /// No instances remain. `last_error` is set when this call evicted the
    /// final instance, and empty when the pool was already drained.
    #[error("All instances have failed")]
    AllInstancesExhausted { last_error: Option<RemoteCallError> },

    #[error("Failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: usize,
        #[source]
        source: Box<EdgewayError>,
    },

    #[error("Service not found: {0}")]
    ServiceNotFound(String),

    #[error("Invalid registration: {0}")]
    InvalidRegistration(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EdgewayError {
    /// Walks retry and circuit-breaker wrappers down to the remote failure
    /// that triggered them, if there is one.
    pub fn remote_cause(&self) -> Option<&RemoteCallError> {
        match self {
            EdgewayError::RemoteCall(e) | EdgewayError::CircuitBreakerTripped(e) => Some(e),
            EdgewayError::AllInstancesExhausted { last_error } => last_error.as_ref(),
            EdgewayError::RetriesExhausted { source, .. } => source.remote_cause(),
            _ => None,
        }
    }

    /// Returns `true` for failures of the dispatch layer itself, which callers
    /// surface as "service unavailable".
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            EdgewayError::RemoteCall(_)
                | EdgewayError::CircuitBreakerTripped(_)
                | EdgewayError::AllInstancesExhausted { .. }
                | EdgewayError::RetriesExhausted { .. }
        )
    }
}

impl From<std::net::AddrParseError> for EdgewayError {
    fn from(err: std::net::AddrParseError) -> Self {
        EdgewayError::InvalidConfig(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EdgewayError>;
