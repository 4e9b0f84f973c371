//! Integration tests for the protocol module
//!
//! These tests verify the error taxonomy and how causes are carried through
//! the dispatch wrappers.

#[cfg(test)]
mod tests {
    use super::super::*;
    use std::collections::HashSet;
    use std::error::Error;

    #[test]
    fn test_tripped_breaker_exposes_remote_cause() {
        let err = EdgewayError::CircuitBreakerTripped(RemoteCallError::Transport(
            "connection refused".into(),
        ));
        assert_eq!(
            err.remote_cause(),
            Some(&RemoteCallError::Transport("connection refused".into()))
        );
        assert!(err.source().is_some());
        assert!(err.is_unavailable());
    }

    #[test]
    fn test_retries_exhausted_walks_to_last_cause() {
        let err = EdgewayError::RetriesExhausted {
            attempts: 3,
            source: Box::new(EdgewayError::CircuitBreakerTripped(RemoteCallError::Timeout(
                5000,
            ))),
        };
        assert_eq!(err.remote_cause(), Some(&RemoteCallError::Timeout(5000)));
        assert!(err.to_string().starts_with("Failed after 3 attempts"));
    }

    #[test]
    fn test_exhausted_pool_without_cause() {
        let err = EdgewayError::AllInstancesExhausted { last_error: None };
        assert!(err.remote_cause().is_none());
        assert_eq!(err.to_string(), "All instances have failed");
    }

    #[test]
    fn test_registry_errors_are_not_unavailability() {
        assert!(!EdgewayError::ServiceNotFound("X".into()).is_unavailable());
        assert!(!EdgewayError::InvalidRegistration("empty".into()).is_unavailable());
    }

    #[test]
    fn test_not_found_detection() {
        assert!(RemoteCallError::Status {
            status: 404,
            message: "Service not found".into()
        }
        .is_not_found());
        assert!(RemoteCallError::Rejected {
            code: jsonrpc::NOT_FOUND,
            message: "Post not found".into()
        }
        .is_not_found());
        assert!(!RemoteCallError::Status {
            status: 500,
            message: "boom".into()
        }
        .is_not_found());
    }

    #[test]
    fn test_request_id_uniqueness() {
        let ids: HashSet<String> = (0..1000)
            .map(|_| JsonRpcRequest::new("check_status", serde_json::json!({})).id.to_string())
            .collect();
        assert_eq!(ids.len(), 1000, "All request IDs should be unique");
    }

    #[test]
    fn test_registration_accepts_missing_fields() {
        let reg: Registration = serde_json::from_str(r#"{"serviceName":"AnimalService"}"#).unwrap();
        assert_eq!(reg.service_name, "AnimalService");
        assert!(reg.service_url.is_empty());
    }
}
