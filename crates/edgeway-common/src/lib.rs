//! Edgeway Common Types
//!
//! This crate provides the protocol definitions and error taxonomy shared by
//! every Edgeway process: the gateway, the service registry and the
//! animal-posts backend.
//!
//! # Overview
//!
//! Edgeway is an edge gateway that fronts interchangeable backend instances,
//! discovers them through a registry and degrades gracefully as they fail.
//! This crate holds the pieces all of those processes agree on:
//!
//! - **Protocol Layer**: JSON-RPC 2.0 envelopes, typed animal-post records,
//!   registry payloads and the [`EdgewayError`] taxonomy
//! - **Transport Layer**: HTTP/JSON helpers and address normalization
//!
//! # Wire Format
//!
//! - **Backend RPC**: JSON-RPC 2.0 over HTTP `POST /`
//! - **Registry RPC**: plain JSON over HTTP (`POST /register`,
//!   `GET /services/{name}`)
//!
//! # Example
//!
//! ```
//! use edgeway_common::{NewPost, RemoteCallError, EdgewayError};
//!
//! let post = NewPost {
//!     title: "Lost cat".into(),
//!     description: "Grey tabby".into(),
//!     location: "Riverside".into(),
//!     status: "lost".into(),
//!     images: None,
//! };
//! assert!(post.validate().is_ok());
//!
//! let err = EdgewayError::CircuitBreakerTripped(RemoteCallError::Timeout(3500));
//! assert!(err.to_string().contains("Circuit breaker"));
//! ```

pub mod protocol;
pub mod transport;

pub use protocol::*;
