//! Edgeway Transport Helpers
//!
//! Both the backend RPC and the registry RPC run over plain HTTP/1.1 with
//! JSON bodies. This module holds the conversions shared by the servers and
//! clients:
//!
//! - **[`HttpTransport`]**: JSON-RPC body parsing and HTTP response building
//! - **[`strip_scheme`]** / **[`base_url`]**: address normalization between the
//!   registry's `http://host:port` form and the bare `host:port` form the
//!   instance pools store

pub mod http;

pub use http::{base_url, now_millis, strip_scheme, HttpTransport, HyperResponse};
