//! Edgeway Service Registry
//!
//! Process-wide mapping from a logical service name to the single address
//! most recently registered for it, served over a small JSON HTTP surface.
//!
//! The registry holds exactly one address per name. Fanning a service out to
//! several instances is the gateway's job (its instance pool), not the
//! registry's. State lives for the lifetime of the process only.

pub mod http_server;
pub mod registry;

pub use http_server::HttpServer;
pub use registry::ServiceRegistry;
