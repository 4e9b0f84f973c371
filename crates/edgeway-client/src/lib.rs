pub mod backend;
pub mod http;
pub mod registry;

pub use backend::BackendClient;
pub use http::{HttpClient, HttpReply};
pub use registry::RegistryClient;
