pub mod error;
pub mod jsonrpc;
pub mod posts;
pub mod registry;

#[cfg(test)]
mod tests;

pub use error::{EdgewayError, RemoteCallError, Result};
pub use jsonrpc::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
pub use posts::{
    Acknowledged, AnimalPost, CreatedPost, DeletePost, NewPost, PostList, ServiceLoad,
    ServiceStatus, UpdatePost,
};
pub use registry::{LoadReport, Registration, ServiceLocation};
