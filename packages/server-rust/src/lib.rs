//! Todo server: typed operation dispatch through tower behaviors, Problem
//! Details error translation, and the axum HTTP transport.

pub mod network;
pub mod service;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_support;

pub use network::{NetworkConfig, NetworkModule};
pub use service::{Dispatcher, ServerConfig};
pub use storage::{InMemoryTodoStore, TodoStore};
