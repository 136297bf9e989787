//! Persistence seam for todos.
//!
//! Handlers only see [`TodoStore`]. A mutating call writes through `add`,
//! `update` or `remove` and then makes the write durable with one `save`.

pub mod memory;

use async_trait::async_trait;
use todo_core::{Todo, TodoId};

use crate::service::operation::OperationError;

pub use memory::InMemoryTodoStore;

/// One page of todos plus the total count across all pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoPage {
    pub items: Vec<Todo>,
    pub total: u64,
}

/// Storage failures. Never shown to clients verbatim.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("todo {id} already exists")]
    Duplicate { id: TodoId },
    #[error("todo {id} does not exist")]
    Missing { id: TodoId },
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for OperationError {
    fn from(err: StoreError) -> Self {
        Self::Internal(anyhow::Error::new(err))
    }
}

/// Pluggable todo persistence.
#[async_trait]
pub trait TodoStore: Send + Sync {
    async fn find_by_id(&self, id: TodoId) -> Result<Option<Todo>, StoreError>;

    /// Todos ordered by creation time. `page` is 1-based.
    async fn list(&self, page: u32, page_size: u32) -> Result<TodoPage, StoreError>;

    async fn add(&self, todo: Todo) -> Result<(), StoreError>;

    async fn update(&self, todo: Todo) -> Result<(), StoreError>;

    /// Returns `false` if nothing was stored under `id`.
    async fn remove(&self, id: TodoId) -> Result<bool, StoreError>;

    /// Flushes writes made since the last save.
    async fn save(&self) -> Result<(), StoreError>;
}
