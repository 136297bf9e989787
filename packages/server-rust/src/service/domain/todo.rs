//! Todo handlers: one [`OperationHandler`] per todo use case.
//!
//! Mutating handlers load the entity, apply the change in memory, check the
//! call's cancellation token, and only then write and `save` once.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use todo_core::messages::{TodoPageView, TodoView};
use todo_core::{Todo, TodoId};

use crate::service::handler::OperationHandler;
use crate::service::operation::{
    Operation, OperationContext, OperationError, OperationKind, OperationResponse,
};
use crate::storage::TodoStore;

/// Entity name used in `NotFound` errors.
pub const TODO_ENTITY: &str = "Todo";

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
}

fn wrong_handler(expected: OperationKind, actual: OperationKind) -> OperationError {
    OperationError::WrongHandler { expected, actual }
}

fn ensure_live(ctx: &OperationContext) -> Result<(), OperationError> {
    if ctx.cancellation.is_cancelled() {
        return Err(OperationError::Cancelled);
    }
    Ok(())
}

async fn load(store: &dyn TodoStore, id: TodoId) -> Result<Todo, OperationError> {
    store
        .find_by_id(id)
        .await?
        .ok_or_else(|| OperationError::not_found(TODO_ENTITY, id))
}

/// Writes `todo` back and commits, unless the call was cancelled.
async fn commit_update(
    store: &dyn TodoStore,
    ctx: &OperationContext,
    todo: Todo,
) -> Result<OperationResponse, OperationError> {
    ensure_live(ctx)?;
    store.update(todo).await?;
    store.save().await?;
    Ok(OperationResponse::Empty)
}

// ---------------------------------------------------------------------------
// CreateTodo
// ---------------------------------------------------------------------------

pub struct CreateTodoHandler {
    store: Arc<dyn TodoStore>,
}

impl CreateTodoHandler {
    #[must_use]
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl OperationHandler for CreateTodoHandler {
    fn kind(&self) -> OperationKind {
        OperationKind::CreateTodo
    }

    async fn handle(&self, op: Operation) -> Result<OperationResponse, OperationError> {
        let actual = op.kind();
        let Operation::CreateTodo { ctx, title } = op else {
            return Err(wrong_handler(OperationKind::CreateTodo, actual));
        };

        let todo = Todo::new(title.as_deref().unwrap_or_default(), now_millis())?;
        let id = todo.id();

        ensure_live(&ctx)?;
        self.store.add(todo).await?;
        self.store.save().await?;

        tracing::debug!(todo_id = %id, correlation_id = %ctx.correlation_id(), "todo created");
        Ok(OperationResponse::Created { id })
    }
}

// ---------------------------------------------------------------------------
// GetTodo
// ---------------------------------------------------------------------------

pub struct GetTodoHandler {
    store: Arc<dyn TodoStore>,
}

impl GetTodoHandler {
    #[must_use]
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl OperationHandler for GetTodoHandler {
    fn kind(&self) -> OperationKind {
        OperationKind::GetTodo
    }

    async fn handle(&self, op: Operation) -> Result<OperationResponse, OperationError> {
        let actual = op.kind();
        let Operation::GetTodo { id, .. } = op else {
            return Err(wrong_handler(OperationKind::GetTodo, actual));
        };

        let todo = load(self.store.as_ref(), id).await?;
        Ok(OperationResponse::Todo(Box::new(TodoView::from(&todo))))
    }
}

// ---------------------------------------------------------------------------
// ListTodos
// ---------------------------------------------------------------------------

pub struct ListTodosHandler {
    store: Arc<dyn TodoStore>,
}

impl ListTodosHandler {
    #[must_use]
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl OperationHandler for ListTodosHandler {
    fn kind(&self) -> OperationKind {
        OperationKind::ListTodos
    }

    async fn handle(&self, op: Operation) -> Result<OperationResponse, OperationError> {
        let actual = op.kind();
        let Operation::ListTodos {
            page, page_size, ..
        } = op
        else {
            return Err(wrong_handler(OperationKind::ListTodos, actual));
        };

        let found = self.store.list(page, page_size).await?;
        Ok(OperationResponse::Page(TodoPageView {
            items: found.items.iter().map(TodoView::from).collect(),
            page,
            page_size,
            total: found.total,
        }))
    }
}

// ---------------------------------------------------------------------------
// UpdateTodo
// ---------------------------------------------------------------------------

pub struct UpdateTodoHandler {
    store: Arc<dyn TodoStore>,
}

impl UpdateTodoHandler {
    #[must_use]
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl OperationHandler for UpdateTodoHandler {
    fn kind(&self) -> OperationKind {
        OperationKind::UpdateTodo
    }

    async fn handle(&self, op: Operation) -> Result<OperationResponse, OperationError> {
        let actual = op.kind();
        let Operation::UpdateTodo { ctx, id, title } = op else {
            return Err(wrong_handler(OperationKind::UpdateTodo, actual));
        };

        let mut todo = load(self.store.as_ref(), id).await?;
        todo.rename(title.as_deref().unwrap_or_default(), now_millis())?;
        commit_update(self.store.as_ref(), &ctx, todo).await
    }
}

// ---------------------------------------------------------------------------
// CompleteTodo / ReopenTodo
// ---------------------------------------------------------------------------

pub struct CompleteTodoHandler {
    store: Arc<dyn TodoStore>,
}

impl CompleteTodoHandler {
    #[must_use]
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl OperationHandler for CompleteTodoHandler {
    fn kind(&self) -> OperationKind {
        OperationKind::CompleteTodo
    }

    async fn handle(&self, op: Operation) -> Result<OperationResponse, OperationError> {
        let actual = op.kind();
        let Operation::CompleteTodo { ctx, id } = op else {
            return Err(wrong_handler(OperationKind::CompleteTodo, actual));
        };

        let mut todo = load(self.store.as_ref(), id).await?;
        todo.complete(now_millis())?;
        commit_update(self.store.as_ref(), &ctx, todo).await
    }
}

pub struct ReopenTodoHandler {
    store: Arc<dyn TodoStore>,
}

impl ReopenTodoHandler {
    #[must_use]
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl OperationHandler for ReopenTodoHandler {
    fn kind(&self) -> OperationKind {
        OperationKind::ReopenTodo
    }

    async fn handle(&self, op: Operation) -> Result<OperationResponse, OperationError> {
        let actual = op.kind();
        let Operation::ReopenTodo { ctx, id } = op else {
            return Err(wrong_handler(OperationKind::ReopenTodo, actual));
        };

        let mut todo = load(self.store.as_ref(), id).await?;
        todo.reopen(now_millis())?;
        commit_update(self.store.as_ref(), &ctx, todo).await
    }
}

// ---------------------------------------------------------------------------
// DeleteTodo
// ---------------------------------------------------------------------------

pub struct DeleteTodoHandler {
    store: Arc<dyn TodoStore>,
}

impl DeleteTodoHandler {
    #[must_use]
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl OperationHandler for DeleteTodoHandler {
    fn kind(&self) -> OperationKind {
        OperationKind::DeleteTodo
    }

    async fn handle(&self, op: Operation) -> Result<OperationResponse, OperationError> {
        let actual = op.kind();
        let Operation::DeleteTodo { ctx, id } = op else {
            return Err(wrong_handler(OperationKind::DeleteTodo, actual));
        };

        load(self.store.as_ref(), id).await?;
        ensure_live(&ctx)?;
        if !self.store.remove(id).await? {
            // Removed concurrently between the lookup and the delete.
            return Err(OperationError::not_found(TODO_ENTITY, id));
        }
        self.store.save().await?;

        tracing::debug!(todo_id = %id, correlation_id = %ctx.correlation_id(), "todo deleted");
        Ok(OperationResponse::Empty)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use todo_core::{RequestContext, TodoState};

    use super::*;
    use crate::storage::InMemoryTodoStore;

    fn ctx() -> OperationContext {
        OperationContext::new(1, RequestContext::detached(), 5000)
    }

    fn store() -> Arc<InMemoryTodoStore> {
        Arc::new(InMemoryTodoStore::new())
    }

    async fn seed(store: &Arc<InMemoryTodoStore>, title: &str) -> TodoId {
        let todo = Todo::new(title, 1).unwrap();
        let id = todo.id();
        store.add(todo).await.unwrap();
        id
    }

    #[tokio::test]
    async fn create_adds_and_saves_once() {
        let store = store();
        let handler = CreateTodoHandler::new(store.clone());

        let resp = handler
            .handle(Operation::CreateTodo {
                ctx: ctx(),
                title: Some("  buy milk  ".to_string()),
            })
            .await
            .unwrap();

        let OperationResponse::Created { id } = resp else {
            panic!("expected Created");
        };
        let stored = store.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.title(), "buy milk");
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn create_with_blank_title_is_a_title_error() {
        let store = store();
        let handler = CreateTodoHandler::new(store.clone());

        let err = handler
            .handle(Operation::CreateTodo {
                ctx: ctx(),
                title: Some("   ".to_string()),
            })
            .await
            .unwrap_err();

        let OperationError::Validation(map) = err else {
            panic!("expected validation error");
        };
        assert!(map.get("title").is_some());
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test]
    async fn get_missing_todo_is_not_found() {
        let handler = GetTodoHandler::new(store());
        let id = TodoId::new();

        let err = handler
            .handle(Operation::GetTodo { ctx: ctx(), id })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            OperationError::NotFound { entity: "Todo", ref key } if *key == id.to_string()
        ));
    }

    #[tokio::test]
    async fn get_returns_view() {
        let store = store();
        let id = seed(&store, "read book").await;
        let handler = GetTodoHandler::new(store);

        let resp = handler
            .handle(Operation::GetTodo { ctx: ctx(), id })
            .await
            .unwrap();

        let OperationResponse::Todo(view) = resp else {
            panic!("expected Todo");
        };
        assert_eq!(view.id, id);
        assert_eq!(view.title, "read book");
        assert_eq!(view.state, TodoState::Open);
    }

    #[tokio::test]
    async fn list_reports_page_and_total() {
        let store = store();
        for title in ["a", "b", "c"] {
            seed(&store, title).await;
        }
        let handler = ListTodosHandler::new(store);

        let resp = handler
            .handle(Operation::ListTodos {
                ctx: ctx(),
                page: 1,
                page_size: 2,
            })
            .await
            .unwrap();

        let OperationResponse::Page(page) = resp else {
            panic!("expected Page");
        };
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total, 3);
        assert_eq!(page.page_size, 2);
    }

    #[tokio::test]
    async fn update_renames_and_saves() {
        let store = store();
        let id = seed(&store, "old").await;
        let handler = UpdateTodoHandler::new(store.clone());

        handler
            .handle(Operation::UpdateTodo {
                ctx: ctx(),
                id,
                title: Some("new".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(store.find_by_id(id).await.unwrap().unwrap().title(), "new");
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn completing_twice_is_a_state_error() {
        let store = store();
        let id = seed(&store, "once").await;
        let handler = CompleteTodoHandler::new(store.clone());

        handler
            .handle(Operation::CompleteTodo { ctx: ctx(), id })
            .await
            .unwrap();
        let err = handler
            .handle(Operation::CompleteTodo { ctx: ctx(), id })
            .await
            .unwrap_err();

        let OperationError::Validation(map) = err else {
            panic!("expected validation error");
        };
        assert_eq!(map.get("state").unwrap(), ["Todo is already done.".to_string()]);
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn reopen_moves_done_back_to_open() {
        let store = store();
        let id = seed(&store, "again").await;
        CompleteTodoHandler::new(store.clone())
            .handle(Operation::CompleteTodo { ctx: ctx(), id })
            .await
            .unwrap();

        ReopenTodoHandler::new(store.clone())
            .handle(Operation::ReopenTodo { ctx: ctx(), id })
            .await
            .unwrap();

        let todo = store.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(todo.state(), TodoState::Open);
    }

    #[tokio::test]
    async fn delete_removes_and_second_delete_is_not_found() {
        let store = store();
        let id = seed(&store, "bye").await;
        let handler = DeleteTodoHandler::new(store.clone());

        handler
            .handle(Operation::DeleteTodo { ctx: ctx(), id })
            .await
            .unwrap();
        let err = handler
            .handle(Operation::DeleteTodo { ctx: ctx(), id })
            .await
            .unwrap_err();

        assert!(matches!(err, OperationError::NotFound { .. }));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn cancelled_call_writes_nothing() {
        let store = store();
        let id = seed(&store, "keep").await;
        let handler = UpdateTodoHandler::new(store.clone());

        let ctx = ctx();
        ctx.cancellation.cancel();
        let err = handler
            .handle(Operation::UpdateTodo {
                ctx,
                id,
                title: Some("changed".to_string()),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, OperationError::Cancelled));
        assert_eq!(store.find_by_id(id).await.unwrap().unwrap().title(), "keep");
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test]
    async fn store_failure_surfaces_as_internal() {
        let store = store();
        store.set_unavailable(true);
        let handler = GetTodoHandler::new(store);

        let err = handler
            .handle(Operation::GetTodo {
                ctx: ctx(),
                id: TodoId::new(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, OperationError::Internal(_)));
    }

    #[tokio::test]
    async fn mismatched_operation_is_rejected() {
        let handler = GetTodoHandler::new(store());

        let err = handler
            .handle(Operation::DeleteTodo {
                ctx: ctx(),
                id: TodoId::new(),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            OperationError::WrongHandler {
                expected: OperationKind::GetTodo,
                actual: OperationKind::DeleteTodo
            }
        ));
    }
}
