//! Todo domain: handlers, validators and their registration.

pub mod todo;
pub mod validators;

use std::sync::Arc;

use crate::service::handler::Validator;
use crate::service::operation::{ConfigurationError, OperationKind};
use crate::service::registry::{HandlerRegistry, RegistryBuilder};
use crate::storage::TodoStore;

pub use todo::{
    CompleteTodoHandler, CreateTodoHandler, DeleteTodoHandler, GetTodoHandler, ListTodosHandler,
    ReopenTodoHandler, UpdateTodoHandler, TODO_ENTITY,
};
pub use validators::{MaxTitleLength, PagingValidator, RequiredTitle, MAX_PAGE_SIZE};

fn title_validators() -> Vec<Arc<dyn Validator>> {
    vec![
        Arc::new(RequiredTitle) as Arc<dyn Validator>,
        Arc::new(MaxTitleLength),
    ]
}

/// Binds every todo handler, with its validators, to `builder`.
///
/// # Errors
///
/// Returns [`ConfigurationError::DuplicateHandler`] if any todo kind was
/// already registered.
pub fn register_todo_handlers(
    builder: &mut RegistryBuilder,
    store: &Arc<dyn TodoStore>,
) -> Result<(), ConfigurationError> {
    builder
        .register(
            OperationKind::CreateTodo,
            CreateTodoHandler::new(Arc::clone(store)),
            title_validators(),
        )?
        .register(
            OperationKind::GetTodo,
            GetTodoHandler::new(Arc::clone(store)),
            Vec::new(),
        )?
        .register(
            OperationKind::ListTodos,
            ListTodosHandler::new(Arc::clone(store)),
            vec![Arc::new(PagingValidator) as Arc<dyn Validator>],
        )?
        .register(
            OperationKind::UpdateTodo,
            UpdateTodoHandler::new(Arc::clone(store)),
            title_validators(),
        )?
        .register(
            OperationKind::CompleteTodo,
            CompleteTodoHandler::new(Arc::clone(store)),
            Vec::new(),
        )?
        .register(
            OperationKind::ReopenTodo,
            ReopenTodoHandler::new(Arc::clone(store)),
            Vec::new(),
        )?
        .register(
            OperationKind::DeleteTodo,
            DeleteTodoHandler::new(Arc::clone(store)),
            Vec::new(),
        )?;
    Ok(())
}

/// Builds the complete registry, running the startup self-check.
///
/// # Errors
///
/// Returns a [`ConfigurationError`] if a kind is bound twice or left unbound.
pub fn build_todo_registry(store: Arc<dyn TodoStore>) -> Result<HandlerRegistry, ConfigurationError> {
    let mut builder = RegistryBuilder::new();
    register_todo_handlers(&mut builder, &store)?;
    builder.build()
}
