//! JSON request and response bodies exchanged over the HTTP API.
//!
//! All types use `#[serde(rename_all = "camelCase")]` so field names match the
//! existing web client.

pub mod todo;

pub use todo::{
    CreateTodoPayload, CreatedView, ListTodosQuery, TodoPageView, TodoView, UpdateTodoPayload,
    DEFAULT_PAGE, DEFAULT_PAGE_SIZE,
};
