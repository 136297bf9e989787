//! Todo request payloads and response views.

use serde::{Deserialize, Serialize};

use crate::types::{Todo, TodoId, TodoState};

/// Page number used when the client omits `page`.
pub const DEFAULT_PAGE: u32 = 1;
/// Page size used when the client omits `pageSize`.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Body of `POST /api/todos`.
///
/// `title` is optional at the serde level so that a missing title is reported
/// by the validators as a field error rather than as a body parse failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodoPayload {
    #[serde(default)]
    pub title: Option<String>,
}

/// Body of `PUT /api/todos/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodoPayload {
    #[serde(default)]
    pub title: Option<String>,
}

/// Query string of `GET /api/todos`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTodosQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for ListTodosQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

fn default_page() -> u32 {
    DEFAULT_PAGE
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Read model of a single todo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoView {
    pub id: TodoId,
    pub title: String,
    pub state: TodoState,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
}

impl From<&Todo> for TodoView {
    fn from(todo: &Todo) -> Self {
        Self {
            id: todo.id(),
            title: todo.title().to_string(),
            state: todo.state(),
            created_at_ms: todo.created_at_ms(),
            updated_at_ms: todo.updated_at_ms(),
        }
    }
}

/// One page of todos plus the total count across all pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoPageView {
    pub items: Vec<TodoView>,
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
}

/// Body of a `201 Created` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedView {
    pub id: TodoId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_query_defaults_apply_when_fields_missing() {
        let query: ListTodosQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query, ListTodosQuery::default());

        let query: ListTodosQuery = serde_json::from_str(r#"{"pageSize": 5}"#).unwrap();
        assert_eq!(query.page, DEFAULT_PAGE);
        assert_eq!(query.page_size, 5);
    }

    #[test]
    fn create_payload_tolerates_missing_title() {
        let payload: CreateTodoPayload = serde_json::from_str("{}").unwrap();
        assert!(payload.title.is_none());
    }

    #[test]
    fn todo_view_uses_camel_case_fields() {
        let todo = Todo::new("write docs", 42).unwrap();
        let json = serde_json::to_value(TodoView::from(&todo)).unwrap();
        assert_eq!(json["title"], "write docs");
        assert_eq!(json["state"], "open");
        assert_eq!(json["createdAtMs"], 42);
        assert_eq!(json["id"], todo.id().to_string());
    }
}
