use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of characters allowed in a todo title (after trimming).
pub const MAX_TITLE_LEN: usize = 200;

/// Stable identifier of a [`Todo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(Uuid);

impl TodoId {
    /// Generates a fresh random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TodoId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TodoId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Lifecycle state of a todo. The only transitions are `Open -> Done`
/// (complete) and `Done -> Open` (reopen).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TodoState {
    Open,
    Done,
}

impl TodoState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for TodoState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Invariant violations raised by the [`Todo`] entity itself.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TodoError {
    #[error("Title is required.")]
    EmptyTitle,
    #[error("Title must not exceed {max} characters (got {len}).")]
    TitleTooLong { len: usize, max: usize },
    #[error("Todo is already {state}.")]
    InvalidTransition { state: TodoState },
}

impl TodoError {
    /// Name of the input field the violation is reported against.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyTitle | Self::TitleTooLong { .. } => "title",
            Self::InvalidTransition { .. } => "state",
        }
    }
}

/// A single todo item.
///
/// Fields are private so every mutation goes through a method that keeps the
/// title and state invariants intact. Timestamps are supplied by the caller
/// (milliseconds since the Unix epoch) to keep the entity clock-free.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Todo {
    id: TodoId,
    title: String,
    state: TodoState,
    created_at_ms: u64,
    updated_at_ms: u64,
}

impl Todo {
    /// Creates a new open todo.
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::EmptyTitle`] or [`TodoError::TitleTooLong`] if the
    /// trimmed title is out of bounds.
    pub fn new(title: &str, now_ms: u64) -> Result<Self, TodoError> {
        Ok(Self {
            id: TodoId::new(),
            title: normalize_title(title)?,
            state: TodoState::Open,
            created_at_ms: now_ms,
            updated_at_ms: now_ms,
        })
    }

    #[must_use]
    pub fn id(&self) -> TodoId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn state(&self) -> TodoState {
        self.state
    }

    #[must_use]
    pub fn created_at_ms(&self) -> u64 {
        self.created_at_ms
    }

    #[must_use]
    pub fn updated_at_ms(&self) -> u64 {
        self.updated_at_ms
    }

    /// Replaces the title.
    ///
    /// # Errors
    ///
    /// Same title rules as [`Todo::new`]; the todo is left untouched on error.
    pub fn rename(&mut self, title: &str, now_ms: u64) -> Result<(), TodoError> {
        self.title = normalize_title(title)?;
        self.updated_at_ms = now_ms;
        Ok(())
    }

    /// Marks the todo as done.
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::InvalidTransition`] if it is already done.
    pub fn complete(&mut self, now_ms: u64) -> Result<(), TodoError> {
        self.transition(TodoState::Open, TodoState::Done, now_ms)
    }

    /// Moves a done todo back to open.
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::InvalidTransition`] if it is already open.
    pub fn reopen(&mut self, now_ms: u64) -> Result<(), TodoError> {
        self.transition(TodoState::Done, TodoState::Open, now_ms)
    }

    fn transition(
        &mut self,
        from: TodoState,
        to: TodoState,
        now_ms: u64,
    ) -> Result<(), TodoError> {
        if self.state != from {
            return Err(TodoError::InvalidTransition { state: self.state });
        }
        self.state = to;
        self.updated_at_ms = now_ms;
        Ok(())
    }
}

fn normalize_title(title: &str) -> Result<String, TodoError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(TodoError::EmptyTitle);
    }
    let len = trimmed.chars().count();
    if len > MAX_TITLE_LEN {
        return Err(TodoError::TitleTooLong {
            len,
            max: MAX_TITLE_LEN,
        });
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_todo_is_open_with_trimmed_title() {
        let todo = Todo::new("  buy milk  ", 10).unwrap();
        assert_eq!(todo.title(), "buy milk");
        assert_eq!(todo.state(), TodoState::Open);
        assert_eq!(todo.created_at_ms(), 10);
        assert_eq!(todo.updated_at_ms(), 10);
    }

    #[test]
    fn blank_title_is_rejected() {
        assert_eq!(Todo::new("   ", 0).unwrap_err(), TodoError::EmptyTitle);
    }

    #[test]
    fn title_length_counts_characters_not_bytes() {
        let exact: String = "é".repeat(MAX_TITLE_LEN);
        assert!(Todo::new(&exact, 0).is_ok());

        let over: String = "é".repeat(MAX_TITLE_LEN + 1);
        assert_eq!(
            Todo::new(&over, 0).unwrap_err(),
            TodoError::TitleTooLong {
                len: MAX_TITLE_LEN + 1,
                max: MAX_TITLE_LEN
            }
        );
    }

    #[test]
    fn complete_then_reopen_round_trips_state() {
        let mut todo = Todo::new("task", 0).unwrap();
        todo.complete(5).unwrap();
        assert_eq!(todo.state(), TodoState::Done);
        assert_eq!(todo.updated_at_ms(), 5);

        todo.reopen(9).unwrap();
        assert_eq!(todo.state(), TodoState::Open);
        assert_eq!(todo.updated_at_ms(), 9);
    }

    #[test]
    fn completing_twice_is_an_invalid_transition() {
        let mut todo = Todo::new("task", 0).unwrap();
        todo.complete(1).unwrap();
        let err = todo.complete(2).unwrap_err();
        assert_eq!(
            err,
            TodoError::InvalidTransition {
                state: TodoState::Done
            }
        );
        assert_eq!(err.field(), "state");
        assert_eq!(todo.updated_at_ms(), 1);
    }

    #[test]
    fn failed_rename_keeps_previous_title() {
        let mut todo = Todo::new("original", 0).unwrap();
        assert!(todo.rename("", 3).is_err());
        assert_eq!(todo.title(), "original");
        assert_eq!(todo.updated_at_ms(), 0);
    }

    #[test]
    fn todo_id_parses_its_own_display() {
        let id = TodoId::new();
        let parsed: TodoId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-a-uuid".parse::<TodoId>().is_err());
    }
}
