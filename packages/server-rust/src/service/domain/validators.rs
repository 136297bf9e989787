//! Input validators for todo operations.

use todo_core::{ValidationFailure, MAX_TITLE_LEN};

use crate::service::handler::Validator;
use crate::service::operation::Operation;

/// Largest accepted `pageSize`.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Title carried by operations that take one; `None` for every other kind.
fn title_input(op: &Operation) -> Option<Option<&str>> {
    match op {
        Operation::CreateTodo { title, .. } | Operation::UpdateTodo { title, .. } => {
            Some(title.as_deref())
        }
        _ => None,
    }
}

/// Title must be present and not blank.
pub struct RequiredTitle;

impl Validator for RequiredTitle {
    fn validate(&self, op: &Operation) -> Vec<ValidationFailure> {
        let missing = match title_input(op) {
            Some(None) => true,
            Some(Some(title)) => title.trim().is_empty(),
            None => false,
        };
        if missing {
            vec![ValidationFailure::new("title", "Title is required.")]
        } else {
            Vec::new()
        }
    }
}

/// Trimmed title must fit in [`MAX_TITLE_LEN`] characters.
pub struct MaxTitleLength;

impl Validator for MaxTitleLength {
    fn validate(&self, op: &Operation) -> Vec<ValidationFailure> {
        match title_input(op) {
            Some(Some(title)) if title.trim().chars().count() > MAX_TITLE_LEN => {
                vec![ValidationFailure::new(
                    "title",
                    format!("Title must not exceed {MAX_TITLE_LEN} characters."),
                )]
            }
            _ => Vec::new(),
        }
    }
}

/// `page >= 1` and `1 <= pageSize <= MAX_PAGE_SIZE`.
pub struct PagingValidator;

impl Validator for PagingValidator {
    fn validate(&self, op: &Operation) -> Vec<ValidationFailure> {
        let Operation::ListTodos {
            page, page_size, ..
        } = op
        else {
            return Vec::new();
        };

        let mut failures = Vec::new();
        if *page < 1 {
            failures.push(ValidationFailure::new("page", "Page must be at least 1."));
        }
        if !(1..=MAX_PAGE_SIZE).contains(page_size) {
            failures.push(ValidationFailure::new(
                "pageSize",
                format!("Page size must be between 1 and {MAX_PAGE_SIZE}."),
            ));
        }
        failures
    }
}
