//! Problem Details error bodies (`application/problem+json`).
//!
//! The type URIs and titles below are part of the wire contract with existing
//! clients and must not change.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::validation::ValidationErrorMap;

/// Content type of every error response body.
pub const APPLICATION_PROBLEM_JSON: &str = "application/problem+json";

/// Canonical `type` URIs.
pub mod problem_types {
    pub const VALIDATION: &str = "https://tools.ietf.org/html/rfc7231#section-6.5.1";
    pub const NOT_FOUND: &str = "https://tools.ietf.org/html/rfc7231#section-6.5.4";
    pub const INTERNAL: &str = "https://tools.ietf.org/html/rfc7231#section-6.6.1";
}

/// Canonical titles, paired with [`problem_types`].
pub mod problem_titles {
    pub const VALIDATION: &str = "One or more validation errors occurred.";
    pub const NOT_FOUND: &str = "The specified resource was not found.";
    pub const INTERNAL: &str = "An error occurred while processing your request.";
}

/// Extension member names.
pub mod extension_keys {
    pub const TRACE_ID: &str = "traceId";
    pub const CORRELATION_ID: &str = "correlationId";
    pub const ERRORS: &str = "errors";
}

/// A Problem Details document.
///
/// Extension members are flattened into the top-level object, so a
/// serialized body looks like
/// `{"type": ..., "title": ..., "status": 400, "traceId": ..., "errors": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub type_uri: String,
    pub title: String,
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(flatten)]
    pub extensions: Map<String, Value>,
}

impl ProblemDetails {
    #[must_use]
    pub fn new(type_uri: impl Into<String>, title: impl Into<String>, status: u16) -> Self {
        Self {
            type_uri: type_uri.into(),
            title: title.into(),
            status,
            detail: None,
            extensions: Map::new(),
        }
    }

    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    #[must_use]
    pub fn with_extension(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extensions.insert(key.into(), value);
        self
    }

    #[must_use]
    pub fn with_trace_id(self, trace_id: &str) -> Self {
        self.with_extension(extension_keys::TRACE_ID, Value::String(trace_id.to_string()))
    }

    #[must_use]
    pub fn with_correlation_id(self, correlation_id: &str) -> Self {
        self.with_extension(
            extension_keys::CORRELATION_ID,
            Value::String(correlation_id.to_string()),
        )
    }

    #[must_use]
    pub fn with_errors(self, errors: &ValidationErrorMap) -> Self {
        self.with_extension(extension_keys::ERRORS, Value::from(errors))
    }

    #[must_use]
    pub fn trace_id(&self) -> Option<&str> {
        self.extension_str(extension_keys::TRACE_ID)
    }

    #[must_use]
    pub fn correlation_id(&self) -> Option<&str> {
        self.extension_str(extension_keys::CORRELATION_ID)
    }

    #[must_use]
    pub fn errors(&self) -> Option<&Value> {
        self.extensions.get(extension_keys::ERRORS)
    }

    fn extension_str(&self, key: &str) -> Option<&str> {
        self.extensions.get(key).and_then(Value::as_str)
    }
}
