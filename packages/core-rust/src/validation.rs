//! Validation failures and their field-grouped aggregate.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// A single `(field, message)` failure reported by a validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFailure {
    pub field: String,
    pub message: String,
}

impl ValidationFailure {
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Field name -> messages, with fields kept in the order they were first seen.
///
/// Messages for one field always stay together regardless of which validator
/// produced them. Serializes as a JSON object (`{"title": ["..."]}`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrorMap {
    entries: Vec<(String, Vec<String>)>,
}

impl ValidationErrorMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a map holding a single failure.
    #[must_use]
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut map = Self::new();
        map.push(ValidationFailure::new(field, message));
        map
    }

    /// Appends a failure to its field's group, creating the group on first sight.
    pub fn push(&mut self, failure: ValidationFailure) {
        let ValidationFailure { field, message } = failure;
        match self.entries.iter_mut().find(|(name, _)| *name == field) {
            Some((_, messages)) => messages.push(message),
            None => self.entries.push((field, vec![message])),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct fields with at least one failure.
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.entries.len()
    }

    /// Messages recorded for `field`, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, messages)| messages.as_slice())
    }

    /// Iterates `(field, messages)` in first-seen field order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }
}

impl Extend<ValidationFailure> for ValidationErrorMap {
    fn extend<I: IntoIterator<Item = ValidationFailure>>(&mut self, iter: I) {
        for failure in iter {
            self.push(failure);
        }
    }
}

impl FromIterator<ValidationFailure> for ValidationErrorMap {
    fn from_iter<I: IntoIterator<Item = ValidationFailure>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl Serialize for ValidationErrorMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (field, messages) in &self.entries {
            map.serialize_entry(field, messages)?;
        }
        map.end()
    }
}

impl From<&ValidationErrorMap> for serde_json::Value {
    fn from(errors: &ValidationErrorMap) -> Self {
        let object = errors
            .iter()
            .map(|(field, messages)| {
                let list = messages
                    .iter()
                    .cloned()
                    .map(serde_json::Value::String)
                    .collect();
                (field.to_string(), serde_json::Value::Array(list))
            })
            .collect();
        serde_json::Value::Object(object)
    }
}
