use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Header carrying the correlation id in both directions.
pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

/// Opaque identifier threading one inbound call through logs and its response.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(String);

impl CorrelationId {
    /// Uses the inbound header value verbatim when it is present and not
    /// blank after trimming; otherwise generates a fresh UUID v4.
    #[must_use]
    pub fn resolve(header_value: Option<&str>) -> Self {
        match header_value {
            Some(value) if !value.trim().is_empty() => Self(value.to_string()),
            _ => {
                let generated = Self::generate();
                tracing::trace!(correlation_id = %generated, "generated correlation id");
                generated
            }
        }
    }

    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CorrelationId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Per-call identity carried explicitly through dispatch, every behavior and
/// the error translator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Client-visible correlation id, echoed on the response.
    pub correlation_id: CorrelationId,
    /// Internal per-call trace identifier, reported as `traceId`.
    pub trace_id: String,
}

impl RequestContext {
    #[must_use]
    pub fn new(correlation_id: CorrelationId, trace_id: impl Into<String>) -> Self {
        Self {
            correlation_id,
            trace_id: trace_id.into(),
        }
    }

    /// A context with a generated correlation id and trace id, for calls that
    /// do not originate from a transport (startup tasks, tests).
    #[must_use]
    pub fn detached() -> Self {
        Self::new(CorrelationId::generate(), Uuid::new_v4().to_string())
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn header_value_is_used_verbatim() {
        assert_eq!(CorrelationId::resolve(Some("abc-123")).as_str(), "abc-123");
        assert_eq!(CorrelationId::resolve(Some(" padded ")).as_str(), " padded ");
    }

    #[test]
    fn missing_or_blank_header_generates_uuid() {
        for header in [None, Some(""), Some("   "), Some("\t\n")] {
            let id = CorrelationId::resolve(header);
            assert!(Uuid::parse_str(id.as_str()).is_ok(), "{header:?} -> {id}");
        }
    }

    #[test]
    fn generated_ids_differ() {
        assert_ne!(CorrelationId::resolve(None), CorrelationId::resolve(None));
    }

    proptest! {
        #[test]
        fn non_blank_values_round_trip(value in "[ -~]{0,40}") {
            let resolved = CorrelationId::resolve(Some(&value));
            if value.trim().is_empty() {
                prop_assert!(Uuid::parse_str(resolved.as_str()).is_ok());
            } else {
                prop_assert_eq!(resolved.as_str(), value.as_str());
            }
        }
    }
}
