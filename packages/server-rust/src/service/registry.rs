//! Build-once handler registry.
//!
//! Handlers and validators are bound to an [`OperationKind`] through a
//! [`RegistryBuilder`] at startup. [`RegistryBuilder::build`] refuses to
//! produce a registry unless every kind has exactly one handler, so a missing
//! binding is found before the first request is served. After `build` the
//! registry is immutable and shared read-only across all calls.

use std::collections::HashMap;
use std::sync::Arc;

use super::handler::{OperationHandler, Validator};
use super::operation::{ConfigurationError, OperationKind};

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

/// The handler and validators bound to one operation kind.
#[derive(Clone)]
pub struct Registration {
    pub handler: Arc<dyn OperationHandler>,
    pub validators: Arc<[Arc<dyn Validator>]>,
}

// ---------------------------------------------------------------------------
// RegistryBuilder
// ---------------------------------------------------------------------------

/// Collects registrations before the registry is frozen.
#[derive(Default)]
pub struct RegistryBuilder {
    entries: HashMap<OperationKind, Registration>,
}

impl RegistryBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `handler` and its `validators` to `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::KindMismatch`] if `handler` serves a
    /// different kind, or [`ConfigurationError::DuplicateHandler`] if `kind`
    /// already has a handler; the existing binding is kept.
    pub fn register<H>(
        &mut self,
        kind: OperationKind,
        handler: H,
        validators: Vec<Arc<dyn Validator>>,
    ) -> Result<&mut Self, ConfigurationError>
    where
        H: OperationHandler,
    {
        self.register_shared(kind, Arc::new(handler), validators)
    }

    /// Same as [`register`](Self::register) for a handler that is already
    /// shared.
    ///
    /// # Errors
    ///
    /// Same conditions as [`register`](Self::register).
    pub fn register_shared(
        &mut self,
        kind: OperationKind,
        handler: Arc<dyn OperationHandler>,
        validators: Vec<Arc<dyn Validator>>,
    ) -> Result<&mut Self, ConfigurationError> {
        let actual = handler.kind();
        if actual != kind {
            return Err(ConfigurationError::KindMismatch {
                expected: kind,
                actual,
            });
        }
        if self.entries.contains_key(&kind) {
            return Err(ConfigurationError::DuplicateHandler { kind });
        }
        self.entries.insert(
            kind,
            Registration {
                handler,
                validators: validators.into(),
            },
        );
        Ok(self)
    }

    /// Kinds that have no handler yet, in declaration order.
    #[must_use]
    pub fn missing(&self) -> Vec<OperationKind> {
        OperationKind::ALL
            .into_iter()
            .filter(|kind| !self.entries.contains_key(kind))
            .collect()
    }

    /// Freezes the registry after checking that every kind is bound.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::Incomplete`] listing every unbound kind.
    pub fn build(self) -> Result<HandlerRegistry, ConfigurationError> {
        let missing = self.missing();
        if !missing.is_empty() {
            return Err(ConfigurationError::Incomplete { missing });
        }
        Ok(self.build_partial())
    }

    /// Freezes the registry without the completeness check. Dispatching an
    /// unbound kind then fails with [`ConfigurationError::MissingHandler`].
    #[must_use]
    pub fn build_partial(self) -> HandlerRegistry {
        HandlerRegistry {
            entries: self.entries,
        }
    }
}

// ---------------------------------------------------------------------------
// HandlerRegistry
// ---------------------------------------------------------------------------

/// Immutable kind -> registration map.
pub struct HandlerRegistry {
    entries: HashMap<OperationKind, Registration>,
}

impl HandlerRegistry {
    #[must_use]
    pub fn get(&self, kind: OperationKind) -> Option<&Registration> {
        self.entries.get(&kind)
    }

    #[must_use]
    pub fn contains(&self, kind: OperationKind) -> bool {
        self.entries.contains_key(&kind)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
