//! Operation types flowing through the dispatch pipeline.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use todo_core::messages::{TodoPageView, TodoView};
use todo_core::{CorrelationId, RequestContext, TodoError, TodoId, ValidationErrorMap};
use tokio_util::sync::CancellationToken;

/// Boxed future returned by every service in the pipeline.
pub type OperationFuture =
    Pin<Box<dyn Future<Output = Result<OperationResponse, OperationError>> + Send>>;

// ---------------------------------------------------------------------------
// OperationKind
// ---------------------------------------------------------------------------

/// Discriminant of [`Operation`], used as the registry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OperationKind {
    CreateTodo,
    GetTodo,
    ListTodos,
    UpdateTodo,
    CompleteTodo,
    ReopenTodo,
    DeleteTodo,
}

impl OperationKind {
    /// Every variant. The startup self-check requires a handler for each.
    pub const ALL: [Self; 7] = [
        Self::CreateTodo,
        Self::GetTodo,
        Self::ListTodos,
        Self::UpdateTodo,
        Self::CompleteTodo,
        Self::ReopenTodo,
        Self::DeleteTodo,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::CreateTodo => "CreateTodo",
            Self::GetTodo => "GetTodo",
            Self::ListTodos => "ListTodos",
            Self::UpdateTodo => "UpdateTodo",
            Self::CompleteTodo => "CompleteTodo",
            Self::ReopenTodo => "ReopenTodo",
            Self::DeleteTodo => "DeleteTodo",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// OperationContext
// ---------------------------------------------------------------------------

/// Context carried with every operation through the pipeline.
///
/// The correlation id and the cancellation signal travel here explicitly;
/// nothing in the pipeline reads them from ambient storage.
#[derive(Debug, Clone)]
pub struct OperationContext {
    pub call_id: u64,
    pub request: RequestContext,
    /// Cancelled by the transport when the caller goes away, or by the
    /// dispatcher when `call_timeout_ms` elapses.
    pub cancellation: CancellationToken,
    pub call_timeout_ms: u64,
}

impl OperationContext {
    #[must_use]
    pub fn new(call_id: u64, request: RequestContext, call_timeout_ms: u64) -> Self {
        Self {
            call_id,
            request,
            cancellation: CancellationToken::new(),
            call_timeout_ms,
        }
    }

    /// Replaces the call's token, e.g. with a child of a shutdown token.
    #[must_use]
    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// Shortens the deadline to at most `cap_ms`.
    #[must_use]
    pub fn with_timeout_cap(mut self, cap_ms: u64) -> Self {
        self.call_timeout_ms = self.call_timeout_ms.min(cap_ms);
        self
    }

    #[must_use]
    pub fn correlation_id(&self) -> &CorrelationId {
        &self.request.correlation_id
    }

    #[must_use]
    pub fn trace_id(&self) -> &str {
        &self.request.trace_id
    }
}

// ---------------------------------------------------------------------------
// Operation
// ---------------------------------------------------------------------------

/// Closed set of requests the service understands. Each variant carries its
/// context plus the input fields of one use case.
#[derive(Debug)]
pub enum Operation {
    CreateTodo {
        ctx: OperationContext,
        title: Option<String>,
    },
    GetTodo {
        ctx: OperationContext,
        id: TodoId,
    },
    ListTodos {
        ctx: OperationContext,
        page: u32,
        page_size: u32,
    },
    UpdateTodo {
        ctx: OperationContext,
        id: TodoId,
        title: Option<String>,
    },
    CompleteTodo {
        ctx: OperationContext,
        id: TodoId,
    },
    ReopenTodo {
        ctx: OperationContext,
        id: TodoId,
    },
    DeleteTodo {
        ctx: OperationContext,
        id: TodoId,
    },
}

impl Operation {
    #[must_use]
    pub fn ctx(&self) -> &OperationContext {
        match self {
            Self::CreateTodo { ctx, .. }
            | Self::GetTodo { ctx, .. }
            | Self::ListTodos { ctx, .. }
            | Self::UpdateTodo { ctx, .. }
            | Self::CompleteTodo { ctx, .. }
            | Self::ReopenTodo { ctx, .. }
            | Self::DeleteTodo { ctx, .. } => ctx,
        }
    }

    #[must_use]
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::CreateTodo { .. } => OperationKind::CreateTodo,
            Self::GetTodo { .. } => OperationKind::GetTodo,
            Self::ListTodos { .. } => OperationKind::ListTodos,
            Self::UpdateTodo { .. } => OperationKind::UpdateTodo,
            Self::CompleteTodo { .. } => OperationKind::CompleteTodo,
            Self::ReopenTodo { .. } => OperationKind::ReopenTodo,
            Self::DeleteTodo { .. } => OperationKind::DeleteTodo,
        }
    }
}

// ---------------------------------------------------------------------------
// OperationResponse
// ---------------------------------------------------------------------------

/// Successful result of a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationResponse {
    Created { id: TodoId },
    Todo(Box<TodoView>),
    Page(TodoPageView),
    Empty,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Handler registration problems. Fatal: these are expected to be caught by
/// the startup self-check, never by a client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("no handler registered for {kind}")]
    MissingHandler { kind: OperationKind },
    #[error("a handler is already registered for {kind}")]
    DuplicateHandler { kind: OperationKind },
    #[error("handler for {actual} cannot be registered for {expected}")]
    KindMismatch {
        expected: OperationKind,
        actual: OperationKind,
    },
    #[error("no handlers registered for: {}", join_kinds(.missing))]
    Incomplete { missing: Vec<OperationKind> },
}

fn join_kinds(kinds: &[OperationKind]) -> String {
    kinds
        .iter()
        .map(|kind| kind.name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors returned from dispatch.
#[derive(Debug, thiserror::Error)]
pub enum OperationError {
    #[error("one or more validation errors occurred")]
    Validation(ValidationErrorMap),
    #[error("Entity \"{entity}\" ({key}) was not found.")]
    NotFound { entity: &'static str, key: String },
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error("operation timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
    #[error("operation was cancelled")]
    Cancelled,
    #[error("handler for {expected} received a {actual} operation")]
    WrongHandler {
        expected: OperationKind,
        actual: OperationKind,
    },
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl OperationError {
    #[must_use]
    pub fn not_found(entity: &'static str, key: impl fmt::Display) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    /// A validation error with a single field failure.
    #[must_use]
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(ValidationErrorMap::single(field, message))
    }
}

/// Entity invariant violations surface as field-level validation errors.
impl From<TodoError> for OperationError {
    fn from(err: TodoError) -> Self {
        Self::invalid(err.field(), err.to_string())
    }
}
