//! Error translation boundary.
//!
//! Every error escaping a dispatch is classified into an [`ErrorKind`] and
//! rendered as a [`ProblemDetails`] body. This is the only place an
//! [`OperationError`] turns into a client-facing response.

use std::future::Future;

use todo_core::problem::{problem_titles, problem_types};
use todo_core::{ProblemDetails, RequestContext, ValidationErrorMap};

use super::config::Environment;
use super::operation::{OperationError, OperationResponse};

/// Detail sent for unclassified errors outside development.
pub const GENERIC_ERROR_DETAIL: &str = "An unexpected error occurred. Please try again later.";

// ---------------------------------------------------------------------------
// ErrorKind
// ---------------------------------------------------------------------------

/// Closed classification of an [`OperationError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind<'a> {
    Validation(&'a ValidationErrorMap),
    NotFound { detail: String },
    Unclassified { message: String },
}

impl<'a> ErrorKind<'a> {
    #[must_use]
    pub fn classify(err: &'a OperationError) -> Self {
        match err {
            OperationError::Validation(errors) => Self::Validation(errors),
            OperationError::NotFound { .. } => Self::NotFound {
                detail: err.to_string(),
            },
            OperationError::Configuration(_)
            | OperationError::Timeout { .. }
            | OperationError::Cancelled
            | OperationError::WrongHandler { .. }
            | OperationError::Internal(_) => Self::Unclassified {
                message: err.to_string(),
            },
        }
    }

    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::NotFound { .. } => 404,
            Self::Unclassified { .. } => 500,
        }
    }
}

// ---------------------------------------------------------------------------
// ResponseState
// ---------------------------------------------------------------------------

/// Whether the transport has already begun writing the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseState {
    NotStarted,
    Started,
}

// ---------------------------------------------------------------------------
// ErrorTranslator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct ErrorTranslator {
    environment: Environment,
}

impl ErrorTranslator {
    #[must_use]
    pub fn new(environment: Environment) -> Self {
        Self { environment }
    }

    #[must_use]
    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Awaits one dispatch and translates its error, if any.
    ///
    /// Always translates: `run` finishes before the caller renders anything,
    /// so the response cannot have started yet. Transports that stream a
    /// response before the outcome is known use
    /// [`translate_unless_started`](Self::translate_unless_started) instead.
    ///
    /// # Errors
    ///
    /// Returns the Problem Details body for any error `call` produced.
    pub async fn run<F>(
        &self,
        ctx: &RequestContext,
        call: F,
    ) -> Result<OperationResponse, ProblemDetails>
    where
        F: Future<Output = Result<OperationResponse, OperationError>>,
    {
        call.await.map_err(|err| self.translate(&err, ctx))
    }

    /// Like [`translate`](Self::translate), but does nothing once the
    /// response has been started.
    #[must_use]
    pub fn translate_unless_started(
        &self,
        err: &OperationError,
        ctx: &RequestContext,
        state: ResponseState,
    ) -> Option<ProblemDetails> {
        match state {
            ResponseState::NotStarted => Some(self.translate(err, ctx)),
            ResponseState::Started => {
                tracing::debug!(
                    correlation_id = %ctx.correlation_id,
                    error = %err,
                    "response already started, error not translated"
                );
                None
            }
        }
    }

    /// Classifies `err` and builds its Problem Details body with the trace
    /// and correlation ids attached.
    #[must_use]
    pub fn translate(&self, err: &OperationError, ctx: &RequestContext) -> ProblemDetails {
        let kind = ErrorKind::classify(err);
        let status = kind.status();

        let problem = match kind {
            ErrorKind::Validation(errors) => {
                tracing::warn!(
                    correlation_id = %ctx.correlation_id,
                    status,
                    fields = errors.field_count(),
                    "request failed validation"
                );
                ProblemDetails::new(problem_types::VALIDATION, problem_titles::VALIDATION, status)
                    .with_errors(errors)
            }
            ErrorKind::NotFound { detail } => {
                tracing::warn!(
                    correlation_id = %ctx.correlation_id,
                    status,
                    detail = %detail,
                    "requested entity not found"
                );
                ProblemDetails::new(problem_types::NOT_FOUND, problem_titles::NOT_FOUND, status)
                    .with_detail(detail)
            }
            ErrorKind::Unclassified { message } => {
                tracing::error!(
                    correlation_id = %ctx.correlation_id,
                    status,
                    error = ?err,
                    "unhandled error while processing request"
                );
                let detail = if self.environment.is_development() {
                    message
                } else {
                    GENERIC_ERROR_DETAIL.to_string()
                };
                ProblemDetails::new(problem_types::INTERNAL, problem_titles::INTERNAL, status)
                    .with_detail(detail)
            }
        };

        problem
            .with_trace_id(&ctx.trace_id)
            .with_correlation_id(ctx.correlation_id.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
