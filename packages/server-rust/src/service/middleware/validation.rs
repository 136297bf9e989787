//! Validation behavior.
//!
//! Runs every validator registered for the operation's kind, groups all
//! failures by field, and short-circuits with
//! `OperationError::Validation` when anything failed. The inner service is
//! not called in that case.

use std::sync::Arc;
use std::task::{Context, Poll};

use todo_core::ValidationErrorMap;
use tower::{Layer, Service};

use crate::service::handler::Validator;
use crate::service::operation::{Operation, OperationError, OperationFuture, OperationResponse};

// ---------------------------------------------------------------------------
// ValidationLayer
// ---------------------------------------------------------------------------

/// Tower layer holding the validators for one operation kind.
#[derive(Clone)]
pub struct ValidationLayer {
    validators: Arc<[Arc<dyn Validator>]>,
}

impl ValidationLayer {
    #[must_use]
    pub fn new(validators: Arc<[Arc<dyn Validator>]>) -> Self {
        Self { validators }
    }
}

impl<S> Layer<S> for ValidationLayer {
    type Service = ValidationService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ValidationService {
            inner,
            validators: Arc::clone(&self.validators),
        }
    }
}

// ---------------------------------------------------------------------------
// ValidationService
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct ValidationService<S> {
    inner: S,
    validators: Arc<[Arc<dyn Validator>]>,
}

impl<S> Service<Operation> for ValidationService<S>
where
    S: Service<Operation, Response = OperationResponse, Error = OperationError> + Send,
    S::Future: Send + 'static,
{
    type Response = OperationResponse;
    type Error = OperationError;
    type Future = OperationFuture;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, op: Operation) -> Self::Future {
        let errors: ValidationErrorMap = self
            .validators
            .iter()
            .flat_map(|validator| validator.validate(&op))
            .collect();

        if errors.is_empty() {
            return Box::pin(self.inner.call(op));
        }

        let ctx = op.ctx();
        tracing::debug!(
            operation = op.kind().name(),
            call_id = ctx.call_id,
            correlation_id = %ctx.correlation_id(),
            fields = errors.field_count(),
            "validation failed, handler skipped"
        );
        Box::pin(async move { Err(OperationError::Validation(errors)) })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
