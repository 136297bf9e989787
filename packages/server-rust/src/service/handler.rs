//! Handler and validator seams, plus the adapter that turns a handler into the
//! innermost `tower::Service` of a behavior chain.

use std::sync::Arc;
use std::task::{Context, Poll};

use async_trait::async_trait;
use todo_core::ValidationFailure;
use tower::Service;

use super::operation::{
    Operation, OperationError, OperationFuture, OperationKind, OperationResponse,
};

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Executes the business effect of exactly one [`Operation`] variant.
///
/// Handlers performing I/O should check `op.ctx().cancellation` before
/// committing side effects.
#[async_trait]
pub trait OperationHandler: Send + Sync + 'static {
    /// The variant this handler serves. Registration under any other kind is
    /// rejected.
    fn kind(&self) -> OperationKind;

    async fn handle(&self, op: Operation) -> Result<OperationResponse, OperationError>;
}

/// Checks an operation's inputs before its handler runs.
///
/// Returns every failure it finds; an empty vector means the input is valid.
pub trait Validator: Send + Sync + 'static {
    fn validate(&self, op: &Operation) -> Vec<ValidationFailure>;
}

// ---------------------------------------------------------------------------
// HandlerService
// ---------------------------------------------------------------------------

/// Adapts a shared [`OperationHandler`] into a `tower::Service<Operation>`.
#[derive(Clone)]
pub struct HandlerService {
    handler: Arc<dyn OperationHandler>,
}

impl HandlerService {
    #[must_use]
    pub fn new(handler: Arc<dyn OperationHandler>) -> Self {
        Self { handler }
    }
}

impl Service<Operation> for HandlerService {
    type Response = OperationResponse;
    type Error = OperationError;
    type Future = OperationFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, op: Operation) -> Self::Future {
        let handler = Arc::clone(&self.handler);
        Box::pin(async move { handler.handle(op).await })
    }
}
