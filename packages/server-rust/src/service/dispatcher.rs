//! Operation dispatch: resolves the handler for an [`Operation`] and runs it
//! through the behavior chain under the call's deadline.

use std::sync::Arc;
use std::time::Duration;

use tower::ServiceExt;

use super::middleware::build_behavior_chain;
use super::operation::{ConfigurationError, Operation, OperationError, OperationResponse};
use super::registry::HandlerRegistry;

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Routes each [`Operation`] to the single handler registered for its kind.
///
/// The registry is built once and shared read-only; cloning a `Dispatcher`
/// only clones the `Arc`.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<HandlerRegistry>,
}

impl Dispatcher {
    #[must_use]
    pub fn new(registry: HandlerRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    #[must_use]
    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Dispatches `op` through Validation -> Logging -> Handler.
    ///
    /// The cancellation token and deadline travel in `op.ctx()`. When the
    /// token fires the call is dropped and `Cancelled` is returned. When the
    /// deadline elapses the token is cancelled and `Timeout` is returned.
    ///
    /// # Errors
    ///
    /// - [`ConfigurationError::MissingHandler`] if no handler is bound to the
    ///   operation's kind. No behavior runs in that case.
    /// - Whatever the behavior chain or handler returns.
    pub async fn dispatch(&self, op: Operation) -> Result<OperationResponse, OperationError> {
        let kind = op.kind();
        let Some(registration) = self.registry.get(kind) else {
            let ctx = op.ctx();
            tracing::error!(
                operation = kind.name(),
                call_id = ctx.call_id,
                correlation_id = %ctx.correlation_id(),
                "no handler registered for operation"
            );
            return Err(ConfigurationError::MissingHandler { kind }.into());
        };

        let token = op.ctx().cancellation.clone();
        let timeout_ms = op.ctx().call_timeout_ms;
        let chain = build_behavior_chain(registration);

        tokio::select! {
            biased;
            () = token.cancelled() => Err(OperationError::Cancelled),
            result = chain.oneshot(op) => result,
            () = tokio::time::sleep(Duration::from_millis(timeout_ms)) => {
                token.cancel();
                Err(OperationError::Timeout { timeout_ms })
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
