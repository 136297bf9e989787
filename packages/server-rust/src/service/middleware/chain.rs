//! Behavior chain composition: wraps a registered handler with the
//! validation and logging behaviors.

use tower::ServiceBuilder;

use super::logging::LoggingLayer;
use super::validation::ValidationLayer;
use crate::service::handler::HandlerService;
use crate::service::operation::{Operation, OperationError, OperationFuture, OperationResponse};
use crate::service::registry::Registration;

/// Build the behavior chain for one registration.
///
/// Layer order (outermost to innermost):
/// 1. `ValidationLayer` -- rejects invalid input before anything is logged
///    as handled, and before the handler can observe it
/// 2. `LoggingLayer` -- times and logs the handler call
/// 3. `HandlerService` -- the registered handler
///
/// Every call gets a fresh chain, so behaviors keep no state between calls.
#[must_use]
pub fn build_behavior_chain(
    registration: &Registration,
) -> impl tower::Service<
    Operation,
    Response = OperationResponse,
    Error = OperationError,
    Future = OperationFuture,
> + Send {
    ServiceBuilder::new()
        .layer(ValidationLayer::new(registration.validators.clone()))
        .layer(LoggingLayer)
        .service(HandlerService::new(registration.handler.clone()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
