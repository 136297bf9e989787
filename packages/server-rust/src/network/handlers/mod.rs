//! HTTP handler definitions for the todo server.
//!
//! This module defines `AppState` (the shared state carried through axum
//! extractors), the [`CallContext`] extractor and the Problem Details
//! response type, and re-exports all handler functions for building the
//! router.

pub mod health;
pub mod todos;

pub use health::{health_handler, liveness_handler, readiness_handler};
pub use todos::{
    complete_todo, create_todo, delete_todo, get_todo, list_todos, reopen_todo, update_todo,
};

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::FromRequestParts;
use axum::http::header::CONTENT_TYPE;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use todo_core::{
    CorrelationId, ProblemDetails, RequestContext, APPLICATION_PROBLEM_JSON, CORRELATION_ID_HEADER,
};

use super::middleware::REQUEST_ID_HEADER;
use super::{NetworkConfig, ShutdownController};
use crate::service::{ContextFactory, Dispatcher, ErrorTranslator};

/// Shared application state passed to all axum handlers via `State` extraction.
///
/// Holds `Arc` references (or cheap `Clone` handles) so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Routes operations to their handlers through the behavior chain.
    pub dispatcher: Dispatcher,
    /// Turns dispatch errors into Problem Details.
    pub translator: ErrorTranslator,
    /// Call ids and default deadlines.
    pub contexts: Arc<ContextFactory>,
    /// Health state, in-flight tracking and shutdown cancellation.
    pub shutdown: Arc<ShutdownController>,
    pub config: Arc<NetworkConfig>,
    /// Server process start time, used for uptime calculation.
    pub start_time: Instant,
}

// ---------------------------------------------------------------------------
// CallContext extractor
// ---------------------------------------------------------------------------

/// Per-request identifiers: the correlation id resolved by the correlation
/// middleware and the trace id assigned as `X-Request-Id`.
#[derive(Debug, Clone)]
pub struct CallContext(pub RequestContext);

impl<S> FromRequestParts<S> for CallContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let correlation_id = parts
            .extensions
            .get::<CorrelationId>()
            .cloned()
            .unwrap_or_else(|| {
                CorrelationId::resolve(
                    parts
                        .headers
                        .get(CORRELATION_ID_HEADER)
                        .and_then(|value| value.to_str().ok()),
                )
            });
        let trace_id = parts
            .headers
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map_or_else(|| uuid::Uuid::new_v4().to_string(), str::to_string);

        Ok(Self(RequestContext::new(correlation_id, trace_id)))
    }
}

// ---------------------------------------------------------------------------
// ProblemResponse
// ---------------------------------------------------------------------------

/// A Problem Details body rendered as `application/problem+json` with the
/// body's `status` as the HTTP status.
#[derive(Debug)]
pub struct ProblemResponse(pub ProblemDetails);

impl IntoResponse for ProblemResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, [(CONTENT_TYPE, APPLICATION_PROBLEM_JSON)], Json(self.0)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;

    use super::*;

    #[tokio::test]
    async fn call_context_prefers_resolved_extension() {
        let mut req = Request::builder()
            .header(REQUEST_ID_HEADER, "req-42")
            .header(CORRELATION_ID_HEADER, "from-header")
            .body(Body::empty())
            .unwrap();
        req.extensions_mut()
            .insert(CorrelationId::resolve(Some("from-middleware")));
        let (mut parts, _body) = req.into_parts();

        let CallContext(ctx) = CallContext::from_request_parts(&mut parts, &())
            .await
            .unwrap();

        assert_eq!(ctx.correlation_id.as_str(), "from-middleware");
        assert_eq!(ctx.trace_id, "req-42");
    }

    #[tokio::test]
    async fn call_context_without_middleware_falls_back_to_headers() {
        let req = Request::builder()
            .header(CORRELATION_ID_HEADER, "raw")
            .body(Body::empty())
            .unwrap();
        let (mut parts, _body) = req.into_parts();

        let CallContext(ctx) = CallContext::from_request_parts(&mut parts, &())
            .await
            .unwrap();

        assert_eq!(ctx.correlation_id.as_str(), "raw");
        assert!(uuid::Uuid::parse_str(&ctx.trace_id).is_ok());
    }

    #[test]
    fn problem_response_uses_body_status_and_problem_content_type() {
        let problem = ProblemDetails::new(
            todo_core::problem::problem_types::NOT_FOUND,
            todo_core::problem::problem_titles::NOT_FOUND,
            404,
        );
        let response = ProblemResponse(problem).into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            APPLICATION_PROBLEM_JSON
        );
    }
}
