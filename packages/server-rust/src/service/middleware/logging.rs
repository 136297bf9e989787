//! Logging and timing behavior.
//!
//! Emits a start event before the inner service is invoked, measures the
//! wall-clock time around it, and emits either a handled or a failed event
//! with the elapsed time. Errors are returned unchanged. If the call is
//! dropped before it completes (cancellation, deadline), the elapsed time is
//! still logged from the timer's `Drop`.
//!
//! Every event carries `operation`, `call_id` and `correlation_id`.

use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use todo_core::CorrelationId;
use tower::{Layer, Service};
use tracing::{info_span, Instrument};

use crate::service::operation::{
    Operation, OperationError, OperationFuture, OperationKind, OperationResponse,
};

// ---------------------------------------------------------------------------
// LoggingLayer
// ---------------------------------------------------------------------------

/// Tower layer that logs and times each operation.
#[derive(Debug, Clone, Default)]
pub struct LoggingLayer;

impl<S> Layer<S> for LoggingLayer {
    type Service = LoggingService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        LoggingService { inner }
    }
}

// ---------------------------------------------------------------------------
// LoggingService
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct LoggingService<S> {
    inner: S,
}

impl<S> Service<Operation> for LoggingService<S>
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
        let kind = op.kind();
        let call_id = op.ctx().call_id;
        let correlation_id = op.ctx().correlation_id().clone();

        let span = info_span!(
            "operation",
            operation = kind.name(),
            call_id = call_id,
            correlation_id = %correlation_id,
            elapsed_ms = tracing::field::Empty,
            outcome = tracing::field::Empty,
        );

        let (timer, fut) = span.in_scope(|| {
            tracing::info!(
                operation = kind.name(),
                call_id = call_id,
                correlation_id = %correlation_id,
                "handling operation"
            );
            (
                CallTimer::start(kind, call_id, correlation_id.clone()),
                self.inner.call(op),
            )
        });

        Box::pin(
            async move {
                let result = fut.await;
                let elapsed = timer.finish();
                let elapsed_ms = millis(elapsed);

                let outcome = if result.is_ok() { "ok" } else { "error" };
                let span = tracing::Span::current();
                span.record("elapsed_ms", elapsed_ms);
                span.record("outcome", outcome);

                match &result {
                    Ok(_) => tracing::info!(
                        operation = kind.name(),
                        call_id = call_id,
                        correlation_id = %correlation_id,
                        elapsed_ms = elapsed_ms,
                        "operation handled"
                    ),
                    Err(err) => tracing::warn!(
                        operation = kind.name(),
                        call_id = call_id,
                        correlation_id = %correlation_id,
                        elapsed_ms = elapsed_ms,
                        error = %err,
                        "operation failed"
                    ),
                }

                metrics::histogram!(
                    "todo_operation_duration_seconds",
                    "operation" => kind.name(),
                    "outcome" => outcome
                )
                .record(elapsed.as_secs_f64());

                result
            }
            .instrument(span),
        )
    }
}

// ---------------------------------------------------------------------------
// CallTimer
// ---------------------------------------------------------------------------

/// Measures one call. Logs on drop unless [`CallTimer::finish`] was reached.
struct CallTimer {
    started: Instant,
    operation: OperationKind,
    call_id: u64,
    correlation_id: CorrelationId,
    finished: bool,
}

impl CallTimer {
    fn start(operation: OperationKind, call_id: u64, correlation_id: CorrelationId) -> Self {
        Self {
            started: Instant::now(),
            operation,
            call_id,
            correlation_id,
            finished: false,
        }
    }

    fn finish(mut self) -> Duration {
        self.finished = true;
        self.started.elapsed()
    }
}

impl Drop for CallTimer {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        tracing::warn!(
            operation = self.operation.name(),
            call_id = self.call_id,
            correlation_id = %self.correlation_id,
            elapsed_ms = millis(self.started.elapsed()),
            "operation abandoned before completion"
        );
    }
}

fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
