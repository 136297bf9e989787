//! Shared doubles for unit tests: a tracing capture layer, a delaying
//! service and a counting handler.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tower::Service;
use tracing::field::{Field, Visit};
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context as LayerContext, SubscriberExt};
use tracing_subscriber::Layer;

use crate::service::handler::OperationHandler;
use crate::service::operation::{
    Operation, OperationError, OperationFuture, OperationKind, OperationResponse,
};

// ---------------------------------------------------------------------------
// Captured tracing events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub(crate) struct CapturedEvent {
    pub level: Level,
    pub message: String,
    fields: BTreeMap<String, String>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<String> {
        self.fields.get(name).cloned()
    }

    pub fn elapsed_ms(&self) -> Option<u64> {
        self.fields.get("elapsed_ms")?.parse().ok()
    }
}

/// `tracing_subscriber::Layer` that records every event with its fields.
#[derive(Clone, Default)]
pub(crate) struct CapturedEvents {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl CapturedEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the capture as the thread's default subscriber.
    pub fn set_default(&self) -> DefaultGuard {
        let subscriber = tracing_subscriber::registry().with(self.clone());
        tracing::subscriber::set_default(subscriber)
    }

    pub fn for_correlation(&self, correlation_id: &str) -> Vec<CapturedEvent> {
        self.events
            .lock()
            .iter()
            .filter(|event| event.field("correlation_id").as_deref() == Some(correlation_id))
            .cloned()
            .collect()
    }

    pub fn messages_for(&self, correlation_id: &str) -> Vec<String> {
        self.for_correlation(correlation_id)
            .into_iter()
            .map(|event| event.message)
            .collect()
    }

    pub fn find(&self, correlation_id: &str, message: &str) -> Option<CapturedEvent> {
        self.for_correlation(correlation_id)
            .into_iter()
            .find(|event| event.message == message)
    }
}

impl<S: Subscriber> Layer<S> for CapturedEvents {
    fn on_event(&self, event: &Event<'_>, _ctx: LayerContext<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        let message = visitor.fields.remove("message").unwrap_or_default();
        self.events.lock().push(CapturedEvent {
            level: *event.metadata().level(),
            message,
            fields: visitor.fields,
        });
    }
}

#[derive(Default)]
struct FieldVisitor {
    fields: BTreeMap<String, String>,
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.fields.insert(field.name().to_string(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.fields
            .insert(field.name().to_string(), format!("{value:?}"));
    }
}

// ---------------------------------------------------------------------------
// DelayService
// ---------------------------------------------------------------------------

/// Inner service that sleeps, then succeeds or fails with `NotFound`.
#[derive(Clone)]
pub(crate) struct DelayService {
    delay: Duration,
    fail: bool,
}

impl DelayService {
    pub fn ok(delay: Duration) -> Self {
        Self { delay, fail: false }
    }

    pub fn not_found(delay: Duration) -> Self {
        Self { delay, fail: true }
    }
}

impl Service<Operation> for DelayService {
    type Response = OperationResponse;
    type Error = OperationError;
    type Future = OperationFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, op: Operation) -> Self::Future {
        let delay = self.delay;
        let fail = self.fail;
        let call_id = op.ctx().call_id;
        Box::pin(async move {
            tokio::time::sleep(delay).await;
            if fail {
                Err(OperationError::not_found("Todo", call_id))
            } else {
                Ok(OperationResponse::Empty)
            }
        })
    }
}

// ---------------------------------------------------------------------------
// CountingHandler
// ---------------------------------------------------------------------------

/// Handler double that counts invocations and optionally sleeps first.
///
/// Clones made with [`for_kind`](Self::for_kind) share one counter.
#[derive(Clone)]
pub(crate) struct CountingHandler {
    calls: Arc<AtomicUsize>,
    delay: Duration,
    kind: OperationKind,
}

impl CountingHandler {
    pub fn new() -> Self {
        Self::with_delay(Duration::ZERO)
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            calls: Arc::default(),
            delay,
            kind: OperationKind::CreateTodo,
        }
    }

    pub fn for_kind(&self, kind: OperationKind) -> Self {
        Self {
            kind,
            ..self.clone()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OperationHandler for CountingHandler {
    fn kind(&self) -> OperationKind {
        self.kind
    }

    async fn handle(&self, _op: Operation) -> Result<OperationResponse, OperationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(OperationResponse::Empty)
    }
}
