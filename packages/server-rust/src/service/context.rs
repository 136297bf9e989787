//! Builds the per-call [`OperationContext`] handed to the dispatcher.

use std::sync::atomic::{AtomicU64, Ordering};

use todo_core::RequestContext;

use super::config::ServerConfig;
use super::operation::OperationContext;

/// Hands out call ids and stamps the default deadline on each context.
#[derive(Debug)]
pub struct ContextFactory {
    call_id_counter: AtomicU64,
    default_timeout_ms: u64,
}

impl ContextFactory {
    #[must_use]
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            call_id_counter: AtomicU64::new(1),
            default_timeout_ms: config.default_operation_timeout_ms,
        }
    }

    fn next_call_id(&self) -> u64 {
        self.call_id_counter.fetch_add(1, Ordering::Relaxed)
    }

    /// Context for one inbound call, with a fresh cancellation token.
    #[must_use]
    pub fn make_ctx(&self, request: RequestContext) -> OperationContext {
        OperationContext::new(self.next_call_id(), request, self.default_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_ids_are_unique_and_deadline_comes_from_config() {
        let config = ServerConfig {
            default_operation_timeout_ms: 750,
            ..ServerConfig::default()
        };
        let factory = ContextFactory::new(&config);

        let first = factory.make_ctx(RequestContext::detached());
        let second = factory.make_ctx(RequestContext::detached());

        assert_ne!(first.call_id, second.call_id);
        assert_eq!(first.call_timeout_ms, 750);
        assert!(!first.cancellation.is_cancelled());
    }

    #[test]
    fn each_context_has_its_own_token() {
        let factory = ContextFactory::new(&ServerConfig::default());
        let first = factory.make_ctx(RequestContext::detached());
        let second = factory.make_ctx(RequestContext::detached());

        first.cancellation.cancel();
        assert!(!second.cancellation.is_cancelled());
    }
}
