//! Operation dispatch framework.
//!
//! This module implements the typed dispatch pipeline:
//!
//! 1. **Context** (`context`): per-call `OperationContext` (call id, deadline, token)
//! 2. **Dispatch** (`dispatcher`): resolves the single handler for an `OperationKind`
//! 3. **Behaviors** (`middleware`): Tower layers (validation, logging/timing)
//! 4. **Domain handlers** (`domain`): todo use cases and their validators
//! 5. **Translation** (`translate`): errors -> Problem Details

pub mod config;
pub mod context;
pub mod dispatcher;
pub mod domain;
pub mod handler;
pub mod middleware;
pub mod operation;
pub mod registry;
pub mod translate;

pub use config::{Environment, ServerConfig};
pub use context::ContextFactory;
pub use dispatcher::Dispatcher;
pub use handler::{OperationHandler, Validator};
pub use operation::{
    ConfigurationError, Operation, OperationContext, OperationError, OperationKind,
    OperationResponse,
};
pub use registry::{HandlerRegistry, RegistryBuilder};
pub use translate::{ErrorKind, ErrorTranslator, ResponseState};
