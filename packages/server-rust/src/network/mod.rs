//! HTTP transport: configuration, middleware, handlers, lifecycle and
//! shutdown control.

pub mod config;
pub mod correlation;
pub mod handlers;
pub mod middleware;
pub mod module;
pub mod shutdown;

pub use config::NetworkConfig;
pub use correlation::CorrelationIdLayer;
pub use handlers::AppState;
pub use module::{build_app, NetworkModule};
pub use shutdown::{HealthState, InFlightGuard, ShutdownController};
