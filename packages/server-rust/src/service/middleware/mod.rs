//! Tower behaviors wrapped around every handler call.
//!
//! - [`validation`]: Runs registered validators and short-circuits on failure
//! - [`logging`]: Start/finish events with elapsed time
//! - [`chain`]: Composes the behaviors around a registered handler

pub mod chain;
pub mod logging;
pub mod validation;

pub use chain::build_behavior_chain;
pub use logging::LoggingLayer;
pub use validation::ValidationLayer;
