//! HTTP listener configuration.

use std::time::Duration;

/// Top-level network configuration for the server.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Bind address for the server.
    pub host: String,
    /// Port to listen on. 0 means OS-assigned.
    pub port: u16,
    /// Allowed CORS origins. `"*"` allows any origin.
    pub cors_origins: Vec<String>,
    /// Upper bound on any call's deadline. A call gets the shorter of this
    /// and the operation timeout, and overrunning it is reported as a
    /// translated timeout error.
    pub request_timeout: Duration,
    /// Largest accepted request body. Larger bodies fail body extraction.
    pub max_body_bytes: usize,
    /// How long shutdown waits for in-flight calls before cancelling them.
    pub drain_timeout: Duration,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
            request_timeout: Duration::from_secs(30),
            max_body_bytes: 64 * 1024,
            drain_timeout: Duration::from_secs(30),
        }
    }
}
