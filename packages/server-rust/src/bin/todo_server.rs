//! Todo server binary.
//!
//! Wires the in-memory store, the operation registry and the HTTP transport,
//! then serves until Ctrl-C.

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use todo_server::service::domain::build_todo_registry;
use todo_server::service::Environment;
use todo_server::{Dispatcher, InMemoryTodoStore, NetworkConfig, NetworkModule, ServerConfig, TodoStore};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "todo-server")]
#[command(about = "Todo HTTP API", long_about = None)]
struct Args {
    #[arg(long, env = "TODO_HOST", default_value = "0.0.0.0")]
    host: String,

    #[arg(long, env = "TODO_PORT", default_value_t = 8080)]
    port: u16,

    #[arg(long, env = "TODO_ENVIRONMENT", value_enum, default_value_t = Environment::Production)]
    environment: Environment,

    /// Cap on any call's deadline, applied by the HTTP handlers.
    #[arg(long, env = "TODO_REQUEST_TIMEOUT_MS", default_value_t = 30_000)]
    request_timeout_ms: u64,

    /// Deadline for a single dispatched operation.
    #[arg(long, env = "TODO_OPERATION_TIMEOUT_MS", default_value_t = 30_000)]
    operation_timeout_ms: u64,

    #[arg(long, env = "TODO_DRAIN_TIMEOUT_MS", default_value_t = 30_000)]
    drain_timeout_ms: u64,

    /// Allowed CORS origin; repeat for several. Defaults to any origin.
    #[arg(long = "cors-origin", env = "TODO_CORS_ORIGINS", value_delimiter = ',')]
    cors_origins: Vec<String>,

    #[arg(long, env = "TODO_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

impl Args {
    fn network_config(&self) -> NetworkConfig {
        let mut config = NetworkConfig {
            host: self.host.clone(),
            port: self.port,
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            drain_timeout: Duration::from_millis(self.drain_timeout_ms),
            ..NetworkConfig::default()
        };
        if !self.cors_origins.is_empty() {
            config.cors_origins.clone_from(&self.cors_origins);
        }
        config
    }

    fn server_config(&self) -> ServerConfig {
        ServerConfig {
            environment: self.environment,
            default_operation_timeout_ms: self.operation_timeout_ms,
        }
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    if let Err(e) = result {
        warn!(error = %e, "tracing init failed");
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.log_format);

    let server_config = args.server_config();
    let store: Arc<dyn TodoStore> = Arc::new(InMemoryTodoStore::new());
    // Fails startup when any operation kind lacks a handler.
    let registry = build_todo_registry(store)?;
    info!(
        operations = registry.len(),
        environment = %server_config.environment,
        "operation registry verified"
    );

    let mut module = NetworkModule::new(
        args.network_config(),
        &server_config,
        Dispatcher::new(registry),
    );
    let port = module.start().await?;
    info!(port, "todo server listening");

    module.serve(shutdown_signal()).await?;
    info!("todo server stopped");
    Ok(())
}
