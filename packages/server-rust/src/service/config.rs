use std::fmt;

/// Deployment environment. Controls how much error detail reaches clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Environment {
    /// Unclassified errors expose their original message.
    Development,
    /// Unclassified errors carry a generic message only.
    #[default]
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_development(self) -> bool {
        matches!(self, Self::Development)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Development => "development",
            Self::Production => "production",
        })
    }
}

/// Server-level configuration for the dispatch pipeline.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub environment: Environment,
    /// Deadline applied to every operation, in milliseconds.
    pub default_operation_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Production,
            default_operation_timeout_ms: 30_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_production() {
        let config = ServerConfig::default();
        assert_eq!(config.environment, Environment::Production);
        assert!(!config.environment.is_development());
        assert_eq!(config.default_operation_timeout_ms, 30_000);
    }

    #[test]
    fn environment_display_matches_cli_value() {
        assert_eq!(Environment::Development.to_string(), "development");
        assert_eq!(Environment::Production.to_string(), "production");
    }
}
