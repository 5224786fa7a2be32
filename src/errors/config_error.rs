use crate::errors::ToolError;
use thiserror::Error;

/// Failures while reading process configuration (CLI flags, env).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{flag} argument provided but no value followed it")]
    MissingFlagValue { flag: &'static str },
    #[error("PORT must be a valid port number, got {0:?}")]
    InvalidPort(String),
}

impl From<ConfigError> for ToolError {
    fn from(err: ConfigError) -> Self {
        let hint = match &err {
            ConfigError::MissingFlagValue { flag } => format!("Pass a value: {} <value>", flag),
            ConfigError::InvalidPort(_) => "Set PORT to an integer between 1 and 65535".to_string(),
        };
        ToolError::invalid_params(err.to_string()).with_hint(hint)
    }
}
