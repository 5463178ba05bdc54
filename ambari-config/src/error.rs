use error_common::{codes, IntegrationError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required option `{0}`")]
    MissingRequiredOption(String),

    #[error("Option `{option}` expects {expected}, got {actual}")]
    TypeMismatch {
        option: String,
        expected: String,
        actual: String,
    },

    #[error("Malformed services whitelist at {}: {reason}", whitelist_path(service, component.as_deref()))]
    MalformedWhitelist {
        service: String,
        component: Option<String>,
        reason: String,
    },

    #[error("Invalid value for option `{option}`: {reason}")]
    InvalidValue { option: String, reason: String },

    #[error("Invalid configuration schema: {0}")]
    InvalidSchema(String),

    #[error("Configuration source not found: {0}")]
    SourceNotFound(String),

    #[error("Configuration parsing failed: {0}")]
    ParseError(String),

    #[error("Configuration watcher error: {0}")]
    WatcherError(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

fn whitelist_path(service: &str, component: Option<&str>) -> String {
    match component {
        Some(component) => format!("{}.{}", service, component),
        None => service.to_string(),
    }
}

impl ConfigError {
    pub fn type_mismatch(option: impl Into<String>, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        ConfigError::TypeMismatch {
            option: option.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn invalid_value(option: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            option: option.into(),
            reason: reason.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::MissingRequiredOption(_) => codes::config::MISSING_REQUIRED_OPTION,
            ConfigError::TypeMismatch { .. } => codes::config::TYPE_MISMATCH,
            ConfigError::MalformedWhitelist { .. } => codes::whitelist::MALFORMED,
            ConfigError::InvalidValue { .. } => codes::config::INVALID_VALUE,
            ConfigError::InvalidSchema(_) => codes::config::INVALID_SCHEMA,
            ConfigError::SourceNotFound(_) => codes::config::SOURCE_NOT_FOUND,
            ConfigError::ParseError(_) => codes::config::PARSE_FAILED,
            ConfigError::WatcherError(_) => codes::system::WATCHER_FAILED,
            ConfigError::InternalError(_) => codes::system::INTERNAL,
        }
    }
}

impl From<ConfigError> for IntegrationError {
    fn from(error: ConfigError) -> Self {
        IntegrationError::config(error.code(), error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
