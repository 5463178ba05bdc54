use thiserror::Error;

/// Top-level error for tools built on the Ambari check crates
#[derive(Error, Debug)]
pub enum IntegrationError {
    /// Configuration loading or validation errors
    #[error("Configuration error [{code}]: {message}")]
    Config { code: &'static str, message: String },

    /// Log source or log processing errors
    #[error("Log pipeline error [{code}]: {message}")]
    Logs { code: &'static str, message: String },

    /// File system errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Logging initialization errors
    #[error("Logging error: {0}")]
    Logging(String),

    /// Wrapped external errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl IntegrationError {
    pub fn config(code: &'static str, message: impl Into<String>) -> Self {
        IntegrationError::Config {
            code,
            message: message.into(),
        }
    }

    pub fn logs(code: &'static str, message: impl Into<String>) -> Self {
        IntegrationError::Logs {
            code,
            message: message.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            IntegrationError::Config { code, .. } | IntegrationError::Logs { code, .. } => code,
            IntegrationError::Io(_) => crate::codes::logs::IO_FAILED,
            IntegrationError::Logging(_) | IntegrationError::Other(_) => crate::codes::system::INTERNAL,
        }
    }
}

/// Result type alias for integration operations
pub type Result<T> = std::result::Result<T, IntegrationError>;

/// Logs an error together with the operation it interrupted
pub fn log_error(context: &str, error: &IntegrationError) {
    tracing::error!(
        context = context,
        error_code = error.code(),
        error = %error,
        "Ambari check error occurred"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes;

    #[test]
    fn test_codes_follow_the_variant() {
        let missing = IntegrationError::config(codes::config::MISSING_REQUIRED_OPTION, "missing url");
        assert_eq!(missing.code(), "CONFIG_1001");

        let io = IntegrationError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "conf.yaml"));
        assert_eq!(io.code(), codes::logs::IO_FAILED);

        let other = IntegrationError::from(anyhow::anyhow!("unexpected"));
        assert_eq!(other.code(), codes::system::INTERNAL);
        log_error("test", &other);
    }
}
