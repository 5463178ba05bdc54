use error_common::{codes, IntegrationError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LogPipelineError {
    #[error("Invalid pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Invalid log source: {0}")]
    InvalidSource(String),

    #[error("Log read failed: {0}")]
    Io(#[from] std::io::Error),
}

impl LogPipelineError {
    pub fn code(&self) -> &'static str {
        match self {
            LogPipelineError::InvalidPattern { .. } => codes::logs::INVALID_PATTERN,
            LogPipelineError::InvalidSource(_) => codes::logs::INVALID_SOURCE,
            LogPipelineError::Io(_) => codes::logs::IO_FAILED,
        }
    }
}

impl From<LogPipelineError> for IntegrationError {
    fn from(error: LogPipelineError) -> Self {
        IntegrationError::logs(error.code(), error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LogPipelineError>;
