// Logger configuration
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines on stderr
    Pretty,
    /// Bunyan-style JSON records
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" | "bunyan" => Ok(LogFormat::Json),
            _ => Err(format!("Unknown log format: {}. Valid options: pretty, json", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggerConfig {
    /// Name attached to every JSON record
    pub app_name: String,
    /// Filter directive used when `RUST_LOG` is not set
    pub log_level: String,
    pub format: LogFormat,
    /// Also write daily-rotated files into this directory
    pub log_directory: Option<PathBuf>,
    pub file_prefix: String,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            app_name: "ambari-check".to_string(),
            log_level: "info".to_string(),
            format: LogFormat::Pretty,
            log_directory: None,
            file_prefix: "ambari-check.log".to_string(),
        }
    }
}

impl LoggerConfig {
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.log_directory = Some(directory.into());
        self
    }
}
