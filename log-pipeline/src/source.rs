use crate::error::{LogPipelineError, Result};
use crate::rules::LogProcessingRule;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogSourceType {
    /// Tail a file (or every file matching a glob)
    File,
    /// Listen on a TCP port
    Tcp,
    /// Listen on a UDP port
    Udp,
}

impl fmt::Display for LogSourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogSourceType::File => write!(f, "file"),
            LogSourceType::Tcp => write!(f, "tcp"),
            LogSourceType::Udp => write!(f, "udp"),
        }
    }
}

/// A log ingestion rule: where logs come from, how they are tagged and
/// how their lines are processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogSource {
    #[serde(rename = "type")]
    pub source_type: LogSourceType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub log_processing_rules: Vec<LogProcessingRule>,
}

impl LogSource {
    pub fn file(path: impl Into<String>, source: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            source_type: LogSourceType::File,
            path: Some(path.into()),
            port: None,
            source: Some(source.into()),
            service: Some(service.into()),
            tags: Vec::new(),
            log_processing_rules: Vec::new(),
        }
    }

    pub fn with_rule(mut self, rule: LogProcessingRule) -> Self {
        self.log_processing_rules.push(rule);
        self
    }

    /// The first `multi_line` rule, which is the one applied
    pub fn multi_line_rule(&self) -> Option<&LogProcessingRule> {
        self.log_processing_rules
            .iter()
            .find(|rule| matches!(rule, LogProcessingRule::MultiLine { .. }))
    }

    pub fn validate(&self) -> Result<()> {
        match self.source_type {
            LogSourceType::File => {
                if self.path.as_deref().map_or(true, |path| path.trim().is_empty()) {
                    return Err(LogPipelineError::InvalidSource(
                        "a `file` log source requires a non-empty `path`".to_string(),
                    ));
                }
            }
            LogSourceType::Tcp | LogSourceType::Udp => {
                if self.port.map_or(true, |port| port == 0) {
                    return Err(LogPipelineError::InvalidSource(format!(
                        "a `{}` log source requires a non-zero `port`",
                        self.source_type
                    )));
                }
            }
        }

        for (field, value) in [("source", &self.source), ("service", &self.service)] {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                return Err(LogPipelineError::InvalidSource(format!(
                    "`{}` must not be empty when provided",
                    field
                )));
            }
        }

        for rule in &self.log_processing_rules {
            if rule.name().trim().is_empty() {
                return Err(LogPipelineError::InvalidSource(format!(
                    "`{}` processing rule requires a `name`",
                    rule.kind()
                )));
            }
        }

        Ok(())
    }
}
