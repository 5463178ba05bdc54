use serde::{Deserialize, Serialize};
use std::fmt;

/// Where in a configuration document a failure applies.
///
/// Failures never travel further than their scope: an instance-scoped error
/// leaves sibling instances untouched, a subtree-scoped error leaves sibling
/// services untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ErrorScope {
    /// The document as a whole (unreadable file, missing `instances`)
    Document,
    /// The process-wide `init_config` section
    InitConfig,
    /// A single entry of `instances`
    Instance { index: usize },
    /// A single option, optionally inside an instance
    Key {
        instance: Option<usize>,
        option: String,
    },
    /// A service or service/component subtree of a metrics whitelist
    Subtree {
        instance: usize,
        service: String,
        component: Option<String>,
    },
    /// A single entry of `logs`
    LogSource { index: usize },
}

impl ErrorScope {
    pub fn key(instance: Option<usize>, option: impl Into<String>) -> Self {
        ErrorScope::Key {
            instance,
            option: option.into(),
        }
    }

    /// Index of the instance this scope belongs to, if any
    pub fn instance(&self) -> Option<usize> {
        match self {
            ErrorScope::Instance { index } => Some(*index),
            ErrorScope::Key { instance, .. } => *instance,
            ErrorScope::Subtree { instance, .. } => Some(*instance),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorScope::Document => write!(f, "document"),
            ErrorScope::InitConfig => write!(f, "init_config"),
            ErrorScope::Instance { index } => write!(f, "instances[{}]", index),
            ErrorScope::Key {
                instance: Some(index),
                option,
            } => write!(f, "instances[{}].{}", index, option),
            ErrorScope::Key {
                instance: None,
                option,
            } => write!(f, "init_config.{}", option),
            ErrorScope::Subtree {
                instance,
                service,
                component: Some(component),
            } => write!(f, "instances[{}].services.{}.{}", instance, service, component),
            ErrorScope::Subtree {
                instance,
                service,
                component: None,
            } => write!(f, "instances[{}].services.{}", instance, service),
            ErrorScope::LogSource { index } => write!(f, "logs[{}]", index),
        }
    }
}

/// How serious a diagnostic is for its scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Recovered: a default was applied or an unknown key was ignored
    Warning,
    /// Fatal for the scope it is attached to
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_display() {
        assert_eq!(ErrorScope::key(Some(2), "url").to_string(), "instances[2].url");
        assert_eq!(ErrorScope::key(None, "timeout").to_string(), "init_config.timeout");
        let subtree = ErrorScope::Subtree {
            instance: 0,
            service: "HDFS".to_string(),
            component: Some("NAMENODE".to_string()),
        };
        assert_eq!(subtree.to_string(), "instances[0].services.HDFS.NAMENODE");
        assert_eq!(subtree.instance(), Some(0));
        assert_eq!(ErrorScope::Document.instance(), None);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Error > Severity::Warning);
    }
}
