use crate::error::{ConfigError, Result};
use crate::init::InitConfig;
use crate::instance::InstanceConfig;
use crate::plan::CollectionPlan;
use crate::schema::SchemaDocument;
use crate::value::describe;
use chrono::{DateTime, Utc};
use error_common::{codes, Diagnostic, ErrorScope};
use log_pipeline::LogSource;
use logger_redacted::SecretRedactor;
use serde_json::{json, Map, Value};

/// The result of validating one entry of `instances`
#[derive(Debug)]
pub struct InstanceOutcome {
    pub index: usize,
    pub result: Result<InstanceConfig>,
}

impl InstanceOutcome {
    pub fn config(&self) -> Option<&InstanceConfig> {
        self.result.as_ref().ok()
    }

    pub fn error(&self) -> Option<&ConfigError> {
        self.result.as_ref().err()
    }
}

/// A validated check configuration document.
///
/// Instances are validated independently; a failed instance is kept as an
/// error outcome so callers can report it without losing its siblings.
#[derive(Debug)]
pub struct CheckConfig {
    pub init: InitConfig,
    pub instances: Vec<InstanceOutcome>,
    pub logs: Vec<LogSource>,
    pub diagnostics: Vec<Diagnostic>,
    pub loaded_at: DateTime<Utc>,
}

impl CheckConfig {
    /// Validates a document with top-level `init_config`, `instances` and `logs`.
    ///
    /// # Errors
    ///
    /// Only document-level problems fail the whole load: a non-mapping
    /// document, or `instances` that is missing, not a sequence, or empty.
    pub fn from_value(document: &Value, schema: &SchemaDocument) -> Result<Self> {
        let root = document
            .as_object()
            .ok_or_else(|| ConfigError::ParseError(format!("document must be a mapping, got {}", describe(document))))?;

        let entries = match root.get("instances") {
            Some(Value::Array(entries)) if !entries.is_empty() => entries,
            Some(Value::Array(_)) => {
                return Err(ConfigError::ParseError("`instances` must list at least one instance".to_string()))
            }
            Some(other) => {
                return Err(ConfigError::ParseError(format!(
                    "`instances` must be a sequence, got {}",
                    describe(other)
                )))
            }
            None => return Err(ConfigError::ParseError("missing `instances` sequence".to_string())),
        };

        let mut diagnostics = Vec::new();
        let init = InitConfig::from_value(root.get("init_config"), schema, &mut diagnostics);

        let instances = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let result = InstanceConfig::from_value(entry, index, schema, &mut diagnostics);
                if let Err(error) = &result {
                    logger_redacted::redacted_warn!("Instance {} rejected [{}]: {}", index, error.code(), error);
                    diagnostics.push(Diagnostic::error(
                        error.code(),
                        ErrorScope::Instance { index },
                        error.to_string(),
                    ));
                }
                InstanceOutcome { index, result }
            })
            .collect();

        let logs = parse_logs(root.get("logs"), &mut diagnostics);

        for key in root.keys() {
            if !matches!(key.as_str(), "init_config" | "instances" | "logs") {
                diagnostics.push(Diagnostic::warning(
                    codes::config::UNKNOWN_OPTION,
                    ErrorScope::Document,
                    format!("unknown top-level key `{}` ignored", key),
                ));
            }
        }

        let config = Self {
            init,
            instances,
            logs,
            diagnostics,
            loaded_at: Utc::now(),
        };
        tracing::debug!(
            valid = config.valid_instances().count(),
            failed = config.failed_instances().count(),
            logs = config.logs.len(),
            diagnostics = config.diagnostics.len(),
            "Check configuration built"
        );
        Ok(config)
    }

    pub fn valid_instances(&self) -> impl Iterator<Item = (usize, &InstanceConfig)> {
        self.instances
            .iter()
            .filter_map(|outcome| outcome.config().map(|config| (outcome.index, config)))
    }

    pub fn failed_instances(&self) -> impl Iterator<Item = (usize, &ConfigError)> {
        self.instances
            .iter()
            .filter_map(|outcome| outcome.error().map(|error| (outcome.index, error)))
    }

    pub fn instance(&self, index: usize) -> Option<&InstanceOutcome> {
        self.instances.iter().find(|outcome| outcome.index == index)
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn plan_for<'a>(&self, instance: &'a InstanceConfig) -> CollectionPlan<'a> {
        CollectionPlan::new(&self.init, &instance.services)
    }

    /// The valid parts of the document, in document form.
    ///
    /// Failed instances are left out.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("init_config".to_string(), self.init.to_value());
        map.insert(
            "instances".to_string(),
            Value::Array(self.valid_instances().map(|(_, config)| config.to_value()).collect()),
        );
        if !self.logs.is_empty() {
            map.insert(
                "logs".to_string(),
                serde_json::to_value(&self.logs).unwrap_or_else(|_| json!([])),
            );
        }
        Value::Object(map)
    }

    /// [`Self::to_value`] with secret options and embedded credentials masked
    pub fn redacted_value(&self, schema: &SchemaDocument) -> Value {
        SecretRedactor::default().redact_value(&self.to_value(), &schema.secret_keys())
    }
}

fn parse_logs(logs: Option<&Value>, diagnostics: &mut Vec<Diagnostic>) -> Vec<LogSource> {
    let entries = match logs {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::Array(entries)) => entries,
        Some(other) => {
            diagnostics.push(Diagnostic::error(
                codes::logs::INVALID_SOURCE,
                ErrorScope::Document,
                format!("`logs` must be a sequence, got {}; ignored", describe(other)),
            ));
            return Vec::new();
        }
    };

    entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let parsed = serde_json::from_value::<LogSource>(entry.clone())
                .map_err(|e| e.to_string())
                .and_then(|source| source.validate().map(|()| source).map_err(|e| e.to_string()));
            match parsed {
                Ok(source) => Some(source),
                Err(reason) => {
                    tracing::warn!(log_source = index, "Log source dropped: {}", reason);
                    diagnostics.push(Diagnostic::error(
                        codes::logs::INVALID_SOURCE,
                        ErrorScope::LogSource { index },
                        reason,
                    ));
                    None
                }
            }
        })
        .collect()
}
