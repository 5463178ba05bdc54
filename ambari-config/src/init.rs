use crate::schema::SchemaDocument;
use crate::validation::{SchemaValidator, ValidatedOptions};
use error_common::{codes, Diagnostic, ErrorScope};
use serde_json::{json, Map, Value};
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECS: f64 = 10.0;

/// Process-wide options shared by every instance
#[derive(Debug, Clone, PartialEq)]
pub struct InitConfig {
    pub collect_service_metrics: bool,
    pub collect_service_status: bool,
    pub service: Option<String>,
    /// Seconds
    pub timeout: f64,
}

/// Seconds as a `Duration`, `None` when negative, non-finite or too large
pub(crate) fn seconds(secs: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(secs).ok()
}

impl Default for InitConfig {
    fn default() -> Self {
        Self {
            collect_service_metrics: true,
            collect_service_status: false,
            service: None,
            timeout: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl InitConfig {
    pub fn from_options(options: &ValidatedOptions) -> Self {
        let defaults = Self::default();
        Self {
            collect_service_metrics: options
                .bool("collect_service_metrics")
                .unwrap_or(defaults.collect_service_metrics),
            collect_service_status: options
                .bool("collect_service_status")
                .unwrap_or(defaults.collect_service_status),
            service: options.str("service").map(str::to_string),
            timeout: options.f64("timeout").unwrap_or(defaults.timeout),
        }
    }

    /// Validates an `init_config` section. Never fails: a missing or `null`
    /// section yields the defaults, problems become diagnostics.
    pub fn from_value(value: Option<&Value>, schema: &SchemaDocument, diagnostics: &mut Vec<Diagnostic>) -> Self {
        let empty = Map::new();
        let supplied = match value {
            None | Some(Value::Null) => &empty,
            Some(Value::Object(map)) => map,
            Some(other) => {
                diagnostics.push(Diagnostic::error(
                    codes::config::TYPE_MISMATCH,
                    ErrorScope::InitConfig,
                    format!(
                        "init_config must be a mapping, got {}; using defaults",
                        crate::value::describe(other)
                    ),
                ));
                &empty
            }
        };

        match SchemaValidator::init_config(schema).check(supplied, diagnostics) {
            Ok(options) => Self::from_options(&options),
            Err(error) => {
                diagnostics.push(Diagnostic::error(error.code(), ErrorScope::InitConfig, error.to_string()));
                Self::default()
            }
        }
    }

    /// Whether the services whitelist has to be consulted at all
    pub fn consults_whitelist(&self) -> bool {
        self.collect_service_metrics || self.collect_service_status
    }

    /// The timeout as a `Duration`; the default when `timeout` is out of range
    pub fn timeout_duration(&self) -> Duration {
        seconds(self.timeout).unwrap_or(Duration::from_secs_f64(DEFAULT_TIMEOUT_SECS))
    }

    pub fn to_value(&self) -> Value {
        let mut value = json!({
            "collect_service_metrics": self.collect_service_metrics,
            "collect_service_status": self.collect_service_status,
            "timeout": self.timeout,
        });
        if let (Some(service), Some(map)) = (&self.service, value.as_object_mut()) {
            map.insert("service".to_string(), json!(service));
        }
        value
    }
}
