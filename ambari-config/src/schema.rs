//! The configuration schema document.
//!
//! A [`SchemaDocument`] declares every recognized option of the two scopes
//! (`init_config` and `instances`) together with its type, default, example
//! and documentation, plus the example log sources offered as defaults.

use crate::error::{ConfigError, Result};
use crate::value::{describe, ValueType};
use log_pipeline::LogSource;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;

const AMBARI_SCHEMA: &str = include_str!("../assets/ambari.yaml");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    InitConfig,
    Instances,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::InitConfig => write!(f, "init_config"),
            Scope::Instances => write!(f, "instances"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueSpec {
    #[serde(rename = "type")]
    pub value_type: ValueType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    /// Element type of an `array`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<ValueSpec>>,

    /// Allowed values of a `string`
    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub allowed: Vec<String>,

    /// Inclusive bounds of an `integer` or `number`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
}

impl ValueSpec {
    pub fn new(value_type: ValueType) -> Self {
        Self {
            value_type,
            example: None,
            default: None,
            items: None,
            allowed: Vec::new(),
            minimum: None,
            maximum: None,
        }
    }

    pub fn with_range(mut self, minimum: f64, maximum: f64) -> Self {
        self.minimum = Some(minimum);
        self.maximum = Some(maximum);
        self
    }

    fn is_numeric(&self) -> bool {
        matches!(self.value_type, ValueType::Integer | ValueType::Number)
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Human-readable type, e.g. `boolean` or `list of strings`
    pub fn type_label(&self) -> String {
        match (&self.value_type, &self.items) {
            (ValueType::Array, Some(items)) => format!("list of {}s", items.type_label()),
            (ValueType::Array, None) => "list".to_string(),
            (ValueType::Object, _) => "mapping".to_string(),
            (value_type, _) => value_type.to_string(),
        }
    }

    /// Checks the type of `value`, including array elements.
    ///
    /// Returns the declared and actual type tags on mismatch.
    pub fn check_type(&self, value: &Value) -> std::result::Result<(), (String, String)> {
        if !self.value_type.accepts(value) {
            return Err((self.value_type.to_string(), describe(value).to_string()));
        }
        if let (Some(items), Value::Array(elements)) = (&self.items, value) {
            if let Some(bad) = elements.iter().find(|element| !items.value_type.accepts(element)) {
                return Err((self.value_type.to_string(), format!("array containing {}", describe(bad))));
            }
        }
        Ok(())
    }

    /// Checks `value` against the declared `enum` and numeric bounds, if any
    pub fn check_allowed(&self, value: &Value) -> std::result::Result<(), String> {
        if let Some(number) = value.as_f64().filter(|_| self.is_numeric()) {
            return self.check_range(number);
        }
        if self.allowed.is_empty() {
            return Ok(());
        }
        match value.as_str() {
            Some(text) if self.allowed.iter().any(|allowed| allowed == text) => Ok(()),
            _ => Err(format!("{} is not one of: {}", value, self.allowed.join(", "))),
        }
    }

    fn check_range(&self, number: f64) -> std::result::Result<(), String> {
        if !number.is_finite() {
            return Err(format!("{} is not a finite number", number));
        }
        if let Some(minimum) = self.minimum.filter(|minimum| number < *minimum) {
            return Err(format!("{} is below the minimum {}", number, minimum));
        }
        if let Some(maximum) = self.maximum.filter(|maximum| number > *maximum) {
            return Err(format!("{} is above the maximum {}", number, maximum));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionSpec {
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,

    /// UI ordering hint only
    #[serde(default, skip_serializing_if = "is_zero")]
    pub display_priority: i32,

    /// The value must never be written to logs or dumps
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub secret: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<String>,

    pub value: ValueSpec,
}

fn is_zero(value: &i32) -> bool {
    *value == 0
}

impl OptionSpec {
    pub fn new(name: impl Into<String>, value: ValueSpec) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            required: false,
            display_priority: 0,
            secret: false,
            deprecated: None,
            value,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDocument {
    pub name: String,

    #[serde(default)]
    pub init_config: Vec<OptionSpec>,

    #[serde(default)]
    pub instances: Vec<OptionSpec>,

    /// Example log sources, offered to agents as a default value
    #[serde(default)]
    pub logs: Vec<LogSource>,
}

impl SchemaDocument {
    /// The built-in Ambari schema
    pub fn ambari() -> Result<Self> {
        Self::from_yaml(AMBARI_SCHEMA)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let document: SchemaDocument =
            serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        document.check()?;
        tracing::debug!(
            schema = %document.name,
            init_options = document.init_config.len(),
            instance_options = document.instances.len(),
            "Configuration schema loaded"
        );
        Ok(document)
    }

    pub fn options(&self, scope: Scope) -> &[OptionSpec] {
        match scope {
            Scope::InitConfig => &self.init_config,
            Scope::Instances => &self.instances,
        }
    }

    pub fn option(&self, scope: Scope, name: &str) -> Option<&OptionSpec> {
        self.options(scope).iter().find(|option| option.name == name)
    }

    /// Options ordered for display: highest priority first, document order otherwise
    pub fn options_by_priority(&self, scope: Scope) -> Vec<&OptionSpec> {
        let mut options: Vec<&OptionSpec> = self.options(scope).iter().collect();
        options.sort_by_key(|option| std::cmp::Reverse(option.display_priority));
        options
    }

    /// Names of options whose values must be redacted
    pub fn secret_keys(&self) -> Vec<&str> {
        self.init_config
            .iter()
            .chain(self.instances.iter())
            .filter(|option| option.secret)
            .map(|option| option.name.as_str())
            .collect()
    }

    /// The example log sources as a default configuration value
    pub fn default_logs(&self) -> Vec<LogSource> {
        self.logs.clone()
    }

    /// Enforces internal consistency of the schema itself
    pub fn check(&self) -> Result<()> {
        for scope in [Scope::InitConfig, Scope::Instances] {
            let mut seen = HashSet::new();
            for option in self.options(scope) {
                if option.name.trim().is_empty() {
                    return Err(ConfigError::InvalidSchema(format!("{} option with an empty name", scope)));
                }
                if !seen.insert(option.name.as_str()) {
                    return Err(ConfigError::InvalidSchema(format!(
                        "duplicate option `{}` in {}",
                        option.name, scope
                    )));
                }
                check_option(scope, option)?;
            }
        }

        if !self.instances.iter().any(|option| option.required) {
            return Err(ConfigError::InvalidSchema(
                "instances must declare at least one required option".to_string(),
            ));
        }

        for (index, source) in self.logs.iter().enumerate() {
            source
                .validate()
                .map_err(|e| ConfigError::InvalidSchema(format!("logs[{}]: {}", index, e)))?;
        }

        Ok(())
    }
}

fn check_option(scope: Scope, option: &OptionSpec) -> Result<()> {
    let spec = &option.value;
    let context = || format!("{}.{}", scope, option.name);

    if spec.items.is_some() && spec.value_type != ValueType::Array {
        return Err(ConfigError::InvalidSchema(format!(
            "{}: `items` is only valid for arrays",
            context()
        )));
    }
    if (spec.minimum.is_some() || spec.maximum.is_some()) && !spec.is_numeric() {
        return Err(ConfigError::InvalidSchema(format!(
            "{}: `minimum` and `maximum` are only valid for numbers",
            context()
        )));
    }
    if let (Some(minimum), Some(maximum)) = (spec.minimum, spec.maximum) {
        if minimum > maximum {
            return Err(ConfigError::InvalidSchema(format!(
                "{}: minimum {} exceeds maximum {}",
                context(),
                minimum,
                maximum
            )));
        }
    }
    if !spec.allowed.is_empty() && spec.value_type != ValueType::String {
        return Err(ConfigError::InvalidSchema(format!(
            "{}: `enum` is only valid for strings",
            context()
        )));
    }

    for (label, value) in [("default", &spec.default), ("example", &spec.example)] {
        if let Some(value) = value {
            spec.check_type(value).map_err(|(expected, actual)| {
                ConfigError::InvalidSchema(format!(
                    "{}: {} must be {}, got {}",
                    context(),
                    label,
                    expected,
                    actual
                ))
            })?;
        }
    }

    if let Some(default) = &spec.default {
        spec.check_allowed(default)
            .map_err(|reason| ConfigError::InvalidSchema(format!("{}: default {}", context(), reason)))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builtin_schema_is_consistent() {
        let schema = SchemaDocument::ambari().unwrap();
        assert_eq!(schema.name, "ambari");

        let metrics = schema.option(Scope::InitConfig, "collect_service_metrics").unwrap();
        assert_eq!(metrics.value.value_type, ValueType::Boolean);
        assert_eq!(metrics.value.default, Some(json!(true)));

        let status = schema.option(Scope::InitConfig, "collect_service_status").unwrap();
        assert_eq!(status.value.default, Some(json!(false)));

        let url = schema.option(Scope::Instances, "url").unwrap();
        assert!(url.required);

        let services = schema.option(Scope::Instances, "services").unwrap();
        assert!(!services.required);
        assert_eq!(services.value.value_type, ValueType::Object);
    }

    #[test]
    fn test_options_by_priority_puts_url_first() {
        let schema = SchemaDocument::ambari().unwrap();
        let ordered = schema.options_by_priority(Scope::Instances);
        assert_eq!(ordered[0].name, "url");
        assert_eq!(ordered[1].name, "services");
        // equal priorities keep document order
        assert_eq!(ordered[2].name, "username");
        assert_eq!(ordered[3].name, "password");
    }

    #[test]
    fn test_secret_keys() {
        let schema = SchemaDocument::ambari().unwrap();
        assert_eq!(schema.secret_keys(), vec!["password"]);
    }

    #[test]
    fn test_default_logs_use_date_multi_line_rule() {
        let schema = SchemaDocument::ambari().unwrap();
        let logs = schema.default_logs();
        assert!(!logs.is_empty());

        let alerts = logs
            .iter()
            .find(|source| source.path.as_deref() == Some("/var/log/ambari-server/ambari-alerts.log"))
            .unwrap();
        assert_eq!(alerts.source.as_deref(), Some("ambari"));
        assert_eq!(alerts.service.as_deref(), Some("ambari"));
        let rule = alerts.multi_line_rule().unwrap();
        assert!(rule.pattern().is_match("2024-03-01 10:00:00"));
    }

    #[test]
    fn test_duplicate_option_is_rejected() {
        let yaml = r#"
name: broken
instances:
  - name: url
    required: true
    value: {type: string}
  - name: url
    value: {type: string}
"#;
        assert!(matches!(
            SchemaDocument::from_yaml(yaml),
            Err(ConfigError::InvalidSchema(message)) if message.contains("duplicate option `url`")
        ));
    }

    #[test]
    fn test_default_of_wrong_type_is_rejected() {
        let yaml = r#"
name: broken
init_config:
  - name: collect_service_status
    value: {type: boolean, default: "no"}
instances:
  - name: url
    required: true
    value: {type: string}
"#;
        assert!(matches!(
            SchemaDocument::from_yaml(yaml),
            Err(ConfigError::InvalidSchema(_))
        ));
    }

    #[test]
    fn test_default_outside_enum_is_rejected() {
        let yaml = r#"
name: broken
instances:
  - name: url
    required: true
    value: {type: string}
  - name: auth_type
    value: {type: string, default: kerberos, enum: [basic, digest]}
"#;
        assert!(SchemaDocument::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_schema_without_required_instance_option_is_rejected() {
        let yaml = "name: broken\ninstances:\n  - name: url\n    value: {type: string}\n";
        assert!(SchemaDocument::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_type_label() {
        let tags = ValueSpec {
            items: Some(Box::new(ValueSpec::new(ValueType::String))),
            ..ValueSpec::new(ValueType::Array)
        };
        assert_eq!(tags.type_label(), "list of strings");
        assert_eq!(
            tags.check_type(&json!(["a", 1])),
            Err(("array".to_string(), "array containing integer".to_string()))
        );
    }

    #[test]
    fn test_numeric_bounds() {
        let timeout = ValueSpec::new(ValueType::Number).with_range(0.0, 86400.0);
        assert!(timeout.check_allowed(&json!(2.5)).is_ok());
        assert!(timeout.check_allowed(&json!(86400)).is_ok());
        assert!(timeout.check_allowed(&json!(-1)).unwrap_err().contains("below the minimum"));
        assert!(timeout.check_allowed(&json!(1e300)).unwrap_err().contains("above the maximum"));
    }

    #[test]
    fn test_bounds_on_non_numeric_option_are_rejected() {
        let yaml = "name: broken\ninstances:\n  - name: url\n    required: true\n    value: {type: string, minimum: 1}\n";
        assert!(matches!(SchemaDocument::from_yaml(yaml), Err(ConfigError::InvalidSchema(_))));
    }

    #[test]
    fn test_builtin_durations_are_bounded() {
        let schema = SchemaDocument::ambari().unwrap();
        for (scope, name) in [
            (Scope::InitConfig, "timeout"),
            (Scope::Instances, "timeout"),
            (Scope::Instances, "min_collection_interval"),
        ] {
            let option = schema.option(scope, name).unwrap();
            assert_eq!(option.value.minimum, Some(0.0), "{scope}.{name}");
            assert!(option.value.maximum.is_some(), "{scope}.{name}");
        }
    }
}
