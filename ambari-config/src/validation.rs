// Configuration validation and schema enforcement
use crate::error::{ConfigError, Result};
use crate::schema::{OptionSpec, SchemaDocument, Scope};
use crate::value::{describe, ValueType};
use error_common::{codes, Diagnostic, ErrorScope};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub trait ConfigValidator {
    fn validate(&self, config: &Value) -> Result<()>;
}

/// Option values that passed validation, with declared defaults filled in
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedOptions {
    values: BTreeMap<String, Value>,
}

impl ValidatedOptions {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    pub fn strings(&self, name: &str) -> Vec<String> {
        self.get(name)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(|item| item.as_str().map(str::to_string)).collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Validates one scope of a configuration document against the schema.
///
/// Instance scope is strict: a missing required option, or an invalid value
/// with no default to fall back to, fails the whole instance. Init scope never
/// fails; an invalid value without a default is dropped and reported.
pub struct SchemaValidator<'a> {
    options: &'a [OptionSpec],
    scope: Scope,
    instance: Option<usize>,
}

impl<'a> SchemaValidator<'a> {
    pub fn init_config(schema: &'a SchemaDocument) -> Self {
        Self {
            options: schema.options(Scope::InitConfig),
            scope: Scope::InitConfig,
            instance: None,
        }
    }

    pub fn instance(schema: &'a SchemaDocument, index: usize) -> Self {
        Self {
            options: schema.options(Scope::Instances),
            scope: Scope::Instances,
            instance: Some(index),
        }
    }

    pub fn check(&self, supplied: &Map<String, Value>, diagnostics: &mut Vec<Diagnostic>) -> Result<ValidatedOptions> {
        let mut values = BTreeMap::new();

        for option in self.options {
            let supplied_value = supplied.get(&option.name).filter(|value| !value.is_null());

            let Some(value) = supplied_value else {
                if option.required {
                    return Err(ConfigError::MissingRequiredOption(option.name.clone()));
                }
                if let Some(default) = &option.value.default {
                    values.insert(option.name.clone(), default.clone());
                }
                continue;
            };

            if let Some(note) = &option.deprecated {
                diagnostics.push(Diagnostic::warning(
                    codes::config::DEPRECATED_OPTION,
                    self.key_scope(&option.name),
                    format!("option `{}` is deprecated: {}", option.name, note),
                ));
            }

            match self.check_value(option, value) {
                Ok(()) => {
                    values.insert(option.name.clone(), value.clone());
                }
                Err(error) => {
                    if let Some(default) = self.recover(option, error, diagnostics)? {
                        values.insert(option.name.clone(), default);
                    }
                }
            }
        }

        for key in supplied.keys() {
            if !self.options.iter().any(|option| &option.name == key) {
                diagnostics.push(Diagnostic::warning(
                    codes::config::UNKNOWN_OPTION,
                    self.key_scope(key),
                    format!("unknown option `{}` ignored", key),
                ));
            }
        }

        Ok(ValidatedOptions { values })
    }

    fn check_value(&self, option: &OptionSpec, value: &Value) -> Result<()> {
        option
            .value
            .check_type(value)
            .map_err(|(expected, actual)| ConfigError::type_mismatch(&option.name, expected, actual))?;
        option
            .value
            .check_allowed(value)
            .map_err(|reason| ConfigError::invalid_value(&option.name, reason))
    }

    /// Falls back to the declared default, or decides whether the scope fails
    fn recover(&self, option: &OptionSpec, error: ConfigError, diagnostics: &mut Vec<Diagnostic>) -> Result<Option<Value>> {
        if let Some(default) = &option.value.default {
            tracing::warn!(
                scope = %self.key_scope(&option.name),
                default = %default,
                "{}; falling back to default",
                error
            );
            diagnostics.push(Diagnostic::warning(
                error.code(),
                self.key_scope(&option.name),
                format!("{}; using default {}", error, default),
            ));
            return Ok(Some(default.clone()));
        }

        match self.scope {
            Scope::Instances => Err(error),
            Scope::InitConfig => {
                diagnostics.push(Diagnostic::error(
                    error.code(),
                    self.key_scope(&option.name),
                    format!("{}; option ignored", error),
                ));
                Ok(None)
            }
        }
    }

    fn key_scope(&self, option: &str) -> ErrorScope {
        ErrorScope::key(self.instance, option)
    }
}

impl ConfigValidator for SchemaValidator<'_> {
    fn validate(&self, config: &Value) -> Result<()> {
        let supplied = config
            .as_object()
            .ok_or_else(|| ConfigError::type_mismatch(self.scope.to_string(), ValueType::Object.as_str(), describe(config)))?;
        self.check(supplied, &mut Vec::new()).map(|_| ())
    }
}
