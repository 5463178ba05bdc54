// Configuration providers: files, environment and in-memory values
use crate::error::{ConfigError, Result};
use figment::providers::{Env, Format, Json, Yaml};
use figment::Figment;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

pub const DEFAULT_ENV_PREFIX: &str = "AMBARI_";

/// A source of (part of) a configuration document
pub trait ConfigProvider: Send + Sync {
    /// Short description used in logs and errors
    fn name(&self) -> String;

    /// # Errors
    ///
    /// `SourceNotFound` when the source does not exist, `ParseError` when it
    /// cannot be read as a document.
    fn load(&self) -> Result<Value>;
}

/// A `conf.yaml` style document on disk, YAML or JSON by extension
#[derive(Debug, Clone)]
pub struct FileProvider {
    path: PathBuf,
}

impl FileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn is_json(&self) -> bool {
        self.path
            .extension()
            .and_then(|extension| extension.to_str())
            .is_some_and(|extension| extension.eq_ignore_ascii_case("json"))
    }
}

impl ConfigProvider for FileProvider {
    fn name(&self) -> String {
        format!("file:{}", self.path.display())
    }

    fn load(&self) -> Result<Value> {
        if !self.path.is_file() {
            return Err(ConfigError::SourceNotFound(self.path.display().to_string()));
        }

        let figment = if self.is_json() {
            Figment::new().merge(Json::file(&self.path))
        } else {
            Figment::new().merge(Yaml::file(&self.path))
        };

        let value: Value = figment
            .extract()
            .map_err(|e| ConfigError::ParseError(format!("{}: {}", self.path.display(), e)))?;
        tracing::debug!(source = %self.name(), "Configuration file read");
        Ok(value)
    }
}

/// `init_config` overrides from the environment.
///
/// `AMBARI_COLLECT_SERVICE_STATUS=true` sets `init_config.collect_service_status`;
/// `__` separates nested keys.
#[derive(Debug, Clone)]
pub struct EnvProvider {
    prefix: String,
}

impl EnvProvider {
    pub fn new() -> Self {
        Self::with_prefix(DEFAULT_ENV_PREFIX)
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }
}

impl Default for EnvProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigProvider for EnvProvider {
    fn name(&self) -> String {
        format!("env:{}*", self.prefix)
    }

    fn load(&self) -> Result<Value> {
        let overrides: Value = Figment::new()
            .merge(Env::prefixed(&self.prefix).split("__"))
            .extract()
            .map_err(|e| ConfigError::ParseError(format!("environment {}*: {}", self.prefix, e)))?;

        let mut document = Map::new();
        if overrides.as_object().is_some_and(|map| !map.is_empty()) {
            document.insert("init_config".to_string(), overrides);
        }
        Ok(Value::Object(document))
    }
}

/// A document already in memory
#[derive(Debug, Clone)]
pub struct StaticProvider {
    value: Value,
}

impl StaticProvider {
    pub fn new(value: Value) -> Self {
        Self { value }
    }
}

impl ConfigProvider for StaticProvider {
    fn name(&self) -> String {
        "static".to_string()
    }

    fn load(&self) -> Result<Value> {
        Ok(self.value.clone())
    }
}

/// Recursively merges `overlay` into `base`.
///
/// Mappings are merged key by key; every other value, sequences included,
/// replaces what was there.
pub fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
