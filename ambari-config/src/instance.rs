use crate::error::{ConfigError, Result};
use crate::init::{seconds, InitConfig};
use crate::schema::SchemaDocument;
use crate::validation::{SchemaValidator, ValidatedOptions};
use crate::value::{describe, ValueType};
use crate::whitelist::{ServiceSelection, ServiceWhitelist};
use error_common::Diagnostic;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

pub const DEFAULT_MIN_COLLECTION_INTERVAL_SECS: f64 = 15.0;

/// Credentials for basic or digest authentication
#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

impl BasicAuth {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &logger_redacted::MASK)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthType {
    #[default]
    Basic,
    Digest,
}

impl AuthType {
    pub fn as_str(self) -> &'static str {
        match self {
            AuthType::Basic => "basic",
            AuthType::Digest => "digest",
        }
    }
}

impl FromStr for AuthType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "basic" => Ok(AuthType::Basic),
            "digest" => Ok(AuthType::Digest),
            other => Err(ConfigError::invalid_value(
                "auth_type",
                format!("unknown authentication type `{}`", other),
            )),
        }
    }
}

/// One monitored Ambari server
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceConfig {
    pub url: Url,
    pub services: ServiceSelection,
    pub auth: Option<BasicAuth>,
    pub auth_type: AuthType,
    pub tls_verify: bool,
    /// Seconds; falls back to `init_config.timeout`
    pub timeout: Option<f64>,
    pub tags: Vec<String>,
    /// Falls back to `init_config.service`
    pub service: Option<String>,
    pub min_collection_interval: f64,
    pub empty_default_hostname: bool,
}

impl InstanceConfig {
    /// An instance pointing at `url` with every other option at its default
    pub fn new(url: Url) -> Self {
        Self {
            url,
            services: ServiceSelection::WHEN_ABSENT,
            auth: None,
            auth_type: AuthType::default(),
            tls_verify: true,
            timeout: None,
            tags: Vec::new(),
            service: None,
            min_collection_interval: DEFAULT_MIN_COLLECTION_INTERVAL_SECS,
            empty_default_hostname: false,
        }
    }

    pub fn with_services(mut self, whitelist: ServiceWhitelist) -> Self {
        self.services = ServiceSelection::Whitelist(whitelist);
        self
    }

    pub fn with_auth(mut self, auth: BasicAuth) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Validates and converts one entry of `instances`.
    ///
    /// # Errors
    ///
    /// Any failure is fatal for this instance only.
    pub fn from_value(
        value: &Value,
        index: usize,
        schema: &SchemaDocument,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<Self> {
        let supplied = value
            .as_object()
            .ok_or_else(|| ConfigError::type_mismatch(format!("instances[{}]", index), ValueType::Object.as_str(), describe(value)))?;
        let options = SchemaValidator::instance(schema, index).check(supplied, diagnostics)?;
        Self::from_options(&options, index, diagnostics)
    }

    pub fn from_options(options: &ValidatedOptions, index: usize, diagnostics: &mut Vec<Diagnostic>) -> Result<Self> {
        let raw_url = options
            .str("url")
            .ok_or_else(|| ConfigError::MissingRequiredOption("url".to_string()))?;
        let url = parse_url(raw_url)?;

        let auth = match (options.str("username"), options.str("password")) {
            (Some(username), Some(password)) => Some(BasicAuth::new(username, password)),
            (Some(_), None) => return Err(ConfigError::MissingRequiredOption("password".to_string())),
            (None, Some(_)) => return Err(ConfigError::MissingRequiredOption("username".to_string())),
            (None, None) => None,
        };

        let services = match options.get("services") {
            Some(Value::Object(services)) => {
                ServiceSelection::Whitelist(ServiceWhitelist::parse(services, index, diagnostics))
            }
            _ => ServiceSelection::WHEN_ABSENT,
        };

        let auth_type = options.str("auth_type").map(AuthType::from_str).transpose()?.unwrap_or_default();

        let config = Self {
            url,
            services,
            auth,
            auth_type,
            tls_verify: options.bool("tls_verify").unwrap_or(true),
            timeout: options.f64("timeout"),
            tags: options.strings("tags"),
            service: options.str("service").map(str::to_string),
            min_collection_interval: options
                .f64("min_collection_interval")
                .unwrap_or(DEFAULT_MIN_COLLECTION_INTERVAL_SECS),
            empty_default_hostname: options.bool("empty_default_hostname").unwrap_or(false),
        };

        tracing::debug!(
            instance = index,
            url = %logger_redacted::redact(config.url.as_str()),
            restricted = config.services.whitelist().is_some(),
            "Instance configuration parsed"
        );
        Ok(config)
    }

    /// Seconds to wait on the Ambari API, instance value first
    pub fn effective_timeout(&self, init: &InitConfig) -> Duration {
        self.timeout
            .and_then(seconds)
            .unwrap_or_else(|| init.timeout_duration())
    }

    pub fn effective_service<'a>(&'a self, init: &'a InitConfig) -> Option<&'a str> {
        self.service.as_deref().or(init.service.as_deref())
    }

    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("url".to_string(), json!(self.url.as_str()));
        if let Some(whitelist) = self.services.whitelist() {
            map.insert("services".to_string(), whitelist.to_value());
        }
        if let Some(auth) = &self.auth {
            map.insert("username".to_string(), json!(auth.username));
            map.insert("password".to_string(), json!(auth.password));
        }
        map.insert("auth_type".to_string(), json!(self.auth_type.as_str()));
        map.insert("tls_verify".to_string(), json!(self.tls_verify));
        if let Some(timeout) = self.timeout {
            map.insert("timeout".to_string(), json!(timeout));
        }
        if !self.tags.is_empty() {
            map.insert("tags".to_string(), json!(self.tags));
        }
        if let Some(service) = &self.service {
            map.insert("service".to_string(), json!(service));
        }
        map.insert("min_collection_interval".to_string(), json!(self.min_collection_interval));
        map.insert("empty_default_hostname".to_string(), json!(self.empty_default_hostname));
        Value::Object(map)
    }
}

fn parse_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| ConfigError::invalid_value("url", format!("{}: {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" if url.has_host() => Ok(url),
        "http" | "https" => Err(ConfigError::invalid_value("url", format!("{} has no host", raw))),
        scheme => Err(ConfigError::invalid_value(
            "url",
            format!("scheme must be http or https, got {}", scheme),
        )),
    }
}
