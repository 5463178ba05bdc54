use regex::Regex;
use lazy_static::lazy_static;
use sha2::{Sha256, Digest};
use base64::{Engine as _, engine::general_purpose};
use serde_json::Value;

pub const MASK: &str = "********";

lazy_static! {
    static ref URL_CREDENTIALS_REGEX: Regex =
        Regex::new(r"(?P<scheme>\b[a-zA-Z][a-zA-Z0-9+.-]*://)(?P<user>[^:/@\s]+):(?P<pass>[^@/\s]+)@")
            .expect("url credentials regex is valid");
    static ref PASSWORD_PAIR_REGEX: Regex = Regex::new(
        r#"(?i)\b(?P<key>password|passwd|pwd|secret|api_key|token)(?P<sep>"?\s*[=:]\s*)(?P<value>"[^"]*"|'[^']*'|[^\s,;&"']+)"#
    )
    .expect("password pair regex is valid");
    static ref AUTH_HEADER_REGEX: Regex =
        Regex::new(r"(?i)(?P<scheme>authorization\s*:\s*(?:basic|bearer|digest))\s+[A-Za-z0-9+/=._~-]+")
            .expect("authorization header regex is valid");
}

/// Credential redaction configuration
#[derive(Debug, Clone)]
pub struct RedactionConfig {
    pub redact_url_credentials: bool,
    pub redact_password_pairs: bool,
    pub redact_auth_headers: bool,
    pub hash_for_correlation: bool,
    pub custom_patterns: Vec<(Regex, String)>,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            redact_url_credentials: true,
            redact_password_pairs: true,
            redact_auth_headers: true,
            hash_for_correlation: false,
            custom_patterns: Vec::new(),
        }
    }
}

impl RedactionConfig {
    pub fn with_custom_pattern(mut self, pattern: Regex, replacement: impl Into<String>) -> Self {
        self.custom_patterns.push((pattern, replacement.into()));
        self
    }
}

/// Secret redactor for log messages and configuration dumps
pub struct SecretRedactor {
    config: RedactionConfig,
}

impl Default for SecretRedactor {
    fn default() -> Self {
        Self::new(RedactionConfig::default())
    }
}

impl SecretRedactor {
    pub fn new(config: RedactionConfig) -> Self {
        Self { config }
    }

    pub fn redact(&self, text: &str) -> String {
        let mut result = text.to_string();

        if self.config.redact_url_credentials {
            result = self.redact_url_credentials(&result);
        }

        if self.config.redact_auth_headers {
            result = self.redact_auth_headers(&result);
        }

        if self.config.redact_password_pairs {
            result = self.redact_password_pairs(&result);
        }

        for (pattern, replacement) in &self.config.custom_patterns {
            result = pattern.replace_all(&result, replacement.as_str()).to_string();
        }

        result
    }

    /// Masks every object member whose key is listed in `secret_keys`, at any
    /// depth, and redacts credentials embedded in the remaining strings.
    pub fn redact_value(&self, value: &Value, secret_keys: &[&str]) -> Value {
        match value {
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(key, inner)| {
                        let redacted = if secret_keys.contains(&key.as_str()) && !inner.is_null() {
                            Value::String(self.mask(&inner.to_string()))
                        } else {
                            self.redact_value(inner, secret_keys)
                        };
                        (key.clone(), redacted)
                    })
                    .collect(),
            ),
            Value::Array(items) => Value::Array(
                items.iter().map(|item| self.redact_value(item, secret_keys)).collect(),
            ),
            Value::String(text) => Value::String(self.redact(text)),
            other => other.clone(),
        }
    }

    fn redact_url_credentials(&self, text: &str) -> String {
        URL_CREDENTIALS_REGEX.replace_all(text, |caps: &regex::Captures| {
            format!("{}{}:{}@", &caps["scheme"], &caps["user"], self.mask(&caps["pass"]))
        }).to_string()
    }

    fn redact_password_pairs(&self, text: &str) -> String {
        PASSWORD_PAIR_REGEX.replace_all(text, |caps: &regex::Captures| {
            let value = &caps["value"];
            if value == MASK || value.starts_with("HASH[") {
                return caps[0].to_string();
            }
            format!("{}{}{}", &caps["key"], &caps["sep"], self.mask(value))
        }).to_string()
    }

    fn redact_auth_headers(&self, text: &str) -> String {
        AUTH_HEADER_REGEX.replace_all(text, |caps: &regex::Captures| {
            format!("{} {}", &caps["scheme"], self.mask(&caps[0]))
        }).to_string()
    }

    fn mask(&self, secret: &str) -> String {
        if self.config.hash_for_correlation {
            format!("HASH[{}]", self.hash_value(secret))
        } else {
            MASK.to_string()
        }
    }

    fn hash_value(&self, value: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(value.as_bytes());
        let result = hasher.finalize();
        general_purpose::STANDARD.encode(&result[..8]) // Use first 8 bytes for shorter hash
    }
}
