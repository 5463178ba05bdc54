//! The `services` metrics whitelist.
//!
//! Three explicit levels: service, component, metric headers. Presence at each
//! level is meaningful, so the whitelist is a typed nested map rather than a
//! loosely inspected JSON object.

use crate::error::ConfigError;
use crate::value::describe;
use error_common::{Diagnostic, ErrorScope};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// A metric group name as reported by Ambari, e.g. `jvm` or `rpc`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricHeader(String);

impl MetricHeader {
    pub fn new(header: impl Into<String>) -> Self {
        Self(header.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether a metric path belongs to this header.
    ///
    /// Paths look like `metrics/jvm/memHeapUsedM` or `jvm.memHeapUsedM`; the
    /// first segment after an optional leading `metrics` segment is compared.
    pub fn matches(&self, metric_path: &str) -> bool {
        let mut segments = metric_path
            .split(|c| c == '/' || c == '.')
            .filter(|segment| !segment.is_empty());
        let first = match segments.next() {
            Some("metrics") => segments.next(),
            other => other,
        };
        first == Some(self.0.as_str())
    }
}

impl fmt::Display for MetricHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub type ComponentHeaders = BTreeMap<String, Vec<MetricHeader>>;

/// `ServiceName -> ComponentName -> [MetricHeader]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ServiceWhitelist {
    services: BTreeMap<String, ComponentHeaders>,
}

impl ServiceWhitelist {
    pub fn new() -> Self {
        Self::default()
    }

    /// List a service with no components: status only
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.services.entry(service.into()).or_default();
        self
    }

    pub fn with_component<I, H>(mut self, service: impl Into<String>, component: impl Into<String>, headers: I) -> Self
    where
        I: IntoIterator<Item = H>,
        H: Into<String>,
    {
        self.services
            .entry(service.into())
            .or_default()
            .insert(component.into(), headers.into_iter().map(MetricHeader::new).collect());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    pub fn services(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }

    pub fn components(&self, service: &str) -> Option<&ComponentHeaders> {
        self.services.get(service)
    }

    pub fn headers(&self, service: &str, component: &str) -> Option<&[MetricHeader]> {
        self.services
            .get(service)
            .and_then(|components| components.get(component))
            .map(Vec::as_slice)
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Parses a `services` mapping, dropping malformed subtrees.
    ///
    /// A malformed service or component is reported in `diagnostics` and left
    /// out; its siblings are kept. A `null` component mapping means the service
    /// is listed with no components.
    pub fn parse(services: &Map<String, Value>, instance: usize, diagnostics: &mut Vec<Diagnostic>) -> Self {
        let mut whitelist = Self::new();

        for (service, components) in services {
            let components = match components {
                Value::Object(components) => components,
                Value::Null => {
                    whitelist.services.insert(service.clone(), ComponentHeaders::new());
                    continue;
                }
                other => {
                    report(
                        diagnostics,
                        instance,
                        ConfigError::MalformedWhitelist {
                            service: service.clone(),
                            component: None,
                            reason: format!("components must be a mapping, got {}", describe(other)),
                        },
                    );
                    continue;
                }
            };

            let mut parsed = ComponentHeaders::new();
            for (component, headers) in components {
                match parse_headers(headers) {
                    Ok(headers) => {
                        parsed.insert(component.clone(), headers);
                    }
                    Err(reason) => report(
                        diagnostics,
                        instance,
                        ConfigError::MalformedWhitelist {
                            service: service.clone(),
                            component: Some(component.clone()),
                            reason,
                        },
                    ),
                }
            }
            whitelist.services.insert(service.clone(), parsed);
        }

        whitelist
    }
}

fn parse_headers(headers: &Value) -> Result<Vec<MetricHeader>, String> {
    let Value::Array(items) = headers else {
        return Err(format!("metric headers must be a sequence, got {}", describe(headers)));
    };
    items
        .iter()
        .map(|item| match item.as_str() {
            Some(header) if !header.trim().is_empty() => Ok(MetricHeader::new(header)),
            Some(_) => Err("metric headers must not be empty".to_string()),
            None => Err(format!("metric headers must be strings, got {}", describe(item))),
        })
        .collect()
}

fn report(diagnostics: &mut Vec<Diagnostic>, instance: usize, error: ConfigError) {
    let ConfigError::MalformedWhitelist { service, component, .. } = &error else {
        return;
    };
    let scope = ErrorScope::Subtree {
        instance,
        service: service.clone(),
        component: component.clone(),
    };
    tracing::warn!(scope = %scope, "{}; subtree skipped", error);
    diagnostics.push(Diagnostic::error(error.code(), scope, error.to_string()));
}

/// Which services are eligible for checks.
///
/// Absence of `services` has to mean something; it is made explicit here
/// instead of being inferred from a missing key at lookup time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceSelection {
    /// `services` omitted: every discovered service and component is eligible
    Unrestricted,
    /// `services` supplied: only what it lists is eligible
    Whitelist(ServiceWhitelist),
}

impl ServiceSelection {
    /// Meaning of an instance without a `services` option
    pub const WHEN_ABSENT: ServiceSelection = ServiceSelection::Unrestricted;

    pub fn whitelist(&self) -> Option<&ServiceWhitelist> {
        match self {
            ServiceSelection::Unrestricted => None,
            ServiceSelection::Whitelist(whitelist) => Some(whitelist),
        }
    }
}

impl Default for ServiceSelection {
    fn default() -> Self {
        Self::WHEN_ABSENT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use error_common::codes;
    use serde_json::json;

    fn parse(value: Value) -> (ServiceWhitelist, Vec<Diagnostic>) {
        let mut diagnostics = Vec::new();
        let whitelist = ServiceWhitelist::parse(value.as_object().unwrap(), 0, &mut diagnostics);
        (whitelist, diagnostics)
    }

    #[test]
    fn test_three_levels_are_parsed() {
        let (whitelist, diagnostics) = parse(json!({
            "HDFS": {"NAMENODE": ["jvm", "rpc"], "DATANODE": []},
            "YARN": {}
        }));

        assert!(diagnostics.is_empty());
        assert_eq!(whitelist.services().collect::<Vec<_>>(), vec!["HDFS", "YARN"]);
        assert_eq!(
            whitelist.headers("HDFS", "NAMENODE"),
            Some(&[MetricHeader::new("jvm"), MetricHeader::new("rpc")][..])
        );
        assert_eq!(whitelist.headers("HDFS", "DATANODE"), Some(&[][..]));
        assert!(whitelist.components("YARN").unwrap().is_empty());
        assert!(whitelist.headers("HDFS", "SECONDARY_NAMENODE").is_none());
    }

    #[test]
    fn test_malformed_leaf_drops_only_that_component() {
        let (whitelist, diagnostics) = parse(json!({
            "HDFS": {"NAMENODE": "jvm", "DATANODE": ["disk"]},
            "YARN": {"RESOURCEMANAGER": []}
        }));

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, codes::whitelist::MALFORMED);
        assert_eq!(
            diagnostics[0].scope,
            ErrorScope::Subtree {
                instance: 0,
                service: "HDFS".to_string(),
                component: Some("NAMENODE".to_string()),
            }
        );
        assert!(whitelist.headers("HDFS", "NAMENODE").is_none());
        assert_eq!(whitelist.headers("HDFS", "DATANODE").map(<[_]>::len), Some(1));
        assert!(whitelist.headers("YARN", "RESOURCEMANAGER").is_some());
    }

    #[test]
    fn test_null_leaf_is_malformed() {
        let (whitelist, diagnostics) = parse(json!({"HDFS": {"NAMENODE": null}}));
        assert_eq!(diagnostics.len(), 1);
        assert!(whitelist.components("HDFS").unwrap().is_empty());
    }

    #[test]
    fn test_non_string_header_is_malformed() {
        let (whitelist, diagnostics) = parse(json!({"HDFS": {"NAMENODE": ["jvm", 7]}}));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("must be strings"));
        assert!(whitelist.headers("HDFS", "NAMENODE").is_none());
    }

    #[test]
    fn test_malformed_service_keeps_siblings() {
        let (whitelist, diagnostics) = parse(json!({
            "HDFS": ["NAMENODE"],
            "YARN": {}
        }));

        assert_eq!(diagnostics.len(), 1);
        assert!(whitelist.components("HDFS").is_none());
        assert!(whitelist.components("YARN").is_some());
    }

    #[test]
    fn test_null_service_means_no_components() {
        let (whitelist, diagnostics) = parse(json!({"HDFS": null}));
        assert!(diagnostics.is_empty());
        assert!(whitelist.components("HDFS").unwrap().is_empty());
    }

    #[test]
    fn test_blank_header_is_malformed() {
        let (whitelist, diagnostics) = parse(json!({"HDFS": {"NAMENODE": ["jvm", "  "], "DATANODE": []}}));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("must not be empty"));
        assert!(whitelist.headers("HDFS", "NAMENODE").is_none());
        assert_eq!(whitelist.headers("HDFS", "DATANODE"), Some(&[][..]));
    }

    #[test]
    fn test_document_form_parses_back_unchanged() {
        let whitelist = ServiceWhitelist::new()
            .with_component("HDFS", "NAMENODE", ["jvm", "rpc"])
            .with_component("HDFS", "DATANODE", Vec::<String>::new())
            .with_service("YARN");
        let (parsed, diagnostics) = parse(whitelist.to_value());
        assert_eq!(parsed, whitelist);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_header_matches_metric_paths() {
        let jvm = MetricHeader::new("jvm");
        assert!(jvm.matches("metrics/jvm/memHeapUsedM"));
        assert!(jvm.matches("jvm.gcCount"));
        assert!(!jvm.matches("metrics/rpc/jvm"));
        assert!(!jvm.matches("metrics"));
    }

    #[test]
    fn test_serializes_back_to_document_form() {
        let whitelist = ServiceWhitelist::new()
            .with_component("HDFS", "NAMENODE", ["jvm"])
            .with_service("YARN");
        assert_eq!(whitelist.to_value(), json!({"HDFS": {"NAMENODE": ["jvm"]}, "YARN": {}}));
    }

    #[test]
    fn test_absent_services_default() {
        assert_eq!(ServiceSelection::default(), ServiceSelection::Unrestricted);
        assert!(ServiceSelection::WHEN_ABSENT.whitelist().is_none());
    }
}
