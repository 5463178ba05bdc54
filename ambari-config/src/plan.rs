//! What an agent should check for each discovered service and component.
//!
//! The plan combines the two `init_config` toggles with an instance's
//! [`ServiceSelection`]. Whitelist semantics:
//!
//! | whitelist entry                  | status | metrics   |
//! |----------------------------------|--------|-----------|
//! | service absent                   | no     | no        |
//! | service with `{}`                | yes    | no        |
//! | component absent                 | no     | no        |
//! | component with `[]`              | yes    | no        |
//! | component with `[jvm, rpc]`      | yes    | jvm, rpc  |
//!
//! "yes" is further gated by the matching toggle.

use crate::init::InitConfig;
use crate::whitelist::{MetricHeader, ServiceSelection};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "headers", rename_all = "snake_case")]
pub enum MetricSelection {
    All,
    Headers(Vec<MetricHeader>),
    Nothing,
}

impl MetricSelection {
    pub fn includes(&self, metric_path: &str) -> bool {
        match self {
            MetricSelection::All => true,
            MetricSelection::Headers(headers) => headers.iter().any(|header| header.matches(metric_path)),
            MetricSelection::Nothing => false,
        }
    }

    pub fn is_nothing(&self) -> bool {
        match self {
            MetricSelection::Nothing => true,
            MetricSelection::Headers(headers) => headers.is_empty(),
            MetricSelection::All => false,
        }
    }
}

/// Which components of a service are eligible
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "components", rename_all = "snake_case")]
pub enum ComponentScope {
    All,
    Listed(Vec<String>),
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServicePlan {
    pub check_status: bool,
    pub components: ComponentScope,
}

impl ServicePlan {
    fn skip() -> Self {
        Self {
            check_status: false,
            components: ComponentScope::None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        !self.check_status && self.components == ComponentScope::None
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentPlan {
    pub check_status: bool,
    pub metrics: MetricSelection,
}

impl ComponentPlan {
    fn skip() -> Self {
        Self {
            check_status: false,
            metrics: MetricSelection::Nothing,
        }
    }

    pub fn is_skipped(&self) -> bool {
        !self.check_status && self.metrics.is_nothing()
    }
}

/// Per-instance answers to "check this service/component?"
#[derive(Debug, Clone)]
pub struct CollectionPlan<'a> {
    collect_metrics: bool,
    collect_status: bool,
    selection: &'a ServiceSelection,
}

impl<'a> CollectionPlan<'a> {
    pub fn new(init: &InitConfig, selection: &'a ServiceSelection) -> Self {
        Self {
            collect_metrics: init.collect_service_metrics,
            collect_status: init.collect_service_status,
            selection,
        }
    }

    /// Both toggles off: nothing is collected and the whitelist is never read
    pub fn is_disabled(&self) -> bool {
        !self.collect_metrics && !self.collect_status
    }

    pub fn plan_service(&self, service: &str) -> ServicePlan {
        if self.is_disabled() {
            return ServicePlan::skip();
        }

        match self.selection {
            ServiceSelection::Unrestricted => ServicePlan {
                check_status: self.collect_status,
                components: ComponentScope::All,
            },
            ServiceSelection::Whitelist(whitelist) => match whitelist.components(service) {
                None => ServicePlan::skip(),
                Some(components) => ServicePlan {
                    check_status: self.collect_status,
                    components: if components.is_empty() {
                        ComponentScope::None
                    } else {
                        ComponentScope::Listed(components.keys().cloned().collect())
                    },
                },
            },
        }
    }

    pub fn plan_component(&self, service: &str, component: &str) -> ComponentPlan {
        if self.is_disabled() {
            return ComponentPlan::skip();
        }

        let metrics = match self.selection {
            ServiceSelection::Unrestricted => MetricSelection::All,
            ServiceSelection::Whitelist(whitelist) => match whitelist.headers(service, component) {
                None => return ComponentPlan::skip(),
                Some([]) => MetricSelection::Nothing,
                Some(headers) => MetricSelection::Headers(headers.to_vec()),
            },
        };

        ComponentPlan {
            check_status: self.collect_status,
            metrics: if self.collect_metrics { metrics } else { MetricSelection::Nothing },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::whitelist::ServiceWhitelist;
    use rstest::rstest;

    fn init(metrics: bool, status: bool) -> InitConfig {
        InitConfig {
            collect_service_metrics: metrics,
            collect_service_status: status,
            ..InitConfig::default()
        }
    }

    fn whitelist() -> ServiceSelection {
        ServiceSelection::Whitelist(
            ServiceWhitelist::new()
                .with_component("HDFS", "NAMENODE", ["jvm", "rpc"])
                .with_component("HDFS", "DATANODE", Vec::<String>::new())
                .with_service("YARN"),
        )
    }

    #[test]
    fn test_empty_headers_check_status_without_metrics() {
        let selection = whitelist();
        let plan = CollectionPlan::new(&init(true, true), &selection);
        let datanode = plan.plan_component("HDFS", "DATANODE");
        assert!(datanode.check_status);
        assert_eq!(datanode.metrics, MetricSelection::Nothing);
        assert!(!datanode.is_skipped());
    }

    #[test]
    fn test_service_without_components_is_status_only() {
        let selection = whitelist();
        let plan = CollectionPlan::new(&init(true, true), &selection);
        let yarn = plan.plan_service("YARN");
        assert!(yarn.check_status);
        assert_eq!(yarn.components, ComponentScope::None);
        assert!(plan.plan_component("YARN", "RESOURCEMANAGER").is_skipped());
    }

    #[test]
    fn test_listed_headers_are_selected() {
        let selection = whitelist();
        let plan = CollectionPlan::new(&init(true, false), &selection);
        let namenode = plan.plan_component("HDFS", "NAMENODE");
        assert!(!namenode.check_status);
        assert!(namenode.metrics.includes("metrics/jvm/memHeapUsedM"));
        assert!(!namenode.metrics.includes("metrics/dfs/FSNamesystem/CapacityUsed"));

        assert_eq!(
            plan.plan_service("HDFS").components,
            ComponentScope::Listed(vec!["DATANODE".to_string(), "NAMENODE".to_string()])
        );
    }

    #[rstest]
    #[case("ZOOKEEPER", "ZOOKEEPER_SERVER")]
    #[case("HDFS", "SECONDARY_NAMENODE")]
    fn test_unlisted_entries_are_skipped(#[case] service: &str, #[case] component: &str) {
        let selection = whitelist();
        let plan = CollectionPlan::new(&init(true, true), &selection);
        assert!(plan.plan_component(service, component).is_skipped());
    }

    #[test]
    fn test_unlisted_service_is_skipped() {
        let selection = whitelist();
        let plan = CollectionPlan::new(&init(true, true), &selection);
        assert!(plan.plan_service("ZOOKEEPER").is_skipped());
    }

    #[test]
    fn test_unrestricted_selects_everything() {
        let selection = ServiceSelection::WHEN_ABSENT;
        let plan = CollectionPlan::new(&init(true, false), &selection);
        assert_eq!(plan.plan_service("ZOOKEEPER").components, ComponentScope::All);

        let component = plan.plan_component("ZOOKEEPER", "ZOOKEEPER_SERVER");
        assert_eq!(component.metrics, MetricSelection::All);
        assert!(!component.check_status);
    }

    #[rstest]
    #[case(whitelist())]
    #[case(ServiceSelection::Unrestricted)]
    fn test_both_toggles_off_skip_everything(#[case] selection: ServiceSelection) {
        let plan = CollectionPlan::new(&init(false, false), &selection);
        assert!(plan.is_disabled());
        assert!(plan.plan_service("HDFS").is_skipped());
        assert!(plan.plan_component("HDFS", "NAMENODE").is_skipped());
    }

    #[test]
    fn test_metrics_toggle_off_keeps_status() {
        let selection = whitelist();
        let plan = CollectionPlan::new(&init(false, true), &selection);
        let namenode = plan.plan_component("HDFS", "NAMENODE");
        assert!(namenode.check_status);
        assert_eq!(namenode.metrics, MetricSelection::Nothing);
    }
}
