//! Configuration schema, validation and loading for the Ambari check
//!
//! This crate describes everything an agent needs to know about the
//! configuration of the Ambari integration:
//! - The schema document: every `init_config` and `instances` option with its
//!   type, default, example and description
//! - Validation of user documents with per-instance failure isolation
//! - The typed `services` whitelist and the collection plan derived from it
//! - Loading from files and the environment, with hot reload
//! - Rendering of a commented `conf.yaml.example`
//!
//! # Example
//!
//! ```rust
//! use ambari_config::{CheckConfig, SchemaDocument};
//! use serde_json::json;
//!
//! let schema = SchemaDocument::ambari()?;
//! let config = CheckConfig::from_value(
//!     &json!({
//!         "init_config": {"collect_service_status": true},
//!         "instances": [{
//!             "url": "http://localhost:8080",
//!             "services": {"HDFS": {"NAMENODE": ["jvm"], "DATANODE": []}}
//!         }]
//!     }),
//!     &schema,
//! )?;
//!
//! let (_, instance) = config.valid_instances().next().expect("one valid instance");
//! let plan = config.plan_for(instance);
//! assert!(plan.plan_component("HDFS", "DATANODE").check_status);
//! assert!(plan.plan_component("YARN", "RESOURCEMANAGER").is_skipped());
//! # Ok::<(), ambari_config::ConfigError>(())
//! ```

pub mod document;
pub mod engine;
pub mod error;
pub mod init;
pub mod instance;
pub mod plan;
pub mod providers;
pub mod schema;
pub mod templates;
pub mod validation;
pub mod value;
pub mod watchers;
pub mod whitelist;

pub use document::{CheckConfig, InstanceOutcome};
pub use engine::ConfigEngine;
pub use error::*;
pub use init::InitConfig;
pub use instance::{AuthType, BasicAuth, InstanceConfig};
pub use plan::{CollectionPlan, ComponentPlan, ComponentScope, MetricSelection, ServicePlan};
pub use providers::*;
pub use schema::{OptionSpec, SchemaDocument, Scope, ValueSpec};
pub use templates::ConfigTemplate;
pub use validation::{ConfigValidator, SchemaValidator, ValidatedOptions};
pub use value::ValueType;
pub use watchers::{ConfigStore, ConfigWatcher};
pub use whitelist::{MetricHeader, ServiceSelection, ServiceWhitelist};
