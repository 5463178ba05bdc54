use crate::document::CheckConfig;
use crate::error::{ConfigError, Result};
use crate::providers::{merge_values, ConfigProvider, EnvProvider, FileProvider};
use crate::schema::SchemaDocument;
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::Arc;

/// Merges configuration providers and validates the result.
///
/// Providers are applied in the order they were added; later providers
/// override earlier ones.
pub struct ConfigEngine {
    providers: Vec<Box<dyn ConfigProvider>>,
    schema: Arc<SchemaDocument>,
    default_logs: bool,
}

impl ConfigEngine {
    pub fn new(schema: SchemaDocument) -> Self {
        Self {
            providers: Vec::new(),
            schema: Arc::new(schema),
            default_logs: false,
        }
    }

    /// Engine for the built-in Ambari schema
    pub fn for_ambari() -> Result<Self> {
        Ok(Self::new(SchemaDocument::ambari()?))
    }

    /// The usual agent setup: a `conf.yaml` file overridden by `AMBARI_*` variables
    pub fn for_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::for_ambari()?
            .add_source(FileProvider::new(path.as_ref()))
            .add_source(EnvProvider::new()))
    }

    pub fn add_source(mut self, provider: impl ConfigProvider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    /// Fall back to the schema's example log sources when the document has none
    pub fn with_default_logs(mut self, enabled: bool) -> Self {
        self.default_logs = enabled;
        self
    }

    pub fn schema(&self) -> &SchemaDocument {
        &self.schema
    }

    pub fn sources(&self) -> Vec<String> {
        self.providers.iter().map(|provider| provider.name()).collect()
    }

    /// The merged, unvalidated document
    pub fn load_document(&self) -> Result<Value> {
        if self.providers.is_empty() {
            return Err(ConfigError::SourceNotFound("no configuration sources".to_string()));
        }

        let mut document = Value::Object(Map::new());
        for provider in &self.providers {
            let layer = provider.load()?;
            tracing::debug!(source = %provider.name(), "Configuration source loaded");
            merge_values(&mut document, layer);
        }
        Ok(document)
    }

    pub fn build(&self) -> Result<CheckConfig> {
        let document = self.load_document()?;
        let mut config = CheckConfig::from_value(&document, &self.schema)?;

        if self.default_logs && config.logs.is_empty() {
            config.logs = self.schema.default_logs();
            tracing::debug!(logs = config.logs.len(), "Default log sources applied");
        }

        tracing::info!(
            sources = ?self.sources(),
            instances = config.instances.len(),
            failed = config.failed_instances().count(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Re-reads every provider and validates again
    pub fn reload(&self) -> Result<CheckConfig> {
        tracing::info!("Reloading configuration");
        self.build()
    }
}
