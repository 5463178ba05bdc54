use crate::error::{LogPipelineError, Result};
use crate::processor::LineProcessor;
use crate::source::{LogSource, LogSourceType};
use std::path::Path;

/// Matches discovered log files against `file` log sources in document order
pub struct LogRouter {
    routes: Vec<(glob::Pattern, LogSource)>,
}

impl LogRouter {
    pub fn new(sources: &[LogSource]) -> Result<Self> {
        let mut routes = Vec::new();
        for source in sources {
            if source.source_type != LogSourceType::File {
                continue;
            }
            source.validate()?;
            let path = source.path.as_deref().unwrap_or_default();
            let pattern = glob::Pattern::new(path).map_err(|e| LogPipelineError::InvalidPattern {
                pattern: path.to_string(),
                reason: e.to_string(),
            })?;
            routes.push((pattern, source.clone()));
        }
        Ok(Self { routes })
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// The first source whose path pattern matches `path`
    pub fn route(&self, path: &Path) -> Option<&LogSource> {
        let matched = self
            .routes
            .iter()
            .find(|(pattern, _)| pattern.matches_path(path))
            .map(|(_, source)| source);

        match matched {
            Some(source) => tracing::debug!(
                path = %path.display(),
                source = source.source.as_deref().unwrap_or_default(),
                "Log file routed"
            ),
            None => tracing::debug!(path = %path.display(), "No log source matches file"),
        }
        matched
    }

    /// A processor for `path`: the matching source's rules, or one record per line
    pub fn processor_for(&self, path: &Path) -> Result<LineProcessor> {
        match self.route(path) {
            Some(source) => LineProcessor::from_source(source),
            None => Ok(LineProcessor::passthrough()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Pattern;
    use crate::rules::LogProcessingRule;

    fn sources() -> Vec<LogSource> {
        vec![
            LogSource::file("/var/log/ambari-server/ambari-alerts.log", "ambari", "alerts"),
            LogSource::file("/var/log/ambari-server/*.log", "ambari", "catch-all").with_rule(
                LogProcessingRule::multi_line("date", Pattern::new(r"\d{4}-\d{2}-\d{2}").unwrap()),
            ),
            LogSource::file("/var/log/ambari-server/ambari-server.log", "ambari", "never-reached"),
        ]
    }

    #[test]
    fn test_first_match_in_document_order_wins() {
        let router = LogRouter::new(&sources()).unwrap();
        assert_eq!(router.len(), 3);

        let alerts = router.route(Path::new("/var/log/ambari-server/ambari-alerts.log")).unwrap();
        assert_eq!(alerts.service.as_deref(), Some("alerts"));

        let server = router.route(Path::new("/var/log/ambari-server/ambari-server.log")).unwrap();
        assert_eq!(server.service.as_deref(), Some("catch-all"));
    }

    #[test]
    fn test_unmatched_file_gets_passthrough_processor() {
        let router = LogRouter::new(&sources()).unwrap();
        assert!(router.route(Path::new("/var/log/messages")).is_none());

        let mut processor = router.processor_for(Path::new("/var/log/messages")).unwrap();
        let records = processor.process(["2024-03-01 a", "b"]);
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_non_file_sources_are_not_routed() {
        let tcp: LogSource = serde_json::from_value(serde_json::json!({
            "type": "tcp", "port": 10518, "source": "ambari"
        }))
        .unwrap();
        let router = LogRouter::new(&[tcp]).unwrap();
        assert!(router.is_empty());
    }

    #[test]
    fn test_invalid_glob_is_rejected() {
        let source = LogSource::file("/var/log/[ambari.log", "ambari", "ambari");
        assert!(matches!(
            LogRouter::new(&[source]),
            Err(LogPipelineError::InvalidPattern { .. })
        ));
    }
}
