use crate::error::Result;
use crate::multiline::{Coalesced, MultiLineAggregator};
use crate::rules::LogProcessingRule;
use crate::source::LogSource;
use regex::Regex;
use serde::Serialize;
use std::io::BufRead;

/// A logical log record after coalescing and processing rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogRecord {
    pub content: String,
    pub line_count: usize,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub truncated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

enum RecordRule {
    Exclude(Regex),
    Include(Regex),
    Mask(Regex, String),
}

/// Turns physical lines into processed [`LogRecord`]s for one log source.
///
/// Multi-line aggregation runs first; exclusion, inclusion and masking rules
/// then run on each completed record in the order they were declared.
pub struct LineProcessor {
    aggregator: Option<MultiLineAggregator>,
    rules: Vec<RecordRule>,
    source: Option<String>,
    service: Option<String>,
    tags: Vec<String>,
    dropped: usize,
}

impl LineProcessor {
    /// Each physical line is its own record, nothing is filtered
    pub fn passthrough() -> Self {
        Self {
            aggregator: None,
            rules: Vec::new(),
            source: None,
            service: None,
            tags: Vec::new(),
            dropped: 0,
        }
    }

    pub fn from_source(source: &LogSource) -> Result<Self> {
        let aggregator = match source.multi_line_rule() {
            Some(rule) => Some(MultiLineAggregator::new(rule.pattern())?),
            None => None,
        };

        let rules = source
            .log_processing_rules
            .iter()
            .filter_map(|rule| match rule {
                LogProcessingRule::MultiLine { .. } => None,
                LogProcessingRule::ExcludeAtMatch { pattern, .. } => {
                    Some(RecordRule::Exclude(pattern.regex().clone()))
                }
                LogProcessingRule::IncludeAtMatch { pattern, .. } => {
                    Some(RecordRule::Include(pattern.regex().clone()))
                }
                LogProcessingRule::MaskSequences {
                    pattern,
                    replace_placeholder,
                    ..
                } => Some(RecordRule::Mask(pattern.regex().clone(), replace_placeholder.clone())),
            })
            .collect();

        Ok(Self {
            aggregator,
            rules,
            source: source.source.clone(),
            service: source.service.clone(),
            tags: source.tags.clone(),
            dropped: 0,
        })
    }

    /// Replace the aggregator, e.g. to set a size limit or flush timeout
    pub fn with_aggregator(mut self, aggregator: MultiLineAggregator) -> Self {
        self.aggregator = Some(aggregator);
        self
    }

    /// Number of records removed by exclusion or inclusion rules so far
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn push_line(&mut self, line: &str) -> Option<LogRecord> {
        let coalesced = match self.aggregator.as_mut() {
            Some(aggregator) => aggregator.push(line)?,
            None => Coalesced {
                content: line.strip_suffix('\r').unwrap_or(line).to_string(),
                line_count: 1,
                truncated: false,
            },
        };
        self.apply(coalesced)
    }

    /// Releases a record still held by the aggregator
    pub fn finish(&mut self) -> Option<LogRecord> {
        let coalesced = self.aggregator.as_mut()?.flush()?;
        self.apply(coalesced)
    }

    pub fn process<I, S>(&mut self, lines: I) -> Vec<LogRecord>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut records: Vec<LogRecord> = lines
            .into_iter()
            .filter_map(|line| self.push_line(line.as_ref()))
            .collect();
        records.extend(self.finish());
        records
    }

    /// Reads `reader` to the end. Invalid UTF-8 is replaced, not rejected.
    pub fn process_reader<R: BufRead>(&mut self, mut reader: R) -> Result<Vec<LogRecord>> {
        let mut records = Vec::new();
        let mut buffer = Vec::new();
        loop {
            buffer.clear();
            if reader.read_until(b'\n', &mut buffer)? == 0 {
                break;
            }
            let bytes = buffer.strip_suffix(b"\n").unwrap_or(&buffer[..]);
            records.extend(self.push_line(&String::from_utf8_lossy(bytes)));
        }
        records.extend(self.finish());
        Ok(records)
    }

    fn apply(&mut self, coalesced: Coalesced) -> Option<LogRecord> {
        let mut content = coalesced.content;
        for rule in &self.rules {
            match rule {
                RecordRule::Exclude(regex) if regex.is_match(&content) => {
                    self.dropped += 1;
                    return None;
                }
                RecordRule::Include(regex) if !regex.is_match(&content) => {
                    self.dropped += 1;
                    return None;
                }
                RecordRule::Mask(regex, placeholder) => {
                    content = regex.replace_all(&content, placeholder.as_str()).into_owned();
                }
                _ => {}
            }
        }

        Some(LogRecord {
            content,
            line_count: coalesced.line_count,
            truncated: coalesced.truncated,
            source: self.source.clone(),
            service: self.service.clone(),
            tags: self.tags.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Pattern;

    fn pattern(source: &str) -> Pattern {
        Pattern::new(source).unwrap()
    }

    #[test]
    fn test_passthrough_keeps_every_line() {
        let mut processor = LineProcessor::passthrough();
        let records = processor.process(["a", "b", "c"]);

        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|record| record.line_count == 1));
    }

    #[test]
    fn test_source_without_multi_line_rule_emits_physical_lines() {
        let source = LogSource::file("/var/log/ambari-server/ambari-audit.log", "ambari", "ambari");
        let mut processor = LineProcessor::from_source(&source).unwrap();
        let records = processor.process(["2024-03-01 a", "continued"]);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].source.as_deref(), Some("ambari"));
        assert_eq!(records[1].service.as_deref(), Some("ambari"));
    }

    #[test]
    fn test_rules_run_in_declared_order_after_coalescing() {
        let source = LogSource::file("/var/log/ambari-server/ambari-server.log", "ambari", "ambari")
            .with_rule(LogProcessingRule::ExcludeAtMatch {
                name: "drop_debug".to_string(),
                pattern: pattern("DEBUG"),
            })
            .with_rule(LogProcessingRule::MaskSequences {
                name: "mask_passwords".to_string(),
                pattern: pattern(r"password=\S+"),
                replace_placeholder: "password=[MASKED]".to_string(),
            })
            .with_rule(LogProcessingRule::multi_line("date", pattern(r"\d{4}-\d{2}-\d{2}")));

        let mut processor = LineProcessor::from_source(&source).unwrap();
        let records = processor.process([
            "2024-03-01 10:00:00 DEBUG heartbeat",
            "2024-03-01 10:00:01 INFO login user=admin",
            "  with password=hunter2",
            "2024-03-01 10:00:02 WARN slow response",
        ]);

        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0].content,
            "2024-03-01 10:00:01 INFO login user=admin\n  with password=[MASKED]"
        );
        assert_eq!(records[0].line_count, 2);
        assert_eq!(processor.dropped(), 1);
    }

    #[test]
    fn test_include_at_match_keeps_only_matching_records() {
        let source = LogSource::file("/var/log/ambari-server/ambari-alerts.log", "ambari", "ambari")
            .with_rule(LogProcessingRule::IncludeAtMatch {
                name: "critical_only".to_string(),
                pattern: pattern("CRITICAL"),
            });

        let mut processor = LineProcessor::from_source(&source).unwrap();
        let records = processor.process(["OK host1", "CRITICAL host2", "WARNING host3"]);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].content, "CRITICAL host2");
    }

    #[test]
    fn test_process_reader() {
        let source = LogSource::file("/tmp/x.log", "ambari", "ambari")
            .with_rule(LogProcessingRule::multi_line("date", pattern(r"\d{4}-\d{2}-\d{2}")));
        let mut processor = LineProcessor::from_source(&source).unwrap();

        let input = "2024-03-01 a\nb\n2024-03-02 c\n";
        let records = processor.process_reader(input.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].content, "2024-03-01 a\nb");
    }

    #[test]
    fn test_invalid_utf8_is_replaced_not_fatal() {
        let source = LogSource::file("/var/log/ambari-server/ambari-server.log", "ambari", "ambari")
            .with_rule(LogProcessingRule::multi_line("date", pattern(r"\d{4}-\d{2}-\d{2}")));
        let mut processor = LineProcessor::from_source(&source).unwrap();
        let input: &[u8] = b"2024-03-01 a\nb\n2024-03-02 caf\xe9\r\n  more\n2024-03-03 d";
        let records = processor.process_reader(std::io::Cursor::new(input)).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].content, "2024-03-01 a\nb");
        assert_eq!(records[1].content, "2024-03-02 caf\u{FFFD}\n  more");
        assert_eq!(records[2].content, "2024-03-03 d");
    }
}
