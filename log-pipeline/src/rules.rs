use crate::pattern::Pattern;
use serde::{Deserialize, Serialize};

/// One entry of a log source's `log_processing_rules`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LogProcessingRule {
    /// A line matching `pattern` at its start begins a new logical record
    MultiLine { name: String, pattern: Pattern },
    /// Records matching `pattern` are dropped
    ExcludeAtMatch { name: String, pattern: Pattern },
    /// Only records matching `pattern` are kept
    IncludeAtMatch { name: String, pattern: Pattern },
    /// Every match of `pattern` is replaced by `replace_placeholder`
    MaskSequences {
        name: String,
        pattern: Pattern,
        replace_placeholder: String,
    },
}

impl LogProcessingRule {
    pub fn multi_line(name: impl Into<String>, pattern: Pattern) -> Self {
        LogProcessingRule::MultiLine {
            name: name.into(),
            pattern,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            LogProcessingRule::MultiLine { name, .. }
            | LogProcessingRule::ExcludeAtMatch { name, .. }
            | LogProcessingRule::IncludeAtMatch { name, .. }
            | LogProcessingRule::MaskSequences { name, .. } => name,
        }
    }

    pub fn pattern(&self) -> &Pattern {
        match self {
            LogProcessingRule::MultiLine { pattern, .. }
            | LogProcessingRule::ExcludeAtMatch { pattern, .. }
            | LogProcessingRule::IncludeAtMatch { pattern, .. }
            | LogProcessingRule::MaskSequences { pattern, .. } => pattern,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            LogProcessingRule::MultiLine { .. } => "multi_line",
            LogProcessingRule::ExcludeAtMatch { .. } => "exclude_at_match",
            LogProcessingRule::IncludeAtMatch { .. } => "include_at_match",
            LogProcessingRule::MaskSequences { .. } => "mask_sequences",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_tagged_rules() {
        let yaml = r#"
- type: multi_line
  name: new_log_start_with_date
  pattern: \d{4}\-\d{2}\-\d{2}
- type: mask_sequences
  name: mask_passwords
  pattern: password=\S+
  replace_placeholder: password=[MASKED]
"#;
        let rules: Vec<LogProcessingRule> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].kind(), "multi_line");
        assert_eq!(rules[0].name(), "new_log_start_with_date");
        assert_eq!(rules[0].pattern().as_str(), r"\d{4}\-\d{2}\-\d{2}");
        assert!(matches!(
            &rules[1],
            LogProcessingRule::MaskSequences { replace_placeholder, .. } if replace_placeholder == "password=[MASKED]"
        ));
    }

    #[test]
    fn test_unknown_rule_type_is_rejected() {
        let yaml = "type: drop_everything\nname: x\npattern: .*\n";
        assert!(serde_yaml::from_str::<LogProcessingRule>(yaml).is_err());
    }

    #[test]
    fn test_mask_sequences_requires_placeholder() {
        let yaml = "type: mask_sequences\nname: x\npattern: secret\n";
        assert!(serde_yaml::from_str::<LogProcessingRule>(yaml).is_err());
    }
}
