//! Log ingestion rules for the Ambari check
//!
//! Declares where Ambari server logs are read from ([`LogSource`]), how their
//! lines are processed ([`LogProcessingRule`]) and implements the processing
//! itself:
//! - routing discovered files to the first matching source ([`LogRouter`])
//! - multi-line coalescing ([`MultiLineAggregator`])
//! - exclusion, inclusion and masking of records ([`LineProcessor`])
//!
//! Shipping records anywhere is the agent's business; this crate stops at
//! producing [`LogRecord`]s.
//!
//! # Example
//!
//! ```rust
//! use log_pipeline::{LineProcessor, LogProcessingRule, LogSource, Pattern};
//!
//! let source = LogSource::file("/var/log/ambari-server/ambari-alerts.log", "ambari", "ambari")
//!     .with_rule(LogProcessingRule::multi_line(
//!         "new_log_start_with_date",
//!         Pattern::new(r"\d{4}\-\d{2}\-\d{2}")?,
//!     ));
//!
//! let mut processor = LineProcessor::from_source(&source)?;
//! let records = processor.process([
//!     "2024-03-01 10:00:00 CRITICAL [HDFS] NameNode Web UI",
//!     "Connection failed to http://nn1:50070",
//!     "2024-03-01 10:01:00 OK [HDFS] NameNode Web UI",
//! ]);
//! assert_eq!(records.len(), 2);
//! assert_eq!(records[0].line_count, 2);
//! # Ok::<(), log_pipeline::LogPipelineError>(())
//! ```

pub mod error;
pub mod pattern;
pub mod rules;
pub mod source;
pub mod router;
pub mod multiline;
pub mod processor;

pub use error::*;
pub use pattern::Pattern;
pub use rules::LogProcessingRule;
pub use source::{LogSource, LogSourceType};
pub use router::LogRouter;
pub use multiline::{Coalesced, MultiLineAggregator};
pub use processor::{LineProcessor, LogRecord};
