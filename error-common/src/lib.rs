//! Common error handling utilities for the Ambari check
//!
//! This module provides the error codes, error scopes and diagnostics shared
//! by the configuration and log-ingestion crates, plus the top-level error
//! type used by the operator tooling.
//!
//! # Error Categories
//!
//! - **Config**: missing required options, type mismatches, invalid values
//! - **Whitelist**: malformed service/component/metric-header subtrees
//! - **Logs**: invalid log sources and processing patterns
//! - **System**: watcher and internal failures
//!
//! Failures carry an [`ErrorScope`]: a failure is fatal for its scope only and
//! never for sibling instances or unrelated services.
//!
//! # Example
//!
//! ```rust
//! use error_common::{codes, Diagnostic, ErrorReporter, ErrorScope};
//!
//! let diagnostic = Diagnostic::warning(
//!     codes::config::UNKNOWN_OPTION,
//!     ErrorScope::key(Some(0), "colect_service_status"),
//!     "unknown option ignored",
//! );
//! let summary = ErrorReporter::new("example").report_all([&diagnostic]);
//! assert_eq!(summary.warnings, 1);
//! ```

pub mod types;
pub mod context;
pub mod codes;
pub mod reporting;

pub use types::*;
pub use context::*;
pub use reporting::*;
