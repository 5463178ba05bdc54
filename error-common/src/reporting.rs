// Error reporting utilities
// Diagnostics collected while loading a configuration and their tracing output

use crate::context::{ErrorScope, Severity};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A recoverable or scoped failure discovered while processing a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: String,
    pub severity: Severity,
    pub scope: ErrorScope,
    pub message: String,
}

impl Diagnostic {
    pub fn warning(code: &str, scope: ErrorScope, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            severity: Severity::Warning,
            scope,
            message: message.into(),
        }
    }

    pub fn error(code: &str, scope: ErrorScope, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            severity: Severity::Error,
            scope,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} at {}: {}", self.code, self.severity, self.scope, self.message)
    }
}

/// Counts produced by [`ErrorReporter::report_all`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportSummary {
    pub warnings: usize,
    pub errors: usize,
}

pub struct ErrorReporter {
    component: &'static str,
}

impl ErrorReporter {
    pub fn new(component: &'static str) -> Self {
        Self { component }
    }

    pub fn report(&self, diagnostic: &Diagnostic) {
        match diagnostic.severity {
            Severity::Warning => tracing::warn!(
                component = self.component,
                error_code = %diagnostic.code,
                scope = %diagnostic.scope,
                "{}",
                diagnostic.message
            ),
            Severity::Error => tracing::error!(
                component = self.component,
                error_code = %diagnostic.code,
                scope = %diagnostic.scope,
                "{}",
                diagnostic.message
            ),
        }
    }

    pub fn report_all<'a, I>(&self, diagnostics: I) -> ReportSummary
    where
        I: IntoIterator<Item = &'a Diagnostic>,
    {
        let mut summary = ReportSummary::default();
        for diagnostic in diagnostics {
            self.report(diagnostic);
            match diagnostic.severity {
                Severity::Warning => summary.warnings += 1,
                Severity::Error => summary.errors += 1,
            }
        }
        summary
    }
}
