//! Multi-line record coalescing.
//!
//! A line whose start matches the rule's pattern begins a new logical record;
//! every following line that does not match is appended to the current
//! record. Lines seen before the first match are coalesced into a record of
//! their own.

use crate::error::Result;
use crate::pattern::Pattern;
use regex::Regex;
use std::time::{Duration, Instant};

/// Largest record kept in one piece before it is split
pub const DEFAULT_MAX_RECORD_BYTES: usize = 256 * 1024;

/// A completed logical record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coalesced {
    pub content: String,
    pub line_count: usize,
    /// The record was cut at the size limit and continues in the next one
    pub truncated: bool,
}

pub struct MultiLineAggregator {
    start: Regex,
    buffer: String,
    line_count: usize,
    max_record_bytes: usize,
    flush_timeout: Option<Duration>,
    last_append: Option<Instant>,
}

impl MultiLineAggregator {
    pub fn new(pattern: &Pattern) -> Result<Self> {
        Ok(Self {
            start: pattern.anchored()?,
            buffer: String::new(),
            line_count: 0,
            max_record_bytes: DEFAULT_MAX_RECORD_BYTES,
            flush_timeout: None,
            last_append: None,
        })
    }

    pub fn with_max_record_bytes(mut self, max_record_bytes: usize) -> Self {
        self.max_record_bytes = max_record_bytes.max(1);
        self
    }

    /// Pending records older than `timeout` are released by [`poll`](Self::poll)
    pub fn with_flush_timeout(mut self, timeout: Duration) -> Self {
        self.flush_timeout = Some(timeout);
        self
    }

    pub fn has_pending(&self) -> bool {
        self.line_count > 0
    }

    pub fn push(&mut self, line: &str) -> Option<Coalesced> {
        self.push_at(line, Instant::now())
    }

    /// Feed one physical line; returns the record this line completed, if any.
    pub fn push_at(&mut self, line: &str, now: Instant) -> Option<Coalesced> {
        let line = line.strip_suffix('\r').unwrap_or(line);
        self.last_append = Some(now);

        if !self.has_pending() {
            self.begin(line);
            return None;
        }

        if self.start.is_match(line) {
            let completed = self.take(false);
            self.begin(line);
            return completed;
        }

        if self.buffer.len() + 1 + line.len() > self.max_record_bytes {
            let completed = self.take(true);
            self.begin(line);
            return completed;
        }

        self.buffer.push('\n');
        self.buffer.push_str(line);
        self.line_count += 1;
        None
    }

    /// Releases the pending record if it has waited longer than the flush timeout
    pub fn poll(&mut self, now: Instant) -> Option<Coalesced> {
        let timeout = self.flush_timeout?;
        let last_append = self.last_append?;
        if self.has_pending() && now.saturating_duration_since(last_append) >= timeout {
            tracing::trace!(lines = self.line_count, "Flushing multi-line record after timeout");
            return self.flush();
        }
        None
    }

    pub fn flush(&mut self) -> Option<Coalesced> {
        self.take(false)
    }

    fn begin(&mut self, line: &str) {
        self.buffer.clear();
        self.buffer.push_str(line);
        self.line_count = 1;
    }

    fn take(&mut self, truncated: bool) -> Option<Coalesced> {
        if !self.has_pending() {
            return None;
        }
        let line_count = std::mem::take(&mut self.line_count);
        Some(Coalesced {
            content: std::mem::take(&mut self.buffer),
            line_count,
            truncated,
        })
    }
}
