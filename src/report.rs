// SPDX-License-Identifier: MIT
//! Reporting and progress collaborators.
//!
//! The engine never formats or persists anything itself: every finding is
//! pushed through a [`ReportSink`], and queue movement is surfaced through
//! an optional [`ProgressObserver`]. [`MemorySink`] collects entries for
//! later rendering; [`TracingSink`] forwards them to the `tracing`
//! subscriber.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Severity ─────────────────────────────────────────────────────────────────

/// Report entry severity, lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Fatal => "fatal",
        };
        f.write_str(name)
    }
}

// ── LogEntry ─────────────────────────────────────────────────────────────────

/// One reported finding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub severity: Severity,
    /// Did the reported check succeed? Independent of severity — an info
    /// entry can still record a failed check.
    pub success: bool,
    pub message: String,
    /// Nesting depth of the reporting job, for indented rendering.
    pub level: u32,
    pub timestamp: DateTime<Utc>,
}

// ── ReportSink ───────────────────────────────────────────────────────────────

/// Receives every result the dispatcher and its analyzers report.
pub trait ReportSink {
    fn add_result(&mut self, severity: Severity, success: bool, message: &str, level: u32);
}

/// Collects entries in memory for the embedder to render after the run.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Vec<LogEntry>,
}

impl MemorySink {
    pub fn new() -> Self {
        MemorySink::default()
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }
}

impl ReportSink for MemorySink {
    fn add_result(&mut self, severity: Severity, success: bool, message: &str, level: u32) {
        self.entries.push(LogEntry {
            severity,
            success,
            message: message.to_string(),
            level,
            timestamp: Utc::now(),
        });
    }
}

// The engine is single-threaded, so a shared sink handle is just Rc/RefCell.
// Lets an embedder keep reading a MemorySink it handed to the dispatcher.
impl<S: ReportSink> ReportSink for std::rc::Rc<std::cell::RefCell<S>> {
    fn add_result(&mut self, severity: Severity, success: bool, message: &str, level: u32) {
        self.borrow_mut().add_result(severity, success, message, level);
    }
}

/// Forwards entries to the active `tracing` subscriber.
#[derive(Debug, Default)]
pub struct TracingSink;

impl ReportSink for TracingSink {
    fn add_result(&mut self, severity: Severity, success: bool, message: &str, level: u32) {
        match severity {
            Severity::Debug => tracing::debug!(success, level, "{message}"),
            Severity::Info => tracing::info!(success, level, "{message}"),
            Severity::Warning => tracing::warn!(success, level, "{message}"),
            Severity::Error | Severity::Fatal => tracing::error!(success, level, "{message}"),
        }
    }
}

// ── ProgressObserver ─────────────────────────────────────────────────────────

/// Optional queue-movement notifications for UI or telemetry.
///
/// Called once after seeding and once after every completed job; the final
/// call of a run always observes `queued == 0`.
pub trait ProgressObserver {
    fn on_queue_changed(&mut self, queued: usize, finished: usize);
}

impl<F: FnMut(usize, usize)> ProgressObserver for F {
    fn on_queue_changed(&mut self, queued: usize, finished: usize) {
        self(queued, finished)
    }
}
