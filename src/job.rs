// SPDX-License-Identifier: MIT
//! Jobs, the pending queue, and the finished ledger.
//!
//! A [`Job`] is one scheduled `(analyzer, level, target)` unit of work. The
//! [`JobQueue`] is FIFO-consumed but supports insertion at arbitrary
//! positions, which is how children land directly behind their discovering
//! parent. Jobs popped from the queue move to the [`FinishedLedger`], which
//! is append-only for the lifetime of a run and backs the dedup check.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::analyzer::{Analyzer, AnalyzerId};

// ── Job ──────────────────────────────────────────────────────────────────────

/// One scheduled unit of analysis work. Immutable once created; only the
/// dispatcher creates jobs.
#[derive(Clone)]
pub struct Job {
    analyzer: Arc<dyn Analyzer>,
    level: u32,
    target: String,
}

impl Job {
    pub(crate) fn new(analyzer: Arc<dyn Analyzer>, level: u32, target: impl Into<String>) -> Self {
        Job {
            analyzer,
            level,
            target: target.into(),
        }
    }

    pub fn analyzer(&self) -> &Arc<dyn Analyzer> {
        &self.analyzer
    }

    /// The scheduled analyzer's stable identity.
    pub fn analyzer_id(&self) -> &AnalyzerId {
        &self.analyzer.descriptor().id
    }

    /// Nesting depth: 0 for seeded jobs, parent + 1 for discovered ones.
    pub fn level(&self) -> u32 {
        self.level
    }

    /// The artifact under analysis (an opaque path string to the engine).
    pub fn target(&self) -> &str {
        &self.target
    }

    fn matches(&self, id: &AnalyzerId, target: &str) -> bool {
        self.analyzer_id() == id && self.target == target
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file_name = Path::new(&self.target)
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| self.target.as_str().into());
        write!(f, "{} — {}", self.analyzer_id(), file_name)
    }
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job")
            .field("analyzer", &self.analyzer_id())
            .field("level", &self.level)
            .field("target", &self.target)
            .finish()
    }
}

// ── JobQueue ─────────────────────────────────────────────────────────────────

/// Ordered queue of pending jobs.
#[derive(Debug, Default)]
pub struct JobQueue {
    jobs: Vec<Job>,
}

impl JobQueue {
    pub fn new() -> Self {
        JobQueue::default()
    }

    /// Append at the tail (seeding path).
    pub fn push_back(&mut self, job: Job) {
        self.jobs.push(job);
    }

    /// Insert at an explicit position (expansion path — children go directly
    /// behind their parent, independent of FIFO consumption).
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(&mut self, index: usize, job: Job) {
        self.jobs.insert(index, job);
    }

    /// Remove and return the head job.
    ///
    /// # Panics
    ///
    /// Panics when the queue is empty. The dispatch loop always checks
    /// [`has_next`](crate::dispatcher::Dispatcher::has_next) first; an empty
    /// pop is an engine defect, not a runtime condition.
    pub fn pop_front(&mut self) -> Job {
        if self.jobs.is_empty() {
            panic!("pop_front on an empty job queue (dispatch loop invariant violated)");
        }
        self.jobs.remove(0)
    }

    /// The head job, if any, without removing it.
    pub fn peek(&self) -> Option<&Job> {
        self.jobs.first()
    }

    /// Is a job for `(id, target)` pending?
    pub fn contains(&self, id: &AnalyzerId, target: &str) -> bool {
        self.position_of(id, target).is_some()
    }

    /// Queue position of the pending job for `(id, target)`, if any.
    pub fn position_of(&self, id: &AnalyzerId, target: &str) -> Option<usize> {
        self.jobs.iter().position(|job| job.matches(id, target))
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Job> {
        self.jobs.iter()
    }
}

// ── FinishedLedger ───────────────────────────────────────────────────────────

/// Append-only record of completed jobs.
///
/// Every job that leaves the queue lands here exactly once, whatever its
/// outcome, and the record is never pruned mid-run — that is what makes the
/// "analyze each artifact at most once" guarantee hold across the whole
/// traversal.
#[derive(Debug, Default)]
pub struct FinishedLedger {
    jobs: Vec<Job>,
}

impl FinishedLedger {
    pub fn new() -> Self {
        FinishedLedger::default()
    }

    pub(crate) fn push(&mut self, job: Job) {
        self.jobs.push(job);
    }

    /// Has `(id, target)` already completed this run?
    pub fn contains(&self, id: &AnalyzerId, target: &str) -> bool {
        self.jobs.iter().any(|job| job.matches(id, target))
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Completed jobs, in completion order.
    pub fn iter(&self) -> impl Iterator<Item = &Job> {
        self.jobs.iter()
    }
}
