// SPDX-License-Identifier: MIT
//! The dispatcher: per-run session owning the queue and the ledger.
//!
//! A run is seeded with every enabled non-leaf analyzer that supports the
//! user-selected target, then driven by [`Dispatcher::run_next`] until the
//! queue is empty. Executing analyzers discover further artifacts and hand
//! them back through [`Host::expand_from`], which resolves matching
//! analyzers and inserts their jobs directly behind the discovering one —
//! FIFO consumption then visits children in a contiguous block after their
//! parent, which is exactly the order a nested report wants.
//!
//! Analyzer failures stay local to their job: an error return, an
//! `anyhow` fault, or a panic is reported and the job retired to the
//! ledger; the traversal continues.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;

use crate::analyzer::Host;
use crate::artifact::KindSet;
use crate::job::{FinishedLedger, Job, JobQueue};
use crate::registry::{AnalyzerRegistry, EnabledAnalyzers};
use crate::report::{ProgressObserver, ReportSink, Severity};

// ── Dispatcher ───────────────────────────────────────────────────────────────

/// Owns one run's queue, ledger, and collaborator hooks.
///
/// Fresh per invocation — two dispatchers over the same registry are fully
/// independent runs.
pub struct Dispatcher {
    registry: Arc<AnalyzerRegistry>,
    enabled: EnabledAnalyzers,
    queue: JobQueue,
    ledger: FinishedLedger,
    report: Box<dyn ReportSink>,
    progress: Option<Box<dyn ProgressObserver>>,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<AnalyzerRegistry>,
        enabled: EnabledAnalyzers,
        report: Box<dyn ReportSink>,
    ) -> Self {
        Dispatcher {
            registry,
            enabled,
            queue: JobQueue::new(),
            ledger: FinishedLedger::new(),
            report,
            progress: None,
        }
    }

    /// Attach a progress observer (queue/finished counts after every
    /// completed job).
    pub fn with_progress(mut self, progress: Box<dyn ProgressObserver>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Pending jobs.
    pub fn queue(&self) -> &JobQueue {
        &self.queue
    }

    /// Completed jobs, in completion order.
    pub fn ledger(&self) -> &FinishedLedger {
        &self.ledger
    }

    /// The toggle map consulted before scheduling. Mutable so an embedder
    /// can flip analyzers between runs of `run_next`.
    pub fn enabled_mut(&mut self) -> &mut EnabledAnalyzers {
        &mut self.enabled
    }

    // ── Seeding ──────────────────────────────────────────────────────────────

    /// Enqueue level-0 jobs for a user-selected target.
    ///
    /// Every enabled analyzer (any role) that supports `target` is seeded,
    /// except leaf analyzers: a leaf can never expand the graph, so a
    /// leaf-only run could not discover anything beyond the raw target.
    /// Leaves become reachable once a seeded analyzer expands the target.
    ///
    /// Returns the number of jobs enqueued.
    pub fn seed(&mut self, target: &str) -> usize {
        let mut seeded = 0;
        let registry = Arc::clone(&self.registry);
        for analyzer in registry.all() {
            let descriptor = analyzer.descriptor();
            if descriptor.is_leaf {
                continue;
            }
            if !self.enabled.is_enabled(&descriptor.id) {
                continue;
            }
            if self.queue.contains(&descriptor.id, target)
                || self.ledger.contains(&descriptor.id, target)
            {
                continue;
            }
            if !analyzer.supports(target) {
                continue;
            }
            tracing::debug!(analyzer = %descriptor.id, path = target, "seed job queued");
            self.queue.push_back(Job::new(analyzer.clone(), 0, target));
            seeded += 1;
        }
        tracing::info!(path = target, seeded, "run seeded");
        self.notify_progress();
        seeded
    }

    // ── Execution loop ───────────────────────────────────────────────────────

    /// Is there a pending job?
    pub fn has_next(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Initialize and execute the head job, retire it to the ledger, and
    /// report its outcome. Returns whether more jobs remain.
    ///
    /// The job is popped only after execution, whatever happens, so a
    /// faulting or panicking analyzer can never wedge the queue into an
    /// endless retry.
    ///
    /// # Panics
    ///
    /// Panics when the queue is empty; callers check [`has_next`] first.
    pub fn run_next(&mut self) -> bool {
        let job = self
            .queue
            .peek()
            .expect("run_next on an empty job queue (check has_next first)")
            .clone();
        let analyzer = job.analyzer().clone();
        let id = job.analyzer_id().clone();
        let queued_before = self.queue.len();

        tracing::info!(analyzer = %id, path = job.target(), level = job.level(), "job started");

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            analyzer.initialize(&mut *self)?;
            analyzer.execute(&job, &mut *self)
        }));

        match outcome {
            Ok(Ok(true)) => {
                let scheduled = self.queue.len().saturating_sub(queued_before);
                if scheduled > 0 {
                    self.add_result(
                        Severity::Info,
                        true,
                        &format!("scheduled {scheduled} new analysis jobs"),
                        job.level(),
                    );
                }
            }
            Ok(Ok(false)) => {
                self.add_result(
                    Severity::Error,
                    false,
                    &format!("failed to execute {id}"),
                    job.level(),
                );
            }
            Ok(Err(fault)) => {
                self.add_result(
                    Severity::Fatal,
                    false,
                    &format!("analyzer {id} faulted: {fault:#}"),
                    job.level(),
                );
            }
            Err(payload) => {
                self.add_result(
                    Severity::Fatal,
                    false,
                    &format!("analyzer {id} panicked: {}", panic_message(payload.as_ref())),
                    job.level(),
                );
            }
        }

        // The head is still this job: expansion only inserts behind it.
        let finished = self.queue.pop_front();
        tracing::debug!(job = %finished, "job finished");
        self.ledger.push(finished);

        self.notify_progress();
        !self.queue.is_empty()
    }

    /// Drive [`run_next`](Dispatcher::run_next) until the queue empties.
    /// Returns the total number of finished jobs.
    pub fn run_to_completion(&mut self) -> usize {
        while self.has_next() {
            self.run_next();
        }
        self.ledger.len()
    }

    fn notify_progress(&mut self) {
        let queued = self.queue.len();
        let finished = self.ledger.len();
        tracing::debug!(queued, finished, "queue changed");
        if let Some(progress) = self.progress.as_mut() {
            progress.on_queue_changed(queued, finished);
        }
    }
}

impl Host for Dispatcher {
    /// Resolve and enqueue analyzers for a newly discovered artifact.
    ///
    /// No recursion despite appearances: this only mutates the queue, so
    /// graph depth is bounded by dispatch-loop iterations.
    fn expand_from(&mut self, job: &Job, kinds: KindSet, target: &str) -> bool {
        tracing::debug!(
            parent = %job.analyzer_id(),
            %kinds,
            path = target,
            "expanding discovered artifact"
        );

        if !Path::new(target).exists() {
            self.add_result(
                Severity::Error,
                false,
                &format!("{} -> {}: target '{}' missing", job.analyzer_id(), kinds, target),
                job.level(),
            );
            return false;
        }

        // The discovering job normally sits at the queue head while its
        // execute runs; a stale job (embedder mistake) degrades to a tail
        // append rather than a lost discovery.
        let base = self
            .queue
            .position_of(job.analyzer_id(), job.target())
            .map(|index| index + 1)
            .unwrap_or_else(|| self.queue.len());

        let mut inserted = 0;
        for kind in kinds.iter() {
            let mut candidates = self.registry.for_kind(kind);
            // Non-leaf first: structural expansion of an artifact is
            // scheduled ahead of its terminal per-artifact checks.
            candidates.sort_by_key(|a| a.descriptor().is_leaf);

            for candidate in candidates {
                let descriptor = candidate.descriptor();
                if !self.enabled.is_enabled(&descriptor.id) {
                    continue;
                }
                if self.queue.contains(&descriptor.id, target)
                    || self.ledger.contains(&descriptor.id, target)
                {
                    continue;
                }
                if !candidate.supports(target) {
                    continue;
                }
                let child = Job::new(candidate.clone(), job.level() + 1, target);
                tracing::debug!(analyzer = %descriptor.id, path = target, level = job.level() + 1, "child job queued");
                self.queue.insert(base + inserted, child);
                inserted += 1;
            }
        }

        true
    }

    fn add_result(&mut self, severity: Severity, success: bool, message: &str, level: u32) {
        self.report.add_result(severity, success, message, level);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
