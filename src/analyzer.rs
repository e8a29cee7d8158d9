// SPDX-License-Identifier: MIT
//! The analyzer contract.
//!
//! Metadata and behavior are split: [`AnalyzerDescriptor`] is plain
//! serializable data a registry can enumerate without touching executable
//! state, and the [`Analyzer`] trait is the capability object the dispatcher
//! drives. A running analyzer talks back to the engine only through the
//! [`Host`] trait — reporting results and scheduling follow-up work for
//! artifacts it discovered.

use std::fmt;

use semver::Version;
use serde::{Deserialize, Serialize};

use crate::artifact::{ArtifactKind, KindSet};
use crate::job::Job;
use crate::report::Severity;

// ── Maturity ─────────────────────────────────────────────────────────────────

/// How production-ready an analyzer claims to be. Informational only; the
/// dispatcher does not gate on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Maturity {
    Alpha,
    Beta,
    Release,
}

impl fmt::Display for Maturity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Maturity::Alpha => "alpha",
            Maturity::Beta => "beta",
            Maturity::Release => "release",
        };
        f.write_str(name)
    }
}

// ── Identity ─────────────────────────────────────────────────────────────────

/// Stable analyzer identity.
///
/// This is the dedup key: the engine guarantees a given `(id, target)` pair
/// is queued and executed at most once per run, so the id must be unique
/// across the registry and stable across runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalyzerId(String);

impl AnalyzerId {
    pub fn new(id: impl Into<String>) -> Self {
        AnalyzerId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AnalyzerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AnalyzerId {
    fn from(id: &str) -> Self {
        AnalyzerId(id.to_string())
    }
}

// ── Descriptor ───────────────────────────────────────────────────────────────

/// Plain analyzer metadata.
///
/// Everything a listing UI needs — no executable state involved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerDescriptor {
    /// Stable identity (dedup key).
    pub id: AnalyzerId,
    /// Human-readable display name.
    pub name: String,
    pub maturity: Maturity,
    pub version: Version,
    pub description: String,
    /// The single artifact category this analyzer handles.
    pub role: ArtifactKind,
    /// Leaf analyzers never schedule further work; the dispatcher runs
    /// them after non-leaf analyzers for the same artifact and never
    /// seeds a run with them.
    pub is_leaf: bool,
}

impl AnalyzerDescriptor {
    /// Descriptor with alpha maturity, version 0.1.0 and an empty
    /// description. Override fields directly for anything richer.
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: ArtifactKind, is_leaf: bool) -> Self {
        AnalyzerDescriptor {
            id: AnalyzerId::new(id),
            name: name.into(),
            maturity: Maturity::Alpha,
            version: Version::new(0, 1, 0),
            description: String::new(),
            role,
            is_leaf,
        }
    }
}

// ── Host ─────────────────────────────────────────────────────────────────────

/// What a running analyzer may ask of the engine.
///
/// The dispatcher implements this; analyzers receive it in
/// [`Analyzer::initialize`] and [`Analyzer::execute`].
pub trait Host {
    /// Schedule analysis of a newly discovered artifact.
    ///
    /// `job` is the caller's own (currently executing) job; `kinds` is every
    /// category the discovered `target` may belong to. Matching enabled
    /// analyzers are queued directly after the calling job, at
    /// `job.level() + 1`, non-leaf first, skipping any `(analyzer, target)`
    /// pair already queued or finished.
    ///
    /// Despite the recursive flavor this never executes anything — it only
    /// inserts queue entries, so discovery depth is bounded by dispatch-loop
    /// iterations, not the call stack.
    ///
    /// Returns `false` (after reporting an error) if `target` does not exist
    /// on disk; the run continues either way.
    fn expand_from(&mut self, job: &Job, kinds: KindSet, target: &str) -> bool;

    /// Append an entry to the run's report stream.
    ///
    /// `level` is the nesting depth used for indentation; pass the calling
    /// job's level (or deeper for sub-findings). The engine does no
    /// formatting or persistence — entries go straight to the configured
    /// [`ReportSink`](crate::report::ReportSink).
    fn add_result(&mut self, severity: Severity, success: bool, message: &str, level: u32);
}

// ── Analyzer ─────────────────────────────────────────────────────────────────

/// A capability-typed unit of analysis work.
///
/// Implementations are registered once in an
/// [`AnalyzerRegistry`](crate::registry::AnalyzerRegistry) and shared
/// (`Arc<dyn Analyzer>`) across the jobs that reference them, so any
/// per-execution state needs interior mutability.
///
/// Failure contract: `execute` returning `Ok(false)` is an
/// analyzer-reported failure (error severity); `Err(_)` from `initialize`
/// or `execute` — and panics — are faults (fatal severity). None of them
/// abort the run; the job is retired to the finished ledger regardless.
pub trait Analyzer: Send + Sync {
    /// Static metadata.
    fn descriptor(&self) -> &AnalyzerDescriptor;

    /// Capability probe: can this analyzer handle `target`? Called before
    /// scheduling; must be cheap and side-effect free.
    fn supports(&self, target: &str) -> bool;

    /// Called by the dispatcher immediately before each `execute`.
    fn initialize(&self, host: &mut dyn Host) -> anyhow::Result<()> {
        let _ = host;
        Ok(())
    }

    /// Run the analysis for `job.target()`. May call
    /// [`Host::expand_from`] any number of times to schedule follow-up
    /// work; leaf analyzers (`descriptor().is_leaf`) must not.
    fn execute(&self, job: &Job, host: &mut dyn Host) -> anyhow::Result<bool>;
}

impl fmt::Debug for dyn Analyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Analyzer")
            .field("id", &self.descriptor().id)
            .field("role", &self.descriptor().role)
            .field("is_leaf", &self.descriptor().is_leaf)
            .finish()
    }
}
