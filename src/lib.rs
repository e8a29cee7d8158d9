// SPDX-License-Identifier: MIT
//! assay — pluggable artifact-graph analysis engine.
//!
//! Walks a hierarchical graph of build artifacts (repository → solutions →
//! projects → compiled outputs → tests) that is discovered *during* the walk
//! itself: each executing analyzer may report new artifacts, which the
//! engine resolves against a registry of capability-typed analyzers and
//! schedules as follow-up jobs. The engine guarantees that no
//! `(analyzer, target)` pair runs twice, that children are queued in a
//! contiguous block directly behind their discovering parent (non-leaf
//! analyzers first), and that a failing or panicking analyzer never aborts
//! the run.
//!
//! The engine owns no I/O beyond checking that discovered targets exist:
//! concrete analyzers, report rendering, and analyzer loading are the
//! embedder's concern, wired in through [`registry::AnalyzerRegistry`],
//! [`report::ReportSink`], and [`report::ProgressObserver`].
//!
//! ```
//! use std::sync::Arc;
//!
//! use assay::analyzer::{Analyzer, AnalyzerDescriptor, Host};
//! use assay::artifact::ArtifactKind;
//! use assay::dispatcher::Dispatcher;
//! use assay::job::Job;
//! use assay::registry::{AnalyzerRegistry, EnabledAnalyzers};
//! use assay::report::MemorySink;
//!
//! struct SolutionLister {
//!     descriptor: AnalyzerDescriptor,
//! }
//!
//! impl Analyzer for SolutionLister {
//!     fn descriptor(&self) -> &AnalyzerDescriptor {
//!         &self.descriptor
//!     }
//!
//!     fn supports(&self, target: &str) -> bool {
//!         target.ends_with(".sln")
//!     }
//!
//!     fn execute(&self, job: &Job, host: &mut dyn Host) -> anyhow::Result<bool> {
//!         // A real analyzer would read the solution here and call
//!         // host.expand_from(job, ArtifactKind::Project.into(), path)
//!         // for every project it finds.
//!         let _ = (job, host);
//!         Ok(true)
//!     }
//! }
//!
//! let mut registry = AnalyzerRegistry::new();
//! registry
//!     .register(Arc::new(SolutionLister {
//!         descriptor: AnalyzerDescriptor::new(
//!             "SolutionLister",
//!             "Solution lister",
//!             ArtifactKind::Solution,
//!             false,
//!         ),
//!     }))
//!     .unwrap();
//!
//! let mut dispatcher = Dispatcher::new(
//!     Arc::new(registry),
//!     EnabledAnalyzers::new(),
//!     Box::new(MemorySink::new()),
//! );
//! dispatcher.seed("Repo.sln");
//! let finished = dispatcher.run_to_completion();
//! assert_eq!(finished, 1);
//! ```

pub mod analyzer;
pub mod artifact;
pub mod dispatcher;
pub mod job;
pub mod registry;
pub mod report;

pub use analyzer::{Analyzer, AnalyzerDescriptor, AnalyzerId, Host, Maturity};
pub use artifact::{ArtifactKind, KindSet};
pub use dispatcher::Dispatcher;
pub use job::{FinishedLedger, Job, JobQueue};
pub use registry::{AnalyzerRegistry, EnabledAnalyzers, RegistryError};
pub use report::{LogEntry, MemorySink, ProgressObserver, ReportSink, Severity, TracingSink};
