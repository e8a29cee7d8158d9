// SPDX-License-Identifier: MIT
//! Shared fixtures: a scriptable analyzer and an on-disk artifact tree.

#![allow(dead_code)]

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use assay::analyzer::{Analyzer, AnalyzerDescriptor, Host};
use assay::artifact::{ArtifactKind, KindSet};
use assay::dispatcher::Dispatcher;
use assay::job::Job;
use assay::registry::{AnalyzerRegistry, EnabledAnalyzers};
use assay::report::MemorySink;

/// What a scripted analyzer does after performing its expansions.
#[derive(Debug, Clone, Copy)]
pub enum Outcome {
    Succeed,
    ReportFailure,
    Fault(&'static str),
    Panic(&'static str),
}

/// Test analyzer: supports targets by extension, performs a fixed list of
/// `expand_from` calls, then finishes with a scripted outcome.
pub struct Scripted {
    descriptor: AnalyzerDescriptor,
    extension: &'static str,
    expansions: Vec<(KindSet, PathBuf)>,
    outcome: Outcome,
    /// Number of completed `execute` calls.
    pub executions: AtomicUsize,
    /// Return values observed from `expand_from`, in call order.
    pub expand_results: Mutex<Vec<bool>>,
}

impl Scripted {
    pub fn new(id: &str, role: ArtifactKind, is_leaf: bool, extension: &'static str) -> Self {
        Scripted {
            descriptor: AnalyzerDescriptor::new(id, id, role, is_leaf),
            extension,
            expansions: Vec::new(),
            outcome: Outcome::Succeed,
            executions: AtomicUsize::new(0),
            expand_results: Mutex::new(Vec::new()),
        }
    }

    /// Add an `expand_from(kinds, target)` call to perform during execute.
    pub fn expanding(mut self, kinds: impl Into<KindSet>, target: impl Into<PathBuf>) -> Self {
        self.expansions.push((kinds.into(), target.into()));
        self
    }

    pub fn finishing(mut self, outcome: Outcome) -> Self {
        self.outcome = outcome;
        self
    }

    pub fn arc(self) -> Arc<Scripted> {
        Arc::new(self)
    }

    pub fn execution_count(&self) -> usize {
        self.executions.load(Ordering::SeqCst)
    }
}

impl Analyzer for Scripted {
    fn descriptor(&self) -> &AnalyzerDescriptor {
        &self.descriptor
    }

    fn supports(&self, target: &str) -> bool {
        target.ends_with(self.extension)
    }

    fn execute(&self, job: &Job, host: &mut dyn Host) -> anyhow::Result<bool> {
        for (kinds, target) in &self.expansions {
            let ok = host.expand_from(job, *kinds, &target.to_string_lossy());
            self.expand_results.lock().unwrap().push(ok);
        }
        self.executions.fetch_add(1, Ordering::SeqCst);
        match self.outcome {
            Outcome::Succeed => Ok(true),
            Outcome::ReportFailure => Ok(false),
            Outcome::Fault(message) => Err(anyhow::anyhow!(message)),
            Outcome::Panic(message) => panic!("{message}"),
        }
    }
}

/// Temp directory pre-populated with artifact files so `expand_from`'s
/// existence precondition holds.
pub struct ArtifactTree {
    pub dir: tempfile::TempDir,
}

impl ArtifactTree {
    pub fn new(files: &[&str]) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        for file in files {
            std::fs::write(dir.path().join(file), b"").expect("create artifact file");
        }
        ArtifactTree { dir }
    }

    pub fn path(&self, file: &str) -> PathBuf {
        self.dir.path().join(file)
    }

    pub fn path_str(&self, file: &str) -> String {
        self.path(file).to_string_lossy().into_owned()
    }
}

/// Dispatcher over `analyzers` with a shared in-memory report sink.
pub fn dispatcher_with(
    analyzers: Vec<Arc<Scripted>>,
) -> (Dispatcher, Rc<RefCell<MemorySink>>) {
    let mut registry = AnalyzerRegistry::new();
    for analyzer in analyzers {
        registry.register(analyzer).expect("register analyzer");
    }
    let sink = Rc::new(RefCell::new(MemorySink::new()));
    let dispatcher = Dispatcher::new(
        Arc::new(registry),
        EnabledAnalyzers::new(),
        Box::new(Rc::clone(&sink)),
    );
    (dispatcher, sink)
}

/// Pending queue as `(analyzer id, level, target file name)` triples.
pub fn queue_snapshot(dispatcher: &Dispatcher) -> Vec<(String, u32, String)> {
    dispatcher
        .queue()
        .iter()
        .map(|job| {
            (
                job.analyzer_id().as_str().to_owned(),
                job.level(),
                file_name(job.target()),
            )
        })
        .collect()
}

/// Finished ledger as `(analyzer id, target file name)` pairs.
pub fn ledger_snapshot(dispatcher: &Dispatcher) -> Vec<(String, String)> {
    dispatcher
        .ledger()
        .iter()
        .map(|job| (job.analyzer_id().as_str().to_owned(), file_name(job.target())))
        .collect()
}

fn file_name(target: &str) -> String {
    Path::new(target)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| target.to_owned())
}
