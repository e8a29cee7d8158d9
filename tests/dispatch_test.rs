// SPDX-License-Identifier: MIT
//! Dispatch loop: seeding, execution outcomes, failure isolation, progress.

mod common;

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use assay::analyzer::AnalyzerId;
use assay::artifact::ArtifactKind;
use assay::report::Severity;

use common::{dispatcher_with, ledger_snapshot, ArtifactTree, Outcome, Scripted};

#[test]
fn seeding_enqueues_only_enabled_non_leaf_supporters_at_level_zero() {
    // Solution analyzers A (non-leaf) and B (leaf) both support
    // *.sln; only A may seed.
    let a = Scripted::new("A", ArtifactKind::Solution, false, ".sln").arc();
    let b = Scripted::new("B", ArtifactKind::Solution, true, ".sln").arc();
    let (mut dispatcher, _sink) = dispatcher_with(vec![Arc::clone(&a), Arc::clone(&b)]);

    let seeded = dispatcher.seed("Repo.sln");

    assert_eq!(seeded, 1);
    assert_eq!(dispatcher.queue().len(), 1);
    let head = dispatcher.queue().peek().unwrap();
    assert_eq!(head.analyzer_id().as_str(), "A");
    assert_eq!(head.level(), 0);
}

#[test]
fn seeding_skips_non_supporting_and_disabled_analyzers() {
    let sln = Scripted::new("Sln", ArtifactKind::Solution, false, ".sln").arc();
    let proj = Scripted::new("Proj", ArtifactKind::Project, false, ".csproj").arc();
    let off = Scripted::new("Off", ArtifactKind::Solution, false, ".sln").arc();
    let (mut dispatcher, _sink) = dispatcher_with(vec![sln, proj, off]);
    dispatcher
        .enabled_mut()
        .set_enabled(AnalyzerId::new("Off"), false);

    // Any role may seed as long as it supports the target; Proj does not.
    assert_eq!(dispatcher.seed("Repo.sln"), 1);
    assert_eq!(
        dispatcher.queue().peek().unwrap().analyzer_id().as_str(),
        "Sln"
    );
}

#[test]
fn seeding_twice_does_not_duplicate_jobs() {
    let a = Scripted::new("A", ArtifactKind::Solution, false, ".sln").arc();
    let (mut dispatcher, _sink) = dispatcher_with(vec![a]);

    assert_eq!(dispatcher.seed("Repo.sln"), 1);
    assert_eq!(dispatcher.seed("Repo.sln"), 0);
    assert_eq!(dispatcher.queue().len(), 1);
}

#[test]
fn run_next_retires_job_and_returns_queue_state() {
    let a = Scripted::new("A", ArtifactKind::Solution, false, ".sln").arc();
    let (mut dispatcher, _sink) = dispatcher_with(vec![Arc::clone(&a)]);
    dispatcher.seed("Repo.sln");

    assert!(dispatcher.has_next());
    let more = dispatcher.run_next();

    assert!(!more);
    assert!(!dispatcher.has_next());
    assert_eq!(a.execution_count(), 1);
    assert_eq!(dispatcher.ledger().len(), 1);
    assert!(dispatcher
        .ledger()
        .contains(&AnalyzerId::new("A"), "Repo.sln"));
}

#[test]
fn reported_failure_is_logged_and_job_still_retires() {
    let a = Scripted::new("A", ArtifactKind::Solution, false, ".sln")
        .finishing(Outcome::ReportFailure)
        .arc();
    let (mut dispatcher, sink) = dispatcher_with(vec![a]);
    dispatcher.seed("Repo.sln");
    dispatcher.run_next();

    assert_eq!(dispatcher.ledger().len(), 1);
    let sink = sink.borrow();
    let entry = sink
        .entries()
        .iter()
        .find(|e| e.severity == Severity::Error)
        .expect("error entry");
    assert!(!entry.success);
    assert!(entry.message.contains("failed to execute A"));
}

#[test]
fn faulting_analyzer_is_logged_fatal_and_run_continues() {
    let tree = ArtifactTree::new(&["Repo.sln"]);
    let bad = Scripted::new("Bad", ArtifactKind::Solution, false, ".sln")
        .finishing(Outcome::Fault("disk exploded"))
        .arc();
    let good = Scripted::new("Good", ArtifactKind::Solution, false, ".sln").arc();
    let (mut dispatcher, sink) = dispatcher_with(vec![bad, Arc::clone(&good)]);
    dispatcher.seed(&tree.path_str("Repo.sln"));

    let finished = dispatcher.run_to_completion();

    assert_eq!(finished, 2);
    assert_eq!(good.execution_count(), 1);
    let sink = sink.borrow();
    let fatal = sink
        .entries()
        .iter()
        .find(|e| e.severity == Severity::Fatal)
        .expect("fatal entry");
    assert!(fatal.message.contains("Bad"));
    assert!(fatal.message.contains("disk exploded"));
}

#[test]
fn panicking_analyzer_lands_in_ledger_exactly_once_and_run_continues() {
    let boom = Scripted::new("Boom", ArtifactKind::Solution, false, ".sln")
        .finishing(Outcome::Panic("boom"))
        .arc();
    let after = Scripted::new("After", ArtifactKind::Solution, false, ".sln").arc();
    let (mut dispatcher, sink) = dispatcher_with(vec![boom, Arc::clone(&after)]);
    dispatcher.seed("Repo.sln");

    let finished = dispatcher.run_to_completion();

    assert_eq!(finished, 2);
    assert_eq!(after.execution_count(), 1);
    let ledger = ledger_snapshot(&dispatcher);
    assert_eq!(
        ledger
            .iter()
            .filter(|(id, _)| id == "Boom")
            .count(),
        1
    );
    let sink = sink.borrow();
    let fatal = sink
        .entries()
        .iter()
        .find(|e| e.severity == Severity::Fatal)
        .expect("fatal entry");
    assert!(fatal.message.contains("panicked"));
    assert!(fatal.message.contains("boom"));
}

#[test]
fn progress_observer_sees_every_completion_and_final_zero_queue() {
    let tree = ArtifactTree::new(&["Repo.sln", "X.csproj"]);
    let reader = Scripted::new("Reader", ArtifactKind::Solution, false, ".sln")
        .expanding(ArtifactKind::Project, tree.path("X.csproj"))
        .arc();
    let checker = Scripted::new("Checker", ArtifactKind::Project, true, ".csproj").arc();

    let calls: Rc<RefCell<Vec<(usize, usize)>>> = Rc::new(RefCell::new(Vec::new()));
    let calls_handle = Rc::clone(&calls);
    let (dispatcher, _sink) = dispatcher_with(vec![reader, checker]);
    let mut dispatcher = dispatcher.with_progress(Box::new(move |queued: usize, finished: usize| {
        calls_handle.borrow_mut().push((queued, finished));
    }));

    dispatcher.seed(&tree.path_str("Repo.sln"));
    let finished = dispatcher.run_to_completion();

    assert_eq!(finished, 2);
    let calls = calls.borrow();
    // Seed notification, then one per completed job.
    assert_eq!(calls.first(), Some(&(1, 0)));
    assert_eq!(calls.last(), Some(&(0, 2)));
}

#[test]
#[should_panic(expected = "empty job queue")]
fn run_next_on_empty_queue_is_a_programmer_error() {
    let (mut dispatcher, _sink) = dispatcher_with(vec![]);
    dispatcher.run_next();
}
