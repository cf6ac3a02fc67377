//! Tests for the approval state machine

use handoff::approval::{
    ApprovalError, ApprovalWorkflow, Decision, ProcessOutcome, StampExecutor, TaskExecutor,
};
use handoff::config::SensitivityThresholds;
use handoff::models::{ApprovalStatus, ExecutionOutcome, Stage, Zone};
use handoff::policy::ThresholdClassifier;
use handoff::storage::StageStore;

use crate::common::fixtures::{banking_task, safe_task};
use crate::common::temp_vault;

struct FailingExecutor;

impl TaskExecutor for FailingExecutor {
    fn execute(&self, _task_id: &str, _content: &str) -> anyhow::Result<String> {
        anyhow::bail!("simulated execution failure")
    }
}

fn setup() -> (tempfile::TempDir, StageStore, ApprovalWorkflow, ThresholdClassifier) {
    let (dir, layout) = temp_vault();
    let store = StageStore::new(&layout, Zone::Local);
    let workflow = ApprovalWorkflow::new(&layout, store.clone());
    let classifier = ThresholdClassifier::new(SensitivityThresholds::default()).unwrap();
    (dir, store, workflow, classifier)
}

#[test]
fn test_sensitive_task_is_parked_behind_a_request() {
    let (_dir, store, workflow, classifier) = setup();
    let id = store.create(Stage::Claimed, &banking_task()).unwrap();

    let outcome = workflow.process(&classifier, &StampExecutor, &id, Stage::Claimed).unwrap();
    let ProcessOutcome::AwaitingApproval(request) = outcome else {
        panic!("expected an approval gate");
    };

    assert_eq!(request.task, id);
    assert_eq!(request.status, ApprovalStatus::Pending);
    assert!(request.reason.contains("$150.00"));
    assert!(store.exists(&id, Stage::PendingApproval));
    assert!(!store.exists(&id, Stage::Claimed));
    assert_eq!(workflow.stats().pending, 1);
}

#[test]
fn test_safe_task_executes_directly() {
    let (_dir, store, workflow, classifier) = setup();
    let id = store.create(Stage::Claimed, &safe_task()).unwrap();

    let outcome = workflow.process(&classifier, &StampExecutor, &id, Stage::Claimed).unwrap();
    assert!(matches!(outcome, ProcessOutcome::Executed { .. }));

    assert!(store.exists(&id, Stage::Done));
    let content = store.read(&id, Stage::Done).unwrap();
    assert!(content.contains("## Execution"));
    assert_eq!(workflow.stats().pending, 0);
}

#[test]
fn test_reject_then_second_decision_fails_already_decided() {
    let (_dir, store, workflow, classifier) = setup();
    let id = store.create(Stage::Claimed, &banking_task()).unwrap();

    let ProcessOutcome::AwaitingApproval(request) =
        workflow.process(&classifier, &StampExecutor, &id, Stage::Claimed).unwrap()
    else {
        panic!("expected an approval gate");
    };

    let outcome = workflow
        .decide(&request.id, Decision::Rejected, Some("duplicate"), "human", &StampExecutor)
        .unwrap();
    assert_eq!(outcome.task_stage, Stage::Rejected);
    assert_eq!(outcome.request.status, ApprovalStatus::Rejected);

    // The task ends in the rejected stage with the reason appended.
    let content = store.read(&id, Stage::Rejected).unwrap();
    assert!(content.contains("## Rejection"));
    assert!(content.contains("duplicate"));

    // The request is archived into the rejected set.
    let stats = workflow.stats();
    assert_eq!(stats.pending, 0);
    assert_eq!(stats.rejected, 1);

    // A second decision fails and leaves the terminal state unchanged.
    let err = workflow
        .decide(&request.id, Decision::Approved, None, "human", &StampExecutor)
        .unwrap_err();
    assert!(matches!(
        err,
        ApprovalError::AlreadyDecided {
            status: ApprovalStatus::Rejected,
            ..
        }
    ));
    assert!(store.exists(&id, Stage::Rejected));
    assert_eq!(workflow.get(&request.id).unwrap().status, ApprovalStatus::Rejected);
}

#[test]
fn test_approve_executes_and_archives_as_a_unit() {
    let (_dir, store, workflow, classifier) = setup();
    let id = store.create(Stage::Claimed, &banking_task()).unwrap();

    let ProcessOutcome::AwaitingApproval(request) =
        workflow.process(&classifier, &StampExecutor, &id, Stage::Claimed).unwrap()
    else {
        panic!("expected an approval gate");
    };

    let outcome = workflow
        .decide(&request.id, Decision::Approved, Some("looks right"), "human", &StampExecutor)
        .unwrap();
    assert_eq!(outcome.task_stage, Stage::Done);
    assert_eq!(outcome.request.execution, Some(ExecutionOutcome::Completed));

    let content = store.read(&id, Stage::Done).unwrap();
    assert!(content.contains("## Execution"));

    let stats = workflow.stats();
    assert_eq!(stats.pending, 0);
    assert_eq!(stats.approved, 1);

    let archived = workflow.get(&request.id).unwrap();
    assert_eq!(archived.status, ApprovalStatus::Approved);
    assert_eq!(archived.decided_by.as_deref(), Some("human"));
}

#[test]
fn test_execution_failure_is_never_archived_as_done() {
    let (_dir, store, workflow, classifier) = setup();
    let id = store.create(Stage::Claimed, &banking_task()).unwrap();

    let ProcessOutcome::AwaitingApproval(request) =
        workflow.process(&classifier, &StampExecutor, &id, Stage::Claimed).unwrap()
    else {
        panic!("expected an approval gate");
    };

    let err = workflow
        .decide(&request.id, Decision::Approved, None, "human", &FailingExecutor)
        .unwrap_err();
    assert!(matches!(err, ApprovalError::ExecutionFailed { .. }));

    // The task lands in the failed stage, distinct from approved and done.
    assert!(store.exists(&id, Stage::Failed));
    assert!(!store.exists(&id, Stage::Done));
    let content = store.read(&id, Stage::Failed).unwrap();
    assert!(content.contains("## Execution Failed"));

    // The request stayed visible to the operator with the failure recorded,
    // and its single transition out of pending already happened.
    let stranded = workflow.get(&request.id).unwrap();
    assert_eq!(stranded.status, ApprovalStatus::Approved);
    assert_eq!(stranded.execution, Some(ExecutionOutcome::Failed));

    let err = workflow
        .decide(&request.id, Decision::Approved, None, "human", &StampExecutor)
        .unwrap_err();
    assert!(matches!(err, ApprovalError::AlreadyDecided { .. }));
}

#[test]
fn test_unknown_request_is_not_found() {
    let (_dir, _store, workflow, _classifier) = setup();
    let err = workflow
        .decide("apr-unknown", Decision::Approved, None, "human", &StampExecutor)
        .unwrap_err();
    assert!(matches!(err, ApprovalError::NotFound { .. }));
}

#[test]
fn test_list_pending_returns_open_requests() {
    let (_dir, store, workflow, classifier) = setup();
    let a = store.create(Stage::Claimed, &banking_task()).unwrap();
    workflow.process(&classifier, &StampExecutor, &a, Stage::Claimed).unwrap();

    let pending = workflow.list_pending().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].task, a);
}
