//! Approval decisions and listings

use std::path::Path;

use handoff::approval::{ApprovalWorkflow, Decision, StampExecutor};
use handoff::models::Zone;
use handoff::output::{ApprovalListResult, DecisionResult, OutputMode};
use handoff::paths::VaultLayout;
use handoff::storage::StageStore;

/// Apply a decision to a pending request.
///
/// `AlreadyDecided` and `NotFound` are caller errors and exit non-zero;
/// so does an execution failure after approval.
pub fn decide(
    root: &Path,
    id: &str,
    decision: Decision,
    reason: Option<&str>,
    actor: &str,
    mode: OutputMode,
) -> anyhow::Result<()> {
    let layout = VaultLayout::new(root);
    let store = StageStore::new(&layout, Zone::Local);
    let workflow = ApprovalWorkflow::new(&layout, store);

    let outcome = workflow.decide(id, decision, reason, actor, &StampExecutor)?;

    DecisionResult {
        request: outcome.request.id.clone(),
        task: outcome.request.task.clone(),
        decision: outcome.request.status.to_string(),
        task_stage: outcome.task_stage.to_string(),
    }
    .render(mode);
    Ok(())
}

/// List pending requests and status-set counts
pub fn approvals(root: &Path, mode: OutputMode) -> anyhow::Result<()> {
    let layout = VaultLayout::new(root);
    let store = StageStore::new(&layout, Zone::Local);
    let workflow = ApprovalWorkflow::new(&layout, store);

    ApprovalListResult {
        pending: workflow.list_pending()?,
        stats: workflow.stats(),
    }
    .render(mode);
    Ok(())
}
