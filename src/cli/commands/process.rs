//! Process tasks that arrived in the local zone

use std::path::Path;

use handoff::approval::{ApprovalWorkflow, ProcessOutcome, StampExecutor};
use handoff::config::Config;
use handoff::models::{Stage, Zone};
use handoff::output::{OutputMode, TransferResult};
use handoff::paths::VaultLayout;
use handoff::policy::ThresholdClassifier;
use handoff::storage::{ClaimError, ClaimLog, StageStore, claim_task};

/// Process the local inbox (or one task): claim by move within the zone,
/// then gate sensitive tasks behind approval and execute the rest.
///
/// Per-task races and execution failures are reported and the loop
/// continues; the command exits non-zero if any task failed hard.
pub fn process(
    root: &Path,
    id: Option<&str>,
    claimant: &str,
    mode: OutputMode,
) -> anyhow::Result<()> {
    let layout = VaultLayout::new(root);
    let config = Config::load(&layout.config_file())?;

    let store = StageStore::new(&layout, Zone::Local);
    let log = ClaimLog::new(&layout);
    let workflow = ApprovalWorkflow::new(&layout, store.clone());
    let classifier = ThresholdClassifier::new(config.thresholds)?;
    let executor = StampExecutor;

    let ids = match id {
        Some(id) => vec![id.to_string()],
        None => store.list(Stage::Inbox)?,
    };

    let mut failures = 0;
    for task_id in &ids {
        // Ownership first: losing the claim race means another processor
        // has the task, which is fine.
        match claim_task(&log, &store, task_id, Stage::Inbox, &store, Stage::Claimed, claimant) {
            Ok(_) => {},
            Err(ClaimError::SourceMissing { .. } | ClaimError::Conflict { .. }) => {
                TransferResult {
                    success: false,
                    record: task_id.clone(),
                    outcome: "claimed by a concurrent processor".to_string(),
                }
                .render(mode);
                continue;
            },
            Err(err) => {
                log::error!("claim of {task_id} failed: {err}");
                failures += 1;
                continue;
            },
        }

        match workflow.process(&classifier, &executor, task_id, Stage::Claimed) {
            Ok(ProcessOutcome::AwaitingApproval(request)) => {
                TransferResult {
                    success: true,
                    record: task_id.clone(),
                    outcome: format!("awaiting approval ({}): {}", request.id, request.reason),
                }
                .render(mode);
            },
            Ok(ProcessOutcome::Executed { .. }) => {
                TransferResult {
                    success: true,
                    record: task_id.clone(),
                    outcome: "executed, moved to done".to_string(),
                }
                .render(mode);
            },
            Err(err) => {
                log::error!("processing {task_id} failed: {err}");
                TransferResult {
                    success: false,
                    record: task_id.clone(),
                    outcome: err.to_string(),
                }
                .render(mode);
                failures += 1;
            },
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} task(s) failed during processing");
    }
    Ok(())
}
