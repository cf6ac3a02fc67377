//! Claim a task: atomic ownership transfer

use std::path::Path;

use handoff::models::{Stage, Zone};
use handoff::output::{OutputMode, TransferResult};
use handoff::paths::VaultLayout;
use handoff::storage::{ClaimError, ClaimLog, StageStore, claim_task};

/// Claim one task from `(from_zone, from_stage)` into `(to_zone, to_stage)`.
///
/// Losing a race (`SourceMissing`) or finding the destination occupied
/// (`Conflict`) are expected outcomes, reported but not failures.
#[allow(clippy::too_many_arguments)]
pub fn claim(
    root: &Path,
    id: &str,
    from_zone: Zone,
    from_stage: Stage,
    to_zone: Zone,
    to_stage: Stage,
    claimant: &str,
    mode: OutputMode,
) -> anyhow::Result<()> {
    let layout = VaultLayout::new(root);
    let log = ClaimLog::new(&layout);
    let src = StageStore::new(&layout, from_zone);
    let dst = StageStore::new(&layout, to_zone);

    match claim_task(&log, &src, id, from_stage, &dst, to_stage, claimant) {
        Ok(claim) => {
            TransferResult {
                success: true,
                record: id.to_string(),
                outcome: format!(
                    "claimed {}/{} -> {}/{} by {}",
                    claim.from_zone, claim.from_stage, claim.to_zone, claim.to_stage, claim.claimed_by
                ),
            }
            .render(mode);
            Ok(())
        },
        Err(ClaimError::SourceMissing { .. }) => {
            TransferResult {
                success: false,
                record: id.to_string(),
                outcome: "already claimed by a concurrent actor".to_string(),
            }
            .render(mode);
            Ok(())
        },
        Err(ClaimError::Conflict { zone, stage, .. }) => {
            TransferResult {
                success: false,
                record: id.to_string(),
                outcome: format!("destination {zone}/{stage} already occupied"),
            }
            .render(mode);
            Ok(())
        },
        Err(err) => Err(err.into()),
    }
}
