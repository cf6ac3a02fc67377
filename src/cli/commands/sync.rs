//! Sync a single file through the policy filter

use std::path::Path;

use handoff::config::Config;
use handoff::models::{Stage, Zone};
use handoff::output::{OutputMode, TransferResult};
use handoff::paths::VaultLayout;
use handoff::policy::PolicyFilter;
use handoff::sync::{SyncError, SyncOutcome, ZoneSyncEngine};

/// Sync one file into `local/inbox`.
///
/// A policy violation blocks the transfer and exits non-zero; the source is
/// left untouched and no receipt is produced.
pub fn sync(root: &Path, file: &Path, mode: OutputMode) -> anyhow::Result<()> {
    let layout = VaultLayout::new(root);
    let config = Config::load(&layout.config_file())?;

    let engine = ZoneSyncEngine::new(PolicyFilter::new(config.policy), &layout);
    let dest = layout.stage_dir(Zone::Local, Stage::Inbox);
    let name = file.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();

    match engine.sync_file(file, &dest) {
        Ok(SyncOutcome::Synced(receipt)) => {
            TransferResult {
                success: true,
                record: name,
                outcome: format!("synced ({} bytes, sha256 {})", receipt.size, &receipt.digest[..8]),
            }
            .render(mode);
            Ok(())
        },
        Ok(SyncOutcome::AlreadyPresent) => {
            TransferResult {
                success: false,
                record: name,
                outcome: "already present at destination".to_string(),
            }
            .render(mode);
            Ok(())
        },
        Err(SyncError::Policy(violation)) => {
            TransferResult {
                success: false,
                record: name,
                outcome: violation.to_string(),
            }
            .render(mode);
            anyhow::bail!("transfer blocked by policy: {violation}")
        },
        Err(err) => Err(err.into()),
    }
}
