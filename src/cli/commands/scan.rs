//! Bulk scan: sync every eligible cloud record into the local zone

use std::path::Path;

use handoff::config::Config;
use handoff::models::{Stage, Zone};
use handoff::output::{OutputMode, ScanResult};
use handoff::paths::VaultLayout;
use handoff::policy::PolicyFilter;
use handoff::sync::ZoneSyncEngine;

/// Scan `cloud/pending` and sync eligible records into `local/inbox`
pub fn scan(root: &Path, mode: OutputMode) -> anyhow::Result<()> {
    let layout = VaultLayout::new(root);
    let config = Config::load(&layout.config_file())?;

    let engine = ZoneSyncEngine::new(PolicyFilter::new(config.policy), &layout);
    let report = engine.scan(
        &layout.stage_dir(Zone::Cloud, Stage::Pending),
        &layout.stage_dir(Zone::Local, Stage::Inbox),
    )?;

    ScanResult { report }.render(mode);
    Ok(())
}
