//! Vault status query and single-writer artifact update

use std::path::Path;

use handoff::config::Config;
use handoff::lock::LockManager;
use handoff::output::{OutputMode, StatusResult};
use handoff::paths::VaultLayout;
use handoff::status::StatusBoard;

/// Show vault status; with `write`, update the shared artifact under the
/// single-writer lock (best-effort: a contended lock is reported, not fatal)
pub fn status(root: &Path, write: bool, mode: OutputMode) -> anyhow::Result<()> {
    let layout = VaultLayout::new(root);
    let config = Config::load(&layout.config_file())?;
    let board = StatusBoard::new(layout.clone());

    let written = if write {
        let locks = LockManager::new(&layout);
        board.write(&locks, config.lock.timeout())
    } else {
        false
    };

    StatusResult {
        report: board.collect(),
        written,
    }
    .render(mode);
    Ok(())
}
