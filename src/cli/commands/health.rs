//! Health checks with bounded recovery

use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use handoff::config::Config;
use handoff::health::HealthMonitor;
use handoff::output::{HealthResult, OutputMode};
use handoff::paths::VaultLayout;

/// Run `cycles` health check cycles with `interval_secs` between them
pub fn health(root: &Path, cycles: usize, interval_secs: u64, mode: OutputMode) -> anyhow::Result<()> {
    let layout = VaultLayout::new(root);
    let config = Config::load(&layout.config_file())?;

    let mut monitor = HealthMonitor::new(layout, config.health);
    let stop = AtomicBool::new(false);
    let completed = monitor.run(Some(cycles), Duration::from_secs(interval_secs), &stop);

    HealthResult {
        cycles: completed,
        observations: monitor.check_all(),
    }
    .render(mode);
    Ok(())
}
