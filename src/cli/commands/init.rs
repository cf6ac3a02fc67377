//! Initialize a vault

use std::path::Path;

use handoff::config::Config;
use handoff::output::{OperationResult, OutputMode};
use handoff::paths::VaultLayout;

/// Initialize a vault at `root`
pub fn init(root: &Path, force: bool, mode: OutputMode) -> anyhow::Result<()> {
    let layout = VaultLayout::new(root);
    let config_path = layout.config_file();

    if config_path.exists() && !force {
        OperationResult {
            success: true,
            message: format!(
                "Already initialized ({}). Use --force to rewrite the config.",
                config_path.display()
            ),
        }
        .render(mode);
        return Ok(());
    }

    layout.ensure()?;
    Config::default().save(&config_path)?;

    OperationResult {
        success: true,
        message: format!(
            "Initialized vault at {}\n\nNext steps:\n  handoff task new \"my first task\"\n  handoff scan",
            root.display()
        ),
    }
    .render(mode);
    Ok(())
}
