//! Common test utilities

pub mod fixtures;

use handoff::paths::VaultLayout;
use tempfile::TempDir;

/// Create a fully initialized vault in a temporary directory.
///
/// The `TempDir` must be kept alive for the duration of the test.
pub fn temp_vault() -> (TempDir, VaultLayout) {
    let dir = TempDir::new().unwrap();
    let layout = VaultLayout::new(dir.path());
    layout.ensure().unwrap();
    (dir, layout)
}
