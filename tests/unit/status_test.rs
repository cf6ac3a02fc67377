//! Tests for the single-writer status artifact

use std::fs;
use std::time::Duration;

use handoff::lock::LockManager;
use handoff::models::{Stage, Zone};
use handoff::status::{STATUS_LOCK, StatusBoard};
use handoff::storage::StageStore;

use crate::common::fixtures::{TaskBuilder, safe_task};
use crate::common::temp_vault;

#[test]
fn test_collect_counts_records() {
    let (_dir, layout) = temp_vault();
    let cloud = StageStore::new(&layout, Zone::Cloud);
    let local = StageStore::new(&layout, Zone::Local);

    cloud.create(Stage::Pending, &safe_task()).unwrap();
    cloud.create(Stage::Pending, &TaskBuilder::new().title("second").build()).unwrap();
    local.create(Stage::Done, &TaskBuilder::new().title("Finished one").build()).unwrap();

    let report = StatusBoard::new(layout).collect();

    let cloud_status = report.zones.iter().find(|z| z.zone == Zone::Cloud).unwrap();
    let pending = cloud_status.stages.iter().find(|s| s.stage == Stage::Pending).unwrap();
    assert_eq!(pending.count, 2);
    assert_eq!(cloud_status.total, 2);

    assert_eq!(report.claims, 0);
    assert_eq!(report.recent_completions, vec!["Finished one".to_string()]);
}

#[test]
fn test_render_contains_zone_sections() {
    let (_dir, layout) = temp_vault();
    let report = StatusBoard::new(layout).collect();
    let rendered = StatusBoard::render(&report);

    assert!(rendered.starts_with("# Status"));
    assert!(rendered.contains("## cloud zone (low-trust)"));
    assert!(rendered.contains("## local zone (high-trust)"));
    assert!(rendered.contains("## Queue"));
    assert!(rendered.contains("*No completions yet.*"));
}

#[test]
fn test_write_produces_artifact_under_lock() {
    let (_dir, layout) = temp_vault();
    let board = StatusBoard::new(layout.clone());
    let locks = LockManager::new(&layout);

    assert!(board.write(&locks, Duration::from_secs(1)));

    let written = fs::read_to_string(layout.status_file()).unwrap();
    assert!(written.starts_with("# Status"));
}

#[test]
fn test_write_degrades_when_lock_is_contended() {
    let (_dir, layout) = temp_vault();
    let board = StatusBoard::new(layout.clone());
    let locks = LockManager::new(&layout);

    let _holder = locks.try_acquire(STATUS_LOCK).unwrap().expect("free");

    // Best-effort contract: a contended lock yields false, not an error.
    assert!(!board.write(&locks, Duration::from_millis(100)));
    assert!(!layout.status_file().exists());
}
