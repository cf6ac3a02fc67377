//! Tests for the health and recovery loop

use std::fs;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use handoff::config::HealthConfig;
use handoff::health::{HealthMonitor, HealthStatus, Subsystem};
use handoff::models::ApprovalStatus;

use crate::common::temp_vault;

#[test]
fn test_fresh_vault_is_healthy() {
    let (_dir, layout) = temp_vault();
    let monitor = HealthMonitor::new(layout, HealthConfig::default());

    for observation in monitor.check_all() {
        assert_eq!(observation.status, HealthStatus::Healthy, "{}", observation.subsystem);
    }
}

#[test]
fn test_missing_zone_root_is_critical() {
    let (_dir, layout) = temp_vault();
    fs::remove_dir_all(layout.zone_dir(handoff::models::Zone::Cloud)).unwrap();

    let monitor = HealthMonitor::new(layout, HealthConfig::default());
    let observation = monitor.check(Subsystem::CloudZone);
    assert_eq!(observation.status, HealthStatus::Critical);
}

#[test]
fn test_approval_backlog_degrades_local_zone() {
    let (_dir, layout) = temp_vault();
    let pending = layout.approvals_dir(ApprovalStatus::Pending);
    for i in 0..3 {
        fs::write(pending.join(format!("apr-{i}.json")), "{}").unwrap();
    }

    let config = HealthConfig {
        approval_backlog: 2,
        ..HealthConfig::default()
    };
    let monitor = HealthMonitor::new(layout, config);
    let observation = monitor.check(Subsystem::LocalZone);
    assert_eq!(observation.status, HealthStatus::Degraded);
    assert!(observation.detail.contains("3 pending approvals"));
}

#[test]
fn test_claim_backlog_degrades_sync_queue() {
    let (_dir, layout) = temp_vault();
    for i in 0..4 {
        fs::write(layout.claims_dir().join(format!("claim_t{i}.json")), "{}").unwrap();
    }

    let config = HealthConfig {
        claim_backlog: 3,
        ..HealthConfig::default()
    };
    let monitor = HealthMonitor::new(layout, config);
    let observation = monitor.check(Subsystem::SyncQueue);
    assert_eq!(observation.status, HealthStatus::Degraded);
}

#[test]
fn test_recovery_recreates_missing_roots() {
    let (_dir, layout) = temp_vault();
    fs::remove_dir_all(layout.zone_dir(handoff::models::Zone::Cloud)).unwrap();

    let monitor = HealthMonitor::new(layout.clone(), HealthConfig::default());
    assert!(monitor.recover(Subsystem::CloudZone));
    assert_eq!(monitor.check(Subsystem::CloudZone).status, HealthStatus::Healthy);
}

#[test]
fn test_recovery_is_idempotent_when_healthy() {
    let (_dir, layout) = temp_vault();
    let monitor = HealthMonitor::new(layout.clone(), HealthConfig::default());

    assert!(monitor.recover(Subsystem::SyncQueue));
    assert!(monitor.recover(Subsystem::SyncQueue));
    assert_eq!(monitor.check(Subsystem::SyncQueue).status, HealthStatus::Healthy);
}

#[test]
fn test_recovery_keeps_fresh_claims() {
    let (_dir, layout) = temp_vault();
    let claim = layout.claims_dir().join("claim_fresh.json");
    fs::write(&claim, "{}").unwrap();

    let monitor = HealthMonitor::new(layout, HealthConfig::default());
    assert!(monitor.recover(Subsystem::SyncQueue));
    assert!(claim.exists(), "fresh claim records must survive recovery");
}

#[test]
fn test_run_completes_the_requested_cycles() {
    let (_dir, layout) = temp_vault();
    let mut monitor = HealthMonitor::new(layout, HealthConfig::default());

    let stop = AtomicBool::new(false);
    let completed = monitor.run(Some(3), Duration::ZERO, &stop);
    assert_eq!(completed, 3);
}

#[test]
fn test_run_stops_immediately_on_signal() {
    let (_dir, layout) = temp_vault();
    let mut monitor = HealthMonitor::new(layout, HealthConfig::default());

    let stop = AtomicBool::new(true);
    let completed = monitor.run(None, Duration::ZERO, &stop);
    assert_eq!(completed, 0);
}

#[test]
fn test_consecutive_failures_trigger_recovery() {
    let (_dir, layout) = temp_vault();
    fs::remove_dir_all(layout.zone_dir(handoff::models::Zone::Cloud)).unwrap();

    let config = HealthConfig {
        failure_threshold: 1,
        ..HealthConfig::default()
    };
    let mut monitor = HealthMonitor::new(layout.clone(), config);

    let stop = AtomicBool::new(false);
    monitor.run(Some(1), Duration::ZERO, &stop);

    // The first unhealthy observation crossed the threshold and recovery
    // recreated the zone root.
    assert!(layout.zone_dir(handoff::models::Zone::Cloud).exists());
}
