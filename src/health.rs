//! Health and recovery loop
//!
//! A supervisory collaborator, not part of protocol correctness: polls each
//! subsystem's health predicate, logs the result, and after a configured
//! number of consecutive unhealthy observations invokes a bounded,
//! idempotent recovery action. Recovery on an already-healthy subsystem is
//! a no-op.

use std::collections::HashMap;
use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde::Serialize;

use crate::audit::{AuditLevel, AuditLog};
use crate::config::HealthConfig;
use crate::models::{ApprovalStatus, Zone};
use crate::paths::VaultLayout;
use crate::storage::StageStore;
use crate::sync::glob_count;

/// A monitored subsystem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Subsystem {
    /// The low-trust zone's stage store
    CloudZone,
    /// The high-trust zone's stage store and approval backlog
    LocalZone,
    /// The claim/receipt queue
    SyncQueue,
}

impl Subsystem {
    /// All monitored subsystems.
    pub const ALL: [Self; 3] = [Self::CloudZone, Self::LocalZone, Self::SyncQueue];
}

impl std::fmt::Display for Subsystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CloudZone => write!(f, "cloud-zone"),
            Self::LocalZone => write!(f, "local-zone"),
            Self::SyncQueue => write!(f, "sync-queue"),
        }
    }
}

/// Outcome of one health predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Operating normally
    Healthy,
    /// Operating with a backlog or partial impairment
    Degraded,
    /// Unusable; recovery needed
    Critical,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Healthy => write!(f, "healthy"),
            Self::Degraded => write!(f, "degraded"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// One observation of one subsystem
#[derive(Debug, Clone, Serialize)]
pub struct HealthObservation {
    /// The observed subsystem
    pub subsystem: Subsystem,
    /// Its status
    pub status: HealthStatus,
    /// What the predicate saw
    pub detail: String,
}

/// Polls subsystem health and performs bounded recovery
#[derive(Debug)]
pub struct HealthMonitor {
    layout: VaultLayout,
    config: HealthConfig,
    audit: AuditLog,
    consecutive_failures: HashMap<Subsystem, u32>,
}

impl HealthMonitor {
    /// Build a monitor over `layout` with `config` thresholds.
    #[must_use]
    pub fn new(layout: VaultLayout, config: HealthConfig) -> Self {
        let audit = AuditLog::new(&layout);
        Self {
            layout,
            config,
            audit,
            consecutive_failures: HashMap::new(),
        }
    }

    /// Evaluate one subsystem's health predicate.
    #[must_use]
    pub fn check(&self, subsystem: Subsystem) -> HealthObservation {
        match subsystem {
            Subsystem::CloudZone => self.check_zone(Zone::Cloud, subsystem, None),
            Subsystem::LocalZone => {
                let backlog = glob_count(
                    &self.layout.approvals_dir(ApprovalStatus::Pending),
                    "*.json",
                );
                self.check_zone(Zone::Local, subsystem, Some(backlog))
            },
            Subsystem::SyncQueue => self.check_queue(),
        }
    }

    /// Evaluate every subsystem.
    #[must_use]
    pub fn check_all(&self) -> Vec<HealthObservation> {
        Subsystem::ALL.into_iter().map(|s| self.check(s)).collect()
    }

    /// Attempt recovery of one subsystem. Bounded and idempotent: safe to
    /// invoke repeatedly, including when the subsystem was already healthy.
    pub fn recover(&self, subsystem: Subsystem) -> bool {
        log::info!("attempting recovery for {subsystem}");
        let recovered = match subsystem {
            Subsystem::CloudZone => StageStore::new(&self.layout, Zone::Cloud).init().is_ok(),
            Subsystem::LocalZone => StageStore::new(&self.layout, Zone::Local).init().is_ok(),
            Subsystem::SyncQueue => self.recover_queue(),
        };
        if recovered {
            self.audit.info(
                "health_recovery",
                serde_json::json!({ "subsystem": subsystem }),
            );
        } else {
            self.audit.error(
                "health_recovery",
                serde_json::json!({ "subsystem": subsystem }),
            );
        }
        recovered
    }

    /// Run the polling loop.
    ///
    /// `cycles` bounds the iteration count; `None` runs until `stop` is
    /// set. Cancellation is immediate: the flag is re-checked before every
    /// cycle and the sleep is skipped on the final one. Returns the number
    /// of completed cycles.
    pub fn run(&mut self, cycles: Option<usize>, interval: Duration, stop: &AtomicBool) -> usize {
        let mut completed = 0;

        loop {
            if stop.load(Ordering::SeqCst) {
                break;
            }
            if cycles.is_some_and(|max| completed >= max) {
                break;
            }

            for observation in self.check_all() {
                self.observe(&observation);
            }
            completed += 1;

            let more = cycles.is_none_or(|max| completed < max);
            if more && !interval.is_zero() && !stop.load(Ordering::SeqCst) {
                std::thread::sleep(interval);
            }
        }

        completed
    }

    /// Record one observation, tracking consecutive failures and invoking
    /// recovery past the configured threshold.
    fn observe(&mut self, observation: &HealthObservation) {
        let level = match observation.status {
            HealthStatus::Healthy => AuditLevel::Info,
            HealthStatus::Degraded => AuditLevel::Warning,
            HealthStatus::Critical => AuditLevel::Critical,
        };
        self.audit.record(
            level,
            "health_check",
            &observation.status.to_string(),
            serde_json::json!({
                "subsystem": observation.subsystem,
                "detail": observation.detail,
            }),
        );

        if observation.status == HealthStatus::Healthy {
            self.consecutive_failures.insert(observation.subsystem, 0);
            return;
        }

        log::warn!(
            "{} {}: {}",
            observation.subsystem,
            observation.status,
            observation.detail
        );
        let failures = self
            .consecutive_failures
            .entry(observation.subsystem)
            .and_modify(|n| *n += 1)
            .or_insert(1);

        if *failures >= self.config.failure_threshold {
            log::warn!(
                "{}: {} consecutive failures, attempting recovery",
                observation.subsystem,
                failures
            );
            if self.recover(observation.subsystem) {
                self.consecutive_failures.insert(observation.subsystem, 0);
            }
        }
    }

    fn check_zone(
        &self,
        zone: Zone,
        subsystem: Subsystem,
        approval_backlog: Option<usize>,
    ) -> HealthObservation {
        let root = self.layout.zone_dir(zone);
        if !root.exists() {
            return HealthObservation {
                subsystem,
                status: HealthStatus::Critical,
                detail: format!("zone root missing: {}", root.display()),
            };
        }

        // Writability probe; removed immediately.
        let probe = root.join(".health-probe");
        if let Err(err) = fs::write(&probe, "probe") {
            return HealthObservation {
                subsystem,
                status: HealthStatus::Critical,
                detail: format!("zone root not writable: {err}"),
            };
        }
        let _ = fs::remove_file(&probe);

        if let Some(backlog) = approval_backlog {
            if backlog > self.config.approval_backlog {
                return HealthObservation {
                    subsystem,
                    status: HealthStatus::Degraded,
                    detail: format!(
                        "{backlog} pending approvals (threshold {})",
                        self.config.approval_backlog
                    ),
                };
            }
        }

        HealthObservation {
            subsystem,
            status: HealthStatus::Healthy,
            detail: "ok".to_string(),
        }
    }

    fn check_queue(&self) -> HealthObservation {
        let claims_dir = self.layout.claims_dir();
        if !claims_dir.exists() {
            return HealthObservation {
                subsystem: Subsystem::SyncQueue,
                status: HealthStatus::Critical,
                detail: format!("claim log missing: {}", claims_dir.display()),
            };
        }

        let backlog = glob_count(&claims_dir, "claim_*.json");
        if backlog > self.config.claim_backlog {
            return HealthObservation {
                subsystem: Subsystem::SyncQueue,
                status: HealthStatus::Degraded,
                detail: format!(
                    "{backlog} claim records (threshold {})",
                    self.config.claim_backlog
                ),
            };
        }

        HealthObservation {
            subsystem: Subsystem::SyncQueue,
            status: HealthStatus::Healthy,
            detail: "ok".to_string(),
        }
    }

    /// Recreate the queue directories and prune claim records older than
    /// the retention window. Fresh records are never touched.
    fn recover_queue(&self) -> bool {
        let claims_dir = self.layout.claims_dir();
        if fs::create_dir_all(&claims_dir).is_err()
            || fs::create_dir_all(self.layout.receipts_dir()).is_err()
        {
            return false;
        }

        let retention = Duration::from_secs(self.config.retention_hours * 3600);
        let Ok(entries) = fs::read_dir(&claims_dir) else {
            return false;
        };
        for entry in entries.filter_map(Result::ok) {
            let path = entry.path();
            let stale = entry
                .metadata()
                .and_then(|meta| meta.modified())
                .ok()
                .and_then(|modified| modified.elapsed().ok())
                .is_some_and(|age| age > retention);
            if stale {
                if let Err(err) = fs::remove_file(&path) {
                    log::warn!("failed to prune stale claim {}: {err}", path.display());
                } else {
                    log::info!("pruned stale claim {}", path.display());
                }
            }
        }
        true
    }
}
