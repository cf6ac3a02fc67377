//! Shared status artifact
//!
//! The one resource multiple independent processes may write concurrently.
//! Every write happens under the `status` lock (single-writer discipline)
//! and is best-effort: a lock timeout or storage failure degrades to a
//! logged `false`, never a crash.

use std::fs;
use std::time::Duration;

use serde::Serialize;
use walkdir::WalkDir;

use crate::lock::LockManager;
use crate::models::{ApprovalStatus, Stage, Zone};
use crate::paths::VaultLayout;
use crate::storage::StageStore;
use crate::sync::glob_count;

/// Name of the lock guarding the status artifact
pub const STATUS_LOCK: &str = "status";

/// Per-stage record count
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StageCount {
    /// The stage
    pub stage: Stage,
    /// Records currently in it
    pub count: usize,
}

/// One zone's stage population
#[derive(Debug, Clone, Serialize)]
pub struct ZoneStatus {
    /// The zone
    pub zone: Zone,
    /// Per-stage counts in lifecycle order
    pub stages: Vec<StageCount>,
    /// Total records across all stages
    pub total: usize,
}

/// Point-in-time snapshot of the whole vault
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    /// When the snapshot was taken (RFC 3339)
    pub generated_at: String,
    /// Per-zone populations
    pub zones: Vec<ZoneStatus>,
    /// Claim records in the queue
    pub claims: usize,
    /// Sync receipts in the queue
    pub receipts: usize,
    /// Approval requests awaiting a decision
    pub pending_approvals: usize,
    /// Titles of the most recently completed tasks
    pub recent_completions: Vec<String>,
}

/// Collects and renders the status artifact
#[derive(Debug, Clone)]
pub struct StatusBoard {
    layout: VaultLayout,
}

impl StatusBoard {
    /// How many recent completions the artifact shows.
    pub const RECENT_LIMIT: usize = 5;

    /// Build a board over `layout`.
    #[must_use]
    pub const fn new(layout: VaultLayout) -> Self {
        Self { layout }
    }

    /// Take a point-in-time snapshot. Does not lock; counts may drift while
    /// collecting, which is acceptable for an observability artifact.
    #[must_use]
    pub fn collect(&self) -> StatusReport {
        let zones = Zone::ALL
            .into_iter()
            .map(|zone| {
                let store = StageStore::new(&self.layout, zone);
                let stages: Vec<StageCount> = Stage::ALL
                    .into_iter()
                    .map(|stage| StageCount {
                        stage,
                        count: store.count(stage),
                    })
                    .collect();
                // Walk the zone root rather than summing the snapshot so
                // records in unexpected locations still show up.
                let total = WalkDir::new(self.layout.zone_dir(zone))
                    .into_iter()
                    .filter_map(Result::ok)
                    .filter(|entry| {
                        entry.file_type().is_file()
                            && entry.path().extension().is_some_and(|ext| ext == "md")
                    })
                    .count();
                ZoneStatus { zone, stages, total }
            })
            .collect();

        StatusReport {
            generated_at: chrono::Utc::now().to_rfc3339(),
            zones,
            claims: glob_count(&self.layout.claims_dir(), "claim_*.json"),
            receipts: glob_count(&self.layout.receipts_dir(), "receipt_*.json"),
            pending_approvals: glob_count(
                &self.layout.approvals_dir(ApprovalStatus::Pending),
                "*.json",
            ),
            recent_completions: self.recent_completions(Self::RECENT_LIMIT),
        }
    }

    /// Render a report as the markdown status document.
    #[must_use]
    pub fn render(report: &StatusReport) -> String {
        let mut out = String::from("# Status\n\n");
        out.push_str(&format!("**Updated**: {}\n\n", report.generated_at));

        for zone in &report.zones {
            out.push_str(&format!(
                "## {} zone ({})\n\n",
                zone.zone,
                zone.zone.trust_label()
            ));
            for entry in &zone.stages {
                out.push_str(&format!("- {}: {}\n", entry.stage, entry.count));
            }
            out.push_str(&format!("- total: {}\n\n", zone.total));
        }

        out.push_str("## Queue\n\n");
        out.push_str(&format!("- claims: {}\n", report.claims));
        out.push_str(&format!("- receipts: {}\n", report.receipts));
        out.push_str(&format!("- pending approvals: {}\n\n", report.pending_approvals));

        out.push_str("## Recent completions\n\n");
        if report.recent_completions.is_empty() {
            out.push_str("*No completions yet.*\n");
        } else {
            for title in &report.recent_completions {
                out.push_str(&format!("- {title}\n"));
            }
        }
        out
    }

    /// Write the status artifact under the `status` lock. Best-effort:
    /// returns `false` on lock timeout or storage failure, with the cause
    /// logged.
    #[must_use]
    pub fn write(&self, locks: &LockManager, timeout: Duration) -> bool {
        let guard = match locks.acquire(STATUS_LOCK, timeout) {
            Ok(guard) => guard,
            Err(err) => {
                log::warn!("status update skipped: {err}");
                return false;
            },
        };

        let report = self.collect();
        let content = Self::render(&report);
        match fs::write(self.layout.status_file(), content) {
            Ok(()) => {
                log::debug!("status artifact updated under lock {:?}", guard.name());
                true
            },
            Err(err) => {
                log::warn!("status write failed: {err}");
                false
            },
        }
    }

    /// Titles of the most recently completed tasks in the high-trust zone,
    /// newest first.
    fn recent_completions(&self, limit: usize) -> Vec<String> {
        let done = self.layout.stage_dir(Zone::Local, Stage::Done);
        let Ok(entries) = fs::read_dir(&done) else {
            return Vec::new();
        };

        let mut records: Vec<(std::time::SystemTime, std::path::PathBuf)> = entries
            .filter_map(Result::ok)
            .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "md"))
            .filter_map(|entry| {
                let modified = entry.metadata().ok()?.modified().ok()?;
                Some((modified, entry.path()))
            })
            .collect();
        records.sort_by(|a, b| b.0.cmp(&a.0));

        records
            .into_iter()
            .take(limit)
            .filter_map(|(_, path)| {
                let content = fs::read_to_string(&path).ok()?;
                content
                    .lines()
                    .find(|line| line.starts_with("# "))
                    .map(|line| line.trim_start_matches('#').trim().to_string())
                    .or_else(|| path.file_stem().map(|s| s.to_string_lossy().to_string()))
            })
            .collect()
    }
}
