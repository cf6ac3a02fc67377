//! Claim-by-move ownership transfer
//!
//! A claim is two steps: persist an immutable claim record to the
//! zone-agnostic claim log, then relocate the task with the stage store's
//! atomic move. The move alone is atomic; a claim record whose move failed
//! is an orphan, distinguishable because the task is still at its origin,
//! and is a safe no-op to retry.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::{ClaimRecord, Stage, Zone};
use crate::paths::VaultLayout;
use crate::storage::stage::{StageStore, StoreError, transfer};

/// Errors from claim operations
#[derive(Debug, Error)]
pub enum ClaimError {
    /// The destination stage already holds a record with this id. Never
    /// overwritten; the caller decides whether this is a duplicate or a
    /// replay.
    #[error("claim conflict: task {id} already present in {zone}/{stage}")]
    Conflict {
        /// Task id
        id: String,
        /// Occupied zone
        zone: Zone,
        /// Occupied stage
        stage: Stage,
    },

    /// The task is no longer at the source: a concurrent actor claimed it
    /// first. Expected outcome of a race, not a fault.
    #[error("task {id} no longer at {zone}/{stage}: claimed by a concurrent actor")]
    SourceMissing {
        /// Task id
        id: String,
        /// Zone the task was expected in
        zone: Zone,
        /// Stage the task was expected in
        stage: Stage,
    },

    /// Underlying storage failure
    #[error("claim error: {context}: {source}")]
    Io {
        /// What was being attempted
        context: String,
        /// Underlying I/O error
        source: io::Error,
    },
}

/// The zone-agnostic, append-only claim log
#[derive(Debug, Clone)]
pub struct ClaimLog {
    dir: PathBuf,
}

impl ClaimLog {
    /// Create a claim log handle under `layout`.
    #[must_use]
    pub fn new(layout: &VaultLayout) -> Self {
        Self {
            dir: layout.claims_dir(),
        }
    }

    /// The claim log directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist a claim record. Each record gets its own file, named after
    /// the task and claim timestamp, and is never rewritten.
    pub fn record(&self, claim: &ClaimRecord) -> Result<PathBuf, ClaimError> {
        fs::create_dir_all(&self.dir).map_err(|e| ClaimError::Io {
            context: "creating claim log".to_string(),
            source: e,
        })?;

        let stamp = claim.claimed_at.replace(':', "-");
        let path = self.dir.join(format!("claim_{}_{stamp}.json", claim.task));
        let json = serde_json::to_string_pretty(claim).map_err(|e| ClaimError::Io {
            context: format!("encoding claim for {}", claim.task),
            source: io::Error::other(e),
        })?;
        fs::write(&path, json).map_err(|e| ClaimError::Io {
            context: format!("writing claim for {}", claim.task),
            source: e,
        })?;
        Ok(path)
    }

    /// Load every claim record, oldest first. Records that fail to parse
    /// are skipped (forward compatibility: unknown shapes are ignorable).
    pub fn list(&self) -> Result<Vec<ClaimRecord>, ClaimError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut paths: Vec<PathBuf> = fs::read_dir(&self.dir)
            .map_err(|e| ClaimError::Io {
                context: "listing claim log".to_string(),
                source: e,
            })?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.extension().is_some_and(|ext| ext == "json")
                    && path
                        .file_name()
                        .is_some_and(|name| name.to_string_lossy().starts_with("claim_"))
            })
            .collect();
        paths.sort();

        Ok(paths
            .iter()
            .filter_map(|path| {
                let content = fs::read_to_string(path).ok()?;
                serde_json::from_str(&content).ok()
            })
            .collect())
    }

    /// Number of claim records currently in the log.
    #[must_use]
    pub fn count(&self) -> usize {
        self.list().map_or(0, |claims| claims.len())
    }

    /// Whether a claim record is an orphan: its move never completed, so
    /// the referenced task is still at the origin.
    #[must_use]
    pub fn is_orphaned(&self, claim: &ClaimRecord, source: &StageStore) -> bool {
        source.exists(&claim.task, claim.from_stage)
    }
}

/// Transfer ownership of one task as a single atomic step, leaving a
/// permanent claim record.
///
/// `Conflict` and `SourceMissing` are the expected outcomes of concurrent
/// claims; callers recover locally and never surface them as failures.
pub fn claim_task(
    log: &ClaimLog,
    src: &StageStore,
    id: &str,
    from: Stage,
    dst: &StageStore,
    to: Stage,
    claimant: &str,
) -> Result<ClaimRecord, ClaimError> {
    let claim = ClaimRecord::new(id, src.zone(), from, dst.zone(), to, claimant);
    log.record(&claim)?;

    match transfer(src, id, from, dst, to) {
        Ok(()) => {
            log::info!(
                "claimed {id}: {}/{from} -> {}/{to} by {claimant}",
                src.zone(),
                dst.zone()
            );
            Ok(claim)
        },
        Err(StoreError::Conflict { id, zone, stage }) => {
            log::debug!("claim of {id} left an orphan record: destination {zone}/{stage} occupied");
            Err(ClaimError::Conflict { id, zone, stage })
        },
        Err(StoreError::NotFound { id, zone, stage }) => {
            log::debug!("claim of {id} lost the race: source {zone}/{stage} empty");
            Err(ClaimError::SourceMissing { id, zone, stage })
        },
        Err(StoreError::Io { context, source }) => Err(ClaimError::Io { context, source }),
        Err(StoreError::DuplicateId { id }) => Err(ClaimError::Io {
            context: format!("unexpected duplicate id {id} during move"),
            source: io::Error::other("duplicate id"),
        }),
    }
}
