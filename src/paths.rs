//! Centralized path definitions for a handoff vault
//!
//! This module provides a single source of truth for the on-disk layout.
//! Every component receives a [`VaultLayout`] built from an explicit root;
//! nothing resolves paths from ambient environment state.
//!
//! ## Storage Layout
//!
//! ```text
//! vault/                          # vault root (chosen by the caller)
//! ├── handoff.toml                # policy + threshold configuration
//! ├── Status.md                   # shared status artifact (single writer)
//! ├── cloud/                      # low-trust zone
//! │   ├── inbox/                  # one task record per file: <id>.md
//! │   ├── pending/
//! │   ├── claimed/
//! │   ├── pending-approval/
//! │   ├── approved/
//! │   ├── rejected/
//! │   ├── done/
//! │   └── failed/
//! ├── local/                      # high-trust zone (same stage set)
//! ├── queue/                      # zone-agnostic transfer artifacts
//! │   ├── claims/                 # claim records: claim_<task>_<ts>.json
//! │   └── receipts/               # sync receipts: receipt_<file>.json
//! ├── approvals/
//! │   ├── pending/                # one approval request per file: <id>.json
//! │   ├── approved/
//! │   └── rejected/
//! ├── audit/                      # append-only JSONL logs: audit-YYYYMMDD.jsonl
//! └── locks/                      # advisory lock files: <name>.lock
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::models::{ApprovalStatus, Stage, Zone};

/// Configuration filename inside the vault root
pub const CONFIG_FILE: &str = "handoff.toml";

/// Shared status artifact filename
pub const STATUS_FILE: &str = "Status.md";

const QUEUE_DIR: &str = "queue";
const CLAIMS_DIR: &str = "claims";
const RECEIPTS_DIR: &str = "receipts";
const APPROVALS_DIR: &str = "approvals";
const AUDIT_DIR: &str = "audit";
const LOCKS_DIR: &str = "locks";

/// The on-disk layout of a handoff vault, rooted at an explicit path.
#[derive(Debug, Clone)]
pub struct VaultLayout {
    root: PathBuf,
}

impl VaultLayout {
    /// Create a layout rooted at `root`. Does not touch the filesystem.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The vault root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to `handoff.toml`.
    #[must_use]
    pub fn config_file(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    /// Path to the shared status artifact.
    #[must_use]
    pub fn status_file(&self) -> PathBuf {
        self.root.join(STATUS_FILE)
    }

    /// Root directory of a zone.
    #[must_use]
    pub fn zone_dir(&self, zone: Zone) -> PathBuf {
        self.root.join(zone.dir_name())
    }

    /// Directory of one stage within a zone.
    #[must_use]
    pub fn stage_dir(&self, zone: Zone, stage: Stage) -> PathBuf {
        self.zone_dir(zone).join(stage.dir_name())
    }

    /// Zone-agnostic queue directory.
    #[must_use]
    pub fn queue_dir(&self) -> PathBuf {
        self.root.join(QUEUE_DIR)
    }

    /// Claim log directory (`queue/claims/`).
    #[must_use]
    pub fn claims_dir(&self) -> PathBuf {
        self.queue_dir().join(CLAIMS_DIR)
    }

    /// Sync receipt directory (`queue/receipts/`).
    #[must_use]
    pub fn receipts_dir(&self) -> PathBuf {
        self.queue_dir().join(RECEIPTS_DIR)
    }

    /// Approval request directory for one status set.
    #[must_use]
    pub fn approvals_dir(&self, status: ApprovalStatus) -> PathBuf {
        self.root.join(APPROVALS_DIR).join(status.dir_name())
    }

    /// Append-only audit log directory.
    #[must_use]
    pub fn audit_dir(&self) -> PathBuf {
        self.root.join(AUDIT_DIR)
    }

    /// Advisory lock file directory.
    #[must_use]
    pub fn locks_dir(&self) -> PathBuf {
        self.root.join(LOCKS_DIR)
    }

    /// Path to a named lock file.
    #[must_use]
    pub fn lock_file(&self, name: &str) -> PathBuf {
        self.locks_dir().join(format!("{name}.lock"))
    }

    /// Create every directory of the layout. Idempotent.
    pub fn ensure(&self) -> io::Result<()> {
        for zone in Zone::ALL {
            for stage in Stage::ALL {
                fs::create_dir_all(self.stage_dir(zone, stage))?;
            }
        }
        fs::create_dir_all(self.claims_dir())?;
        fs::create_dir_all(self.receipts_dir())?;
        for status in ApprovalStatus::ALL {
            fs::create_dir_all(self.approvals_dir(status))?;
        }
        fs::create_dir_all(self.audit_dir())?;
        fs::create_dir_all(self.locks_dir())?;
        Ok(())
    }
}
