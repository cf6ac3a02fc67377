//! Append-only audit logging
//!
//! One JSONL entry per autonomous action, appended to a per-day file.
//! Recording is best-effort by contract: a storage failure degrades to a
//! logged `false` instead of propagating, so audit trouble never takes
//! down the operation being audited.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use serde::Serialize;

use crate::paths::VaultLayout;

/// Severity of an audit entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditLevel {
    /// Routine action
    Info,
    /// Degraded but operating
    Warning,
    /// Operation failed
    Error,
    /// Subsystem unusable
    Critical,
}

/// One audit log entry
#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    /// When the entry was recorded (RFC 3339)
    pub timestamp: String,
    /// Severity
    pub level: AuditLevel,
    /// Action being performed
    pub action: String,
    /// Outcome: success, failed, degraded
    pub status: String,
    /// Additional context
    pub details: serde_json::Value,
}

/// Append-only JSONL audit log under the vault's audit directory
#[derive(Debug, Clone)]
pub struct AuditLog {
    dir: PathBuf,
}

impl AuditLog {
    /// Build a log handle under `layout`.
    #[must_use]
    pub fn new(layout: &VaultLayout) -> Self {
        Self {
            dir: layout.audit_dir(),
        }
    }

    /// Append one entry. Returns `false` (and logs a warning) if the write
    /// failed; never propagates.
    pub fn record(
        &self,
        level: AuditLevel,
        action: &str,
        status: &str,
        details: serde_json::Value,
    ) -> bool {
        let entry = AuditEntry {
            timestamp: chrono::Utc::now().to_rfc3339(),
            level,
            action: action.to_string(),
            status: status.to_string(),
            details,
        };
        match self.append(&entry) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("audit write failed for {action}: {err}");
                false
            },
        }
    }

    /// Append a routine success entry.
    pub fn info(&self, action: &str, details: serde_json::Value) -> bool {
        self.record(AuditLevel::Info, action, "success", details)
    }

    /// Append a degraded-operation entry.
    pub fn warning(&self, action: &str, details: serde_json::Value) -> bool {
        self.record(AuditLevel::Warning, action, "degraded", details)
    }

    /// Append a failure entry.
    pub fn error(&self, action: &str, details: serde_json::Value) -> bool {
        self.record(AuditLevel::Error, action, "failed", details)
    }

    fn append(&self, entry: &AuditEntry) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.current_file();
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        let line = serde_json::to_string(entry).map_err(std::io::Error::other)?;
        writeln!(file, "{line}")
    }

    /// Today's log file: `audit-YYYYMMDD.jsonl`.
    #[must_use]
    pub fn current_file(&self) -> PathBuf {
        let day = chrono::Utc::now().format("%Y%m%d");
        self.dir.join(format!("audit-{day}.jsonl"))
    }
}
