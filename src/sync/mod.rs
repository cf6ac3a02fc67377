//! Zone sync engine
//!
//! Decides, per candidate record in the source zone, whether it may cross
//! into the destination zone, and if so copies it (a copy, not a claim-move:
//! both zones may keep referencing the original) and writes a receipt. The
//! receipt is written only after the destination write succeeds; any earlier
//! failure leaves the source untouched and produces no partial state.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::models::SyncReceipt;
use crate::paths::VaultLayout;
use crate::policy::{PolicyFilter, PolicyViolation};

/// Errors from sync operations
#[derive(Debug, Error)]
pub enum SyncError {
    /// A transfer rule blocked the candidate
    #[error(transparent)]
    Policy(#[from] PolicyViolation),

    /// Underlying storage failure
    #[error("sync error: {context}: {source}")]
    Io {
        /// What was being attempted
        context: String,
        /// Underlying I/O error
        source: io::Error,
    },
}

impl SyncError {
    fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

/// Result of syncing a single candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The candidate crossed the boundary; the receipt is valid
    Synced(SyncReceipt),
    /// A record with the same name already exists at the destination;
    /// nothing was written (repeated syncs converge)
    AlreadyPresent,
}

/// Tally of one bulk scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct ScanReport {
    /// Candidates copied to the destination
    pub transferred: usize,
    /// Candidates already present at the destination
    pub skipped: usize,
    /// Candidates blocked by policy
    pub blocked: usize,
    /// Candidates that failed with storage errors (logged, scan continued)
    pub failed: usize,
}

/// SHA-256 digest of `content`, lowercase hex.
#[must_use]
pub fn content_digest(content: &str) -> String {
    Sha256::digest(content.as_bytes())
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// Policy-filtered copier between zone locations
#[derive(Debug, Clone)]
pub struct ZoneSyncEngine {
    filter: PolicyFilter,
    receipts_dir: PathBuf,
}

impl ZoneSyncEngine {
    /// Build an engine writing receipts under `layout`.
    #[must_use]
    pub fn new(filter: PolicyFilter, layout: &VaultLayout) -> Self {
        Self {
            filter,
            receipts_dir: layout.receipts_dir(),
        }
    }

    /// The policy filter this engine applies.
    #[must_use]
    pub const fn filter(&self) -> &PolicyFilter {
        &self.filter
    }

    /// Sync one file into `dest_dir`.
    ///
    /// The copy is verbatim, so the receipt digest matches the source
    /// content exactly. Fail-closed: a destination write failure produces
    /// no receipt and leaves the source unaffected.
    pub fn sync_file(&self, source: &Path, dest_dir: &Path) -> Result<SyncOutcome, SyncError> {
        let name = source
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let dest = dest_dir.join(&name);
        if dest.exists() {
            log::debug!("skip {name}: already present at {}", dest_dir.display());
            return Ok(SyncOutcome::AlreadyPresent);
        }

        let content = fs::read_to_string(source)
            .map_err(|e| SyncError::io(format!("reading {}", source.display()), e))?;

        self.filter.evaluate(&name, &content)?;

        fs::create_dir_all(dest_dir)
            .map_err(|e| SyncError::io(format!("creating {}", dest_dir.display()), e))?;
        fs::write(&dest, &content)
            .map_err(|e| SyncError::io(format!("writing {}", dest.display()), e))?;

        // The destination write is the point after which the receipt is
        // considered valid. Persisting it is best-effort: the transfer
        // already happened, so a receipt write failure degrades to a logged
        // no-op instead of failing the sync.
        let receipt = SyncReceipt {
            file: name.clone(),
            digest: content_digest(&content),
            size: content.len() as u64,
            source: source.display().to_string(),
            destination: dest.display().to_string(),
            synced_at: chrono::Utc::now().to_rfc3339(),
        };
        if let Err(err) = self.write_receipt(&receipt) {
            log::warn!("receipt write skipped for {name}: {err}");
        }

        log::info!("synced {name} ({} bytes, sha256 {})", receipt.size, &receipt.digest[..8]);
        Ok(SyncOutcome::Synced(receipt))
    }

    /// Walk every candidate in `source_dir` and sync each one.
    ///
    /// Idempotent per file: candidates already present at the destination
    /// are skipped, so repeated scans converge rather than duplicate.
    /// Policy violations and per-file storage errors are logged and do not
    /// abort the scan.
    pub fn scan(&self, source_dir: &Path, dest_dir: &Path) -> Result<ScanReport, SyncError> {
        let mut report = ScanReport::default();

        if !source_dir.exists() {
            return Ok(report);
        }

        let mut candidates: Vec<PathBuf> = fs::read_dir(source_dir)
            .map_err(|e| SyncError::io(format!("scanning {}", source_dir.display()), e))?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();
        candidates.sort();

        for candidate in candidates {
            match self.sync_file(&candidate, dest_dir) {
                Ok(SyncOutcome::Synced(_)) => report.transferred += 1,
                Ok(SyncOutcome::AlreadyPresent) => report.skipped += 1,
                Err(SyncError::Policy(violation)) => {
                    log::warn!("{violation}");
                    report.blocked += 1;
                },
                Err(SyncError::Io { context, source }) => {
                    log::error!("sync failed: {context}: {source}");
                    report.failed += 1;
                },
            }
        }

        log::info!(
            "scan complete: {} transferred, {} skipped, {} blocked, {} failed",
            report.transferred,
            report.skipped,
            report.blocked,
            report.failed
        );
        Ok(report)
    }

    /// Number of receipts written so far.
    #[must_use]
    pub fn receipt_count(&self) -> usize {
        glob_count(&self.receipts_dir, "receipt_*.json")
    }

    fn write_receipt(&self, receipt: &SyncReceipt) -> Result<(), SyncError> {
        fs::create_dir_all(&self.receipts_dir)
            .map_err(|e| SyncError::io("creating receipt directory".to_string(), e))?;

        let stem = receipt.file.trim_end_matches(".md");
        let path = self.receipts_dir.join(format!("receipt_{stem}.json"));
        let json = serde_json::to_string_pretty(receipt)
            .map_err(|e| SyncError::io(format!("encoding receipt for {}", receipt.file), io::Error::other(e)))?;
        fs::write(&path, json)
            .map_err(|e| SyncError::io(format!("writing receipt for {}", receipt.file), e))
    }
}

/// Count files matching `pattern` inside `dir`. Best-effort; unreadable
/// directories count as empty.
#[must_use]
pub fn glob_count(dir: &Path, pattern: &str) -> usize {
    let full = dir.join(pattern);
    glob::glob(&full.to_string_lossy()).map_or(0, |paths| paths.filter_map(Result::ok).count())
}
