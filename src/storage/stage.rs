//! Stage store
//!
//! Represents a task's place in the workflow as a location in a fixed set of
//! named stage directories, one file per record. The move primitive is a
//! rename: a record is visible in at most one of the two stages at every
//! instant another process can observe.

use std::fs;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::PathBuf;

use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::models::{Stage, TaskDocument, Zone};
use crate::paths::VaultLayout;

/// Record file extension
pub const RECORD_EXT: &str = "md";

/// Errors from stage store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// The record is absent from the source stage
    #[error("task {id} not found in {zone}/{stage}")]
    NotFound {
        /// Task id
        id: String,
        /// Zone searched
        zone: Zone,
        /// Stage searched
        stage: Stage,
    },

    /// A record with the same id already occupies the destination stage
    #[error("task {id} already exists in {zone}/{stage}")]
    Conflict {
        /// Task id
        id: String,
        /// Occupied zone
        zone: Zone,
        /// Occupied stage
        stage: Stage,
    },

    /// Pathological id collision on create
    #[error("task id collision: {id}")]
    DuplicateId {
        /// Colliding id
        id: String,
    },

    /// Underlying storage failure
    #[error("storage error: {context}: {source}")]
    Io {
        /// What was being attempted
        context: String,
        /// Underlying I/O error
        source: io::Error,
    },
}

impl StoreError {
    fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

/// Generate a record id unique within a stage: creation time plus a short
/// content hash.
#[must_use]
pub fn generate_id(content: &str) -> String {
    let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%S%3f");
    let digest = Sha256::digest(content.as_bytes());
    let short: String = digest.iter().take(4).map(|b| format!("{b:02x}")).collect();
    format!("task-{stamp}-{short}")
}

/// One zone's set of stage directories
#[derive(Debug, Clone)]
pub struct StageStore {
    zone: Zone,
    zone_root: PathBuf,
}

impl StageStore {
    /// Create a store for `zone` under `layout`. Does not touch the
    /// filesystem; call [`StageStore::init`] to create the directories.
    #[must_use]
    pub fn new(layout: &VaultLayout, zone: Zone) -> Self {
        Self {
            zone,
            zone_root: layout.zone_dir(zone),
        }
    }

    /// The zone this store belongs to.
    #[must_use]
    pub const fn zone(&self) -> Zone {
        self.zone
    }

    /// Create every stage directory. Idempotent.
    pub fn init(&self) -> Result<(), StoreError> {
        for stage in Stage::ALL {
            fs::create_dir_all(self.stage_dir(stage))
                .map_err(|e| StoreError::io(format!("creating {}/{stage}", self.zone), e))?;
        }
        Ok(())
    }

    /// Directory of one stage.
    #[must_use]
    pub fn stage_dir(&self, stage: Stage) -> PathBuf {
        self.zone_root.join(stage.dir_name())
    }

    /// Path of one record.
    #[must_use]
    pub fn record_path(&self, id: &str, stage: Stage) -> PathBuf {
        self.stage_dir(stage).join(format!("{id}.{RECORD_EXT}"))
    }

    /// Whether a record exists in a stage.
    #[must_use]
    pub fn exists(&self, id: &str, stage: Stage) -> bool {
        self.record_path(id, stage).exists()
    }

    /// Write a new record into `stage` and return its generated id.
    ///
    /// `create_new` enforces the uniqueness invariant: an id collision
    /// (practically unreachable given timestamp+hash ids) fails with
    /// `DuplicateId` instead of overwriting.
    pub fn create(&self, stage: Stage, doc: &TaskDocument) -> Result<String, StoreError> {
        let content = doc.render();
        let id = generate_id(&content);
        let path = self.record_path(&id, stage);

        fs::create_dir_all(self.stage_dir(stage))
            .map_err(|e| StoreError::io(format!("creating {}/{stage}", self.zone), e))?;

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(StoreError::DuplicateId { id });
            },
            Err(e) => return Err(StoreError::io(format!("creating record {id}"), e)),
        };
        file.write_all(content.as_bytes())
            .map_err(|e| StoreError::io(format!("writing record {id}"), e))?;

        Ok(id)
    }

    /// Atomically relocate a record within this zone.
    pub fn move_record(&self, id: &str, from: Stage, to: Stage) -> Result<(), StoreError> {
        transfer(self, id, from, self, to)
    }

    /// Point-in-time snapshot of the record ids in a stage, sorted. Does
    /// not lock; concurrent moves may invalidate entries by the time the
    /// caller acts on them.
    pub fn list(&self, stage: Stage) -> Result<Vec<String>, StoreError> {
        let dir = self.stage_dir(stage);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let entries = fs::read_dir(&dir)
            .map_err(|e| StoreError::io(format!("listing {}/{stage}", self.zone), e))?;

        let mut ids: Vec<String> = entries
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == RECORD_EXT) {
                    path.file_stem().map(|stem| stem.to_string_lossy().to_string())
                } else {
                    None
                }
            })
            .collect();
        ids.sort();
        Ok(ids)
    }

    /// Number of records in a stage. Best-effort; a missing directory
    /// counts as empty.
    #[must_use]
    pub fn count(&self, stage: Stage) -> usize {
        self.list(stage).map_or(0, |ids| ids.len())
    }

    /// Read a record's full content.
    pub fn read(&self, id: &str, stage: Stage) -> Result<String, StoreError> {
        let path = self.record_path(id, stage);
        fs::read_to_string(&path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                StoreError::NotFound {
                    id: id.to_string(),
                    zone: self.zone,
                    stage,
                }
            } else {
                StoreError::io(format!("reading record {id}"), e)
            }
        })
    }

    /// Append a pre-rendered section to a record without disturbing its
    /// existing content.
    pub fn append(&self, id: &str, stage: Stage, section: &str) -> Result<(), StoreError> {
        let path = self.record_path(id, stage);
        let mut file = match OpenOptions::new().append(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound {
                    id: id.to_string(),
                    zone: self.zone,
                    stage,
                });
            },
            Err(e) => return Err(StoreError::io(format!("opening record {id}"), e)),
        };
        file.write_all(section.as_bytes())
            .map_err(|e| StoreError::io(format!("appending to record {id}"), e))
    }
}

/// Atomically relocate a record between two stores (possibly the same one).
///
/// The destination check is advisory; the rename is the atomic step. A
/// concurrent claimant who loses the race observes `NotFound` here, which
/// claim-level callers treat as `SourceMissing` — an expected outcome, not
/// a fault.
pub fn transfer(
    src: &StageStore,
    id: &str,
    from: Stage,
    dst: &StageStore,
    to: Stage,
) -> Result<(), StoreError> {
    let src_path = src.record_path(id, from);
    let dst_path = dst.record_path(id, to);

    if dst_path.exists() {
        return Err(StoreError::Conflict {
            id: id.to_string(),
            zone: dst.zone,
            stage: to,
        });
    }

    fs::create_dir_all(dst.stage_dir(to))
        .map_err(|e| StoreError::io(format!("creating {}/{to}", dst.zone), e))?;

    match fs::rename(&src_path, &dst_path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(StoreError::NotFound {
            id: id.to_string(),
            zone: src.zone,
            stage: from,
        }),
        Err(e) => Err(StoreError::io(
            format!("moving {id} from {}/{from} to {}/{to}", src.zone, dst.zone),
            e,
        )),
    }
}
