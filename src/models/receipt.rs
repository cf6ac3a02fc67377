//! Sync receipt
//!
//! Written once per successful cross-zone transfer, after the destination
//! write succeeds, and never mutated. The digest covers the source content
//! exactly, so a receipt can verify the transferred copy.

use serde::{Deserialize, Serialize};

/// An immutable record of one policy-filtered cross-zone copy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReceipt {
    /// File name of the transferred record
    pub file: String,
    /// SHA-256 digest of the source content, lowercase hex
    pub digest: String,
    /// Payload size in bytes
    pub size: u64,
    /// Source location
    pub source: String,
    /// Destination location
    pub destination: String,
    /// When the transfer completed (RFC 3339)
    pub synced_at: String,
}
