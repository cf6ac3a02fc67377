//! Claim record
//!
//! Created atomically with an ownership transfer and never mutated
//! afterwards; the claim log is a permanent audit artifact. Consumers must
//! ignore unknown additional fields (forward compatibility).

use serde::{Deserialize, Serialize};

use super::task::{Stage, Zone};

/// An immutable record of one ownership transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRecord {
    /// Id of the transferred task
    pub task: String,
    /// Zone the task was taken from
    pub from_zone: Zone,
    /// Stage the task was taken from
    pub from_stage: Stage,
    /// Zone the task was moved to
    pub to_zone: Zone,
    /// Stage the task was moved to
    pub to_stage: Stage,
    /// When the claim was made (RFC 3339)
    pub claimed_at: String,
    /// Identity of the claimant
    pub claimed_by: String,
}

impl ClaimRecord {
    /// Build a claim record stamped with the current time.
    #[must_use]
    pub fn new(
        task: &str,
        from_zone: Zone,
        from_stage: Stage,
        to_zone: Zone,
        to_stage: Stage,
        claimed_by: &str,
    ) -> Self {
        Self {
            task: task.to_string(),
            from_zone,
            from_stage,
            to_zone,
            to_stage,
            claimed_at: chrono::Utc::now().to_rfc3339(),
            claimed_by: claimed_by.to_string(),
        }
    }
}
