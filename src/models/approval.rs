//! Approval request
//!
//! A pending human decision gating execution of a sensitive task. Exactly
//! one forward transition is legal from `pending`; the record is otherwise
//! terminal.

use serde::{Deserialize, Serialize};

/// Status of an approval request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    /// Awaiting a human decision
    #[default]
    Pending,
    /// Decision was approve (terminal)
    Approved,
    /// Decision was reject (terminal)
    Rejected,
}

impl ApprovalStatus {
    /// All status sets, pending first.
    pub const ALL: [Self; 3] = [Self::Pending, Self::Approved, Self::Rejected];

    /// Directory name of this status set under `approvals/`.
    #[must_use]
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Outcome of executing an approved task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionOutcome {
    /// Execution succeeded; the task reached the done stage
    Completed,
    /// Execution failed; the task reached the failed stage
    Failed,
}

/// A pending (or decided) human decision over one sensitive task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalRequest {
    /// Request identity
    pub id: String,
    /// Id of the referenced task
    pub task: String,
    /// Current status
    #[serde(default)]
    pub status: ApprovalStatus,
    /// Why the task was flagged sensitive
    pub reason: String,
    /// The threshold or rule that triggered the flag
    pub threshold: String,
    /// When the request was created (RFC 3339)
    pub created_at: String,
    /// When the decision was made (RFC 3339)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decided_at: Option<String>,
    /// Who made the decision
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decided_by: Option<String>,
    /// Free-text decision rationale
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision_reason: Option<String>,
    /// Execution outcome, present only after an approved execution attempt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution: Option<ExecutionOutcome>,
}

impl ApprovalRequest {
    /// Build a pending request for `task`, stamped with the current time.
    #[must_use]
    pub fn new(id: &str, task: &str, reason: &str, threshold: &str) -> Self {
        Self {
            id: id.to_string(),
            task: task.to_string(),
            status: ApprovalStatus::Pending,
            reason: reason.to_string(),
            threshold: threshold.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            decided_at: None,
            decided_by: None,
            decision_reason: None,
            execution: None,
        }
    }
}
