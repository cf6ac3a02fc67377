//! Data model: task records and the structured transfer artifacts
//! (claims, receipts, approval requests) that cross the zone boundary.

/// Approval request records
pub mod approval;
/// Claim records
pub mod claim;
/// Sync receipts
pub mod receipt;
/// Task records and workflow enums
pub mod task;

pub use approval::{ApprovalRequest, ApprovalStatus, ExecutionOutcome};
pub use claim::ClaimRecord;
pub use receipt::SyncReceipt;
pub use task::{Priority, Stage, TaskDocument, Zone, section};
