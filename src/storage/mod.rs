//! Storage layer: per-zone stage stores and the claim protocol
//!
//! A stage store keeps one file per task record and relies on the atomicity
//! of rename for stage transitions; no external locking. The claim protocol
//! layers an immutable audit record on top of a cross-store move.

/// Claim log and the claim-by-move protocol
pub mod claim;
/// Per-zone stage store
pub mod stage;

pub use claim::{ClaimError, ClaimLog, claim_task};
pub use stage::{StageStore, StoreError, generate_id, transfer};
