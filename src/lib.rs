//! handoff - delegate units of work between trust zones over shared,
//! crash-tolerant storage
//!
//! This library implements the protocol binding a low-trust zone (cloud,
//! runs continuously and unattended) and a high-trust zone (local, alone may
//! perform sensitive or irreversible actions) together over a shared
//! filesystem, with no central coordinator: claim-by-move ownership transfer,
//! a policy filter gating what may cross the boundary, single-writer mutual
//! exclusion for shared state, and a human-approval gate for sensitive
//! execution.

// Deny all clippy warnings in this crate
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unused_import_braces,
    unused_qualifications
)]
// Allow some pedantic lints that are too noisy or not applicable
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cargo_common_metadata
)]

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod approval;
pub mod audit;
pub mod config;
pub mod health;
pub mod lock;
pub mod models;
pub mod output;
pub mod paths;
pub mod policy;
pub mod status;
pub mod storage;
pub mod sync;
