//! Vault configuration
//!
//! Loaded once from `handoff.toml` at the vault root and passed into each
//! component's constructor. No component reads ambient environment state.
//! Unknown keys are ignored so older binaries tolerate newer files.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Complete vault configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Transfer policy rule set
    #[serde(default)]
    pub policy: PolicyRules,
    /// Sensitivity classification thresholds
    #[serde(default)]
    pub thresholds: SensitivityThresholds,
    /// Health loop tuning
    #[serde(default)]
    pub health: HealthConfig,
    /// Lock manager tuning
    #[serde(default)]
    pub lock: LockConfig,
}

impl Config {
    /// Load configuration from `path`, or defaults if the file is absent.
    /// A present-but-malformed file is an error, never a silent default.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Save configuration to `path`.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

/// The ordered rule set gating what may cross a zone boundary.
///
/// Read-only after load; evaluated per candidate transfer. The rules are
/// deliberately inspectable here rather than hard-coded: stricter
/// deployments tighten the file, nothing is strengthened silently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyRules {
    /// Rule set version
    #[serde(default = "default_policy_version")]
    pub version: u32,
    /// The only content format allowed to cross (file extension)
    #[serde(default = "default_allowed_extension")]
    pub allowed_extension: String,
    /// Maximum payload size in bytes
    #[serde(default = "default_max_size_bytes")]
    pub max_size_bytes: u64,
    /// Case-insensitive substrings that exclude a record by name alone
    #[serde(default = "default_excluded_name_patterns")]
    pub excluded_name_patterns: Vec<String>,
    /// Case-insensitive substrings that exclude a record by content
    #[serde(default = "default_forbidden_content_terms")]
    pub forbidden_content_terms: Vec<String>,
}

fn default_policy_version() -> u32 {
    1
}

fn default_allowed_extension() -> String {
    "md".to_string()
}

const fn default_max_size_bytes() -> u64 {
    1024 * 1024
}

fn default_excluded_name_patterns() -> Vec<String> {
    [".env", "credential", "secret", "token"].map(String::from).to_vec()
}

fn default_forbidden_content_terms() -> Vec<String> {
    ["password", "api_key", "secret", "token", "credential", "private_key"]
        .map(String::from)
        .to_vec()
}

impl Default for PolicyRules {
    fn default() -> Self {
        Self {
            version: default_policy_version(),
            allowed_extension: default_allowed_extension(),
            max_size_bytes: default_max_size_bytes(),
            excluded_name_patterns: default_excluded_name_patterns(),
            forbidden_content_terms: default_forbidden_content_terms(),
        }
    }
}

/// Thresholds for the reference sensitivity classifier
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SensitivityThresholds {
    /// Financial operations above this dollar amount require approval
    #[serde(default = "default_financial_amount")]
    pub financial_amount: f64,
    /// Deletions affecting more than this many files require approval
    #[serde(default = "default_delete_count")]
    pub delete_count: usize,
    /// Whether any API call requires approval
    #[serde(default = "default_true")]
    pub flag_api_calls: bool,
    /// Whether any outbound email send requires approval
    #[serde(default = "default_true")]
    pub flag_email_send: bool,
}

const fn default_financial_amount() -> f64 {
    100.0
}

const fn default_delete_count() -> usize {
    10
}

const fn default_true() -> bool {
    true
}

impl Default for SensitivityThresholds {
    fn default() -> Self {
        Self {
            financial_amount: default_financial_amount(),
            delete_count: default_delete_count(),
            flag_api_calls: default_true(),
            flag_email_send: default_true(),
        }
    }
}

/// Health loop tuning
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HealthConfig {
    /// Consecutive unhealthy observations before recovery is attempted
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,
    /// Pending approvals above this count degrade the local zone
    #[serde(default = "default_approval_backlog")]
    pub approval_backlog: usize,
    /// Claim records above this count degrade the sync queue
    #[serde(default = "default_claim_backlog")]
    pub claim_backlog: usize,
    /// Claim records older than this many hours are pruned by recovery
    #[serde(default = "default_retention_hours")]
    pub retention_hours: u64,
}

const fn default_failure_threshold() -> u32 {
    3
}

const fn default_approval_backlog() -> usize {
    10
}

const fn default_claim_backlog() -> usize {
    20
}

const fn default_retention_hours() -> u64 {
    24
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            failure_threshold: default_failure_threshold(),
            approval_backlog: default_approval_backlog(),
            claim_backlog: default_claim_backlog(),
            retention_hours: default_retention_hours(),
        }
    }
}

/// Lock manager tuning
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LockConfig {
    /// How long `acquire` waits before failing with a timeout
    #[serde(default = "default_lock_timeout_secs")]
    pub timeout_secs: u64,
}

const fn default_lock_timeout_secs() -> u64 {
    10
}

impl LockConfig {
    /// The acquisition timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_lock_timeout_secs(),
        }
    }
}
