//! Transfer policy
//!
//! Evaluates a candidate payload against the ordered rule set before it may
//! cross the trust boundary: format, size, name patterns, content terms.
//! Evaluation short-circuits on the first failure and a rejected candidate
//! is left untouched at the source.

/// Pluggable sensitivity classification
pub mod classifier;

use thiserror::Error;

use crate::config::PolicyRules;

pub use classifier::{Sensitivity, SensitivityCategory, SensitivityClassifier, ThresholdClassifier};

/// A transfer rule failure. Non-fatal: the transfer is blocked and logged,
/// the owning loop continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyViolation {
    /// Only the designated content format may cross
    #[error("blocked {name}: not a .{expected} task document")]
    WrongFormat {
        /// Candidate name
        name: String,
        /// The allowed extension
        expected: String,
    },

    /// Payload exceeds the configured size ceiling
    #[error("blocked {name}: {size} bytes exceeds the {limit} byte ceiling")]
    TooLarge {
        /// Candidate name
        name: String,
        /// Payload size in bytes
        size: u64,
        /// Configured ceiling in bytes
        limit: u64,
    },

    /// Name matches an excluded pattern; content was not inspected
    #[error("blocked {name}: name matches excluded pattern {pattern:?}")]
    ExcludedName {
        /// Candidate name
        name: String,
        /// The matching pattern
        pattern: String,
    },

    /// Body contains a forbidden term
    #[error("blocked {name}: content contains forbidden term {term:?}")]
    ForbiddenContent {
        /// Candidate name
        name: String,
        /// The matching term
        term: String,
    },
}

/// Evaluates candidates against a [`PolicyRules`] set
#[derive(Debug, Clone)]
pub struct PolicyFilter {
    rules: PolicyRules,
}

impl PolicyFilter {
    /// Build a filter over `rules`.
    #[must_use]
    pub const fn new(rules: PolicyRules) -> Self {
        Self { rules }
    }

    /// The rule set this filter evaluates.
    #[must_use]
    pub const fn rules(&self) -> &PolicyRules {
        &self.rules
    }

    /// Evaluate one candidate. Rules run in order and short-circuit on the
    /// first failure; name patterns are checked before content is inspected.
    pub fn evaluate(&self, name: &str, content: &str) -> Result<(), PolicyViolation> {
        let expected = &self.rules.allowed_extension;
        if !name.to_lowercase().ends_with(&format!(".{expected}")) {
            return Err(PolicyViolation::WrongFormat {
                name: name.to_string(),
                expected: expected.clone(),
            });
        }

        let size = content.len() as u64;
        if size > self.rules.max_size_bytes {
            return Err(PolicyViolation::TooLarge {
                name: name.to_string(),
                size,
                limit: self.rules.max_size_bytes,
            });
        }

        let name_lower = name.to_lowercase();
        for pattern in &self.rules.excluded_name_patterns {
            if name_lower.contains(&pattern.to_lowercase()) {
                return Err(PolicyViolation::ExcludedName {
                    name: name.to_string(),
                    pattern: pattern.clone(),
                });
            }
        }

        let content_lower = content.to_lowercase();
        for term in &self.rules.forbidden_content_terms {
            if content_lower.contains(&term.to_lowercase()) {
                return Err(PolicyViolation::ForbiddenContent {
                    name: name.to_string(),
                    term: term.clone(),
                });
            }
        }

        Ok(())
    }
}
