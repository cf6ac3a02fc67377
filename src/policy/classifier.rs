//! Sensitivity classification
//!
//! Decides whether a task's content requires a human approval gate. The
//! reference implementation is a flat, case-insensitive heuristic over the
//! textual body driven by configured thresholds — false negatives are an
//! accepted risk. Stricter implementations plug in through the trait
//! without touching the approval state machine.

use regex::Regex;
use serde::Serialize;

use crate::config::SensitivityThresholds;

/// Why a task was flagged sensitive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SensitivityCategory {
    /// Financial operation above the configured dollar threshold
    Financial,
    /// API call execution
    ApiCall,
    /// Outbound email send
    EmailSend,
    /// Deletion affecting more than the configured file count
    BulkDelete,
    /// Explicit approval/authorization language
    ApprovalLanguage,
}

impl std::fmt::Display for SensitivityCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Financial => write!(f, "financial"),
            Self::ApiCall => write!(f, "api-call"),
            Self::EmailSend => write!(f, "email-send"),
            Self::BulkDelete => write!(f, "bulk-delete"),
            Self::ApprovalLanguage => write!(f, "approval-language"),
        }
    }
}

/// A positive classification: the category that matched plus a human
/// readable description of the triggering rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sensitivity {
    /// The matched category
    pub category: SensitivityCategory,
    /// The rule or threshold that triggered, for the approval request
    pub detail: String,
}

/// Predicate over task content deciding whether execution needs a human
/// decision first
pub trait SensitivityClassifier {
    /// Classify `content`; `None` means safe to execute without approval.
    fn classify(&self, content: &str) -> Option<Sensitivity>;
}

const FINANCIAL_TERMS: [&str; 4] = ["banking", "financial", "transfer", "payment"];
const API_TERMS: [&str; 3] = ["api_call", "api call", "api."];
const EMAIL_TERMS: [&str; 3] = ["send_email", "send email", "email.send"];
const APPROVAL_TERMS: [&str; 2] = ["approve", "authorization"];

/// The reference heuristic: configured thresholds over a case-insensitive
/// substring scan
#[derive(Debug, Clone)]
pub struct ThresholdClassifier {
    thresholds: SensitivityThresholds,
    amount_re: Regex,
}

impl ThresholdClassifier {
    /// Build a classifier over `thresholds`.
    pub fn new(thresholds: SensitivityThresholds) -> Result<Self, regex::Error> {
        Ok(Self {
            thresholds,
            amount_re: Regex::new(r"\$\s*([0-9][0-9,]*(?:\.[0-9]+)?)")?,
        })
    }

    /// The thresholds this classifier applies.
    #[must_use]
    pub const fn thresholds(&self) -> &SensitivityThresholds {
        &self.thresholds
    }

    /// Largest dollar amount mentioned in `content`, if any.
    fn max_amount(&self, content: &str) -> Option<f64> {
        self.amount_re
            .captures_iter(content)
            .filter_map(|caps| caps.get(1)?.as_str().replace(',', "").parse::<f64>().ok())
            .fold(None, |acc, amount| {
                Some(acc.map_or(amount, |max: f64| max.max(amount)))
            })
    }
}

impl SensitivityClassifier for ThresholdClassifier {
    fn classify(&self, content: &str) -> Option<Sensitivity> {
        let lower = content.to_lowercase();

        if APPROVAL_TERMS.iter().any(|term| lower.contains(term)) {
            return Some(Sensitivity {
                category: SensitivityCategory::ApprovalLanguage,
                detail: "explicit approval/authorization language".to_string(),
            });
        }

        if FINANCIAL_TERMS.iter().any(|term| lower.contains(term)) {
            // Any financial operation gates; an amount above the threshold
            // sharpens the reason shown to the approver.
            let detail = match self.max_amount(&lower) {
                Some(amount) if amount > self.thresholds.financial_amount => format!(
                    "financial operation of ${amount:.2} exceeds the ${:.2} threshold",
                    self.thresholds.financial_amount
                ),
                _ => "financial operation".to_string(),
            };
            return Some(Sensitivity {
                category: SensitivityCategory::Financial,
                detail,
            });
        }

        if self.thresholds.flag_api_calls && API_TERMS.iter().any(|term| lower.contains(term)) {
            return Some(Sensitivity {
                category: SensitivityCategory::ApiCall,
                detail: "API call execution".to_string(),
            });
        }

        if self.thresholds.flag_email_send && EMAIL_TERMS.iter().any(|term| lower.contains(term)) {
            return Some(Sensitivity {
                category: SensitivityCategory::EmailSend,
                detail: "outbound email send".to_string(),
            });
        }

        if lower.contains("delete") {
            let file_mentions = lower.matches("file").count();
            if file_mentions > self.thresholds.delete_count {
                return Some(Sensitivity {
                    category: SensitivityCategory::BulkDelete,
                    detail: format!(
                        "deletion affecting {file_mentions} files (threshold {})",
                        self.thresholds.delete_count
                    ),
                });
            }
        }

        None
    }
}
