//! Output formatting for human and JSON modes
//!
//! This module provides structured output that can be rendered either as
//! human-readable text or machine-parseable JSON.

use colored::Colorize;
use serde::Serialize;

use crate::approval::ApprovalStats;
use crate::health::HealthObservation;
use crate::models::ApprovalRequest;
use crate::status::StatusReport;
use crate::sync::ScanReport;

/// Output mode for the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output (machine-readable)
    Json,
}

fn print_json<T: Serialize>(value: &T) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

/// Generic operation result for simple commands
#[derive(Debug, Serialize)]
pub struct OperationResult {
    /// Whether the operation succeeded
    pub success: bool,
    /// Human-readable message
    pub message: String,
}

impl OperationResult {
    /// Render the result based on output mode
    pub fn render(&self, mode: OutputMode) {
        match mode {
            OutputMode::Human => println!("{}", self.message),
            OutputMode::Json => print_json(self),
        }
    }
}

/// One row of a task listing
#[derive(Debug, Serialize)]
pub struct TaskRow {
    /// Task id
    pub id: String,
    /// Title from the record's leading line
    pub title: String,
    /// Priority from the metadata block
    pub priority: String,
}

/// Result of a task list operation
#[derive(Debug, Serialize)]
pub struct TaskListResult {
    /// Zone that was listed
    pub zone: String,
    /// Stage that was listed
    pub stage: String,
    /// The tasks found
    pub tasks: Vec<TaskRow>,
}

impl TaskListResult {
    /// Render the result based on output mode
    pub fn render(&self, mode: OutputMode) {
        match mode {
            OutputMode::Human => {
                if self.tasks.is_empty() {
                    println!("No tasks in {}/{}.", self.zone, self.stage);
                    return;
                }
                println!("Tasks in {}/{}:\n", self.zone, self.stage);
                for task in &self.tasks {
                    println!("  [{}] {}", task.priority, task.title);
                    println!("  {}\n", task.id.dimmed());
                }
            },
            OutputMode::Json => print_json(self),
        }
    }
}

/// Result of a bulk scan
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ScanResult {
    /// The tally
    #[serde(flatten)]
    pub report: ScanReport,
}

impl ScanResult {
    /// Render the result based on output mode
    pub fn render(&self, mode: OutputMode) {
        match mode {
            OutputMode::Human => {
                let r = &self.report;
                println!(
                    "Scan complete: {} transferred, {} skipped, {} blocked, {} failed",
                    r.transferred.to_string().green(),
                    r.skipped,
                    r.blocked.to_string().yellow(),
                    r.failed.to_string().red()
                );
            },
            OutputMode::Json => print_json(self),
        }
    }
}

/// Result of a claim or sync of one record
#[derive(Debug, Serialize)]
pub struct TransferResult {
    /// Whether the transfer happened
    pub success: bool,
    /// The record involved
    pub record: String,
    /// What happened to it
    pub outcome: String,
}

impl TransferResult {
    /// Render the result based on output mode
    pub fn render(&self, mode: OutputMode) {
        match mode {
            OutputMode::Human => {
                if self.success {
                    println!("{}: {}", self.record, self.outcome.green());
                } else {
                    println!("{}: {}", self.record, self.outcome.yellow());
                }
            },
            OutputMode::Json => print_json(self),
        }
    }
}

/// Result of an approval decision
#[derive(Debug, Serialize)]
pub struct DecisionResult {
    /// Request id
    pub request: String,
    /// Task the request referenced
    pub task: String,
    /// The decision applied
    pub decision: String,
    /// The stage the task ended in
    pub task_stage: String,
}

impl DecisionResult {
    /// Render the result based on output mode
    pub fn render(&self, mode: OutputMode) {
        match mode {
            OutputMode::Human => {
                let decision = if self.decision == "approved" {
                    self.decision.green()
                } else {
                    self.decision.red()
                };
                println!("{}: {decision}", self.request);
                println!("Task {} moved to {}", self.task, self.task_stage);
            },
            OutputMode::Json => print_json(self),
        }
    }
}

/// Result of listing pending approvals
#[derive(Debug, Serialize)]
pub struct ApprovalListResult {
    /// Requests awaiting a decision
    pub pending: Vec<ApprovalRequest>,
    /// Counts across all status sets
    pub stats: ApprovalStats,
}

impl ApprovalListResult {
    /// Render the result based on output mode
    pub fn render(&self, mode: OutputMode) {
        match mode {
            OutputMode::Human => {
                println!(
                    "Approvals: {} pending, {} approved, {} rejected\n",
                    self.stats.pending.to_string().yellow(),
                    self.stats.approved,
                    self.stats.rejected
                );
                for request in &self.pending {
                    println!("  [{}] {}", request.threshold, request.id);
                    println!("  Task: {}", request.task);
                    println!("  {}\n", request.reason);
                }
            },
            OutputMode::Json => print_json(self),
        }
    }
}

/// Result of a status query
#[derive(Debug, Serialize)]
pub struct StatusResult {
    /// The snapshot
    #[serde(flatten)]
    pub report: StatusReport,
    /// Whether the status artifact was written
    pub written: bool,
}

impl StatusResult {
    /// Render the result based on output mode
    pub fn render(&self, mode: OutputMode) {
        match mode {
            OutputMode::Human => {
                for zone in &self.report.zones {
                    println!("{} zone ({}):", zone.zone, zone.zone.trust_label());
                    for entry in &zone.stages {
                        if entry.count > 0 {
                            println!("  {}: {}", entry.stage, entry.count);
                        }
                    }
                    println!("  total: {}\n", zone.total);
                }
                println!(
                    "Queue: {} claims, {} receipts, {} pending approvals",
                    self.report.claims, self.report.receipts, self.report.pending_approvals
                );
                if self.written {
                    println!("{}", "Status artifact updated.".green());
                }
            },
            OutputMode::Json => print_json(self),
        }
    }
}

/// Result of a health run
#[derive(Debug, Serialize)]
pub struct HealthResult {
    /// Cycles completed
    pub cycles: usize,
    /// Final observations
    pub observations: Vec<HealthObservation>,
}

impl HealthResult {
    /// Render the result based on output mode
    pub fn render(&self, mode: OutputMode) {
        match mode {
            OutputMode::Human => {
                println!("Health ({} cycle(s)):", self.cycles);
                for obs in &self.observations {
                    let status = match obs.status {
                        crate::health::HealthStatus::Healthy => "healthy".green(),
                        crate::health::HealthStatus::Degraded => "degraded".yellow(),
                        crate::health::HealthStatus::Critical => "critical".red(),
                    };
                    println!("  {:12} {status}  {}", obs.subsystem.to_string(), obs.detail);
                }
            },
            OutputMode::Json => print_json(self),
        }
    }
}
