//! Approval state machine
//!
//! Tracks sensitive task requests through `pending -> {approved, rejected}`
//! and triggers execution only on approval. Exactly one transition out of
//! `pending` is legal; a second decision fails with `AlreadyDecided` and
//! leaves the first decision's terminal state unchanged.

use std::fs;
use std::io;
use std::path::PathBuf;

use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::models::{ApprovalRequest, ApprovalStatus, ExecutionOutcome, Stage, section};
use crate::paths::VaultLayout;
use crate::policy::{Sensitivity, SensitivityClassifier};
use crate::storage::{StageStore, StoreError};

/// Errors from the approval workflow
#[derive(Debug, Error)]
pub enum ApprovalError {
    /// No request with this id exists in any status set
    #[error("approval request not found: {id}")]
    NotFound {
        /// Request id
        id: String,
    },

    /// The request already left `pending`; its terminal state is unchanged
    #[error("approval request {id} already decided: {status}")]
    AlreadyDecided {
        /// Request id
        id: String,
        /// The standing decision
        status: ApprovalStatus,
    },

    /// Execution failed after approval. Fatal to this task: it is staged
    /// as failed, never silently archived as done.
    #[error("execution failed after approval for task {task}: {detail}")]
    ExecutionFailed {
        /// The approved task
        task: String,
        /// Why execution failed
        detail: String,
    },

    /// Underlying stage store failure
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Underlying storage failure
    #[error("approval error: {context}: {source}")]
    Io {
        /// What was being attempted
        context: String,
        /// Underlying I/O error
        source: io::Error,
    },
}

impl ApprovalError {
    fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

/// A human decision over a pending request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Execute the task
    Approved,
    /// Do not execute the task
    Rejected,
}

/// Executes an approved task. The reference executor stamps the record;
/// real deployments plug in an executor that performs the sensitive action.
pub trait TaskExecutor {
    /// Execute `task_id` given its current content; the returned summary is
    /// appended to the record as the execution stamp.
    fn execute(&self, task_id: &str, content: &str) -> anyhow::Result<String>;
}

/// Reference executor: records that execution happened in the high-trust
/// zone without performing any external action
#[derive(Debug, Clone, Copy, Default)]
pub struct StampExecutor;

impl TaskExecutor for StampExecutor {
    fn execute(&self, task_id: &str, _content: &str) -> anyhow::Result<String> {
        Ok(format!("**Task**: {task_id}\n**Zone**: local\n**Status**: completed"))
    }
}

/// Outcome of screening a task through the classifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// The task matched a sensitivity rule and now awaits a decision
    AwaitingApproval(ApprovalRequest),
    /// The task was safe and executed directly
    Executed {
        /// The executed task id
        task: String,
    },
}

/// Result of a successful decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionOutcome {
    /// The archived request in its terminal state
    pub request: ApprovalRequest,
    /// Where the task ended up
    pub task_stage: Stage,
}

/// Counts across the three status sets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct ApprovalStats {
    /// Requests awaiting a decision
    pub pending: usize,
    /// Requests decided approve
    pub approved: usize,
    /// Requests decided reject
    pub rejected: usize,
}

/// Human-in-the-loop approval workflow over the high-trust zone's store
#[derive(Debug, Clone)]
pub struct ApprovalWorkflow {
    store: StageStore,
    pending: PathBuf,
    approved: PathBuf,
    rejected: PathBuf,
}

impl ApprovalWorkflow {
    /// Build a workflow over `store` (the high-trust zone), with request
    /// sets under `layout`.
    #[must_use]
    pub fn new(layout: &VaultLayout, store: StageStore) -> Self {
        Self {
            store,
            pending: layout.approvals_dir(ApprovalStatus::Pending),
            approved: layout.approvals_dir(ApprovalStatus::Approved),
            rejected: layout.approvals_dir(ApprovalStatus::Rejected),
        }
    }

    /// Create the request set directories. Idempotent.
    pub fn init(&self) -> Result<(), ApprovalError> {
        for dir in [&self.pending, &self.approved, &self.rejected] {
            fs::create_dir_all(dir)
                .map_err(|e| ApprovalError::io("creating approval sets", e))?;
        }
        Ok(())
    }

    /// Create a pending request for a task that matched a sensitivity rule.
    pub fn submit(
        &self,
        task_id: &str,
        sensitivity: &Sensitivity,
    ) -> Result<ApprovalRequest, ApprovalError> {
        let request = ApprovalRequest::new(
            &request_id(task_id),
            task_id,
            &sensitivity.detail,
            &sensitivity.category.to_string(),
        );
        self.write_request(&self.pending, &request)?;
        log::info!("approval required for {task_id}: {}", sensitivity.detail);
        Ok(request)
    }

    /// Screen a task that arrived in the high-trust zone: create an
    /// approval request and park the task if a sensitivity rule matches,
    /// otherwise execute it directly.
    pub fn process(
        &self,
        classifier: &dyn SensitivityClassifier,
        executor: &dyn TaskExecutor,
        task_id: &str,
        from: Stage,
    ) -> Result<ProcessOutcome, ApprovalError> {
        let content = self.store.read(task_id, from)?;

        if let Some(sensitivity) = classifier.classify(&content) {
            let request = self.submit(task_id, &sensitivity)?;
            self.store.move_record(task_id, from, Stage::PendingApproval)?;
            return Ok(ProcessOutcome::AwaitingApproval(request));
        }

        self.execute_and_stage(executor, task_id, from)?;
        Ok(ProcessOutcome::Executed {
            task: task_id.to_string(),
        })
    }

    /// Apply a human decision to a pending request.
    ///
    /// On approve, the referenced task is executed and relocated to `done`
    /// with an execution stamp; on reject it is relocated to `rejected`
    /// with the reason appended. In both cases the request is archived out
    /// of the pending set. If execution fails after approval the request
    /// stays visible in the pending set (status approved, execution
    /// failed), the task lands in the `failed` stage, and the call
    /// surfaces `ExecutionFailed`.
    pub fn decide(
        &self,
        request_id: &str,
        decision: Decision,
        reason: Option<&str>,
        actor: &str,
        executor: &dyn TaskExecutor,
    ) -> Result<DecisionOutcome, ApprovalError> {
        let pending_path = self.pending.join(format!("{request_id}.json"));
        if !pending_path.exists() {
            return Err(self.decided_or_missing(request_id));
        }

        let mut request = read_request(&pending_path)?;
        if request.status != ApprovalStatus::Pending {
            // Left behind by a failed execution; the transition already
            // happened.
            return Err(ApprovalError::AlreadyDecided {
                id: request_id.to_string(),
                status: request.status,
            });
        }

        request.decided_at = Some(chrono::Utc::now().to_rfc3339());
        request.decided_by = Some(actor.to_string());
        request.decision_reason = reason.map(String::from);

        match decision {
            Decision::Rejected => {
                let task = request.task.clone();
                let why = reason.unwrap_or("No reason provided");
                self.store.append(
                    &task,
                    Stage::PendingApproval,
                    &section("Rejection", &format!("**Rejected By**: {actor}\n**Reason**: {why}")),
                )?;
                self.store.move_record(&task, Stage::PendingApproval, Stage::Rejected)?;

                request.status = ApprovalStatus::Rejected;
                self.write_request(&self.rejected, &request)?;
                remove_request(&pending_path)?;

                log::info!("rejected {request_id} ({task}): {why}");
                Ok(DecisionOutcome {
                    request,
                    task_stage: Stage::Rejected,
                })
            },
            Decision::Approved => {
                let task = request.task.clone();
                request.status = ApprovalStatus::Approved;

                let content = self.store.read(&task, Stage::PendingApproval)?;
                match executor.execute(&task, &content) {
                    Ok(summary) => {
                        self.store.append(&task, Stage::PendingApproval, &section("Execution", &summary))?;
                        self.store.move_record(&task, Stage::PendingApproval, Stage::Done)?;

                        request.execution = Some(ExecutionOutcome::Completed);
                        self.write_request(&self.approved, &request)?;
                        remove_request(&pending_path)?;

                        log::info!("approved {request_id} ({task}): executed");
                        Ok(DecisionOutcome {
                            request,
                            task_stage: Stage::Done,
                        })
                    },
                    Err(err) => {
                        let detail = format!("{err:#}");
                        request.execution = Some(ExecutionOutcome::Failed);
                        // Stays in the pending set so the operator sees it;
                        // the status transition still happened exactly once.
                        self.write_request(&self.pending, &request)?;

                        self.store.append(
                            &task,
                            Stage::PendingApproval,
                            &section("Execution Failed", &detail),
                        )?;
                        self.store.move_record(&task, Stage::PendingApproval, Stage::Failed)?;

                        log::error!("approved {request_id} ({task}) but execution failed: {detail}");
                        Err(ApprovalError::ExecutionFailed { task, detail })
                    },
                }
            },
        }
    }

    /// Load a request from any status set.
    pub fn get(&self, request_id: &str) -> Result<ApprovalRequest, ApprovalError> {
        for dir in [&self.pending, &self.approved, &self.rejected] {
            let path = dir.join(format!("{request_id}.json"));
            if path.exists() {
                return read_request(&path);
            }
        }
        Err(ApprovalError::NotFound {
            id: request_id.to_string(),
        })
    }

    /// All requests awaiting a decision, oldest first.
    pub fn list_pending(&self) -> Result<Vec<ApprovalRequest>, ApprovalError> {
        if !self.pending.exists() {
            return Ok(Vec::new());
        }
        let mut paths: Vec<PathBuf> = fs::read_dir(&self.pending)
            .map_err(|e| ApprovalError::io("listing pending approvals", e))?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        paths.iter().map(|path| read_request(path)).collect()
    }

    /// Counts across the three status sets.
    #[must_use]
    pub fn stats(&self) -> ApprovalStats {
        ApprovalStats {
            pending: count_requests(&self.pending),
            approved: count_requests(&self.approved),
            rejected: count_requests(&self.rejected),
        }
    }

    fn execute_and_stage(
        &self,
        executor: &dyn TaskExecutor,
        task_id: &str,
        from: Stage,
    ) -> Result<(), ApprovalError> {
        let content = self.store.read(task_id, from)?;
        match executor.execute(task_id, &content) {
            Ok(summary) => {
                self.store.append(task_id, from, &section("Execution", &summary))?;
                self.store.move_record(task_id, from, Stage::Done)?;
                log::info!("executed {task_id}: moved to done");
                Ok(())
            },
            Err(err) => {
                let detail = format!("{err:#}");
                self.store.append(task_id, from, &section("Execution Failed", &detail))?;
                self.store.move_record(task_id, from, Stage::Failed)?;
                Err(ApprovalError::ExecutionFailed {
                    task: task_id.to_string(),
                    detail,
                })
            },
        }
    }

    fn decided_or_missing(&self, request_id: &str) -> ApprovalError {
        for (dir, status) in [
            (&self.approved, ApprovalStatus::Approved),
            (&self.rejected, ApprovalStatus::Rejected),
        ] {
            if dir.join(format!("{request_id}.json")).exists() {
                return ApprovalError::AlreadyDecided {
                    id: request_id.to_string(),
                    status,
                };
            }
        }
        ApprovalError::NotFound {
            id: request_id.to_string(),
        }
    }

    fn write_request(
        &self,
        dir: &std::path::Path,
        request: &ApprovalRequest,
    ) -> Result<(), ApprovalError> {
        fs::create_dir_all(dir).map_err(|e| ApprovalError::io("creating approval set", e))?;
        let path = dir.join(format!("{}.json", request.id));
        let json = serde_json::to_string_pretty(request)
            .map_err(|e| ApprovalError::io(format!("encoding request {}", request.id), io::Error::other(e)))?;
        fs::write(&path, json)
            .map_err(|e| ApprovalError::io(format!("writing request {}", request.id), e))
    }
}

/// Derive a request id from the task it references.
fn request_id(task_id: &str) -> String {
    let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%S%3f");
    let digest = Sha256::digest(task_id.as_bytes());
    let short: String = digest.iter().take(3).map(|b| format!("{b:02x}")).collect();
    format!("apr-{stamp}-{short}")
}

fn count_requests(dir: &std::path::Path) -> usize {
    fs::read_dir(dir).map_or(0, |entries| {
        entries
            .filter_map(Result::ok)
            .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "json"))
            .count()
    })
}

fn read_request(path: &std::path::Path) -> Result<ApprovalRequest, ApprovalError> {
    let content = fs::read_to_string(path)
        .map_err(|e| ApprovalError::io(format!("reading {}", path.display()), e))?;
    serde_json::from_str(&content)
        .map_err(|e| ApprovalError::io(format!("decoding {}", path.display()), io::Error::other(e)))
}

fn remove_request(path: &std::path::Path) -> Result<(), ApprovalError> {
    fs::remove_file(path)
        .map_err(|e| ApprovalError::io(format!("archiving {}", path.display()), e))
}
