//! Task model
//!
//! A task record is a markdown document with a leading title line, a
//! metadata block of `**Key**: value` pairs and a free-text body. Later
//! processing stages append new sections; existing content is never
//! rewritten. A record lives in exactly one `(zone, stage)` location at any
//! observable instant.

use serde::{Deserialize, Serialize};

/// A trust domain with its own stage store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    /// Low-trust zone: runs continuously and unattended, drafting and triage
    Cloud,
    /// High-trust zone: approvals and sensitive execution only happen here
    Local,
}

impl Zone {
    /// All zones, cloud first.
    pub const ALL: [Self; 2] = [Self::Cloud, Self::Local];

    /// Directory name of this zone under the vault root.
    #[must_use]
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::Cloud => "cloud",
            Self::Local => "local",
        }
    }

    /// Trust level label used in logs and status output.
    #[must_use]
    pub const fn trust_label(self) -> &'static str {
        match self {
            Self::Cloud => "low-trust",
            Self::Local => "high-trust",
        }
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.dir_name())
    }
}

impl std::str::FromStr for Zone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cloud" | "low" | "low-trust" => Ok(Self::Cloud),
            "local" | "high" | "high-trust" => Ok(Self::Local),
            _ => Err(format!("Invalid zone: {s}. Use: cloud, local")),
        }
    }
}

/// A task's lifecycle position within a zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    /// Newly arrived, not yet triaged
    Inbox,
    /// Eligible for processing or transfer
    Pending,
    /// Ownership taken by a processor
    Claimed,
    /// Suspended awaiting a human decision
    PendingApproval,
    /// Decision was approve; execution in flight
    Approved,
    /// Decision was reject (terminal)
    Rejected,
    /// Executed successfully (terminal)
    Done,
    /// Execution failed after approval (terminal, distinct from done)
    Failed,
}

impl Stage {
    /// All stages in lifecycle order.
    pub const ALL: [Self; 8] = [
        Self::Inbox,
        Self::Pending,
        Self::Claimed,
        Self::PendingApproval,
        Self::Approved,
        Self::Rejected,
        Self::Done,
        Self::Failed,
    ];

    /// Directory name of this stage within a zone.
    #[must_use]
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::Inbox => "inbox",
            Self::Pending => "pending",
            Self::Claimed => "claimed",
            Self::PendingApproval => "pending-approval",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    /// Whether a task in this stage has finished its lifecycle.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Rejected | Self::Done | Self::Failed)
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.dir_name())
    }
}

impl std::str::FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "inbox" => Ok(Self::Inbox),
            "pending" => Ok(Self::Pending),
            "claimed" => Ok(Self::Claimed),
            "pending-approval" | "pendingapproval" => Ok(Self::PendingApproval),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "done" | "complete" | "completed" => Ok(Self::Done),
            "failed" => Ok(Self::Failed),
            _ => Err(format!(
                "Invalid stage: {s}. Use: inbox, pending, claimed, pending-approval, approved, rejected, done, failed"
            )),
        }
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Low priority
    Low,
    /// Medium priority (default)
    #[default]
    Medium,
    /// High priority
    High,
    /// Critical - handle immediately
    Critical,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" | "med" | "normal" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" | "urgent" => Ok(Self::Critical),
            _ => Err(format!("Invalid priority: {s}. Use: low, medium, high, critical")),
        }
    }
}

/// A parsed task record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDocument {
    /// Title from the leading `# ` line
    pub title: String,
    /// Metadata block, in document order
    pub metadata: Vec<(String, String)>,
    /// Everything after the metadata block
    pub body: String,
}

impl TaskDocument {
    /// Create a task document with the standard metadata block.
    #[must_use]
    pub fn new(title: &str, task_type: &str, priority: Priority, source: &str, body: &str) -> Self {
        Self {
            title: title.to_string(),
            metadata: vec![
                ("Type".to_string(), task_type.to_string()),
                ("Priority".to_string(), priority.to_string()),
                ("Source".to_string(), source.to_string()),
                ("Created".to_string(), chrono::Utc::now().to_rfc3339()),
            ],
            body: body.to_string(),
        }
    }

    /// Parse a record. Tolerant: unknown metadata keys are preserved, a
    /// missing title falls back to empty.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let mut title = String::new();
        let mut metadata = Vec::new();
        let mut body_lines: Vec<&str> = Vec::new();
        let mut in_head = true;

        for line in content.lines() {
            if in_head {
                let trimmed = line.trim();
                if title.is_empty() && trimmed.starts_with("# ") {
                    title = trimmed.trim_start_matches('#').trim().to_string();
                    continue;
                }
                if let Some((key, value)) = parse_metadata_line(trimmed) {
                    metadata.push((key, value));
                    continue;
                }
                if trimmed.is_empty() && body_lines.is_empty() {
                    continue;
                }
                in_head = false;
            }
            body_lines.push(line);
        }

        Self {
            title,
            metadata,
            body: body_lines.join("\n"),
        }
    }

    /// Render the record back to its on-disk form.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = format!("# {}\n\n", self.title);
        for (key, value) in &self.metadata {
            out.push_str(&format!("**{key}**: {value}\n"));
        }
        if !self.body.is_empty() {
            out.push('\n');
            out.push_str(&self.body);
            if !self.body.ends_with('\n') {
                out.push('\n');
            }
        }
        out
    }

    /// Look up a metadata value, case-insensitively.
    #[must_use]
    pub fn meta(&self, key: &str) -> Option<&str> {
        self.metadata
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// The `type` metadata field, or "unknown".
    #[must_use]
    pub fn task_type(&self) -> &str {
        self.meta("type").unwrap_or("unknown")
    }

    /// The `priority` metadata field, parsed with a medium fallback.
    #[must_use]
    pub fn priority(&self) -> Priority {
        self.meta("priority").and_then(|p| p.parse().ok()).unwrap_or_default()
    }

    /// The `source` metadata field, or "unknown".
    #[must_use]
    pub fn source(&self) -> &str {
        self.meta("source").unwrap_or("unknown")
    }
}

/// Parse one `**Key**: value` metadata line.
fn parse_metadata_line(line: &str) -> Option<(String, String)> {
    let rest = line.strip_prefix("**")?;
    let (key, value) = rest.split_once("**:")?;
    if key.is_empty() || key.contains('*') {
        return None;
    }
    Some((key.trim().to_string(), value.trim().to_string()))
}

/// Render an append-only section: its own heading, a timestamp and a body,
/// delimited so existing sections are never disturbed.
#[must_use]
pub fn section(heading: &str, body: &str) -> String {
    format!(
        "\n## {heading}\n\n**Timestamp**: {}\n\n{}\n",
        chrono::Utc::now().to_rfc3339(),
        body.trim_end()
    )
}
