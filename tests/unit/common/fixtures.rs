//! Test fixtures and builders
//!
//! Provides convenient builders for creating test data.

use handoff::models::{Priority, TaskDocument};

/// Builder for creating test task documents
pub struct TaskBuilder {
    title: String,
    task_type: String,
    priority: Priority,
    source: String,
    body: String,
}

impl TaskBuilder {
    pub fn new() -> Self {
        Self {
            title: "Test task".to_string(),
            task_type: "user-request".to_string(),
            priority: Priority::Medium,
            source: "test".to_string(),
            body: "Do the thing.".to_string(),
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn task_type(mut self, task_type: &str) -> Self {
        self.task_type = task_type.to_string();
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn body(mut self, body: &str) -> Self {
        self.body = body.to_string();
        self
    }

    pub fn build(self) -> TaskDocument {
        TaskDocument::new(&self.title, &self.task_type, self.priority, &self.source, &self.body)
    }
}

impl Default for TaskBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A task whose body trips the financial sensitivity rule.
pub fn banking_task() -> TaskDocument {
    TaskBuilder::new()
        .title("Pay invoice")
        .task_type("banking")
        .body("Initiate a banking transfer of $150 to the supplier.")
        .build()
}

/// A task whose body trips no sensitivity rule.
pub fn safe_task() -> TaskDocument {
    TaskBuilder::new()
        .title("Summarize notes")
        .body("Write a short summary of the meeting notes.")
        .build()
}
