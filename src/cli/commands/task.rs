//! Create, list and inspect task records

use std::path::Path;

use crate::cli::app::TaskAction;
use handoff::models::TaskDocument;
use handoff::output::{OperationResult, OutputMode, TaskListResult, TaskRow};
use handoff::paths::VaultLayout;
use handoff::storage::StageStore;

/// Dispatch a `task` subcommand
pub fn task(root: &Path, action: TaskAction, mode: OutputMode) -> anyhow::Result<()> {
    let layout = VaultLayout::new(root);

    match action {
        TaskAction::New {
            title,
            task_type,
            priority,
            source,
            body,
            zone,
            stage,
        } => {
            let priority = priority.parse().map_err(|e: String| anyhow::anyhow!(e))?;
            let doc = TaskDocument::new(&title, &task_type, priority, &source, &body);
            let store = StageStore::new(&layout, zone);
            let id = store.create(stage, &doc)?;

            OperationResult {
                success: true,
                message: format!("Created {id} in {zone}/{stage}"),
            }
            .render(mode);
            Ok(())
        },

        TaskAction::List { zone, stage } => {
            let store = StageStore::new(&layout, zone);
            let tasks = store
                .list(stage)?
                .into_iter()
                .map(|id| {
                    let doc = store.read(&id, stage).map(|c| TaskDocument::parse(&c));
                    let (title, priority) = doc.map_or_else(
                        |_| (String::new(), String::new()),
                        |d| (d.title.clone(), d.priority().to_string()),
                    );
                    TaskRow { id, title, priority }
                })
                .collect();

            TaskListResult {
                zone: zone.to_string(),
                stage: stage.to_string(),
                tasks,
            }
            .render(mode);
            Ok(())
        },

        TaskAction::Show { id, zone, stage } => {
            let store = StageStore::new(&layout, zone);
            let content = store.read(&id, stage)?;
            print!("{content}");
            Ok(())
        },
    }
}
