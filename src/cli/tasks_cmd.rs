//! Task list command handler

use thiserror::Error;

use crate::domain::task::Task;
use crate::infrastructure::InMemoryTaskStore;

use super::args::TasksAction;
use super::presenter::Presenter;

#[derive(Debug, Error)]
pub enum TasksError {
    #[error("No example task with id \"{0}\"")]
    NotFound(String),
    #[error("Cannot serialise tasks: {0}")]
    Json(#[from] serde_json::Error),
}

/// Handle tasks subcommand
pub async fn handle_tasks_command(
    action: TasksAction,
    store: &InMemoryTaskStore,
    presenter: &Presenter,
) -> Result<(), TasksError> {
    match action {
        TasksAction::List { json } => print_tasks(&store.list().await, json, presenter),
        TasksAction::Delete { id, json } => {
            if !store.delete(&id).await {
                return Err(TasksError::NotFound(id));
            }
            presenter.success(&format!("Deleted task {}", id));
            print_tasks(&store.list().await, json, presenter)
        }
    }
}

fn print_tasks(tasks: &[Task], json: bool, presenter: &Presenter) -> Result<(), TasksError> {
    if json {
        presenter.output(&serde_json::to_string_pretty(tasks)?);
        return Ok(());
    }
    if tasks.is_empty() {
        presenter.info("No tasks");
    }
    for task in tasks {
        presenter.output(&task_line(task));
    }
    Ok(())
}

/// One row of the task list: id, priority, due date, title, tag
pub fn task_line(task: &Task) -> String {
    let due = task
        .due
        .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string());
    let mut line = format!(
        "{:<4} {:<7} {:<16} {}",
        task.id.as_deref().unwrap_or("-"),
        task.priority.as_str(),
        due,
        task.title
    );
    if let Some(tag) = &task.tag {
        line.push_str(&format!(" #{}", tag));
    }
    if task.audio_url.is_some() {
        line.push_str(" [memo]");
    }
    line
}
