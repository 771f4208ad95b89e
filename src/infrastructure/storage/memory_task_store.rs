//! In-process task store
//!
//! Stands in for the remote task service: accepts submissions, assigns
//! ids, and keeps everything in memory for the life of the process.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Local, NaiveDateTime, NaiveTime, Timelike};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::application::ports::{SubmissionError, TaskSubmitter};
use crate::domain::task::{Priority, Task};

/// Shared, cloneable in-memory task list
#[derive(Clone, Default)]
pub struct InMemoryTaskStore {
    tasks: Arc<Mutex<Vec<Task>>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with a handful of example tasks due relative to now
    pub fn with_examples() -> Self {
        let now = Local::now()
            .naive_local()
            .with_second(0)
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or_else(|| Local::now().naive_local());
        Self {
            tasks: Arc::new(Mutex::new(example_tasks(now))),
        }
    }

    pub async fn list(&self) -> Vec<Task> {
        self.tasks.lock().await.clone()
    }

    pub async fn get(&self, id: &str) -> Option<Task> {
        self.tasks
            .lock()
            .await
            .iter()
            .find(|t| t.id.as_deref() == Some(id))
            .cloned()
    }

    /// Remove a task. Returns whether anything was removed.
    pub async fn delete(&self, id: &str) -> bool {
        let mut tasks = self.tasks.lock().await;
        let before = tasks.len();
        tasks.retain(|t| t.id.as_deref() != Some(id));
        tasks.len() != before
    }
}

#[async_trait]
impl TaskSubmitter for InMemoryTaskStore {
    async fn submit(&self, mut task: Task) -> Result<Task, SubmissionError> {
        if task.title.trim().is_empty() {
            return Err(SubmissionError::Rejected("task has no title".into()));
        }

        let id = task
            .id
            .get_or_insert_with(|| Uuid::new_v4().to_string())
            .clone();

        let mut tasks = self.tasks.lock().await;
        match tasks.iter_mut().find(|t| t.id.as_deref() == Some(id.as_str())) {
            Some(existing) => {
                debug!(%id, "task replaced");
                *existing = task.clone();
            }
            None => {
                debug!(%id, "task added");
                tasks.push(task.clone());
            }
        }
        Ok(task)
    }
}

fn at(day: NaiveDateTime, days: i64, hour: u32, minute: u32) -> Option<NaiveDateTime> {
    let time = NaiveTime::from_hms_opt(hour, minute, 0)?;
    Some((day + ChronoDuration::days(days)).date().and_time(time))
}

fn example_tasks(now: NaiveDateTime) -> Vec<Task> {
    let example = |id: &str, title: &str, body: Option<&str>, tag: Option<&str>, priority| Task {
        id: Some(id.to_string()),
        body: body.map(str::to_string),
        tag: tag.map(str::to_string),
        priority,
        ..Task::titled(title)
    };

    vec![
        Task {
            due: at(now, 1, 9, 0),
            ..example("1", "Buy milk", Some("Go to the supermarket"), Some("Shopping"), Priority::High)
        },
        Task {
            due: at(now, 3, 12, 0),
            ..example("2", "Study Rust", Some("Review iterators"), Some("Study"), Priority::Medium)
        },
        example("3", "Call mom", None, None, Priority::Low),
        Task {
            due: at(now, 7, 17, 30),
            ..example("4", "Long scrolling task", Some("A long description..."), Some("Test"), Priority::Medium)
        },
    ]
}
