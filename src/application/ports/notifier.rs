//! Notification port interface

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::task::Task;

/// Notification errors
#[derive(Debug, Clone, Error)]
pub enum NotificationError {
    #[error("Failed to show notification: {0}")]
    SendFailed(String),
}

/// A message for the local notification area
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub summary: String,
    pub body: String,
    /// freedesktop icon name
    pub icon: &'static str,
}

impl Notice {
    /// Confirmation shown after a task reaches the store.
    ///
    /// The body names the task and, when set, its due date.
    pub fn task_saved(task: &Task) -> Self {
        let body = match task.due {
            Some(due) => format!("{} (due {})", task.title, due.format("%Y-%m-%d %H:%M")),
            None => task.title.clone(),
        };
        Self {
            summary: "Task saved".to_string(),
            body,
            icon: if task.audio_url.is_some() {
                "audio-x-generic"
            } else {
                "task-new"
            },
        }
    }
}

/// Port for local notifications
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notice: &Notice) -> Result<(), NotificationError>;
}

#[async_trait]
impl Notifier for Box<dyn Notifier> {
    async fn notify(&self, notice: &Notice) -> Result<(), NotificationError> {
        self.as_ref().notify(notice).await
    }
}
