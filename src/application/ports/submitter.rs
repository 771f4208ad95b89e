//! Task submission port interface

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::task::Task;

/// Submission errors
#[derive(Debug, Clone, Error)]
pub enum SubmissionError {
    #[error("Task rejected: {0}")]
    Rejected(String),

    #[error("Task service unavailable: {0}")]
    Unavailable(String),
}

/// Port for the service that accepts finished tasks
#[async_trait]
pub trait TaskSubmitter: Send + Sync {
    /// Submit a composed task.
    ///
    /// # Returns
    /// The task as stored (with its id assigned) or an error
    async fn submit(&self, task: Task) -> Result<Task, SubmissionError>;
}
