//! Task draft being edited in a session, and the outcome of saving it

use std::fmt;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

use super::priority::Priority;
use super::task::Task;
use crate::domain::attachment::file_uri;
use crate::domain::error::DueDateParseError;

/// Raised when composing a task from a draft without a title
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Title cannot be empty.")]
pub struct EmptyTitleError;

/// Outcome of the last save attempt
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SaveResult {
    #[default]
    Idle,
    Success(Option<String>),
    Error(String),
}

impl SaveResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

impl fmt::Display for SaveResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "not saved"),
            Self::Success(Some(message)) => write!(f, "{}", message),
            Self::Success(None) => write!(f, "saved"),
            Self::Error(message) => write!(f, "{}", message),
        }
    }
}

/// Editable task fields.
///
/// Attachments are not part of the draft; they live in the
/// attachment coordinator and are joined in [`TaskDraft::compose`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskDraft {
    /// Id of the task being edited, `None` when creating
    editing_id: Option<String>,
    title: String,
    body: String,
    due: Option<NaiveDateTime>,
    tag: String,
    priority: Priority,
}

impl TaskDraft {
    /// Create an empty draft for a new task
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a draft from an existing task (edit mode)
    pub fn from_task(task: &Task) -> Self {
        Self {
            editing_id: task.id.clone(),
            title: task.title.clone(),
            body: task.body.clone().unwrap_or_default(),
            due: task.due,
            tag: task.tag.clone().unwrap_or_default(),
            priority: task.priority,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn due(&self) -> Option<NaiveDateTime> {
        self.due
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn editing_id(&self) -> Option<&str> {
        self.editing_id.as_deref()
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = body.into();
    }

    pub fn set_due(&mut self, due: Option<NaiveDateTime>) {
        self.due = due;
    }

    pub fn set_tag(&mut self, tag: impl Into<String>) {
        self.tag = tag.into();
    }

    pub fn set_priority(&mut self, priority: Priority) {
        self.priority = priority;
    }

    /// Whether the draft can be saved at all
    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }

    /// Build the task payload from this draft plus the session's attachments.
    ///
    /// The title is trimmed; a blank body or tag becomes `None`.
    pub fn compose(
        &self,
        image_reference: Option<&str>,
        audio_file: Option<&Path>,
        owner_id: Option<String>,
    ) -> Result<Task, EmptyTitleError> {
        if !self.has_title() {
            return Err(EmptyTitleError);
        }

        Ok(Task {
            id: self.editing_id.clone(),
            title: self.title.trim().to_string(),
            body: non_blank(&self.body),
            image_url: image_reference.map(str::to_string),
            audio_url: audio_file.map(file_uri),
            due: self.due,
            tag: non_blank(&self.tag),
            priority: self.priority,
            completed: false,
            owner_id,
        })
    }
}

/// Blank text becomes `None`; anything else is kept as typed.
fn non_blank(value: &str) -> Option<String> {
    (!value.trim().is_empty()).then(|| value.to_string())
}

/// Parse a due date typed by the user.
///
/// Accepts `YYYY-MM-DD HH:MM`, `YYYY-MM-DD` (midnight), or `none`/empty to clear.
pub fn parse_due(input: &str) -> Result<Option<NaiveDateTime>, DueDateParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
        return Ok(None);
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M") {
        return Ok(Some(dt));
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map(|d| Some(d.and_time(NaiveTime::MIN)))
        .map_err(|_| DueDateParseError {
            input: input.to_string(),
        })
}
