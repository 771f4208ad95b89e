//! Task entity

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::priority::Priority;

/// A task as handed to the submission service and kept by the task store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Store-assigned id; `None` for a task that has never been saved
    pub id: Option<String>,
    pub title: String,
    pub body: Option<String>,
    /// Opaque image reference from the picker
    pub image_url: Option<String>,
    /// `file://` URI of the recorded voice memo
    pub audio_url: Option<String>,
    pub due: Option<NaiveDateTime>,
    pub tag: Option<String>,
    pub priority: Priority,
    #[serde(default)]
    pub completed: bool,
    /// Authenticated user that saved the task, when known
    #[serde(default)]
    pub owner_id: Option<String>,
}

impl Task {
    /// Create a task with only a title; everything else empty.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            body: None,
            image_url: None,
            audio_url: None,
            due: None,
            tag: None,
            priority: Priority::default(),
            completed: false,
            owner_id: None,
        }
    }

    /// Whether the task carries any attachment
    pub fn has_attachments(&self) -> bool {
        self.image_url.is_some() || self.audio_url.is_some()
    }
}
