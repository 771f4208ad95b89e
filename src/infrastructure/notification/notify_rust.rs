//! Desktop notifications through notify-rust

use async_trait::async_trait;
use tracing::debug;

use crate::application::ports::{Notice, NotificationError, Notifier};

/// Application name shown by the notification server
pub const APP_NAME: &str = "TaskMaster";

/// How long a notice stays on screen
const TIMEOUT_MS: u32 = 5_000;

#[derive(Debug, Default, Clone, Copy)]
pub struct NotifyRustNotifier;

impl NotifyRustNotifier {
    pub fn new() -> Self {
        Self
    }
}

fn show(notice: &Notice) -> Result<(), NotificationError> {
    notify_rust::Notification::new()
        .appname(APP_NAME)
        .summary(&notice.summary)
        .body(&notice.body)
        .icon(notice.icon)
        .timeout(notify_rust::Timeout::Milliseconds(TIMEOUT_MS))
        .show()
        .map(|_| ())
        .map_err(|e| NotificationError::SendFailed(e.to_string()))
}

#[async_trait]
impl Notifier for NotifyRustNotifier {
    async fn notify(&self, notice: &Notice) -> Result<(), NotificationError> {
        debug!(summary = %notice.summary, "showing desktop notification");
        let notice = notice.clone();
        // The D-Bus round trip blocks
        tokio::task::spawn_blocking(move || show(&notice))
            .await
            .map_err(|e| NotificationError::SendFailed(format!("notification task: {}", e)))?
    }
}
