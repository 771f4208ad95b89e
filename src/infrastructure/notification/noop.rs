//! Notifier that shows nothing

use async_trait::async_trait;
use tracing::trace;

use crate::application::ports::{Notice, NotificationError, Notifier};

/// Used when notifications are disabled
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpNotifier;

#[async_trait]
impl Notifier for NoOpNotifier {
    async fn notify(&self, notice: &Notice) -> Result<(), NotificationError> {
        trace!(summary = %notice.summary, "notification suppressed");
        Ok(())
    }
}
