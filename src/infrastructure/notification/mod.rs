//! Notification infrastructure module

mod noop;
mod notify_rust;

pub use noop::NoOpNotifier;
pub use notify_rust::{NotifyRustNotifier, APP_NAME};

use crate::application::ports::Notifier;

/// Desktop notifier when `enabled`, otherwise one that drops everything
pub fn create_notifier(enabled: bool) -> Box<dyn Notifier> {
    if enabled {
        Box::new(NotifyRustNotifier::new())
    } else {
        Box::new(NoOpNotifier)
    }
}
