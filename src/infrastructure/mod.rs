//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces:
//! microphone and speaker devices, stores, and notifications.

pub mod config;
pub mod notification;
pub mod playback;
pub mod recording;
pub mod session;
pub mod storage;

// Re-export adapters
pub use config::XdgConfigStore;
pub use notification::{create_notifier, NoOpNotifier, NotifyRustNotifier};
pub use playback::RodioPlayer;
pub use recording::CpalRecorder;
pub use session::TomlSessionStore;
pub use storage::InMemoryTaskStore;
