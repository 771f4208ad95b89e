//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod config;
pub mod device;
pub mod notifier;
pub mod player;
pub mod recorder;
pub mod session_store;
pub mod submitter;

// Re-export common types
pub use config::ConfigStore;
pub use device::DeviceError;
pub use notifier::{Notice, NotificationError, Notifier};
pub use player::{
    player_event_channel, PlaybackHandle, PlaybackTicket, PlayerDevice, PlayerEvent,
    PlayerEventReceiver, PlayerSignal, PlayerSignalSender,
};
pub use recorder::{RecorderDevice, RecordingHandle};
pub use session_store::{SessionStore, SessionStoreError};
pub use submitter::{SubmissionError, TaskSubmitter};
