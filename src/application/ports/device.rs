//! Errors shared by the recorder and player device ports

use thiserror::Error;

/// Audio device errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceError {
    #[error("No audio device available")]
    NoAudioDevice,

    #[error("Failed to acquire device: {0}")]
    AcquireFailed(String),

    #[error("Failed to start device: {0}")]
    StartFailed(String),

    #[error("Failed to stop device: {0}")]
    StopFailed(String),

    #[error("Playback failed: {0}")]
    PlaybackFailed(String),

    #[error("Device already released")]
    Released,

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for DeviceError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
