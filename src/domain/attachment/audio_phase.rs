//! Audio capture/playback phase

use std::fmt;

/// Phase of the voice-memo state machine.
///
/// State machine:
///   IDLE -> RECORDING (start_recording succeeded)
///   IDLE -> ERROR (start_recording failed)
///   RECORDING -> RECORDED (stop_recording succeeded)
///   RECORDING -> ERROR (stop_recording failed)
///   IDLE | RECORDED -> PLAYING (player signalled ready)
///   IDLE | RECORDED -> ERROR (player failed before ready)
///   PLAYING -> RECORDED (completion, or stop_playback)
///   PLAYING -> ERROR (player failed mid-playback)
///   any -> IDLE (delete_audio)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum AudioPhase {
    #[default]
    Idle,
    Recording,
    Recorded,
    Playing,
    Error(String),
}

impl AudioPhase {
    /// Get the string representation, without the error message
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
            Self::Recorded => "recorded",
            Self::Playing => "playing",
            Self::Error(_) => "error",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording)
    }

    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Whether playback may be requested from this phase
    pub fn can_play(&self) -> bool {
        matches!(self, Self::Idle | Self::Recorded)
    }

    /// Error message, if in the error phase
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            _ => None,
        }
    }
}

impl fmt::Display for AudioPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error(message) => write!(f, "error: {}", message),
            other => write!(f, "{}", other.as_str()),
        }
    }
}
