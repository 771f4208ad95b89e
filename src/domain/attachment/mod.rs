//! Attachment domain module

mod audio_phase;
mod recording_path;

pub use audio_phase::AudioPhase;
pub use recording_path::{file_uri, fresh_recording_path};
