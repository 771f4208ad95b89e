//! Recording infrastructure module
//!
//! Microphone capture with cpal. Clips are resampled to 16kHz mono and
//! stored as FLAC.

mod cpal_recorder;
mod flac_encoder;

pub use cpal_recorder::CpalRecorder;
pub use flac_encoder::{encode_to_flac, write_flac, EncodingError, TARGET_SAMPLE_RATE};
