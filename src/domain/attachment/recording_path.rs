//! Voice memo file naming

use std::path::{Path, PathBuf};

use uuid::Uuid;

/// File extension for voice memos (FLAC, written by the recorder)
const RECORDING_EXTENSION: &str = "flac";

/// File name prefix for voice memos
const RECORDING_PREFIX: &str = "audio_";

/// Build a fresh, collision-resistant path for a new voice memo in `dir`.
pub fn fresh_recording_path(dir: &Path) -> PathBuf {
    dir.join(format!(
        "{}{}.{}",
        RECORDING_PREFIX,
        Uuid::new_v4(),
        RECORDING_EXTENSION
    ))
}

/// `file://` URI for a local path, as attached to a submitted task
pub fn file_uri(path: &Path) -> String {
    format!("file://{}", path.display())
}
