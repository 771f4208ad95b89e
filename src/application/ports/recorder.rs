//! Recorder device port

use std::path::Path;

use super::device::DeviceError;

/// Port for microphone capture into a file.
///
/// `acquire` binds the microphone to an output path and hands back an
/// exclusive handle. Nothing is captured until [`RecordingHandle::start`].
pub trait RecorderDevice: Send + Sync {
    /// Acquire the microphone, bound to `output`.
    ///
    /// # Arguments
    /// * `output` - File the clip is written to when the recording stops
    fn acquire(&self, output: &Path) -> Result<Box<dyn RecordingHandle>, DeviceError>;
}

/// Exclusive, acquire/release-scoped binding to the microphone.
pub trait RecordingHandle: Send {
    /// Begin capturing.
    fn start(&mut self) -> Result<(), DeviceError>;

    /// Finish capturing and flush the clip to the bound output path.
    fn stop(&mut self) -> Result<(), DeviceError>;

    /// Give the microphone back. Never fails; safe after a failed `stop`.
    fn release(self: Box<Self>);
}
