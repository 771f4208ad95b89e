//! Scriptable recorder/player doubles shared by the application tests

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::ports::{
    DeviceError, PlaybackHandle, PlayerDevice, PlayerSignal, PlayerSignalSender, RecorderDevice,
    RecordingHandle,
};

/// Which device calls should fail
#[derive(Debug, Clone, Default)]
pub struct DeviceScript {
    pub recorder_acquire_fails: bool,
    pub recorder_start_fails: bool,
    pub recorder_stop_fails: bool,
    /// Time `stop()` spends finishing the clip
    pub recorder_stop_delay: Option<Duration>,
    pub player_acquire_fails: bool,
    pub player_prepare_fails: bool,
    pub player_start_fails: bool,
    pub player_stop_fails: bool,
}

#[derive(Default)]
struct Shared {
    script: Mutex<DeviceScript>,
    recorders_held: AtomicUsize,
    players_held: AtomicUsize,
    recorder_acquisitions: AtomicUsize,
    player_acquisitions: AtomicUsize,
    last_output: Mutex<Option<PathBuf>>,
    last_signals: Mutex<Option<PlayerSignalSender>>,
}

/// Handle on a pair of fake devices and their bookkeeping
#[derive(Clone, Default)]
pub struct MockDevices {
    shared: Arc<Shared>,
}

impl MockDevices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&self, update: impl FnOnce(&mut DeviceScript)) {
        update(&mut self.shared.script.lock().unwrap());
    }

    pub fn recorder(&self) -> MockRecorder {
        MockRecorder {
            shared: Arc::clone(&self.shared),
        }
    }

    pub fn player(&self) -> MockPlayer {
        MockPlayer {
            shared: Arc::clone(&self.shared),
        }
    }

    pub fn recorders_held(&self) -> usize {
        self.shared.recorders_held.load(Ordering::SeqCst)
    }

    pub fn players_held(&self) -> usize {
        self.shared.players_held.load(Ordering::SeqCst)
    }

    pub fn recorder_acquisitions(&self) -> usize {
        self.shared.recorder_acquisitions.load(Ordering::SeqCst)
    }

    pub fn player_acquisitions(&self) -> usize {
        self.shared.player_acquisitions.load(Ordering::SeqCst)
    }

    /// Output path of the most recent recorder acquisition
    pub fn last_output(&self) -> Option<PathBuf> {
        self.shared.last_output.lock().unwrap().clone()
    }

    /// Fire a signal as the most recently prepared player would
    pub fn signal(&self, signal: PlayerSignal) -> bool {
        match self.shared.last_signals.lock().unwrap().as_ref() {
            Some(sender) => sender.send(signal),
            None => false,
        }
    }
}

pub struct MockRecorder {
    shared: Arc<Shared>,
}

impl RecorderDevice for MockRecorder {
    fn acquire(&self, output: &Path) -> Result<Box<dyn RecordingHandle>, DeviceError> {
        if self.shared.script.lock().unwrap().recorder_acquire_fails {
            return Err(DeviceError::NoAudioDevice);
        }
        self.shared.recorder_acquisitions.fetch_add(1, Ordering::SeqCst);
        self.shared.recorders_held.fetch_add(1, Ordering::SeqCst);
        *self.shared.last_output.lock().unwrap() = Some(output.to_path_buf());
        Ok(Box::new(MockRecordingHandle {
            shared: Arc::clone(&self.shared),
            output: output.to_path_buf(),
        }))
    }
}

struct MockRecordingHandle {
    shared: Arc<Shared>,
    output: PathBuf,
}

impl RecordingHandle for MockRecordingHandle {
    fn start(&mut self) -> Result<(), DeviceError> {
        if self.shared.script.lock().unwrap().recorder_start_fails {
            return Err(DeviceError::StartFailed("microphone busy".into()));
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<(), DeviceError> {
        let script = self.shared.script.lock().unwrap().clone();
        if let Some(delay) = script.recorder_stop_delay {
            std::thread::sleep(delay);
        }
        if script.recorder_stop_fails {
            return Err(DeviceError::StopFailed("stop called in invalid state".into()));
        }
        std::fs::write(&self.output, b"fLaC")?;
        Ok(())
    }

    fn release(self: Box<Self>) {}
}

impl Drop for MockRecordingHandle {
    fn drop(&mut self) {
        self.shared.recorders_held.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct MockPlayer {
    shared: Arc<Shared>,
}

impl PlayerDevice for MockPlayer {
    fn acquire(
        &self,
        path: &Path,
        signals: PlayerSignalSender,
    ) -> Result<Box<dyn PlaybackHandle>, DeviceError> {
        if self.shared.script.lock().unwrap().player_acquire_fails {
            return Err(DeviceError::AcquireFailed(format!(
                "cannot open {}",
                path.display()
            )));
        }
        self.shared.player_acquisitions.fetch_add(1, Ordering::SeqCst);
        self.shared.players_held.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockPlaybackHandle {
            shared: Arc::clone(&self.shared),
            signals,
            playing: AtomicBool::new(false),
        }))
    }
}

struct MockPlaybackHandle {
    shared: Arc<Shared>,
    signals: PlayerSignalSender,
    playing: AtomicBool,
}

impl PlaybackHandle for MockPlaybackHandle {
    fn prepare_async(&mut self) -> Result<(), DeviceError> {
        if self.shared.script.lock().unwrap().player_prepare_fails {
            return Err(DeviceError::PlaybackFailed("unsupported format".into()));
        }
        *self.shared.last_signals.lock().unwrap() = Some(self.signals.clone());
        Ok(())
    }

    fn start(&mut self) -> Result<(), DeviceError> {
        if self.shared.script.lock().unwrap().player_start_fails {
            return Err(DeviceError::StartFailed("output busy".into()));
        }
        self.playing.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }

    fn stop(&mut self) -> Result<(), DeviceError> {
        if self.shared.script.lock().unwrap().player_stop_fails {
            return Err(DeviceError::StopFailed("illegal state".into()));
        }
        self.playing.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn release(self: Box<Self>) {}
}

impl Drop for MockPlaybackHandle {
    fn drop(&mut self) {
        self.shared.players_held.fetch_sub(1, Ordering::SeqCst);
    }
}
