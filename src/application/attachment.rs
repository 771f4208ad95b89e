//! Attachment coordinator
//!
//! Owns the image reference and the voice memo of one task-edit session,
//! and the recorder/player handles behind the memo. Every method is
//! infallible from the caller's point of view: device failures end up
//! as [`AudioPhase::Error`], and calls that do not match the current phase
//! are ignored so duplicate UI events are harmless.
//!
//! A handle is always released inside the same call that moves the phase
//! away from `Recording` or `Playing`.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration as StdDuration, Instant};

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, trace, warn};

use super::ports::{
    PlaybackHandle, PlaybackTicket, PlayerDevice, PlayerEvent, PlayerSignal, PlayerSignalSender,
    RecorderDevice, RecordingHandle,
};
use crate::domain::attachment::{fresh_recording_path, AudioPhase};

/// Point-in-time view of the attachment state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AttachmentSnapshot {
    pub image_reference: Option<String>,
    pub audio_file: Option<PathBuf>,
    pub phase: AudioPhase,
    pub recorder_held: bool,
    pub player_held: bool,
}

struct ActivePlayback {
    ticket: PlaybackTicket,
    handle: Box<dyn PlaybackHandle>,
}

struct ActiveRecording {
    handle: Box<dyn RecordingHandle>,
    started_at: Instant,
}

/// Image and voice-memo state for one task-edit session
pub struct AttachmentCoordinator<R, P>
where
    R: RecorderDevice,
    P: PlayerDevice,
{
    recorder: R,
    player: P,
    recordings_dir: PathBuf,
    player_events: UnboundedSender<PlayerEvent>,
    image_reference: Option<String>,
    audio_file: Option<PathBuf>,
    phase: AudioPhase,
    recording: Option<ActiveRecording>,
    playback: Option<ActivePlayback>,
    last_ticket: PlaybackTicket,
}

impl<R, P> AttachmentCoordinator<R, P>
where
    R: RecorderDevice,
    P: PlayerDevice,
{
    /// Create a coordinator for a fresh session.
    ///
    /// # Arguments
    /// * `recordings_dir` - Where new voice memos are created
    /// * `player_events` - Channel the player reports on; the session
    ///   must feed what arrives back through [`Self::handle_player_event`]
    pub fn new(
        recorder: R,
        player: P,
        recordings_dir: impl Into<PathBuf>,
        player_events: UnboundedSender<PlayerEvent>,
    ) -> Self {
        Self {
            recorder,
            player,
            recordings_dir: recordings_dir.into(),
            player_events,
            image_reference: None,
            audio_file: None,
            phase: AudioPhase::Idle,
            recording: None,
            playback: None,
            last_ticket: PlaybackTicket::default(),
        }
    }

    pub fn phase(&self) -> &AudioPhase {
        &self.phase
    }

    pub fn image_reference(&self) -> Option<&str> {
        self.image_reference.as_deref()
    }

    pub fn audio_file(&self) -> Option<&Path> {
        self.audio_file.as_deref()
    }

    pub fn recorder_held(&self) -> bool {
        self.recording.is_some()
    }

    pub fn player_held(&self) -> bool {
        self.playback.is_some()
    }

    /// Time since the current recording started
    pub fn recording_elapsed(&self) -> Option<StdDuration> {
        self.recording.as_ref().map(|r| r.started_at.elapsed())
    }

    pub fn snapshot(&self) -> AttachmentSnapshot {
        AttachmentSnapshot {
            image_reference: self.image_reference.clone(),
            audio_file: self.audio_file.clone(),
            phase: self.phase.clone(),
            recorder_held: self.recorder_held(),
            player_held: self.player_held(),
        }
    }

    /// Store the picked image. `None` means the picker was cancelled.
    pub fn select_image(&mut self, reference: Option<String>) {
        match reference {
            Some(reference) => {
                debug!(%reference, "image selected");
                self.image_reference = Some(reference);
            }
            None => trace!("image picking cancelled"),
        }
    }

    pub fn clear_image(&mut self) {
        self.image_reference = None;
    }

    /// Create a new memo file and start the microphone on it. Only from `Idle`.
    pub fn start_recording(&mut self) {
        if !self.phase.is_idle() || self.holds_device() {
            debug!(phase = %self.phase, "ignoring start_recording");
            return;
        }

        let path = fresh_recording_path(&self.recordings_dir);
        if let Err(e) = create_empty_file(&path) {
            warn!(path = %path.display(), error = %e, "cannot create recording file");
            self.phase = AudioPhase::Error(format!("Failed to start recording: {}", e));
            return;
        }

        let mut handle = match self.recorder.acquire(&path) {
            Ok(handle) => handle,
            Err(e) => {
                warn!(error = %e, "recorder acquisition failed");
                self.abort_recording_start(&path, e.to_string());
                return;
            }
        };

        if let Err(e) = handle.start() {
            warn!(error = %e, "recorder start failed");
            handle.release();
            self.abort_recording_start(&path, e.to_string());
            return;
        }

        info!(path = %path.display(), "recording started");
        self.recording = Some(ActiveRecording {
            handle,
            started_at: Instant::now(),
        });
        self.audio_file = Some(path);
        self.phase = AudioPhase::Recording;
    }

    /// Stop the microphone. Only from `Recording`.
    ///
    /// On failure the handle is still released and the partial clip deleted.
    pub fn stop_recording(&mut self) {
        if !self.phase.is_recording() {
            debug!(phase = %self.phase, "ignoring stop_recording");
            return;
        }

        let result = match self.recording.take() {
            Some(mut active) => {
                let result = active.handle.stop();
                active.handle.release();
                result.map_err(|e| e.to_string())
            }
            None => Err("recorder handle missing".to_string()),
        };

        match result {
            Ok(()) => {
                info!("recording stopped");
                self.phase = AudioPhase::Recorded;
            }
            Err(reason) => {
                warn!(%reason, "recording stop failed");
                self.discard_audio_file();
                self.phase = AudioPhase::Error(format!("Failed to stop recording: {}", reason));
            }
        }
    }

    /// Begin playing the memo. Only from `Idle` or `Recorded` with a memo present.
    ///
    /// The phase becomes `Playing` once the player signals ready.
    pub fn play_audio(&mut self) {
        let Some(path) = self.audio_file.clone() else {
            debug!("ignoring play_audio without a recording");
            return;
        };
        if !self.phase.can_play() || self.holds_device() {
            debug!(phase = %self.phase, "ignoring play_audio");
            return;
        }

        self.last_ticket = self.last_ticket.next();
        let ticket = self.last_ticket;
        let signals = PlayerSignalSender::new(ticket, self.player_events.clone());

        let mut handle = match self.player.acquire(&path, signals) {
            Ok(handle) => handle,
            Err(e) => {
                warn!(error = %e, "player acquisition failed");
                self.phase = AudioPhase::Error(format!("Failed to prepare audio: {}", e));
                return;
            }
        };

        if let Err(e) = handle.prepare_async() {
            warn!(error = %e, "player preparation failed");
            handle.release();
            self.phase = AudioPhase::Error(format!("Failed to prepare audio: {}", e));
            return;
        }

        debug!(%ticket, "playback preparing");
        self.playback = Some(ActivePlayback { ticket, handle });
    }

    /// Apply a signal from the player. Signals from released acquisitions are dropped.
    pub fn handle_player_event(&mut self, event: PlayerEvent) {
        let current = self.playback.as_ref().map(|p| p.ticket);
        if current != Some(event.ticket) {
            trace!(ticket = %event.ticket, signal = ?event.signal, "dropping stale player signal");
            return;
        }

        match event.signal {
            PlayerSignal::Ready => {
                if self.phase.is_playing() {
                    return;
                }
                let Some(active) = self.playback.as_mut() else {
                    return;
                };
                match active.handle.start() {
                    Ok(()) => {
                        info!(ticket = %event.ticket, "playback started");
                        self.phase = AudioPhase::Playing;
                    }
                    Err(e) => {
                        warn!(error = %e, "player start failed");
                        self.release_player();
                        self.phase = AudioPhase::Error(format!("Playback error: {}", e));
                    }
                }
            }
            PlayerSignal::Completed => {
                info!(ticket = %event.ticket, "playback completed");
                self.release_player();
                self.phase = AudioPhase::Recorded;
            }
            PlayerSignal::Failed(reason) => {
                warn!(%reason, "playback failed");
                self.release_player();
                self.phase = AudioPhase::Error(format!("Playback error: {}", reason));
            }
        }
    }

    /// Stop playing. Only from `Playing`; always ends in `Recorded`,
    /// even when the player rejects the stop.
    pub fn stop_playback(&mut self) {
        if !self.phase.is_playing() {
            debug!(phase = %self.phase, "ignoring stop_playback");
            return;
        }

        self.release_player();
        info!("playback stopped");
        self.phase = AudioPhase::Recorded;
    }

    /// Drop the memo from any phase, including `Error`. Returns to `Idle`.
    pub fn delete_audio(&mut self) {
        self.release_player();
        if let Some(mut active) = self.recording.take() {
            if let Err(e) = active.handle.stop() {
                debug!(error = %e, "stop before delete failed");
            }
            active.handle.release();
        }
        self.discard_audio_file();
        self.phase = AudioPhase::Idle;
        info!("audio deleted");
    }

    /// Force-release any held device. Safe to call repeatedly.
    ///
    /// An interrupted recording is discarded; interrupted playback
    /// leaves the memo in `Recorded`.
    pub fn teardown(&mut self) {
        if let Some(active) = self.recording.take() {
            debug!("releasing recorder on teardown");
            active.handle.release();
            self.discard_audio_file();
            self.phase = AudioPhase::Idle;
        }
        if self.playback.is_some() {
            debug!("releasing player on teardown");
            self.release_player();
            if self.phase.is_playing() {
                self.phase = AudioPhase::Recorded;
            }
        }
    }

    fn holds_device(&self) -> bool {
        self.recording.is_some() || self.playback.is_some()
    }

    /// Best-effort stop, then release. No-op without a player.
    fn release_player(&mut self) {
        if let Some(mut active) = self.playback.take() {
            if active.handle.is_playing() {
                if let Err(e) = active.handle.stop() {
                    warn!(error = %e, "player rejected stop");
                }
            }
            active.handle.release();
        }
    }

    fn abort_recording_start(&mut self, path: &Path, reason: String) {
        remove_file_quietly(path);
        self.audio_file = None;
        self.phase = AudioPhase::Error(format!("Failed to start recording: {}", reason));
    }

    fn discard_audio_file(&mut self) {
        if let Some(path) = self.audio_file.take() {
            remove_file_quietly(&path);
        }
    }
}

impl<R, P> Drop for AttachmentCoordinator<R, P>
where
    R: RecorderDevice,
    P: PlayerDevice,
{
    fn drop(&mut self) {
        self.teardown();
    }
}

fn create_empty_file(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().write(true).create_new(true).open(path)?;
    Ok(())
}

fn remove_file_quietly(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "recording file removed"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "cannot remove recording file"),
    }
}
