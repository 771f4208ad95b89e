//! Player device port
//!
//! Playback preparation and completion are asynchronous: the device reports
//! them as [`PlayerSignal`]s on a channel, each tagged with the
//! [`PlaybackTicket`] of the acquisition that produced it.

use std::fmt;
use std::path::Path;

use tokio::sync::mpsc;

use super::device::DeviceError;

/// Identifies one player acquisition.
///
/// Signals from a released acquisition carry a ticket that no longer
/// matches and are dropped by the receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct PlaybackTicket(u64);

impl PlaybackTicket {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn id(&self) -> u64 {
        self.0
    }

    /// The ticket following this one
    pub const fn next(&self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for PlaybackTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Asynchronous notifications from the player
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerSignal {
    /// Preparation finished; `start` may be called
    Ready,
    /// Playback reached the end of the clip
    Completed,
    /// Preparation or playback failed
    Failed(String),
}

/// A player signal tagged with the acquisition it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerEvent {
    pub ticket: PlaybackTicket,
    pub signal: PlayerSignal,
}

pub type PlayerEventReceiver = mpsc::UnboundedReceiver<PlayerEvent>;

/// Create the channel player signals are delivered on
pub fn player_event_channel() -> (mpsc::UnboundedSender<PlayerEvent>, PlayerEventReceiver) {
    mpsc::unbounded_channel()
}

/// Sending half given to a player acquisition. Tags every signal with
/// the acquisition's ticket. Usable from any thread.
#[derive(Debug, Clone)]
pub struct PlayerSignalSender {
    ticket: PlaybackTicket,
    tx: mpsc::UnboundedSender<PlayerEvent>,
}

impl PlayerSignalSender {
    pub fn new(ticket: PlaybackTicket, tx: mpsc::UnboundedSender<PlayerEvent>) -> Self {
        Self { ticket, tx }
    }

    pub fn ticket(&self) -> PlaybackTicket {
        self.ticket
    }

    /// Deliver a signal. Returns false once the receiving session is gone.
    pub fn send(&self, signal: PlayerSignal) -> bool {
        self.tx
            .send(PlayerEvent {
                ticket: self.ticket,
                signal,
            })
            .is_ok()
    }
}

/// Port for audio playback from a file
pub trait PlayerDevice: Send + Sync {
    /// Acquire the audio output for `path`.
    ///
    /// # Arguments
    /// * `path` - Clip to play
    /// * `signals` - Where `Ready`, `Completed` and `Failed` are reported
    fn acquire(
        &self,
        path: &Path,
        signals: PlayerSignalSender,
    ) -> Result<Box<dyn PlaybackHandle>, DeviceError>;
}

/// Exclusive, acquire/release-scoped binding to the audio output.
pub trait PlaybackHandle: Send {
    /// Begin preparing; completion arrives as `Ready` or `Failed`.
    fn prepare_async(&mut self) -> Result<(), DeviceError>;

    /// Start playing. Only valid after `Ready`.
    fn start(&mut self) -> Result<(), DeviceError>;

    fn is_playing(&self) -> bool;

    /// Stop playing. May be rejected if playback already ended.
    fn stop(&mut self) -> Result<(), DeviceError>;

    /// Give the output back. Never fails; no signals follow.
    fn release(self: Box<Self>);
}
