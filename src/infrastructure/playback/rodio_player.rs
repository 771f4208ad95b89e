//! Rodio-based voice memo player
//!
//! Each acquisition gets a worker thread that owns the output stream and
//! sink (`rodio::OutputStream` is not `Send`). Preparation happens on the
//! worker and is reported through the acquisition's signal sender, as is
//! the end of the clip.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, SyncSender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use rodio::{Decoder, OutputStream, Sink};
use tracing::{debug, warn};

use crate::application::ports::{
    DeviceError, PlaybackHandle, PlayerDevice, PlayerSignal, PlayerSignalSender,
};

/// How often the worker checks whether the clip has drained
const DRAIN_POLL: Duration = Duration::from_millis(100);

type Reply = SyncSender<Result<(), DeviceError>>;

enum PlayerCommand {
    Prepare,
    Start(Reply),
    Stop(Reply),
}

/// Player device backed by the default rodio output
#[derive(Debug, Default, Clone, Copy)]
pub struct RodioPlayer;

impl RodioPlayer {
    pub fn new() -> Self {
        Self
    }
}

impl PlayerDevice for RodioPlayer {
    fn acquire(
        &self,
        path: &Path,
        signals: PlayerSignalSender,
    ) -> Result<Box<dyn PlaybackHandle>, DeviceError> {
        let file = File::open(path)
            .map_err(|e| DeviceError::AcquireFailed(format!("{}: {}", path.display(), e)))?;

        let (command_tx, command_rx) = mpsc::channel();
        let playing = Arc::new(AtomicBool::new(false));
        let worker_playing = Arc::clone(&playing);

        let worker = std::thread::Builder::new()
            .name("taskmaster-playback".into())
            .spawn(move || playback_thread(file, command_rx, signals, worker_playing))
            .map_err(|e| DeviceError::AcquireFailed(e.to_string()))?;

        Ok(Box::new(RodioPlaybackHandle {
            commands: Some(command_tx),
            worker: Some(worker),
            playing,
        }))
    }
}

/// Output stream plus the sink holding the decoded clip
struct Prepared {
    _stream: OutputStream,
    sink: Sink,
}

fn prepare(file: File) -> Result<Prepared, String> {
    let (stream, handle) = OutputStream::try_default().map_err(|e| e.to_string())?;
    let sink = Sink::try_new(&handle).map_err(|e| e.to_string())?;
    let source = Decoder::new(BufReader::new(file)).map_err(|e| e.to_string())?;
    sink.pause();
    sink.append(source);
    Ok(Prepared {
        _stream: stream,
        sink,
    })
}

/// Body of the playback thread. Exits when the handle hangs up.
fn playback_thread(
    file: File,
    commands: Receiver<PlayerCommand>,
    signals: PlayerSignalSender,
    playing: Arc<AtomicBool>,
) {
    let ticket = signals.ticket();
    let mut file = Some(file);
    let mut prepared: Option<Prepared> = None;

    loop {
        let command = match commands.recv_timeout(DRAIN_POLL) {
            Ok(command) => command,
            Err(RecvTimeoutError::Timeout) => {
                let drained = prepared.as_ref().is_some_and(|p| p.sink.empty());
                if playing.load(Ordering::SeqCst) && drained {
                    playing.store(false, Ordering::SeqCst);
                    debug!(%ticket, "clip finished");
                    signals.send(PlayerSignal::Completed);
                }
                continue;
            }
            Err(RecvTimeoutError::Disconnected) => break,
        };

        match command {
            PlayerCommand::Prepare => match file.take() {
                Some(file) => match prepare(file) {
                    Ok(p) => {
                        prepared = Some(p);
                        signals.send(PlayerSignal::Ready);
                    }
                    Err(reason) => {
                        warn!(%ticket, %reason, "cannot prepare clip");
                        signals.send(PlayerSignal::Failed(reason));
                    }
                },
                None => {
                    signals.send(PlayerSignal::Failed("already prepared".into()));
                }
            },
            PlayerCommand::Start(reply) => {
                let result = match prepared.as_ref() {
                    Some(p) => {
                        p.sink.play();
                        playing.store(true, Ordering::SeqCst);
                        Ok(())
                    }
                    None => Err(DeviceError::StartFailed("player is not prepared".into())),
                };
                let _ = reply.send(result);
            }
            PlayerCommand::Stop(reply) => {
                let result = match prepared.as_ref() {
                    Some(p) if playing.swap(false, Ordering::SeqCst) => {
                        p.sink.stop();
                        Ok(())
                    }
                    _ => Err(DeviceError::StopFailed("player is not playing".into())),
                };
                let _ = reply.send(result);
            }
        }
    }

    playing.store(false, Ordering::SeqCst);
    if let Some(p) = prepared {
        p.sink.stop();
    }
    debug!(%ticket, "audio output released");
}

/// Handle on an acquired audio output
struct RodioPlaybackHandle {
    commands: Option<Sender<PlayerCommand>>,
    worker: Option<JoinHandle<()>>,
    playing: Arc<AtomicBool>,
}

impl RodioPlaybackHandle {
    fn send(&self, command: PlayerCommand) -> Result<(), DeviceError> {
        self.commands
            .as_ref()
            .ok_or(DeviceError::Released)?
            .send(command)
            .map_err(|_| DeviceError::Released)
    }

    fn request(&self, make: impl FnOnce(Reply) -> PlayerCommand) -> Result<(), DeviceError> {
        let (reply_tx, reply_rx) = mpsc::sync_channel(1);
        self.send(make(reply_tx))?;
        reply_rx.recv().map_err(|_| DeviceError::Released)?
    }
}

impl PlaybackHandle for RodioPlaybackHandle {
    fn prepare_async(&mut self) -> Result<(), DeviceError> {
        self.send(PlayerCommand::Prepare)
    }

    fn start(&mut self) -> Result<(), DeviceError> {
        self.request(PlayerCommand::Start)
    }

    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }

    fn stop(&mut self) -> Result<(), DeviceError> {
        self.request(PlayerCommand::Stop)
    }

    fn release(self: Box<Self>) {}
}

impl Drop for RodioPlaybackHandle {
    fn drop(&mut self) {
        self.commands.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("playback thread panicked");
            }
        }
    }
}
