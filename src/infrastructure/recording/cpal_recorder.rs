//! Microphone recorder using cpal
//!
//! Each acquisition spawns a capture thread that owns the input stream
//! (`cpal::Stream` is not `Send`). The handle talks to it over a command
//! channel. Samples are mixed to mono while capturing; on stop they are
//! resampled to 16kHz and written to the bound path as FLAC.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, SyncSender};
use std::sync::{Arc, Mutex as StdMutex};
use std::thread::JoinHandle;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, SampleRate, StreamConfig};
use rubato::{FftFixedIn, Resampler};
use tracing::{debug, error, warn};

use super::flac_encoder::{write_flac, TARGET_SAMPLE_RATE};
use crate::application::ports::{DeviceError, RecorderDevice, RecordingHandle};

type Reply = SyncSender<Result<(), DeviceError>>;

enum CaptureCommand {
    Start(Reply),
    Stop(Reply),
}

/// Recorder device backed by the default cpal input
#[derive(Debug, Default, Clone, Copy)]
pub struct CpalRecorder;

impl CpalRecorder {
    pub fn new() -> Self {
        Self
    }

    /// Get the default input device
    fn get_input_device() -> Result<cpal::Device, DeviceError> {
        let host = cpal::default_host();
        host.default_input_device().ok_or(DeviceError::NoAudioDevice)
    }

    /// Get a suitable input configuration, preferring mono and 16kHz
    fn get_input_config(device: &cpal::Device) -> Result<(StreamConfig, SampleFormat), DeviceError> {
        let supported_configs = device
            .supported_input_configs()
            .map_err(|e| DeviceError::AcquireFailed(format!("Failed to get configs: {}", e)))?;

        let mut best_config: Option<cpal::SupportedStreamConfigRange> = None;

        for config in supported_configs {
            if config.sample_format() != SampleFormat::I16
                && config.sample_format() != SampleFormat::F32
            {
                continue;
            }

            let includes_target = config.min_sample_rate().0 <= TARGET_SAMPLE_RATE
                && config.max_sample_rate().0 >= TARGET_SAMPLE_RATE;

            let is_better = match &best_config {
                None => true,
                Some(current) => {
                    let fewer_channels = config.channels() < current.channels();
                    let better_rate =
                        includes_target && current.min_sample_rate().0 > TARGET_SAMPLE_RATE;
                    fewer_channels || better_rate
                }
            };
            if is_better {
                best_config = Some(config);
            }
        }

        let range = best_config
            .ok_or_else(|| DeviceError::AcquireFailed("No suitable input config".into()))?;

        let sample_rate = if range.min_sample_rate().0 <= TARGET_SAMPLE_RATE
            && range.max_sample_rate().0 >= TARGET_SAMPLE_RATE
        {
            SampleRate(TARGET_SAMPLE_RATE)
        } else {
            range.min_sample_rate()
        };

        let config = StreamConfig {
            channels: range.channels(),
            sample_rate,
            buffer_size: cpal::BufferSize::Default,
        };

        Ok((config, range.sample_format()))
    }

    /// Build a paused input stream that appends mono samples while `capturing` is set
    fn build_stream(
        device: &cpal::Device,
        config: &StreamConfig,
        sample_format: SampleFormat,
        buffer: Arc<StdMutex<Vec<i16>>>,
        capturing: Arc<AtomicBool>,
    ) -> Result<cpal::Stream, DeviceError> {
        let channels = config.channels;
        let on_error = |err: cpal::StreamError| error!(error = %err, "audio input stream error");

        let stream = match sample_format {
            SampleFormat::I16 => device.build_input_stream(
                config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    if capturing.load(Ordering::SeqCst) {
                        let mono = stereo_to_mono(data, channels);
                        if let Ok(mut buffer) = buffer.lock() {
                            buffer.extend_from_slice(&mono);
                        }
                    }
                },
                on_error,
                None,
            ),
            SampleFormat::F32 => device.build_input_stream(
                config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if capturing.load(Ordering::SeqCst) {
                        let i16_data: Vec<i16> =
                            data.iter().map(|&s| (s * 32767.0) as i16).collect();
                        let mono = stereo_to_mono(&i16_data, channels);
                        if let Ok(mut buffer) = buffer.lock() {
                            buffer.extend_from_slice(&mono);
                        }
                    }
                },
                on_error,
                None,
            ),
            _ => {
                return Err(DeviceError::AcquireFailed(
                    "Unsupported sample format".into(),
                ))
            }
        };

        stream.map_err(|e| DeviceError::AcquireFailed(e.to_string()))
    }
}

impl RecorderDevice for CpalRecorder {
    fn acquire(&self, output: &Path) -> Result<Box<dyn RecordingHandle>, DeviceError> {
        let (command_tx, command_rx) = mpsc::channel();
        let (ready_tx, ready_rx) = mpsc::sync_channel(1);
        let output = output.to_path_buf();

        let worker = std::thread::Builder::new()
            .name("taskmaster-capture".into())
            .spawn(move || capture_thread(output, command_rx, ready_tx))
            .map_err(|e| DeviceError::AcquireFailed(e.to_string()))?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Box::new(CpalRecordingHandle {
                commands: Some(command_tx),
                worker: Some(worker),
            })),
            Ok(Err(e)) => {
                let _ = worker.join();
                Err(e)
            }
            Err(_) => Err(DeviceError::AcquireFailed(
                "capture thread exited during setup".into(),
            )),
        }
    }
}

/// Body of the capture thread: open the microphone, then serve commands
/// until the handle hangs up.
fn capture_thread(
    output: PathBuf,
    commands: Receiver<CaptureCommand>,
    ready: SyncSender<Result<(), DeviceError>>,
) {
    let buffer = Arc::new(StdMutex::new(Vec::new()));
    let capturing = Arc::new(AtomicBool::new(false));

    let setup = CpalRecorder::get_input_device().and_then(|device| {
        let (config, sample_format) = CpalRecorder::get_input_config(&device)?;
        let stream = CpalRecorder::build_stream(
            &device,
            &config,
            sample_format,
            Arc::clone(&buffer),
            Arc::clone(&capturing),
        )?;
        Ok((stream, config.sample_rate.0))
    });

    let (stream, sample_rate) = match setup {
        Ok(ok) => {
            let _ = ready.send(Ok(()));
            ok
        }
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };
    debug!(sample_rate, path = %output.display(), "microphone acquired");

    while let Ok(command) = commands.recv() {
        match command {
            CaptureCommand::Start(reply) => {
                let result = match buffer.lock() {
                    Ok(mut samples) => {
                        samples.clear();
                        Ok(())
                    }
                    Err(_) => Err(DeviceError::StartFailed("sample buffer poisoned".into())),
                }
                .and_then(|()| {
                    capturing.store(true, Ordering::SeqCst);
                    stream
                        .play()
                        .map_err(|e| DeviceError::StartFailed(e.to_string()))
                });
                if result.is_err() {
                    capturing.store(false, Ordering::SeqCst);
                }
                let _ = reply.send(result);
            }
            CaptureCommand::Stop(reply) => {
                let was_capturing = capturing.swap(false, Ordering::SeqCst);
                if let Err(e) = stream.pause() {
                    warn!(error = %e, "cannot pause input stream");
                }
                let result = if was_capturing {
                    finish_clip(&output, &buffer, sample_rate)
                } else {
                    Err(DeviceError::StopFailed("recorder was not started".into()))
                };
                let _ = reply.send(result);
            }
        }
    }

    capturing.store(false, Ordering::SeqCst);
    drop(stream);
    debug!("microphone released");
}

/// Drain the buffer, resample, and write the FLAC file
fn finish_clip(
    output: &Path,
    buffer: &StdMutex<Vec<i16>>,
    sample_rate: u32,
) -> Result<(), DeviceError> {
    let samples = buffer
        .lock()
        .map(|mut b| std::mem::take(&mut *b))
        .map_err(|_| DeviceError::StopFailed("sample buffer poisoned".into()))?;

    let resampled = resample_to_16k(&samples, sample_rate)?;
    write_flac(output, &resampled, TARGET_SAMPLE_RATE)
        .map_err(|e| DeviceError::StopFailed(e.to_string()))?;
    debug!(samples = resampled.len(), path = %output.display(), "clip written");
    Ok(())
}

/// Resample audio from device rate to 16kHz if needed
fn resample_to_16k(samples: &[i16], source_rate: u32) -> Result<Vec<i16>, DeviceError> {
    if source_rate == TARGET_SAMPLE_RATE || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let samples_f32: Vec<f32> = samples.iter().map(|&s| s as f32 / 32768.0).collect();

    let ratio = TARGET_SAMPLE_RATE as f64 / source_rate as f64;
    let output_len = (samples_f32.len() as f64 * ratio).ceil() as usize;

    let mut resampler = FftFixedIn::<f32>::new(
        source_rate as usize,
        TARGET_SAMPLE_RATE as usize,
        1024, // Chunk size
        2,    // Sub-chunks
        1,    // Mono
    )
    .map_err(|e| DeviceError::StopFailed(format!("Resampler init failed: {}", e)))?;

    let mut output = Vec::with_capacity(output_len);
    let mut input_pos = 0;

    while input_pos < samples_f32.len() {
        let frames_needed = resampler.input_frames_next();
        let end_pos = (input_pos + frames_needed).min(samples_f32.len());
        let mut chunk = samples_f32[input_pos..end_pos].to_vec();
        chunk.resize(frames_needed, 0.0);
        let input = vec![chunk];

        let resampled = resampler
            .process(&input, None)
            .map_err(|e| DeviceError::StopFailed(format!("Resampling failed: {}", e)))?;

        output.extend(resampled[0].iter().map(|&s| (s * 32767.0) as i16));
        input_pos = end_pos;
    }

    output.truncate(output_len);
    Ok(output)
}

/// Mix interleaved multi-channel samples down to mono
fn stereo_to_mono(samples: &[i16], channels: u16) -> Vec<i16> {
    if channels == 1 {
        return samples.to_vec();
    }

    samples
        .chunks(channels as usize)
        .map(|chunk| {
            let sum: i32 = chunk.iter().map(|&s| s as i32).sum();
            (sum / channels as i32) as i16
        })
        .collect()
}

/// Handle on an acquired microphone
struct CpalRecordingHandle {
    commands: Option<Sender<CaptureCommand>>,
    worker: Option<JoinHandle<()>>,
}

impl CpalRecordingHandle {
    fn request(
        &self,
        make: impl FnOnce(Reply) -> CaptureCommand,
    ) -> Result<(), DeviceError> {
        let commands = self.commands.as_ref().ok_or(DeviceError::Released)?;
        let (reply_tx, reply_rx) = mpsc::sync_channel(1);
        commands
            .send(make(reply_tx))
            .map_err(|_| DeviceError::Released)?;
        reply_rx.recv().map_err(|_| DeviceError::Released)?
    }
}

impl RecordingHandle for CpalRecordingHandle {
    fn start(&mut self) -> Result<(), DeviceError> {
        self.request(CaptureCommand::Start)
    }

    fn stop(&mut self) -> Result<(), DeviceError> {
        self.request(CaptureCommand::Stop)
    }

    fn release(self: Box<Self>) {}
}

impl Drop for CpalRecordingHandle {
    fn drop(&mut self) {
        // Hanging up ends the capture thread
        self.commands.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("capture thread panicked");
            }
        }
    }
}
