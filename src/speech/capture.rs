//! Microphone capture
//!
//! 16 kHz mono input into a shared sample buffer; the caller drains the
//! buffer on its own schedule. The cpal stream is not `Send`, so it lives
//! on a dedicated thread that parks until capture is stopped.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleRate, StreamConfig};

use crate::{Error, Result};

/// Sample rate for speech capture
pub const SAMPLE_RATE: u32 = 16000;

/// Thread hosting the input stream for one start/stop cycle
struct CaptureWorker {
    stop: mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

/// Captures audio from the default input device
pub struct AudioCapture {
    buffer: Arc<Mutex<Vec<f32>>>,
    worker: Option<CaptureWorker>,
}

impl AudioCapture {
    /// Probe the default input device at the speech sample rate
    ///
    /// # Errors
    ///
    /// Returns `Error::Audio` if no device or no mono 16 kHz config exists
    pub fn new() -> Result<Self> {
        let (device, _) = open_input()?;

        tracing::debug!(
            device = device.name().unwrap_or_default(),
            sample_rate = SAMPLE_RATE,
            "microphone capture initialized"
        );

        Ok(Self {
            buffer: Arc::new(Mutex::new(Vec::new())),
            worker: None,
        })
    }

    /// Start the capture stream; idempotent
    ///
    /// # Errors
    ///
    /// Returns `Error::Audio` if the stream cannot be built or started
    pub fn start(&mut self) -> Result<()> {
        if self.worker.is_some() {
            return Ok(());
        }

        if let Ok(mut buf) = self.buffer.lock() {
            buf.clear();
        }

        let buffer = Arc::clone(&self.buffer);
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<()>>();

        let handle = std::thread::spawn(move || {
            let stream = match build_input_stream(&buffer) {
                Ok(stream) => stream,
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                    return;
                }
            };
            let _ = ready_tx.send(Ok(()));

            // Park until stop is requested or the capture handle is dropped
            let _ = stop_rx.recv();
            drop(stream);
        });

        match ready_rx.recv() {
            Ok(Ok(())) => {
                self.worker = Some(CaptureWorker {
                    stop: stop_tx,
                    handle,
                });
                tracing::debug!("microphone capture started");
                Ok(())
            }
            Ok(Err(e)) => {
                let _ = handle.join();
                Err(e)
            }
            Err(_) => {
                let _ = handle.join();
                Err(Error::Audio("capture thread died during setup".to_string()))
            }
        }
    }

    /// Stop the capture stream and discard buffered samples
    pub fn stop(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.stop.send(());
            let _ = worker.handle.join();
            if let Ok(mut buf) = self.buffer.lock() {
                buf.clear();
            }
            tracing::debug!("microphone capture stopped");
        }
    }

    /// Drain samples captured since the last call
    #[must_use]
    pub fn take_buffer(&self) -> Vec<f32> {
        self.buffer
            .lock()
            .map(|mut buf| std::mem::take(&mut *buf))
            .unwrap_or_default()
    }

    /// Whether the stream is running
    #[must_use]
    pub const fn is_capturing(&self) -> bool {
        self.worker.is_some()
    }
}

impl Drop for AudioCapture {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Find the default input device and a mono 16 kHz config
fn open_input() -> Result<(Device, StreamConfig)> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| Error::Audio("no input device available".to_string()))?;

    let supported = device
        .supported_input_configs()
        .map_err(|e| Error::Audio(e.to_string()))?
        .find(|c| {
            c.channels() == 1
                && c.min_sample_rate() <= SampleRate(SAMPLE_RATE)
                && c.max_sample_rate() >= SampleRate(SAMPLE_RATE)
        })
        .ok_or_else(|| Error::Audio("no mono 16kHz input config found".to_string()))?;

    let config = supported.with_sample_rate(SampleRate(SAMPLE_RATE)).config();
    Ok((device, config))
}

/// Build and start the input stream, appending samples into `buffer`
fn build_input_stream(buffer: &Arc<Mutex<Vec<f32>>>) -> Result<cpal::Stream> {
    let (device, config) = open_input()?;
    let buffer = Arc::clone(buffer);

    let stream = device
        .build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                if let Ok(mut buf) = buffer.lock() {
                    buf.extend_from_slice(data);
                }
            },
            |err| {
                tracing::error!(error = %err, "microphone capture error");
            },
            None,
        )
        .map_err(|e| Error::Audio(e.to_string()))?;

    stream.play().map_err(|e| Error::Audio(e.to_string()))?;
    Ok(stream)
}

/// Encode f32 samples as 16-bit WAV for the transcription API
///
/// # Errors
///
/// Returns `Error::Audio` if WAV encoding fails
pub fn samples_to_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer =
            hound::WavWriter::new(&mut cursor, spec).map_err(|e| Error::Audio(e.to_string()))?;

        for &sample in samples {
            #[allow(clippy::cast_possible_truncation)]
            let sample_i16 = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
            writer
                .write_sample(sample_i16)
                .map_err(|e| Error::Audio(e.to_string()))?;
        }

        writer.finalize().map_err(|e| Error::Audio(e.to_string()))?;
    }

    Ok(cursor.into_inner())
}
