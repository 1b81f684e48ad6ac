// SPDX-License-Identifier: MPL-2.0
//! Audio output using cpal for low-latency playback.
//!
//! The decode thread pushes interleaved f32 samples into a bounded buffer
//! that the cpal callback drains. Volume and mute live in [`AudioLevels`],
//! shared with the pipeline handle on the UI thread, so changes apply on the
//! next callback without a round trip through the decoder.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use log::{debug, warn};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use super::Volume;
use crate::error::{Error, Result};

/// Volume and mute shared between the pipeline handle and the audio callback.
#[derive(Debug)]
pub(crate) struct AudioLevels {
    /// Current volume (stored as u64 bits of f64 for atomic access).
    volume_bits: AtomicU64,
    muted: AtomicBool,
}

impl AudioLevels {
    pub(crate) fn new(volume: Volume, muted: bool) -> Self {
        Self {
            volume_bits: AtomicU64::new(volume.value().to_bits()),
            muted: AtomicBool::new(muted),
        }
    }

    pub(crate) fn volume(&self) -> Volume {
        Volume::new(f64::from_bits(self.volume_bits.load(Ordering::Relaxed)))
    }

    pub(crate) fn set_volume(&self, volume: Volume) {
        self.volume_bits
            .store(volume.value().to_bits(), Ordering::Relaxed);
    }

    pub(crate) fn is_muted(&self) -> bool {
        self.muted.load(Ordering::Relaxed)
    }

    pub(crate) fn set_muted(&self, muted: bool) {
        self.muted.store(muted, Ordering::Relaxed);
    }

    /// Gain applied to each sample: zero when muted.
    #[allow(clippy::cast_possible_truncation)]
    fn gain(&self) -> f32 {
        if self.is_muted() {
            0.0
        } else {
            self.volume().value() as f32
        }
    }
}

struct StreamState {
    levels: Arc<AudioLevels>,
    paused: AtomicBool,
}

/// Audio output stream on the default device.
pub(crate) struct AudioOutput {
    buffer: Arc<Mutex<Vec<f32>>>,
    state: Arc<StreamState>,
    max_buffer_len: usize,
    sample_rate: u32,
    channels: u16,
    /// The audio stream (kept alive to maintain playback).
    _stream: cpal::Stream,
}

impl AudioOutput {
    /// Opens the default output device, paused.
    ///
    /// The stream is limited to mono or stereo; callers resample to
    /// [`AudioOutput::sample_rate`] and [`AudioOutput::channels`].
    ///
    /// # Errors
    ///
    /// Returns an error if no output device is found, its configuration
    /// cannot be read, or the stream fails to start.
    pub(crate) fn new(levels: Arc<AudioLevels>) -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| Error::Io("No audio output device found".to_string()))?;

        let supported_config = device
            .default_output_config()
            .map_err(|e| Error::Io(format!("Failed to get audio config: {e}")))?;

        let sample_rate = supported_config.sample_rate();
        let channels = supported_config.channels().clamp(1, 2);
        let config = cpal::StreamConfig {
            channels,
            sample_rate,
            buffer_size: cpal::BufferSize::Default,
        };

        // About one second of audio
        let max_buffer_len = (sample_rate.0 as usize) * (channels as usize);
        let buffer = Arc::new(Mutex::new(Vec::with_capacity(max_buffer_len)));
        let state = Arc::new(StreamState {
            levels,
            paused: AtomicBool::new(true),
        });

        let stream = match supported_config.sample_format() {
            cpal::SampleFormat::F32 => Self::build_stream::<f32>(
                &device,
                &config,
                Arc::clone(&buffer),
                Arc::clone(&state),
            )?,
            cpal::SampleFormat::I16 => Self::build_stream::<i16>(
                &device,
                &config,
                Arc::clone(&buffer),
                Arc::clone(&state),
            )?,
            cpal::SampleFormat::U16 => Self::build_stream::<u16>(
                &device,
                &config,
                Arc::clone(&buffer),
                Arc::clone(&state),
            )?,
            _ => return Err(Error::Io("Unsupported audio sample format".to_string())),
        };

        stream
            .play()
            .map_err(|e| Error::Io(format!("Failed to start audio stream: {e}")))?;

        debug!(
            "audio output ready: {} Hz, {} channel(s)",
            sample_rate.0, channels
        );

        Ok(Self {
            buffer,
            state,
            max_buffer_len,
            sample_rate: sample_rate.0,
            channels,
            _stream: stream,
        })
    }

    /// Builds an audio output stream for a specific sample format.
    fn build_stream<T: cpal::SizedSample + cpal::FromSample<f32>>(
        device: &cpal::Device,
        config: &cpal::StreamConfig,
        buffer: Arc<Mutex<Vec<f32>>>,
        state: Arc<StreamState>,
    ) -> Result<cpal::Stream> {
        device
            .build_output_stream(
                config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    if state.paused.load(Ordering::Relaxed) {
                        fill_silence(data);
                        return;
                    }

                    let Ok(mut buf) = buffer.lock() else {
                        fill_silence(data);
                        return;
                    };

                    let gain = state.levels.gain();
                    for (i, sample) in data.iter_mut().enumerate() {
                        let value = buf.get(i).map_or(0.0, |s| (s * gain).clamp(-1.0, 0.999_999_9));
                        *sample = T::from_sample(value);
                    }

                    let consumed = data.len().min(buf.len());
                    buf.drain(..consumed);
                },
                |err| warn!("audio output error: {err}"),
                None,
            )
            .map_err(|e| Error::Io(format!("Failed to build audio stream: {e}")))
    }

    /// Queues samples, dropping whatever does not fit the buffer.
    pub(crate) fn push(&self, samples: &[f32]) {
        if let Ok(mut buf) = self.buffer.lock() {
            let available = self.max_buffer_len.saturating_sub(buf.len());
            let take = available.min(samples.len());
            buf.extend_from_slice(&samples[..take]);
        }
    }

    /// Discards queued samples.
    pub(crate) fn clear(&self) {
        if let Ok(mut buf) = self.buffer.lock() {
            buf.clear();
        }
    }

    pub(crate) fn set_paused(&self, paused: bool) {
        self.state.paused.store(paused, Ordering::Relaxed);
    }

    pub(crate) fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub(crate) fn channels(&self) -> u16 {
        self.channels
    }
}

fn fill_silence<T: cpal::SizedSample + cpal::FromSample<f32>>(data: &mut [T]) {
    for sample in data.iter_mut() {
        *sample = T::from_sample(0.0f32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::assert_abs_diff_eq;

    #[test]
    fn levels_round_trip_volume() {
        let levels = AudioLevels::new(Volume::new(0.3), false);
        assert_abs_diff_eq!(levels.volume().value(), 0.3);

        levels.set_volume(Volume::new(0.7));
        assert_abs_diff_eq!(levels.volume().value(), 0.7);
    }

    #[test]
    fn muted_levels_have_zero_gain() {
        let levels = AudioLevels::new(Volume::new(0.9), false);
        assert!(levels.gain() > 0.0);

        levels.set_muted(true);
        assert!(levels.is_muted());
        assert_abs_diff_eq!(levels.gain(), 0.0);
    }
}
