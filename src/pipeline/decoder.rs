// SPDX-License-Identifier: MPL-2.0
//! Decode thread: demuxes the media file, paces video frames into the
//! [`FrameSink`] and feeds audio to the cpal output.
//!
//! FFmpeg contexts are not `Send`, so everything here is created and dropped
//! on the decode thread. The UI side talks to it through a command channel
//! and hears back through the bus channel.

use log::{debug, error, info, warn};
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

use super::audio_output::{AudioLevels, AudioOutput};
use super::clock::PlaybackClock;
use super::ffmpeg::init_ffmpeg;
use super::frame::{FrameSink, VideoFrame};
use super::{BusMessage, PipelineState};
use crate::error::{Error, Result, MediaError};

/// Idle sleep while nothing needs decoding.
const IDLE_SLEEP: Duration = Duration::from_millis(10);

/// Frames earlier than the seek target by more than this are decoded but not shown.
const SEEK_TOLERANCE: Duration = Duration::from_millis(50);

/// Upper bound on frames dropped while catching up with a seek target.
const MAX_SEEK_SKIP: u32 = 600;

/// Commands sent from the pipeline handle to the decode thread.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum DecoderCommand {
    SetState(PipelineState),
    Seek(Duration),
    Shutdown,
}

/// Everything the decode thread shares with the pipeline handle.
pub(crate) struct DecoderLink {
    pub(crate) path: PathBuf,
    pub(crate) commands: mpsc::UnboundedReceiver<DecoderCommand>,
    pub(crate) bus: mpsc::UnboundedSender<BusMessage>,
    pub(crate) sink: FrameSink,
    pub(crate) clock: Arc<PlaybackClock>,
    pub(crate) negotiated: Arc<OnceLock<(u32, u32)>>,
    pub(crate) levels: Arc<AudioLevels>,
}

/// Thread entry point. Fatal errors are reported on the bus.
pub(crate) fn run(link: DecoderLink) {
    let bus = link.bus.clone();
    if let Err(err) = Decoder::open(link).and_then(Decoder::run) {
        error!("decoder stopped: {err}");
        let _ = bus.send(BusMessage::Error {
            message: err.to_string(),
        });
    }
}

enum Flow {
    Continue,
    Stop,
}

struct Decoder {
    link: DecoderLink,
    ictx: ffmpeg_next::format::context::Input,
    video: VideoTrack,
    audio: Option<AudioTrack>,
    state: PipelineState,
    /// First frame still has to be decoded to learn the video size.
    preroll: bool,
    /// A paused seek still has to show its target frame.
    preview: bool,
    at_eos: bool,
    /// Packets ran out and the decoders were sent EOF; only buffered frames remain.
    draining: bool,
    seek_target: Option<Duration>,
    /// Wall time and PTS the pacing of the current run is anchored at.
    pacing: Option<(Instant, Duration)>,
}

impl Decoder {
    fn open(link: DecoderLink) -> Result<Self> {
        init_ffmpeg()?;

        let ictx = ffmpeg_next::format::input(&link.path)?;
        let video = VideoTrack::open(&ictx)?;
        let audio = match AudioTrack::open(&ictx, Arc::clone(&link.levels)) {
            Ok(audio) => audio,
            Err(err) => {
                warn!("playing without sound: {err}");
                None
            }
        };

        debug!(
            "decoder opened {} ({}x{}, audio: {})",
            link.path.display(),
            video.width,
            video.height,
            audio.is_some()
        );

        Ok(Self {
            link,
            ictx,
            video,
            audio,
            state: PipelineState::Ready,
            preroll: false,
            preview: false,
            at_eos: false,
            draining: false,
            seek_target: None,
            pacing: None,
        })
    }

    fn run(mut self) -> Result<()> {
        loop {
            let mut batch = Vec::new();
            let mut disconnected = false;
            loop {
                match self.link.commands.try_recv() {
                    Ok(command) => batch.push(command),
                    Err(mpsc::error::TryRecvError::Empty) => break,
                    Err(mpsc::error::TryRecvError::Disconnected) => {
                        disconnected = true;
                        break;
                    }
                }
            }
            for command in coalesce_seeks(batch) {
                if let Flow::Stop = self.handle(command) {
                    return Ok(());
                }
            }
            if disconnected {
                return Ok(());
            }

            let playing = self.state == PipelineState::Playing && !self.at_eos;
            if !(self.preroll || self.preview || playing) {
                std::thread::sleep(IDLE_SLEEP);
                continue;
            }

            match self.next_frame()? {
                Some(frame) => self.present(frame),
                None => self.end_of_stream()?,
            }
        }
    }

    fn post(&self, message: BusMessage) {
        let _ = self.link.bus.send(message);
    }

    fn handle(&mut self, command: DecoderCommand) -> Flow {
        match command {
            DecoderCommand::SetState(PipelineState::Paused) => {
                let old = self.state;
                if old == PipelineState::Playing {
                    self.link.clock.pause();
                    self.pacing = None;
                    if let Some(audio) = &self.audio {
                        audio.output.set_paused(true);
                    }
                }
                self.state = PipelineState::Paused;
                if self.link.negotiated.get().is_none() {
                    // Reported once the first frame is decoded
                    self.preroll = true;
                } else {
                    self.post(BusMessage::StateChanged {
                        old,
                        new: PipelineState::Paused,
                    });
                }
                Flow::Continue
            }
            DecoderCommand::SetState(PipelineState::Playing) => {
                let old = self.state;
                self.state = PipelineState::Playing;
                self.pacing = None;
                self.link.clock.resume();
                if let Some(audio) = &self.audio {
                    audio.output.set_paused(false);
                }
                self.post(BusMessage::StateChanged {
                    old,
                    new: PipelineState::Playing,
                });
                Flow::Continue
            }
            DecoderCommand::SetState(new) => {
                let old = self.state;
                self.state = new;
                self.post(BusMessage::StateChanged { old, new });
                Flow::Stop
            }
            DecoderCommand::Seek(target) => {
                self.seek(target);
                Flow::Continue
            }
            DecoderCommand::Shutdown => Flow::Stop,
        }
    }

    fn seek(&mut self, target: Duration) {
        // AV_TIME_BASE is microseconds
        let timestamp = i64::try_from(target.as_micros()).unwrap_or(i64::MAX);
        // RangeTo lets FFmpeg land on the keyframe before the target
        if let Err(err) = self.ictx.seek(timestamp, ..timestamp) {
            warn!("seek to {:.3}s failed: {err}", target.as_secs_f64());
            return;
        }

        self.video.decoder.flush();
        if let Some(audio) = self.audio.as_mut() {
            audio.flush();
        }
        self.link.clock.set_position(target);
        self.seek_target = Some(target);
        self.pacing = None;
        self.at_eos = false;
        self.draining = false;
        if self.state != PipelineState::Playing {
            self.preview = true;
        }
        debug!("seeked to {:.3}s", target.as_secs_f64());
    }

    /// Decodes until the next displayable video frame. Frames already
    /// buffered in the decoder are taken before more packets are read, and
    /// once the packets run out the decoders are drained.
    fn next_frame(&mut self) -> Result<Option<VideoFrame>> {
        let feed_audio = self.state == PipelineState::Playing;
        let mut skipped = 0u32;
        let mut decoded = ffmpeg_next::frame::Video::empty();

        loop {
            if self.video.decoder.receive_frame(&mut decoded).is_ok() {
                let pts = self.video.pts_of(&decoded);
                if let Some(target) = self.seek_target {
                    if pts + SEEK_TOLERANCE < target && skipped < MAX_SEEK_SKIP {
                        skipped += 1;
                        continue;
                    }
                    self.seek_target = None;
                }
                return self.video.convert(&decoded, pts).map(Some);
            }

            if self.draining {
                return Ok(None);
            }

            let next = self
                .ictx
                .packets()
                .next()
                .map(|(stream, packet)| (stream.index(), packet));
            let Some((index, packet)) = next else {
                self.start_draining(feed_audio);
                continue;
            };

            if let Some(audio) = self.audio.as_mut() {
                if index == audio.stream_index {
                    if feed_audio && self.seek_target.is_none() {
                        audio.decode(&packet);
                    }
                    continue;
                }
            }

            if index == self.video.stream_index {
                if let Err(err) = self.video.decoder.send_packet(&packet) {
                    debug!("video packet rejected: {err}");
                }
            }
        }
    }

    /// Signals end of input so the decoders release their delayed frames.
    fn start_draining(&mut self, feed_audio: bool) {
        self.draining = true;
        if let Err(err) = self.video.decoder.send_eof() {
            debug!("video decoder refused EOF: {err}");
        }
        if let Some(audio) = self.audio.as_mut() {
            if feed_audio {
                audio.drain();
            }
        }
    }

    fn present(&mut self, frame: VideoFrame) {
        if self.preroll {
            self.preroll = false;
            let _ = self.link.negotiated.set((frame.width, frame.height));
            self.link.clock.set_position(frame.pts);
            self.link.sink.present(frame);
            self.post(BusMessage::StateChanged {
                old: PipelineState::Ready,
                new: PipelineState::Paused,
            });
            return;
        }

        if self.preview {
            self.preview = false;
            self.link.clock.set_position(frame.pts);
            self.link.sink.present(frame);
            return;
        }

        // Wait until the frame is due relative to the start of this run
        let (start, first_pts) = *self.pacing.get_or_insert((Instant::now(), frame.pts));
        let due = start + frame.pts.saturating_sub(first_pts);
        let now = Instant::now();
        if due > now {
            std::thread::sleep(due - now);
        }

        self.link.clock.set_position(frame.pts);
        self.link.sink.present(frame);
    }

    fn end_of_stream(&mut self) -> Result<()> {
        if self.preroll {
            return Err(Error::Media(MediaError::DecodingFailed(
                "no decodable video frames".to_string(),
            )));
        }

        self.at_eos = true;
        self.preview = false;
        self.seek_target = None;
        self.pacing = None;
        self.link.clock.pause();
        if let Some(audio) = &self.audio {
            audio.output.set_paused(true);
        }
        info!("end of stream");
        self.post(BusMessage::EndOfStream);
        Ok(())
    }
}

struct VideoTrack {
    stream_index: usize,
    /// Seconds per PTS unit.
    time_base: f64,
    decoder: ffmpeg_next::decoder::Video,
    scaler: ffmpeg_next::software::scaling::Context,
    width: u32,
    height: u32,
}

impl VideoTrack {
    fn open(ictx: &ffmpeg_next::format::context::Input) -> Result<Self> {
        let input = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or(Error::Media(MediaError::NoVideoStream))?;
        let stream_index = input.index();

        let context_decoder =
            ffmpeg_next::codec::context::Context::from_parameters(input.parameters())?;
        let decoder = context_decoder.decoder().video()?;

        let width = decoder.width();
        let height = decoder.height();

        let scaler = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            width,
            height,
            ffmpeg_next::format::Pixel::RGBA,
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )
        .map_err(|e| Error::Media(MediaError::DecodingFailed(format!("scaling setup: {e}"))))?;

        let time_base = input.time_base();
        let time_base = f64::from(time_base.numerator()) / f64::from(time_base.denominator());

        Ok(Self {
            stream_index,
            time_base,
            decoder,
            scaler,
            width,
            height,
        })
    }

    #[allow(clippy::cast_precision_loss)]
    fn pts_of(&self, frame: &ffmpeg_next::frame::Video) -> Duration {
        let secs = frame
            .timestamp()
            .map_or(0.0, |pts| pts as f64 * self.time_base);
        if secs.is_finite() && secs > 0.0 {
            Duration::from_secs_f64(secs)
        } else {
            Duration::ZERO
        }
    }

    fn convert(&mut self, decoded: &ffmpeg_next::frame::Video, pts: Duration) -> Result<VideoFrame> {
        let mut rgba_frame = ffmpeg_next::frame::Video::empty();
        self.scaler
            .run(decoded, &mut rgba_frame)
            .map_err(|e| Error::Media(MediaError::DecodingFailed(format!("scaling: {e}"))))?;

        Ok(VideoFrame {
            rgba: Arc::new(extract_rgba(&rgba_frame)),
            width: rgba_frame.width(),
            height: rgba_frame.height(),
            pts,
        })
    }
}

/// Drops every seek in a command batch except the last one. Dragging along
/// the seek bar queues one seek per pointer move.
fn coalesce_seeks(batch: Vec<DecoderCommand>) -> Vec<DecoderCommand> {
    let last_seek = batch
        .iter()
        .rposition(|command| matches!(command, DecoderCommand::Seek(_)));
    batch
        .into_iter()
        .enumerate()
        .filter(|(index, command)| {
            !matches!(command, DecoderCommand::Seek(_)) || Some(*index) == last_seek
        })
        .map(|(_, command)| command)
        .collect()
}

/// Copies RGBA rows out of a frame, dropping the stride padding.
fn extract_rgba(frame: &ffmpeg_next::frame::Video) -> Vec<u8> {
    let width = frame.width() as usize;
    let height = frame.height() as usize;
    let data = frame.data(0);
    let stride = frame.stride(0);

    let mut rgba = Vec::with_capacity(width * height * 4);
    for y in 0..height {
        let row_start = y * stride;
        rgba.extend_from_slice(&data[row_start..row_start + width * 4]);
    }
    rgba
}

struct AudioTrack {
    stream_index: usize,
    decoder: ffmpeg_next::decoder::Audio,
    resampler: ffmpeg_next::software::resampling::Context,
    output: AudioOutput,
}

impl AudioTrack {
    /// Opens the best audio stream and an output device for it.
    /// Returns `Ok(None)` for media without sound.
    fn open(
        ictx: &ffmpeg_next::format::context::Input,
        levels: Arc<AudioLevels>,
    ) -> Result<Option<Self>> {
        let Some(input) = ictx.streams().best(ffmpeg_next::media::Type::Audio) else {
            return Ok(None);
        };
        let stream_index = input.index();

        let context_decoder =
            ffmpeg_next::codec::context::Context::from_parameters(input.parameters())?;
        let decoder = context_decoder.decoder().audio()?;

        let output = AudioOutput::new(levels)?;
        let output_layout = match output.channels() {
            1 => ffmpeg_next::ChannelLayout::MONO,
            _ => ffmpeg_next::ChannelLayout::STEREO,
        };

        let resampler = ffmpeg_next::software::resampling::Context::get(
            decoder.format(),
            decoder.channel_layout(),
            decoder.rate(),
            ffmpeg_next::format::Sample::F32(ffmpeg_next::format::sample::Type::Packed),
            output_layout,
            output.sample_rate(),
        )
        .map_err(|e| Error::Media(MediaError::DecodingFailed(format!("resampler setup: {e}"))))?;

        Ok(Some(Self {
            stream_index,
            decoder,
            resampler,
            output,
        }))
    }

    fn decode(&mut self, packet: &ffmpeg_next::Packet) {
        if let Err(err) = self.decoder.send_packet(packet) {
            debug!("audio packet rejected: {err}");
            return;
        }
        self.pull_frames();
    }

    /// Plays out whatever the decoder still buffers at end of input.
    fn drain(&mut self) {
        if let Err(err) = self.decoder.send_eof() {
            debug!("audio decoder refused EOF: {err}");
            return;
        }
        self.pull_frames();
    }

    fn pull_frames(&mut self) {
        let mut decoded = ffmpeg_next::frame::Audio::empty();
        while self.decoder.receive_frame(&mut decoded).is_ok() {
            let mut resampled = ffmpeg_next::frame::Audio::empty();
            if let Err(err) = self.resampler.run(&decoded, &mut resampled) {
                debug!("audio resampling failed: {err}");
                continue;
            }
            let samples = extract_samples(&resampled, self.output.channels());
            self.output.push(&samples);
        }
    }

    fn flush(&mut self) {
        self.decoder.flush();
        self.output.clear();
    }
}

/// Reads interleaved little-endian f32 samples from a packed audio frame.
fn extract_samples(frame: &ffmpeg_next::frame::Audio, channels: u16) -> Vec<f32> {
    let data = frame.data(0);
    let sample_count = frame.samples() * usize::from(channels);
    data.chunks_exact(4)
        .take(sample_count)
        .map(|bytes| f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn link_for(path: &Path) -> (DecoderLink, mpsc::UnboundedReceiver<BusMessage>) {
        let (_command_tx, commands) = mpsc::unbounded_channel();
        let (bus, bus_rx) = mpsc::unbounded_channel();
        let link = DecoderLink {
            path: path.to_path_buf(),
            commands,
            bus,
            sink: FrameSink::new(),
            clock: Arc::new(PlaybackClock::new()),
            negotiated: Arc::new(OnceLock::new()),
            levels: Arc::new(AudioLevels::new(super::super::Volume::default(), false)),
        };
        (link, bus_rx)
    }

    #[test]
    fn only_the_last_seek_of_a_batch_runs() {
        let batch = vec![
            DecoderCommand::Seek(Duration::from_secs(10)),
            DecoderCommand::SetState(PipelineState::Playing),
            DecoderCommand::Seek(Duration::from_secs(20)),
            DecoderCommand::Seek(Duration::from_secs(30)),
            DecoderCommand::SetState(PipelineState::Paused),
        ];

        assert_eq!(
            coalesce_seeks(batch),
            vec![
                DecoderCommand::SetState(PipelineState::Playing),
                DecoderCommand::Seek(Duration::from_secs(30)),
                DecoderCommand::SetState(PipelineState::Paused),
            ]
        );
    }

    #[test]
    fn batches_without_seeks_are_kept_in_order() {
        let batch = vec![
            DecoderCommand::SetState(PipelineState::Paused),
            DecoderCommand::SetState(PipelineState::Playing),
            DecoderCommand::Shutdown,
        ];

        assert_eq!(coalesce_seeks(batch.clone()), batch);
    }

    #[test]
    fn missing_file_is_reported_on_the_bus() {
        let (link, mut bus_rx) = link_for(Path::new("/definitely/not/here.mkv"));

        run(link);

        match bus_rx.try_recv() {
            Ok(BusMessage::Error { message }) => assert!(!message.is_empty()),
            other => panic!("expected error message, got {:?}", other),
        }
    }

    #[test]
    fn non_media_file_is_reported_on_the_bus() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let path = dir.path().join("notes.mkv");
        std::fs::write(&path, b"this is not a matroska file").expect("failed to write");
        let (link, mut bus_rx) = link_for(&path);

        run(link);

        assert!(matches!(bus_rx.try_recv(), Ok(BusMessage::Error { .. })));
    }
}
