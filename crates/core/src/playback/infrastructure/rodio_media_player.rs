use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use rodio::{Decoder, OutputStream, Sink, Source};
use thiserror::Error;

use crate::playback::domain::media_player::MediaPlayer;

#[derive(Error, Debug)]
pub enum PlaybackError {
    #[error("Failed to decode audio: {0}")]
    Decode(#[from] rodio::decoder::DecoderError),
    #[error("No audio output device: {0}")]
    Output(#[from] rodio::StreamError),
    #[error("Failed to create audio sink: {0}")]
    Sink(#[from] rodio::PlayError),
    #[error("Audio contains no samples")]
    Empty,
}

/// Decoded PCM for a whole lesson.
pub struct DecodedAudio {
    channels: u16,
    sample_rate: u32,
    samples: Arc<[f32]>,
}

impl DecodedAudio {
    pub fn decode(bytes: Vec<u8>) -> Result<Self, PlaybackError> {
        let source = Decoder::new(Cursor::new(bytes))?.convert_samples::<f32>();
        let channels = source.channels();
        let sample_rate = source.sample_rate();
        let samples: Vec<f32> = source.collect();
        if samples.is_empty() || channels == 0 || sample_rate == 0 {
            return Err(PlaybackError::Empty);
        }
        log::info!(
            "Decoded {} samples ({} ch @ {} Hz)",
            samples.len(),
            channels,
            sample_rate
        );
        Ok(Self {
            channels,
            sample_rate,
            samples: samples.into(),
        })
    }

    /// Playback source over the shared samples from `position` on.
    fn source_from(&self, position: f64) -> SharedSamples {
        SharedSamples {
            samples: Arc::clone(&self.samples),
            cursor: self.sample_index(position),
            channels: self.channels,
            sample_rate: self.sample_rate,
        }
    }

    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 / (self.channels as f64 * self.sample_rate as f64)
    }

    fn sample_index(&self, position: f64) -> usize {
        let frame = (position * self.sample_rate as f64) as usize;
        (frame * self.channels as usize).min(self.samples.len())
    }
}

/// Reads decoded samples in place; seeking only moves the cursor.
struct SharedSamples {
    samples: Arc<[f32]>,
    cursor: usize,
    channels: u16,
    sample_rate: u32,
}

impl Iterator for SharedSamples {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        let sample = self.samples.get(self.cursor).copied()?;
        self.cursor += 1;
        Some(sample)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.samples.len().saturating_sub(self.cursor);
        (remaining, Some(remaining))
    }
}

impl Source for SharedSamples {
    fn current_frame_len(&self) -> Option<usize> {
        Some(self.samples.len().saturating_sub(self.cursor))
    }

    fn channels(&self) -> u16 {
        self.channels
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        let frames = self.samples.len().saturating_sub(self.cursor) / self.channels as usize;
        Some(Duration::from_secs_f64(frames as f64 / self.sample_rate as f64))
    }
}

/// Speaker output through the default device.
///
/// Must be created and used on one thread; the output stream is not `Send`.
pub struct RodioMediaPlayer {
    _stream: OutputStream,
    sink: Sink,
    audio: DecodedAudio,
    /// Lesson position the queued buffer starts at.
    offset: f64,
}

impl RodioMediaPlayer {
    pub fn new(audio: DecodedAudio) -> Result<Self, PlaybackError> {
        let (stream, handle) = OutputStream::try_default()?;
        let sink = Sink::try_new(&handle)?;
        sink.pause();

        let mut player = Self {
            _stream: stream,
            sink,
            audio,
            offset: 0.0,
        };
        player.queue_from(0.0);
        Ok(player)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, PlaybackError> {
        Self::new(DecodedAudio::decode(bytes)?)
    }

    fn queue_from(&mut self, position: f64) {
        self.sink.clear();
        self.sink.append(self.audio.source_from(position));
        self.offset = position;
    }
}

impl MediaPlayer for RodioMediaPlayer {
    fn is_ready(&self) -> bool {
        true
    }

    fn duration(&self) -> Option<f64> {
        Some(self.audio.duration())
    }

    fn position(&self) -> Option<f64> {
        let duration = self.audio.duration();
        if self.sink.empty() {
            return Some(duration);
        }
        Some((self.offset + self.sink.get_pos().as_secs_f64()).min(duration))
    }

    fn is_playing(&self) -> bool {
        !self.sink.is_paused() && !self.sink.empty()
    }

    fn seek(&mut self, position: f64) {
        let was_playing = self.is_playing();
        let target = position.clamp(0.0, self.audio.duration());
        self.queue_from(target);
        if was_playing {
            self.sink.play();
        }
    }

    fn play(&mut self) {
        if self.sink.empty() {
            self.queue_from(0.0);
        }
        self.sink.play();
    }

    fn pause(&mut self) {
        self.sink.pause();
    }
}
