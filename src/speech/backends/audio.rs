//! Audio output for server-rendered speech using rodio
//!
//! The output stream and decoder live on a blocking worker thread for the
//! duration of one playback and are dropped when it returns, whatever the
//! outcome.

use crate::error::{SpeechError, SpeechResult};
use crate::speech::playback::{AudioOutput, PlaybackOutcome};
use async_trait::async_trait;
use bytes::Bytes;
use log::debug;
use rodio::{Decoder, OutputStreamBuilder, Sink};
use std::io::Cursor;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// How often the worker checks for the end of playback or cancellation
const PLAYER_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Plays audio on the default output device
#[derive(Debug, Default, Clone, Copy)]
pub struct RodioOutput;

impl RodioOutput {
    pub fn new() -> Self {
        Self
    }
}

fn play_blocking(
    audio: Bytes,
    volume: f32,
    cancel: &CancellationToken,
) -> SpeechResult<PlaybackOutcome> {
    // Decode up front so a bad payload fails before the device is opened
    let source = Decoder::new(Cursor::new(audio))
        .map_err(|e| SpeechError::Playback(format!("Could not decode audio: {}", e)))?;

    let stream = OutputStreamBuilder::open_default_stream()
        .map_err(|e| SpeechError::Playback(format!("No audio output device: {}", e)))?;
    let sink = Sink::connect_new(stream.mixer());
    sink.set_volume(volume.clamp(0.0, 1.0));
    sink.append(source);

    while !sink.empty() {
        if cancel.is_cancelled() {
            sink.stop();
            debug!("Audio playback interrupted");
            return Ok(PlaybackOutcome::Interrupted);
        }
        std::thread::sleep(PLAYER_POLL_INTERVAL);
    }

    debug!("Audio playback finished");
    Ok(PlaybackOutcome::Completed)
}

#[async_trait]
impl AudioOutput for RodioOutput {
    async fn play(
        &self,
        audio: Bytes,
        volume: f32,
        cancel: CancellationToken,
    ) -> SpeechResult<PlaybackOutcome> {
        debug!("Playing {} bytes of audio", audio.len());
        tokio::task::spawn_blocking(move || play_blocking(audio, volume, &cancel))
            .await
            .map_err(|e| SpeechError::Playback(format!("Playback worker failed: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_garbage_audio_fails_to_decode() {
        let output = RodioOutput::new();
        let result = output
            .play(
                Bytes::from_static(b"definitely not audio"),
                0.8,
                CancellationToken::new(),
            )
            .await;
        assert!(matches!(result, Err(SpeechError::Playback(_))));
    }
}
