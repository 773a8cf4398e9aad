//! Shared fakes for integration tests
//!
//! Stand-ins for the audio device and the platform synthesizer so the
//! fallback chain can be exercised without speakers.

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use quizvoice::speech::{
    AudioOutput, EndpointList, OnDeviceSynthesizer, PlaybackController, PlaybackOutcome,
    RemoteSpeechClient, SpeechDispatcher, SpeechEngine, UtteranceParams, VoiceInfo,
};
use quizvoice::ui::{ErrorSurface, LoadingIndicator, Notice};
use quizvoice::SpeechError;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Audio bytes `FakeOutput` refuses to decode
pub const UNDECODABLE: &[u8] = b"not audio";

/// Records what it was asked to play and "plays" for a fixed time
pub struct FakeOutput {
    duration: Duration,
    pub played: Mutex<Vec<(Bytes, f32)>>,
    pub interrupted: Mutex<u32>,
}

impl FakeOutput {
    pub fn new(duration: Duration) -> Arc<Self> {
        Arc::new(Self {
            duration,
            played: Mutex::new(Vec::new()),
            interrupted: Mutex::new(0),
        })
    }

    pub fn play_count(&self) -> usize {
        self.played.lock().unwrap().len()
    }

    pub fn interrupted_count(&self) -> u32 {
        *self.interrupted.lock().unwrap()
    }
}

#[async_trait]
impl AudioOutput for FakeOutput {
    async fn play(
        &self,
        audio: Bytes,
        volume: f32,
        cancel: CancellationToken,
    ) -> Result<PlaybackOutcome, SpeechError> {
        self.played.lock().unwrap().push((audio.clone(), volume));
        if audio.as_ref() == UNDECODABLE {
            return Err(SpeechError::Playback("Failed to decode audio".into()));
        }

        tokio::select! {
            _ = cancel.cancelled() => {
                *self.interrupted.lock().unwrap() += 1;
                Ok(PlaybackOutcome::Interrupted)
            }
            _ = tokio::time::sleep(self.duration) => Ok(PlaybackOutcome::Completed),
        }
    }
}

/// Synthesizer that finishes instantly and remembers what it said
///
/// With a speaking window it instead reports `is_speaking` only between
/// `from` and `to` after `speak`, like a slow-starting platform engine.
pub struct FakeEngine {
    pub spoken: Arc<Mutex<Vec<String>>>,
    pub voices: Vec<VoiceInfo>,
    pub fail: bool,
    pub stops: Arc<Mutex<u32>>,
    speaking_window: Option<(Duration, Duration)>,
    started: Option<Instant>,
}

impl FakeEngine {
    pub fn new() -> (Self, Arc<Mutex<Vec<String>>>) {
        let spoken = Arc::new(Mutex::new(Vec::new()));
        let engine = Self {
            spoken: spoken.clone(),
            voices: vec![
                VoiceInfo::new("Microsoft Zira", "en-US"),
                VoiceInfo::new("Thomas", "fr-FR"),
            ],
            fail: false,
            stops: Arc::new(Mutex::new(0)),
            speaking_window: None,
            started: None,
        };
        (engine, spoken)
    }

    pub fn with_speaking_window(mut self, from: Duration, to: Duration) -> Self {
        self.speaking_window = Some((from, to));
        self
    }

    pub fn failing() -> (Self, Arc<Mutex<Vec<String>>>) {
        let (mut engine, spoken) = Self::new();
        engine.fail = true;
        (engine, spoken)
    }
}

impl SpeechEngine for FakeEngine {
    fn voices(&self) -> Result<Vec<VoiceInfo>, SpeechError> {
        Ok(self.voices.clone())
    }

    fn speak(
        &mut self,
        text: &str,
        _params: &UtteranceParams,
        _voice: Option<&VoiceInfo>,
    ) -> Result<(), SpeechError> {
        if self.fail {
            return Err(SpeechError::Synthesis("synthesis-failed".into()));
        }
        self.spoken.lock().unwrap().push(text.to_string());
        self.started = Some(Instant::now());
        Ok(())
    }

    fn is_speaking(&self) -> Result<bool, SpeechError> {
        Ok(match (self.speaking_window, self.started) {
            (Some((from, to)), Some(started)) => {
                let elapsed = started.elapsed();
                elapsed >= from && elapsed < to
            }
            _ => false,
        })
    }

    fn stop(&mut self) -> Result<(), SpeechError> {
        *self.stops.lock().unwrap() += 1;
        self.started = None;
        Ok(())
    }
}

/// Notice that keeps every message it was asked to show
#[derive(Default)]
pub struct RecordingNotice {
    pub messages: Mutex<Vec<String>>,
}

impl RecordingNotice {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Notice for RecordingNotice {
    fn show(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

/// Loading indicator that records every state change
#[derive(Default)]
pub struct RecordingIndicator {
    pub states: Mutex<Vec<bool>>,
}

impl RecordingIndicator {
    pub fn states(&self) -> Vec<bool> {
        self.states.lock().unwrap().clone()
    }
}

impl LoadingIndicator for RecordingIndicator {
    fn set_loading(&self, loading: bool) {
        self.states.lock().unwrap().push(loading);
    }
}

/// Endpoints `paths` resolved against a mock server
pub fn endpoints(base: &str, paths: &[&str]) -> EndpointList {
    let secondaries: Vec<String> = paths[1..].iter().map(|p| p.to_string()).collect();
    EndpointList::from_paths(base, paths[0], &secondaries).unwrap()
}

pub fn dispatcher(
    endpoints: EndpointList,
    output: Arc<FakeOutput>,
    device: OnDeviceSynthesizer,
    surface: ErrorSurface,
) -> SpeechDispatcher {
    let playback = PlaybackController::new(output, device);
    SpeechDispatcher::new(
        endpoints,
        RemoteSpeechClient::with_timeout(Duration::from_secs(2)),
        playback,
    )
    .with_surface(surface)
}
