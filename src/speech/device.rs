//! On-device synthesis, the last-resort fallback
//!
//! Wraps a platform `SpeechEngine` as an awaitable operation: `speak`
//! resolves when the utterance stops sounding, fails on an engine error,
//! and reports `Interrupted` when cancelled.

use super::options::SpeechOptions;
use super::playback::PlaybackOutcome;
use super::synth::{SpeechEngine, UtteranceParams, VoiceInfo};
use crate::error::{SpeechError, SpeechResult};
use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::OnceCell;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Voice names preferred for natural-sounding speech, best first
pub const PREFERRED_VOICE_NAMES: &[&str] = &[
    "Aria", "Jenny", "Guy", "Zira", "David", "Mark", "Samantha", "Susan", "Alex", "Karen", "Moira",
];

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// How long an utterance may take to report that it started
const START_GRACE: Duration = Duration::from_millis(500);

/// How long to wait for the platform to publish its voice list
const VOICES_READY_TIMEOUT: Duration = Duration::from_secs(2);

/// Primary language subtag, e.g. "en" for "en-US" or "en_GB"
fn primary_subtag(tag: &str) -> &str {
    tag.split(['-', '_']).next().unwrap_or(tag)
}

/// Pick the voice for an utterance
///
/// An exact `voice_name` match wins. Otherwise voices are narrowed to the
/// requested language; with no match the platform's first voice is used.
/// Within the language a preferred name wins, then a female voice, then
/// the first one.
pub fn select_voice<'a>(voices: &'a [VoiceInfo], options: &SpeechOptions) -> Option<&'a VoiceInfo> {
    if let Some(name) = options.voice_name.as_deref() {
        if let Some(voice) = voices.iter().find(|v| v.name == name) {
            return Some(voice);
        }
        debug!("Requested voice {} not found, selecting automatically", name);
    }
    best_voice(voices, &options.lang)
}

fn best_voice<'a>(voices: &'a [VoiceInfo], lang: &str) -> Option<&'a VoiceInfo> {
    let wanted = primary_subtag(lang);
    let in_lang: Vec<&VoiceInfo> = voices
        .iter()
        .filter(|v| primary_subtag(&v.lang).eq_ignore_ascii_case(wanted))
        .collect();

    if in_lang.is_empty() {
        return voices.first();
    }

    for name in PREFERRED_VOICE_NAMES {
        if let Some(voice) = in_lang.iter().copied().find(|v| v.name.contains(*name)) {
            return Some(voice);
        }
    }

    if let Some(voice) = in_lang.iter().copied().find(|v| {
        let lower = v.name.to_lowercase();
        lower.contains("female") || lower.contains("woman")
    }) {
        return Some(voice);
    }

    in_lang.first().copied()
}

/// Platform speech synthesis as an async fallback
pub struct OnDeviceSynthesizer {
    engine: Option<Mutex<Box<dyn SpeechEngine>>>,
    voices: OnceCell<Vec<VoiceInfo>>,
    waited_for_voices: AtomicBool,
}

impl OnDeviceSynthesizer {
    pub fn new(engine: Box<dyn SpeechEngine>) -> Self {
        Self {
            engine: Some(Mutex::new(engine)),
            voices: OnceCell::new(),
            waited_for_voices: AtomicBool::new(false),
        }
    }

    /// A synthesizer for platforms without on-device speech
    pub fn unsupported() -> Self {
        Self {
            engine: None,
            voices: OnceCell::new(),
            waited_for_voices: AtomicBool::new(false),
        }
    }

    /// Use the platform engine if one can be created
    pub fn detect() -> Self {
        match super::synth::create_engine() {
            Some(engine) => Self::new(engine),
            None => Self::unsupported(),
        }
    }

    pub fn is_supported(&self) -> bool {
        self.engine.is_some()
    }

    fn lock(engine: &Mutex<Box<dyn SpeechEngine>>) -> MutexGuard<'_, Box<dyn SpeechEngine>> {
        engine.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Voices offered by the platform
    ///
    /// The first call waits up to `VOICES_READY_TIMEOUT` for the platform to
    /// publish a list; later calls only look once. Only a non-empty list is
    /// cached.
    pub async fn voices(&self) -> &[VoiceInfo] {
        let Some(engine) = self.engine.as_ref() else {
            return &[];
        };
        if let Some(voices) = self.voices.get() {
            return voices;
        }
        if !Self::lock(engine).lists_voices() {
            return &[];
        }

        let wait = if self.waited_for_voices.swap(true, Ordering::AcqRel) {
            Duration::ZERO
        } else {
            VOICES_READY_TIMEOUT
        };
        let deadline = Instant::now() + wait;
        loop {
            let listed = Self::lock(engine).voices();
            match listed {
                Ok(voices) if !voices.is_empty() => {
                    info!("🔊 Speech voices loaded: {}", voices.len());
                    let _ = self.voices.set(voices);
                    return self.voices.get().map(Vec::as_slice).unwrap_or(&[]);
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("Could not list speech voices: {}", e);
                    return &[];
                }
            }
            if Instant::now() >= deadline {
                warn!("No speech voices published, using platform default");
                return &[];
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Silence any in-flight utterance
    pub fn cancel(&self) {
        if let Some(engine) = self.engine.as_ref() {
            if let Err(e) = Self::lock(engine).stop() {
                warn!("Failed to cancel on-device speech: {}", e);
            }
        }
    }

    /// Speak `text` and wait for it to finish
    pub async fn speak(
        &self,
        text: &str,
        options: &SpeechOptions,
        cancel: &CancellationToken,
    ) -> SpeechResult<PlaybackOutcome> {
        let Some(engine) = self.engine.as_ref() else {
            return Err(SpeechError::Unsupported);
        };

        let voices = self.voices().await;
        let voice = select_voice(voices, options);
        let params = UtteranceParams {
            rate: options.rate,
            pitch: options.pitch,
            volume: options.volume,
        };

        if cancel.is_cancelled() {
            return Ok(PlaybackOutcome::Interrupted);
        }

        {
            let mut engine = Self::lock(engine);
            engine.stop()?;
            engine.speak(text, &params, voice)?;
        }
        info!(
            "🌐 On-device speech started{}",
            voice.map(|v| format!(" with {}", v.name)).unwrap_or_default()
        );

        let started = Instant::now();
        let mut heard = false;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    self.cancel();
                    return Ok(PlaybackOutcome::Interrupted);
                }
                _ = tokio::time::sleep(POLL_INTERVAL) => {}
            }

            let speaking = Self::lock(engine).is_speaking()?;
            if speaking {
                heard = true;
            } else if heard || started.elapsed() >= START_GRACE {
                debug!("On-device speech completed");
                return Ok(PlaybackOutcome::Completed);
            }
        }
    }
}
