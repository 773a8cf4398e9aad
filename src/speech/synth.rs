//! On-device speech engine abstraction
//!
//! The platform synthesizer sits behind `SpeechEngine` so the fallback
//! logic can run against a deterministic engine in tests.

use crate::error::SpeechResult;
use log::info;

/// A platform voice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceInfo {
    /// Backend-specific identifier
    pub id: String,
    /// Human-readable name, e.g. "Microsoft Zira"
    pub name: String,
    /// Language tag, e.g. "en-US"
    pub lang: String,
}

impl VoiceInfo {
    pub fn new(name: impl Into<String>, lang: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            name,
            lang: lang.into(),
        }
    }
}

/// Engine-ready parameters for one utterance
///
/// Same scale as `SpeechOptions`; engines map them onto their own ranges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UtteranceParams {
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

/// Platform speech synthesizer
///
/// Calls are short and non-blocking: `speak` queues an utterance and
/// completion is observed through `is_speaking`.
pub trait SpeechEngine: Send {
    /// Voices currently known to the platform (may be empty until loaded)
    fn voices(&self) -> SpeechResult<Vec<VoiceInfo>>;

    /// Whether `voices` can ever return anything on this platform
    fn lists_voices(&self) -> bool {
        true
    }

    /// Start speaking `text`, replacing anything in flight
    fn speak(
        &mut self,
        text: &str,
        params: &UtteranceParams,
        voice: Option<&VoiceInfo>,
    ) -> SpeechResult<()>;

    /// Whether an utterance is still sounding
    fn is_speaking(&self) -> SpeechResult<bool>;

    /// Cancel/silence current speech
    fn stop(&mut self) -> SpeechResult<()>;
}

/// Create the platform's speech engine, if it has one
///
/// `None` means on-device synthesis is unsupported here; the dispatcher
/// then has no last-resort fallback.
pub fn create_engine() -> Option<Box<dyn SpeechEngine>> {
    use super::backends::native::NativeEngine;

    let platform = std::env::consts::OS;
    match NativeEngine::new() {
        Ok(engine) => {
            info!("✓ Native speech engine initialized for {}", platform);
            Some(Box::new(engine))
        }
        Err(e) => {
            info!("✗ Native speech engine unavailable on {}: {}", platform, e);
            if platform == "linux" {
                info!("To install: sudo apt install speech-dispatcher");
            }
            None
        }
    }
}
