//! Speech parameters and validated requests

use super::sanitize::sanitize;
use crate::error::SpeechResult;
use serde::{Deserialize, Serialize};

pub const DEFAULT_RATE: f32 = 0.9;
pub const DEFAULT_PITCH: f32 = 1.0;
pub const DEFAULT_VOLUME: f32 = 0.8;
pub const DEFAULT_LANG: &str = "en-US";

/// Voice parameters for one utterance
///
/// Values use the web speech scale: `rate` and `pitch` are multipliers of
/// the backend's normal value, `volume` is a fraction in 0.0..=1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechOptions {
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
    pub lang: String,

    /// Exact platform voice name, overriding automatic voice selection
    #[serde(rename = "voice", default, skip_serializing_if = "Option::is_none")]
    pub voice_name: Option<String>,
}

impl Default for SpeechOptions {
    fn default() -> Self {
        Self {
            rate: DEFAULT_RATE,
            pitch: DEFAULT_PITCH,
            volume: DEFAULT_VOLUME,
            lang: DEFAULT_LANG.to_string(),
            voice_name: None,
        }
    }
}

impl SpeechOptions {
    pub fn with_voice(mut self, name: impl Into<String>) -> Self {
        self.voice_name = Some(name.into());
        self
    }

    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }
}

/// A sanitized piece of text ready to be sent to a backend
///
/// The text is never empty and never longer than the sanitizer's cap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeechRequest {
    pub text: String,
    #[serde(flatten)]
    pub options: SpeechOptions,
}

impl SpeechRequest {
    pub fn new(raw: &str, options: SpeechOptions) -> SpeechResult<Self> {
        Ok(Self {
            text: sanitize(raw)?,
            options,
        })
    }
}
