//! Native on-device engine using the tts crate
//!
//! The `tts` crate provides a unified interface to:
//! - Speech Dispatcher on Linux
//! - AVFoundation on macOS/iOS
//! - WinRT/SAPI on Windows

use crate::error::{SpeechError, SpeechResult};
use crate::speech::synth::{SpeechEngine, UtteranceParams, VoiceInfo};
use log::{debug, error, warn};
use tts::{Features, Tts as TtsCrate, Voice};

/// Native speech engine backed by the tts crate
pub struct NativeEngine {
    tts: TtsCrate,

    /// Capabilities reported by the platform backend
    features: Features,

    /// Platform voice handles, kept so a `VoiceInfo` can be mapped back
    voices: Vec<Voice>,
}

impl NativeEngine {
    pub fn new() -> SpeechResult<Self> {
        debug!("Creating native speech engine");

        let tts = TtsCrate::default()
            .map_err(|e| SpeechError::Synthesis(format!("Failed to initialize TTS: {}", e)))?;
        let features = tts.supported_features();

        debug!("Native speech engine created");

        Ok(Self {
            tts,
            features,
            voices: Vec::new(),
        })
    }

    /// Scale a web-style multiplier onto the platform's range around `normal`
    fn scale_around(normal: f32, min: f32, max: f32, factor: f32) -> f32 {
        (normal * factor).clamp(min, max)
    }

    /// Map a 0.0..=1.0 fraction onto the platform's volume range
    fn scale_fraction(min: f32, max: f32, fraction: f32) -> f32 {
        min + (max - min) * fraction.clamp(0.0, 1.0)
    }

    fn apply_params(&mut self, params: &UtteranceParams) -> SpeechResult<()> {
        if self.features.rate {
            let rate = Self::scale_around(
                self.tts.normal_rate(),
                self.tts.min_rate(),
                self.tts.max_rate(),
                params.rate,
            );
            self.tts
                .set_rate(rate)
                .map_err(|e| SpeechError::Synthesis(format!("Failed to set rate: {}", e)))?;
        } else {
            warn!("Rate control not supported on this platform");
        }

        if self.features.pitch {
            let pitch = Self::scale_around(
                self.tts.normal_pitch(),
                self.tts.min_pitch(),
                self.tts.max_pitch(),
                params.pitch,
            );
            self.tts
                .set_pitch(pitch)
                .map_err(|e| SpeechError::Synthesis(format!("Failed to set pitch: {}", e)))?;
        }

        if self.features.volume {
            let volume =
                Self::scale_fraction(self.tts.min_volume(), self.tts.max_volume(), params.volume);
            self.tts
                .set_volume(volume)
                .map_err(|e| SpeechError::Synthesis(format!("Failed to set volume: {}", e)))?;
        }

        Ok(())
    }

    fn apply_voice(&mut self, voice: &VoiceInfo) -> SpeechResult<()> {
        if !self.features.voice {
            return Ok(());
        }
        match self.voices.iter().find(|v| v.id() == voice.id) {
            Some(handle) => {
                debug!("Selecting voice: {}", voice.name);
                self.tts
                    .set_voice(handle)
                    .map_err(|e| SpeechError::Synthesis(format!("Failed to set voice: {}", e)))
            }
            None => {
                warn!("Voice {} is no longer offered by the platform", voice.name);
                Ok(())
            }
        }
    }
}

impl SpeechEngine for NativeEngine {
    fn voices(&self) -> SpeechResult<Vec<VoiceInfo>> {
        if !self.features.voice {
            return Ok(Vec::new());
        }
        let voices = self
            .tts
            .voices()
            .map_err(|e| SpeechError::Synthesis(format!("Failed to get voices: {}", e)))?;

        Ok(voices
            .iter()
            .map(|v| VoiceInfo {
                id: v.id(),
                name: v.name(),
                lang: v.language().to_string(),
            })
            .collect())
    }

    fn lists_voices(&self) -> bool {
        self.features.voice
    }

    fn speak(
        &mut self,
        text: &str,
        params: &UtteranceParams,
        voice: Option<&VoiceInfo>,
    ) -> SpeechResult<()> {
        if text.is_empty() {
            return Ok(());
        }

        if voice.is_some() && self.voices.is_empty() && self.features.voice {
            self.voices = self
                .tts
                .voices()
                .map_err(|e| SpeechError::Synthesis(format!("Failed to get voices: {}", e)))?;
        }

        self.apply_params(params)?;
        if let Some(voice) = voice {
            self.apply_voice(voice)?;
        }

        debug!("Speaking: {}", text);
        self.tts.speak(text, true).map_err(|e| {
            error!("Failed to speak: {}", e);
            SpeechError::Synthesis(format!("Speak failed: {}", e))
        })?;

        Ok(())
    }

    fn is_speaking(&self) -> SpeechResult<bool> {
        // Without support we cannot observe the end; report idle
        if !self.features.is_speaking {
            return Ok(false);
        }
        self.tts
            .is_speaking()
            .map_err(|e| SpeechError::Synthesis(format!("Failed to query state: {}", e)))
    }

    fn stop(&mut self) -> SpeechResult<()> {
        if !self.features.stop {
            return Ok(());
        }
        debug!("Canceling speech");
        self.tts.stop().map_err(|e| {
            error!("Failed to cancel speech: {}", e);
            SpeechError::Synthesis(format!("Cancel failed: {}", e))
        })?;

        Ok(())
    }
}
