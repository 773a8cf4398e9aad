//! Fallback-chained speech delivery
//!
//! `SpeechDispatcher::speak` is the one entry point UI code calls. It walks
//! the remote endpoints in declared order and falls back to on-device
//! synthesis; only when every backend has failed does the caller see an
//! error.

use super::options::{SpeechOptions, SpeechRequest};
use super::playback::{PlaybackController, PlaybackOutcome};
use super::remote::{RemoteOutcome, RemoteSpeechClient};
use crate::error::{QuizVoiceError, Result, SpeechError, SpeechResult};
use crate::ui::notice::ErrorSurface;
use log::{debug, info, warn};
use reqwest::Url;
use std::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;

/// Remote speech endpoints in fallback priority order
///
/// The primary comes first, then secondaries as declared. The order is
/// fixed once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointList {
    endpoints: Vec<Url>,
}

impl EndpointList {
    pub fn new(primary: Url, secondaries: impl IntoIterator<Item = Url>) -> Self {
        let mut endpoints = vec![primary];
        endpoints.extend(secondaries);
        Self { endpoints }
    }

    /// Resolve endpoint paths against a server base URL
    pub fn from_paths(base: &str, primary: &str, secondaries: &[String]) -> Result<Self> {
        let base = Url::parse(base)
            .map_err(|e| QuizVoiceError::Config(format!("Bad server URL {}: {}", base, e)))?;
        let join = |path: &str| {
            base.join(path)
                .map_err(|e| QuizVoiceError::Config(format!("Bad endpoint path {}: {}", path, e)))
        };

        let primary = join(primary)?;
        let secondaries = secondaries
            .iter()
            .map(|p| join(p.as_str()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(primary, secondaries))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Url> {
        self.endpoints.iter()
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

/// Orchestrates the fallback chain and owns the playback session
pub struct SpeechDispatcher {
    endpoints: EndpointList,
    client: RemoteSpeechClient,
    playback: PlaybackController,
    surface: ErrorSurface,
    defaults: RwLock<SpeechOptions>,

    /// Cancels the call currently in flight, if any
    current_call: Mutex<CancellationToken>,
}

impl SpeechDispatcher {
    pub fn new(endpoints: EndpointList, client: RemoteSpeechClient, playback: PlaybackController) -> Self {
        Self {
            endpoints,
            client,
            playback,
            surface: ErrorSurface::default(),
            defaults: RwLock::new(SpeechOptions::default()),
            current_call: Mutex::new(CancellationToken::new()),
        }
    }

    pub fn with_surface(mut self, surface: ErrorSurface) -> Self {
        self.surface = surface;
        self
    }

    pub fn with_default_options(self, options: SpeechOptions) -> Self {
        self.set_default_options(options);
        self
    }

    pub fn endpoints(&self) -> &EndpointList {
        &self.endpoints
    }

    pub fn playback(&self) -> &PlaybackController {
        &self.playback
    }

    pub fn default_options(&self) -> SpeechOptions {
        self.defaults
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn set_default_options(&self, options: SpeechOptions) {
        *self.defaults.write().unwrap_or_else(|e| e.into_inner()) = options;
    }

    pub fn is_playing(&self) -> bool {
        self.playback.is_playing()
    }

    /// Stop the current call and whatever it is playing
    pub fn stop(&self) {
        self.current_call
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .cancel();
        self.playback.stop();
        self.surface.set_loading(false);
    }

    /// Cancel the previous call and open a new one
    fn supersede(&self) -> CancellationToken {
        let token = CancellationToken::new();
        let previous = std::mem::replace(
            &mut *self.current_call.lock().unwrap_or_else(|e| e.into_inner()),
            token.clone(),
        );
        previous.cancel();
        self.playback.stop();
        token
    }

    /// Speak with the dispatcher's default options
    pub async fn speak_default(&self, raw: &str) -> SpeechResult<bool> {
        let options = self.default_options();
        self.speak(raw, &options).await
    }

    /// Speak `raw` through the first backend that works
    ///
    /// Returns `Ok(true)` when speech played to the end and `Ok(false)` when
    /// there was nothing to say or a newer call took over. `Err` means every
    /// backend failed; the error surface has already been notified.
    pub async fn speak(&self, raw: &str, options: &SpeechOptions) -> SpeechResult<bool> {
        if raw.trim().is_empty() {
            warn!("⚠️ No text provided for speech");
            return Ok(false);
        }

        let call = self.supersede();

        let request = match SpeechRequest::new(raw, options.clone()) {
            Ok(request) => request,
            Err(SpeechError::EmptyInput) => {
                warn!("⚠️ Nothing speakable left after sanitizing");
                return Ok(false);
            }
            Err(e) => return Err(e),
        };

        info!(
            "🎯 Speaking: \"{}\"",
            request.text.chars().take(50).collect::<String>()
        );

        self.surface.set_loading(true);
        let result = self.run_chain(&request, &call).await;
        // A superseding call owns the indicator now
        if !call.is_cancelled() {
            self.surface.set_loading(false);
        }

        match result {
            Ok(PlaybackOutcome::Completed) => Ok(true),
            Ok(PlaybackOutcome::Interrupted) | Err(SpeechError::Interrupted) => {
                debug!("Speech superseded before it finished");
                Ok(false)
            }
            Err(e) => {
                self.surface.report(&e.to_string());
                Err(e)
            }
        }
    }

    async fn run_chain(
        &self,
        request: &SpeechRequest,
        call: &CancellationToken,
    ) -> SpeechResult<PlaybackOutcome> {
        for endpoint in self.endpoints.iter() {
            match self.client.request_speech(endpoint, request, call).await {
                Ok(RemoteOutcome::Audio(audio)) => {
                    if call.is_cancelled() {
                        return Err(SpeechError::Interrupted);
                    }
                    match self.playback.play(audio, &request.options, call).await {
                        Ok(PlaybackOutcome::Completed) => {
                            info!("✅ Speech delivered by {}", endpoint);
                            return Ok(PlaybackOutcome::Completed);
                        }
                        Ok(PlaybackOutcome::Interrupted) => {
                            debug!("Audio from {} interrupted", endpoint);
                            return Ok(PlaybackOutcome::Interrupted);
                        }
                        Err(e) if e.is_endpoint_local() => {
                            warn!("❌ Audio from {} failed to play: {}", endpoint, e)
                        }
                        Err(e) => return Err(e),
                    }
                }
                Ok(RemoteOutcome::Fallback(instruction)) => {
                    info!("🌐 {} requested on-device speech", endpoint);
                    let text = instruction.text.unwrap_or_else(|| request.text.clone());
                    return self.speak_on_device(&text, request, call).await;
                }
                Err(e) if e.is_endpoint_local() => {
                    warn!("❌ Speech failed for {}: {}", endpoint, e)
                }
                Err(e) => return Err(e),
            }
        }

        info!("🌐 All remote speech options failed, trying on-device speech");
        self.speak_on_device(&request.text, request, call).await
    }

    async fn speak_on_device(
        &self,
        text: &str,
        request: &SpeechRequest,
        call: &CancellationToken,
    ) -> SpeechResult<PlaybackOutcome> {
        if call.is_cancelled() {
            return Err(SpeechError::Interrupted);
        }
        self.playback
            .speak_on_device(text, &request.options, call)
            .await
    }
}
