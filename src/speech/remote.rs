//! Client for one remote speech endpoint
//!
//! A request either yields audio bytes for playback or a JSON instruction
//! telling the caller to use on-device speech instead. Responses are
//! decoded into `RemoteOutcome` here and nowhere else.

use super::options::SpeechRequest;
use crate::error::{SpeechError, SpeechResult};
use bytes::Bytes;
use log::debug;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Per-endpoint ceiling on a speech request
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(15_000);

/// Server instruction to speak on-device rather than play audio
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FallbackInstruction {
    #[serde(rename = "useOnDeviceSpeech", alias = "use_browser_tts", default)]
    pub use_on_device_speech: bool,

    /// Text to speak, possibly rewritten by the server
    #[serde(default)]
    pub text: Option<String>,

    #[serde(default)]
    pub error: Option<String>,
}

/// What a successful endpoint call produced
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteOutcome {
    Audio(Bytes),
    Fallback(FallbackInstruction),
}

/// Sends speech requests to remote endpoints
#[derive(Debug, Clone)]
pub struct RemoteSpeechClient {
    http: Client,
    timeout: Duration,
}

impl Default for RemoteSpeechClient {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteSpeechClient {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            http: Client::new(),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Request speech for `request` from `endpoint`
    ///
    /// Fails with `Timeout` when the endpoint is slower than the configured
    /// ceiling and with `Interrupted` when `cancel` fires first. Dropping the
    /// in-flight future aborts the HTTP request in both cases.
    pub async fn request_speech(
        &self,
        endpoint: &Url,
        request: &SpeechRequest,
        cancel: &CancellationToken,
    ) -> SpeechResult<RemoteOutcome> {
        debug!("POST {} ({} chars)", endpoint, request.text.len());

        tokio::select! {
            _ = cancel.cancelled() => Err(SpeechError::Interrupted),
            result = tokio::time::timeout(self.timeout, self.exchange(endpoint, request)) => {
                match result {
                    Ok(outcome) => outcome,
                    Err(_) => Err(SpeechError::Timeout {
                        endpoint: endpoint.to_string(),
                        after: self.timeout,
                    }),
                }
            }
        }
    }

    async fn exchange(&self, endpoint: &Url, request: &SpeechRequest) -> SpeechResult<RemoteOutcome> {
        let response = self
            .http
            .post(endpoint.clone())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SpeechError::RemoteStatus {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.contains("application/json"))
            .unwrap_or(false);

        if !is_json {
            let audio = response.bytes().await?;
            debug!("{} returned {} bytes of audio", endpoint, audio.len());
            return Ok(RemoteOutcome::Audio(audio));
        }

        let body = response.bytes().await?;
        let instruction: FallbackInstruction =
            serde_json::from_slice(&body).map_err(|e| SpeechError::RemoteMessage {
                endpoint: endpoint.to_string(),
                message: format!("Malformed JSON response: {}", e),
            })?;

        if instruction.use_on_device_speech {
            let text = instruction
                .text
                .clone()
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| request.text.clone());
            debug!("{} asked for on-device speech", endpoint);
            return Ok(RemoteOutcome::Fallback(FallbackInstruction {
                text: Some(text),
                ..instruction
            }));
        }

        Err(SpeechError::RemoteMessage {
            endpoint: endpoint.to_string(),
            message: instruction
                .error
                .unwrap_or_else(|| "Unknown error".to_string()),
        })
    }
}
