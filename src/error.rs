//! Error types for quizvoice

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Failures of the speech-output pipeline
///
/// Errors for which `is_endpoint_local` holds only advance the fallback
/// chain; the rest end the call.
#[derive(Error, Debug)]
pub enum SpeechError {
    #[error("Nothing to speak after sanitizing input")]
    EmptyInput,

    #[error("Request to {endpoint} timed out after {}ms", .after.as_millis())]
    Timeout { endpoint: String, after: Duration },

    #[error("{endpoint} responded with HTTP {status}")]
    RemoteStatus { endpoint: String, status: u16 },

    #[error("{endpoint} reported: {message}")]
    RemoteMessage { endpoint: String, message: String },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Audio playback failed: {0}")]
    Playback(String),

    #[error("On-device speech synthesis is not supported on this platform")]
    Unsupported,

    #[error("Speech synthesis failed: {0}")]
    Synthesis(String),

    #[error("Superseded by a newer speech request")]
    Interrupted,
}

impl SpeechError {
    /// True for errors that only concern a single remote endpoint
    pub fn is_endpoint_local(&self) -> bool {
        matches!(
            self,
            SpeechError::Timeout { .. }
                | SpeechError::RemoteStatus { .. }
                | SpeechError::RemoteMessage { .. }
                | SpeechError::Transport(_)
                | SpeechError::Playback(_)
        )
    }
}

/// Main error type for quizvoice
#[derive(Error, Debug)]
pub enum QuizVoiceError {
    #[error("Speech error: {0}")]
    Speech(#[from] SpeechError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("INI parse error: {0}")]
    IniParse(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for quizvoice operations
pub type Result<T> = std::result::Result<T, QuizVoiceError>;

/// Result type alias for the speech pipeline
pub type SpeechResult<T> = std::result::Result<T, SpeechError>;

impl From<String> for QuizVoiceError {
    fn from(s: String) -> Self {
        QuizVoiceError::Other(s)
    }
}

impl From<&str> for QuizVoiceError {
    fn from(s: &str) -> Self {
        QuizVoiceError::Other(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_local_errors() {
        let status = SpeechError::RemoteStatus {
            endpoint: "http://localhost/api/tts/".into(),
            status: 500,
        };
        assert!(status.is_endpoint_local());
        assert!(SpeechError::Playback("bad frame".into()).is_endpoint_local());
        assert!(!SpeechError::Unsupported.is_endpoint_local());
        assert!(!SpeechError::Synthesis("failed".into()).is_endpoint_local());
    }

    #[test]
    fn test_messages() {
        let timeout = SpeechError::Timeout {
            endpoint: "http://localhost/api/tts/".into(),
            after: Duration::from_millis(15_000),
        };
        assert_eq!(
            timeout.to_string(),
            "Request to http://localhost/api/tts/ timed out after 15000ms"
        );

        let wrapped: QuizVoiceError = SpeechError::Unsupported.into();
        assert!(matches!(wrapped, QuizVoiceError::Speech(SpeechError::Unsupported)));
    }
}
