//! quizvoice - spoken multiple-choice quizzes
//!
//! Reads questions, feedback and explanations aloud through a chain of
//! remote speech endpoints, falling back to the platform's own speech
//! synthesizer when none of them can deliver audio.

pub mod error;
pub mod quiz;
pub mod speech;
pub mod state;
pub mod ui;

pub use error::{QuizVoiceError, Result, SpeechError};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = "quizvoice";
