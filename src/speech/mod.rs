//! Speech output: sanitizing, remote endpoints, playback and the
//! on-device fallback

pub mod availability;
pub mod backends;
pub mod device;
pub mod dispatcher;
pub mod options;
pub mod playback;
pub mod remote;
pub mod sanitize;
pub mod synth;

pub use availability::{AvailabilityProbe, AvailabilityState};
pub use device::OnDeviceSynthesizer;
pub use dispatcher::{EndpointList, SpeechDispatcher};
pub use options::{SpeechOptions, SpeechRequest};
pub use playback::{AudioOutput, PlaybackController, PlaybackOutcome, SessionKind};
pub use remote::{FallbackInstruction, RemoteOutcome, RemoteSpeechClient};
pub use sanitize::sanitize;
pub use synth::{create_engine, SpeechEngine, UtteranceParams, VoiceInfo};
