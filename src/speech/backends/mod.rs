//! Platform-specific speech backends

// On-device synthesis using the tts crate (cross-platform)
pub mod native;

// Playback of server-rendered audio using rodio
pub mod audio;
