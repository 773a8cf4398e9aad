//! Single-session playback control
//!
//! At most one audio or on-device session sounds at any time. Starting a
//! new one stops the previous one first, and `stop` is safe to call at any
//! moment.

use super::device::OnDeviceSynthesizer;
use super::options::SpeechOptions;
use crate::error::SpeechResult;
use async_trait::async_trait;
use bytes::Bytes;
use log::debug;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;

/// How a playback attempt ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackOutcome {
    /// Audio played to its natural end
    Completed,
    /// Stopped early by `stop` or a newer request
    Interrupted,
}

/// Which backend owns the live session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    RemoteAudio,
    OnDevice,
}

/// Sink for server-rendered audio
///
/// `play` decodes `audio`, starts once buffered and settles exactly once.
/// It must return promptly with `Interrupted` after `cancel` fires, and must
/// release its decoder and output stream on every exit path.
#[async_trait]
pub trait AudioOutput: Send + Sync {
    async fn play(
        &self,
        audio: Bytes,
        volume: f32,
        cancel: CancellationToken,
    ) -> SpeechResult<PlaybackOutcome>;
}

struct PlaybackSession {
    id: u64,
    kind: SessionKind,
    cancel: CancellationToken,
}

/// Owner of the one live playback session
pub struct PlaybackController {
    output: Arc<dyn AudioOutput>,
    device: OnDeviceSynthesizer,
    session: Mutex<Option<PlaybackSession>>,
    next_id: AtomicU64,
    /// Set once the engine has been handed an utterance that may still sound
    device_used: AtomicBool,
}

/// Clears the session slot when a playback scope ends, unless a newer
/// session has already replaced it
struct SessionGuard<'a> {
    controller: &'a PlaybackController,
    id: u64,
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        let mut slot = self.controller.slot();
        if slot.as_ref().map(|s| s.id) == Some(self.id) {
            *slot = None;
            debug!("Playback session {} released", self.id);
        }
    }
}

impl PlaybackController {
    pub fn new(output: Arc<dyn AudioOutput>, device: OnDeviceSynthesizer) -> Self {
        Self {
            output,
            device,
            session: Mutex::new(None),
            next_id: AtomicU64::new(1),
            device_used: AtomicBool::new(false),
        }
    }

    pub fn device(&self) -> &OnDeviceSynthesizer {
        &self.device
    }

    fn slot(&self) -> MutexGuard<'_, Option<PlaybackSession>> {
        self.session.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Stop whatever is sounding. No-op when idle.
    ///
    /// The engine is silenced even when its session already ended: an
    /// utterance that never reported speaking can outlive the session.
    pub fn stop(&self) {
        let previous = self.slot().take();
        if let Some(session) = previous {
            debug!("Stopping playback session {} ({:?})", session.id, session.kind);
            session.cancel.cancel();
        }
        if self.device_used.swap(false, Ordering::AcqRel) {
            self.device.cancel();
        }
    }

    pub fn is_playing(&self) -> bool {
        self.slot().is_some()
    }

    pub fn active_kind(&self) -> Option<SessionKind> {
        self.slot().as_ref().map(|s| s.kind)
    }

    /// Replace any live session with a fresh one of `kind`
    fn begin(&self, kind: SessionKind, parent: &CancellationToken) -> (SessionGuard<'_>, CancellationToken) {
        self.stop();

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let cancel = parent.child_token();
        *self.slot() = Some(PlaybackSession {
            id,
            kind,
            cancel: cancel.clone(),
        });
        debug!("Playback session {} started ({:?})", id, kind);

        (SessionGuard { controller: self, id }, cancel)
    }

    /// Play server-rendered audio until it ends, fails or is stopped
    pub async fn play(
        &self,
        audio: Bytes,
        options: &SpeechOptions,
        parent: &CancellationToken,
    ) -> SpeechResult<PlaybackOutcome> {
        let (_guard, cancel) = self.begin(SessionKind::RemoteAudio, parent);
        self.output.play(audio, options.volume, cancel).await
    }

    /// Speak `text` with the on-device synthesizer as the live session
    pub async fn speak_on_device(
        &self,
        text: &str,
        options: &SpeechOptions,
        parent: &CancellationToken,
    ) -> SpeechResult<PlaybackOutcome> {
        let (_guard, cancel) = self.begin(SessionKind::OnDevice, parent);
        self.device_used.store(true, Ordering::Release);
        self.device.speak(text, options, &cancel).await
    }
}
