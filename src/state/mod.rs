//! Application state
//!
//! `App` is the central structure the binary drives: it owns the
//! configuration, the speech dispatcher built from it, and the quiz as it
//! progresses.

pub mod config;

use crate::quiz::{self, Effect, Question, QuestionBank, QuizEvent, QuizState};
use crate::speech::{
    AudioOutput, AvailabilityProbe, OnDeviceSynthesizer, PlaybackController, RemoteSpeechClient,
    SpeechDispatcher,
};
use crate::ui::ErrorSurface;
use crate::Result;
use config::Config;
use log::{info, warn};
use std::sync::Arc;

/// Build a dispatcher from configured endpoints and voice defaults
pub fn build_dispatcher(
    config: &Config,
    output: Arc<dyn AudioOutput>,
    device: OnDeviceSynthesizer,
    surface: ErrorSurface,
) -> Result<SpeechDispatcher> {
    let endpoints = config.endpoints()?;
    info!("Speech endpoints ({}):", endpoints.len());
    for endpoint in endpoints.iter() {
        info!("  {}", endpoint);
    }

    let client = RemoteSpeechClient::with_timeout(config.request_timeout());
    let playback = PlaybackController::new(output, device);

    Ok(SpeechDispatcher::new(endpoints, client, playback)
        .with_surface(surface)
        .with_default_options(config.speech_options()))
}

/// Everything the running quiz needs
pub struct App {
    /// Configuration loaded from ~/.quizvoice.cfg
    pub config: Config,

    pub bank: QuestionBank,

    /// Quiz progress; only replaced through `handle`
    quiz: QuizState,

    /// Shared so speech tasks can outlive the event that started them
    pub dispatcher: Arc<SpeechDispatcher>,
}

impl App {
    pub fn new(
        config: Config,
        output: Arc<dyn AudioOutput>,
        device: OnDeviceSynthesizer,
        surface: ErrorSurface,
    ) -> Result<Self> {
        info!("Configuration loaded from {:?}", config.path());
        info!("  Auto speak: {}", config.auto_speak());

        let dispatcher = build_dispatcher(&config, output, device, surface)?;

        let bank = match config.questions_path() {
            Some(path) => QuestionBank::load(&path).unwrap_or_else(|e| {
                warn!("Could not load questions from {:?}: {}", path, e);
                QuestionBank::default()
            }),
            None => QuestionBank::default(),
        };
        info!("Quiz initialized with {} questions", bank.len());

        let quiz = QuizState::new(config.auto_speak(), config.explanation_delay());

        Ok(Self {
            config,
            bank,
            quiz,
            dispatcher: Arc::new(dispatcher),
        })
    }

    pub fn quiz(&self) -> &QuizState {
        &self.quiz
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.bank.get(self.quiz.current)
    }

    /// Advance the quiz and return what the caller should carry out
    pub fn handle(&mut self, event: QuizEvent) -> Vec<Effect> {
        let (next, effects) = quiz::update(&self.quiz, &self.bank, event);
        self.quiz = next;
        effects
    }

    /// Probe for the configured status endpoint
    pub fn availability_probe(&self) -> Result<AvailabilityProbe> {
        Ok(AvailabilityProbe::new(self.config.status_url()?))
    }

    /// Save configuration to disk
    pub fn save_config(&self) -> Result<()> {
        self.config.save()
    }
}
