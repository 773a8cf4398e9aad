//! Application wiring tests
//!
//! Builds an `App` from a temporary config and drives the quiz through it.

mod common;

use common::FakeOutput;
use quizvoice::quiz::{Difficulty, Effect, QuizEvent};
use quizvoice::speech::OnDeviceSynthesizer;
use quizvoice::state::config::Config;
use quizvoice::state::App;
use quizvoice::ui::ErrorSurface;
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

fn app_with(config: Config) -> App {
    App::new(
        config,
        FakeOutput::new(Duration::from_millis(10)),
        OnDeviceSynthesizer::unsupported(),
        ErrorSurface::new(),
    )
    .expect("Failed to build app")
}

#[test]
fn test_builtin_quiz_run() {
    let dir = tempdir().unwrap();
    let mut app = app_with(Config::load_from(dir.path().join("q.cfg")).unwrap());

    assert_eq!(app.bank.len(), 5);
    assert_eq!(app.dispatcher.endpoints().len(), 4);

    let effects = app.handle(QuizEvent::Start);
    assert_eq!(effects[0], Effect::ShowQuestion(0));
    assert_eq!(
        app.current_question().map(|q| q.question.as_str()),
        Some("What is 2 + 2?")
    );

    let effects = app.handle(QuizEvent::Answer(1));
    assert!(effects.contains(&Effect::Speak("Correct! Well done!".to_string())));
    assert_eq!(app.quiz().correct, 1);

    app.handle(QuizEvent::Next);
    assert_eq!(app.quiz().current, 1);
}

#[test]
fn test_config_drives_quiz_settings() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("q.cfg");
    fs::write(
        &path,
        "[quiz]\nauto_speak = false\nexplanation_delay_ms = 1200\n",
    )
    .unwrap();

    let mut app = app_with(Config::load_from(&path).unwrap());
    assert!(!app.quiz().auto_speak);

    let effects = app.handle(QuizEvent::Start);
    assert_eq!(effects, vec![Effect::ShowQuestion(0)]);

    let effects = app.handle(QuizEvent::Answer(0));
    assert!(effects
        .iter()
        .any(|e| matches!(e, Effect::SpeakAfter(d, _) if *d == Duration::from_millis(1200))));
}

#[test]
fn test_question_file() {
    let dir = tempdir().unwrap();
    let questions = dir.path().join("questions.json");
    fs::write(
        &questions,
        r#"[{
            "id": 1,
            "question": "What is the capital of France?",
            "options": ["Paris", "Rome"],
            "correct_index": 0,
            "difficulty": "medium",
            "explanation": "Paris is the capital of France.",
            "correct_answer": "Paris"
        }]"#,
    )
    .unwrap();

    let path = dir.path().join("q.cfg");
    fs::write(&path, format!("[quiz]\nquestions = {}\n", questions.display())).unwrap();

    let mut app = app_with(Config::load_from(&path).unwrap());
    assert_eq!(app.bank.len(), 1);
    assert_eq!(app.bank.get(0).unwrap().difficulty, Difficulty::Medium);

    app.handle(QuizEvent::Start);
    app.handle(QuizEvent::Answer(0));
    let effects = app.handle(QuizEvent::Next);
    assert!(matches!(effects[0], Effect::Completed(summary) if summary.correct == 1));
}

#[test]
fn test_unreadable_question_file_uses_builtin() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("q.cfg");
    fs::write(&path, "[quiz]\nquestions = /nonexistent/quiz.json\n").unwrap();

    let app = app_with(Config::load_from(&path).unwrap());
    assert_eq!(app.bank.len(), 5);
}

#[test]
fn test_bad_server_url_fails_to_build() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("q.cfg");
    fs::write(&path, "[server]\nbase_url = nowhere\n").unwrap();

    let result = App::new(
        Config::load_from(&path).unwrap(),
        FakeOutput::new(Duration::from_millis(10)),
        OnDeviceSynthesizer::unsupported(),
        ErrorSurface::new(),
    );
    assert!(result.is_err());
}
