//! quizvoice main entry point
//!
//! Runs a quiz on the terminal. Each line typed is one command; quiz
//! transitions happen immediately and any speech they ask for runs as a
//! background task, so the quiz never waits on audio.

use log::{debug, error, info, warn};
use quizvoice::quiz::{Effect, QuizEvent};
use quizvoice::speech::backends::audio::RodioOutput;
use quizvoice::speech::OnDeviceSynthesizer;
use quizvoice::state::config::Config;
use quizvoice::state::App;
use quizvoice::ui::trigger::DEFAULT_CONTENT_ELEMENT;
use quizvoice::ui::{
    ContentTree, ErrorSurface, LoadingIndicator, Notice, Trigger, TriggerButton, TriggerState,
    TriggerView,
};
use quizvoice::Result;
use std::collections::HashMap;
use std::process;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::LocalSet;

const EXPLANATION_ELEMENT: &str = "explanationText";
const SPEAK_QUESTION: &str = "speakQuestion";
const SPEAK_EXPLANATION: &str = "speakExplanation";

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let debug_mode = args.iter().any(|arg| arg == "--debug" || arg == "-d");

    // Initialize logger
    if debug_mode {
        // Debug mode: write to quizvoice.log file
        use std::fs::OpenOptions;
        match OpenOptions::new()
            .create(true)
            .append(true)
            .open("quizvoice.log")
        {
            Ok(log_file) => {
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Debug)
                    .target(env_logger::Target::Pipe(Box::new(log_file)))
                    .init();
            }
            Err(e) => {
                eprintln!("Warning: Failed to open quizvoice.log for debug logging: {}", e);
                eprintln!("Continuing without file logging...");
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Warn)
                    .init();
            }
        }

        info!(
            "quizvoice version {} starting (debug mode, logging to quizvoice.log)",
            quizvoice::VERSION
        );
    } else {
        // Normal mode: warnings and errors to stderr, RUST_LOG may override
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Warn)
            .parse_default_env()
            .init();
    }

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Fatal error: could not start runtime: {}", e);
            process::exit(1);
        }
    };

    let local = LocalSet::new();
    if let Err(e) = local.block_on(&runtime, run(debug_mode)) {
        error!("Fatal error: {}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Prints speech failures beneath the quiz
struct InlineNotice;

impl Notice for InlineNotice {
    fn show(&self, message: &str) {
        println!("  ✗ Could not speak: {}", message);
    }
}

/// Last-resort alert, only wired up with --debug
struct DeveloperAlert;

impl Notice for DeveloperAlert {
    fn show(&self, message: &str) {
        eprintln!("[quizvoice debug] speech failure: {}", message);
    }
}

struct SpeakingIndicator;

impl LoadingIndicator for SpeakingIndicator {
    fn set_loading(&self, loading: bool) {
        debug!("Speaking indicator {}", if loading { "on" } else { "off" });
    }
}

struct TerminalTriggerView;

impl TriggerView for TerminalTriggerView {
    fn render(&self, trigger_id: &str, state: TriggerState) {
        match state {
            TriggerState::Loading => println!("  🔊 Speaking..."),
            TriggerState::Success => debug!("Trigger {} finished", trigger_id),
            TriggerState::Error => println!("  ✗ Speech unavailable"),
            TriggerState::Default => debug!("Trigger {} ready", trigger_id),
        }
    }
}

/// Text currently on screen, addressable by element id
#[derive(Default)]
struct Screen {
    elements: HashMap<String, String>,
}

impl Screen {
    fn set(&mut self, id: &str, text: impl Into<String>) {
        self.elements.insert(id.to_string(), text.into());
    }

    fn clear(&mut self, id: &str) {
        self.elements.remove(id);
    }
}

impl ContentTree for Screen {
    fn text_of(&self, id: &str) -> Option<String> {
        self.elements.get(id).cloned()
    }

    fn container_text(&self, trigger_id: &str) -> Option<String> {
        // Both triggers sit inside the question card
        match trigger_id {
            SPEAK_QUESTION | SPEAK_EXPLANATION => self.text_of(DEFAULT_CONTENT_ELEMENT),
            _ => None,
        }
    }
}

async fn run(debug_mode: bool) -> Result<()> {
    debug!("Initializing quizvoice");

    let config = Config::load()?;

    let mut surface = ErrorSurface::new()
        .with_inline(Arc::new(InlineNotice))
        .with_loading(Arc::new(SpeakingIndicator));
    if debug_mode {
        surface = surface.with_developer_alert(Arc::new(DeveloperAlert));
    }

    let device = OnDeviceSynthesizer::detect();
    let device_supported = device.is_supported();
    info!("On-device speech supported: {}", device_supported);

    let reset_after = config.trigger_reset();
    let mut app = App::new(config, Arc::new(RodioOutput::new()), device, surface)?;

    // Advisory only: speech still walks the whole chain when asked
    let availability = app
        .availability_probe()?
        .check(device_supported)
        .await;
    let affordance = availability.affordance();
    info!("Speech affordance: {:?}", affordance);

    let view: Arc<dyn TriggerView> = Arc::new(TerminalTriggerView);
    let speak_question = Arc::new(
        TriggerButton::new(
            Trigger::new(SPEAK_QUESTION).with_target(DEFAULT_CONTENT_ELEMENT),
            view.clone(),
        )
        .with_reset_after(reset_after),
    );
    let speak_explanation = Arc::new(
        TriggerButton::new(
            Trigger::new(SPEAK_EXPLANATION).with_target(EXPLANATION_ELEMENT),
            view,
        )
        .with_reset_after(reset_after),
    );

    println!("quizvoice {}", quizvoice::VERSION);
    println!("Configuration loaded: {}", app.config.path().display());
    println!("Speech: {}", affordance.hint);
    print_help();

    let mut screen = Screen::default();
    let effects = app.handle(QuizEvent::Start);
    apply_effects(&app, &mut screen, effects);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = line.trim().to_lowercase();
        let event = match command.as_str() {
            "" => continue,
            "q" | "quit" => break,
            "h" | "help" | "?" => {
                print_help();
                continue;
            }
            "x" | "stop" => {
                app.dispatcher.stop();
                continue;
            }
            "s" | "e" => {
                let button = if command == "s" {
                    &speak_question
                } else {
                    &speak_explanation
                };
                if !affordance.enabled {
                    println!("  {}", affordance.hint);
                    continue;
                }
                let text = button.resolve(&screen);
                let button = button.clone();
                let dispatcher = app.dispatcher.clone();
                tokio::task::spawn_local(async move {
                    button.activate(&dispatcher, text).await;
                });
                continue;
            }
            "n" | "next" => QuizEvent::Next,
            "r" | "retry" => QuizEvent::Retry,
            "a" | "auto" => QuizEvent::ToggleAutoSpeak,
            "restart" => QuizEvent::Start,
            other => match other.parse::<usize>() {
                Ok(n) if n >= 1 => QuizEvent::Answer(n - 1),
                _ => {
                    println!("  Unknown command '{}', type h for help", other);
                    continue;
                }
            },
        };

        let effects = app.handle(event);
        if event == QuizEvent::ToggleAutoSpeak {
            let auto_speak = app.quiz().auto_speak;
            println!("  Auto speak {}", if auto_speak { "on" } else { "off" });
            app.config
                .set("quiz", "auto_speak", if auto_speak { "true" } else { "false" });
            if let Err(e) = app.save_config() {
                warn!("Could not save config: {}", e);
            }
        }
        apply_effects(&app, &mut screen, effects);
    }

    app.dispatcher.stop();
    info!("quizvoice exiting");
    Ok(())
}

fn print_help() {
    println!("Commands: 1-4 answer, s speak question, e speak explanation,");
    println!("          n next, r retry, a toggle auto speak, x stop speech,");
    println!("          restart, q quit");
}

fn apply_effects(app: &App, screen: &mut Screen, effects: Vec<Effect>) {
    for effect in effects {
        match effect {
            Effect::ShowQuestion(index) => {
                let Some(question) = app.bank.get(index) else {
                    continue;
                };
                screen.set(DEFAULT_CONTENT_ELEMENT, question.question.as_str());
                screen.clear(EXPLANATION_ELEMENT);

                let quiz = app.quiz();
                println!();
                println!(
                    "Question {} of {} [{}]  score {}/{}  streak {}  level {}",
                    index + 1,
                    app.bank.len(),
                    question.difficulty,
                    quiz.correct,
                    quiz.answered_total,
                    quiz.streak,
                    quiz.difficulty
                );
                println!("{}", question.question);
                for (i, option) in question.options.iter().enumerate() {
                    println!("  {}. {}", i + 1, option);
                }
            }
            Effect::ShowResult {
                selected,
                correct_index,
            } => {
                if selected == correct_index {
                    println!("  ✓ Correct!");
                } else {
                    println!("  ✗ Not quite.");
                }
                println!("  (n next, r retry)");
            }
            Effect::ShowExplanation {
                explanation,
                correct_answer,
            } => {
                println!("  {}", explanation);
                println!("  The correct answer is: {}", correct_answer);
                screen.set(EXPLANATION_ELEMENT, explanation);
            }
            Effect::Speak(text) => speak_later(app, Duration::ZERO, text),
            Effect::SpeakAfter(delay, text) => speak_later(app, delay, text),
            Effect::Completed(summary) => {
                let message = quizvoice::quiz::performance_message(summary.percentage());
                screen.set(DEFAULT_CONTENT_ELEMENT, summary.spoken());
                println!();
                println!("🎉 Congratulations! 🎉");
                println!("You've completed the quiz!");
                println!(
                    "Your score: {}/{} ({}%)",
                    summary.correct,
                    summary.total,
                    summary.percentage()
                );
                println!("{}", message);
                println!("(restart to play again, q to quit)");
            }
        }
    }
}

/// Fire-and-forget speech; failures were already surfaced by the dispatcher
fn speak_later(app: &App, delay: Duration, text: String) {
    let dispatcher = app.dispatcher.clone();
    tokio::task::spawn_local(async move {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if let Err(e) = dispatcher.speak_default(&text).await {
            debug!("Background speech ended with error: {}", e);
        }
    });
}
