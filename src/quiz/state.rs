//! Quiz progress as an explicit value
//!
//! `update` is the only way the quiz moves forward. It never touches
//! speech or the screen itself; it returns `Effect`s for the caller to
//! carry out, so speech outcomes can never stall or alter the quiz.

use super::bank::{Difficulty, QuestionBank};
use log::{debug, info};
use std::time::Duration;

/// Streak length that raises the difficulty
pub const STREAK_TO_LEVEL_UP: u32 = 3;

/// Delay before the explanation is read, so the explanation panel is up first
pub const EXPLANATION_DELAY: Duration = Duration::from_millis(500);

pub const CORRECT_PHRASE: &str = "Correct! Well done!";
pub const INCORRECT_PHRASE: &str = "Oops! Let me explain.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizEvent {
    Start,
    Answer(usize),
    Next,
    Retry,
    ToggleAutoSpeak,
}

/// Final score of a finished quiz
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionSummary {
    pub correct: u32,
    pub total: u32,
}

impl CompletionSummary {
    /// Score as a whole percentage, 0 when nothing was answered
    pub fn percentage(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        (f64::from(self.correct) * 100.0 / f64::from(self.total)).round() as u32
    }

    pub fn spoken(&self) -> String {
        format!(
            "Congratulations! You scored {} out of {}. {}",
            self.correct,
            self.total,
            performance_message(self.percentage())
        )
    }
}

/// What the caller should do after a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Display the question at this index
    ShowQuestion(usize),
    /// Mark the chosen option and the right one
    ShowResult { selected: usize, correct_index: usize },
    ShowExplanation { explanation: String, correct_answer: String },
    Speak(String),
    SpeakAfter(Duration, String),
    Completed(CompletionSummary),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizState {
    /// Index of the question on screen
    pub current: usize,
    pub correct: u32,
    /// Every answer given, retries included
    pub answered_total: u32,
    pub streak: u32,
    pub difficulty: Difficulty,
    /// The current question has been answered
    pub answered: bool,
    pub selected: Option<usize>,
    pub auto_speak: bool,
    pub started: bool,
    pub explanation_delay: Duration,
}

impl Default for QuizState {
    fn default() -> Self {
        Self {
            current: 0,
            correct: 0,
            answered_total: 0,
            streak: 0,
            difficulty: Difficulty::Easy,
            answered: false,
            selected: None,
            auto_speak: true,
            started: false,
            explanation_delay: EXPLANATION_DELAY,
        }
    }
}

impl QuizState {
    pub fn new(auto_speak: bool, explanation_delay: Duration) -> Self {
        Self {
            auto_speak,
            explanation_delay,
            ..Default::default()
        }
    }

    pub fn is_complete(&self, bank: &QuestionBank) -> bool {
        self.started && self.current >= bank.len()
    }

    pub fn summary(&self) -> CompletionSummary {
        CompletionSummary {
            correct: self.correct,
            total: self.answered_total,
        }
    }
}

/// Spoken feedback for a final percentage
pub fn performance_message(percentage: u32) -> &'static str {
    match percentage {
        90.. => "Outstanding performance!",
        80..=89 => "Great job! Keep up the excellent work!",
        70..=79 => "Good work! You're learning well!",
        60..=69 => "Nice effort! Keep practicing!",
        _ => "Keep learning and trying your best!",
    }
}

/// Apply `event` to `state`
///
/// Events that make no sense in the current state (answering twice,
/// moving on before answering) leave the state unchanged and produce no
/// effects.
pub fn update(state: &QuizState, bank: &QuestionBank, event: QuizEvent) -> (QuizState, Vec<Effect>) {
    let mut next = state.clone();
    let mut effects = Vec::new();

    match event {
        QuizEvent::Start => {
            next = QuizState {
                started: true,
                ..QuizState::new(state.auto_speak, state.explanation_delay)
            };
            load_question(&mut next, bank, &mut effects);
        }
        QuizEvent::Answer(choice) => {
            let Some(question) = bank.get(state.current) else {
                return (next, effects);
            };
            if !state.started || state.answered || choice >= question.options.len() {
                debug!("Ignoring answer {} in current state", choice);
                return (next, effects);
            }

            next.answered = true;
            next.selected = Some(choice);
            next.answered_total += 1;
            effects.push(Effect::ShowResult {
                selected: choice,
                correct_index: question.correct_index,
            });

            if question.is_correct(choice) {
                next.correct += 1;
                next.streak += 1;
                effects.push(Effect::Speak(CORRECT_PHRASE.to_string()));
                if next.streak >= STREAK_TO_LEVEL_UP {
                    next.difficulty = next.difficulty.raised();
                }
            } else {
                next.streak = 0;
                effects.push(Effect::Speak(INCORRECT_PHRASE.to_string()));
                effects.push(Effect::ShowExplanation {
                    explanation: question.explanation.clone(),
                    correct_answer: question.correct_answer.clone(),
                });
                effects.push(Effect::SpeakAfter(
                    state.explanation_delay,
                    question.explanation.clone(),
                ));
                next.difficulty = next.difficulty.lowered();
            }

            if next.difficulty != state.difficulty {
                info!(
                    "Difficulty adapted from {} to {}",
                    state.difficulty, next.difficulty
                );
            }
        }
        QuizEvent::Next => {
            if !state.answered {
                return (next, effects);
            }
            next.current += 1;
            load_question(&mut next, bank, &mut effects);
        }
        QuizEvent::Retry => {
            if !state.answered {
                return (next, effects);
            }
            load_question(&mut next, bank, &mut effects);
        }
        QuizEvent::ToggleAutoSpeak => {
            next.auto_speak = !state.auto_speak;
        }
    }

    (next, effects)
}

fn load_question(state: &mut QuizState, bank: &QuestionBank, effects: &mut Vec<Effect>) {
    state.answered = false;
    state.selected = None;

    match bank.get(state.current) {
        Some(question) => {
            debug!("Loading question {}: {}", state.current + 1, question.question);
            effects.push(Effect::ShowQuestion(state.current));
            if state.auto_speak {
                effects.push(Effect::Speak(question.question.clone()));
            }
        }
        None => {
            let summary = state.summary();
            info!(
                "Quiz completed! Score: {} / {}",
                summary.correct, summary.total
            );
            effects.push(Effect::Completed(summary));
            effects.push(Effect::Speak(summary.spoken()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started(bank: &QuestionBank) -> QuizState {
        update(&QuizState::default(), bank, QuizEvent::Start).0
    }

    fn answer_and_next(state: QuizState, bank: &QuestionBank, correct: bool) -> QuizState {
        let question = bank.get(state.current).unwrap();
        let choice = if correct {
            question.correct_index
        } else {
            (question.correct_index + 1) % question.options.len()
        };
        let (state, _) = update(&state, bank, QuizEvent::Answer(choice));
        update(&state, bank, QuizEvent::Next).0
    }

    #[test]
    fn test_start_shows_and_speaks_first_question() {
        let bank = QuestionBank::default();
        let (state, effects) = update(&QuizState::default(), &bank, QuizEvent::Start);
        assert!(state.started);
        assert_eq!(
            effects,
            vec![
                Effect::ShowQuestion(0),
                Effect::Speak("What is 2 + 2?".to_string())
            ]
        );
    }

    #[test]
    fn test_auto_speak_off_stays_quiet() {
        let bank = QuestionBank::default();
        let (state, _) = update(&QuizState::default(), &bank, QuizEvent::ToggleAutoSpeak);
        assert!(!state.auto_speak);
        let (_, effects) = update(&state, &bank, QuizEvent::Start);
        assert_eq!(effects, vec![Effect::ShowQuestion(0)]);
    }

    #[test]
    fn test_correct_answer() {
        let bank = QuestionBank::default();
        let (state, effects) = update(&started(&bank), &bank, QuizEvent::Answer(1));
        assert_eq!((state.correct, state.streak, state.answered_total), (1, 1, 1));
        assert!(state.answered);
        assert!(effects.contains(&Effect::Speak(CORRECT_PHRASE.to_string())));
    }

    #[test]
    fn test_incorrect_answer_explains_after_delay() {
        let bank = QuestionBank::default();
        let mut state = started(&bank);
        state.streak = 2;
        let (state, effects) = update(&state, &bank, QuizEvent::Answer(0));
        assert_eq!(state.streak, 0);
        assert_eq!(state.correct, 0);

        let explanation = bank.get(0).unwrap().explanation.clone();
        assert_eq!(
            effects,
            vec![
                Effect::ShowResult {
                    selected: 0,
                    correct_index: 1
                },
                Effect::Speak(INCORRECT_PHRASE.to_string()),
                Effect::ShowExplanation {
                    explanation: explanation.clone(),
                    correct_answer: "4".to_string()
                },
                Effect::SpeakAfter(Duration::from_millis(500), explanation),
            ]
        );
    }

    #[test]
    fn test_answer_only_once() {
        let bank = QuestionBank::default();
        let (state, _) = update(&started(&bank), &bank, QuizEvent::Answer(1));
        let (again, effects) = update(&state, &bank, QuizEvent::Answer(0));
        assert_eq!(again, state);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_next_requires_answer() {
        let bank = QuestionBank::default();
        let state = started(&bank);
        let (next, effects) = update(&state, &bank, QuizEvent::Next);
        assert_eq!(next.current, 0);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_out_of_range_answer_ignored() {
        let bank = QuestionBank::default();
        let state = started(&bank);
        let (next, _) = update(&state, &bank, QuizEvent::Answer(7));
        assert!(!next.answered);
    }

    #[test]
    fn test_difficulty_rises_after_streak_and_falls_on_miss() {
        let bank = QuestionBank::default();
        let mut state = started(&bank);
        for _ in 0..2 {
            state = answer_and_next(state, &bank, true);
        }
        assert_eq!(state.difficulty, Difficulty::Easy);

        let (state, _) = update(&state, &bank, QuizEvent::Answer(1));
        assert_eq!(state.streak, 3);
        assert_eq!(state.difficulty, Difficulty::Medium);

        let state = update(&state, &bank, QuizEvent::Next).0;
        let (state, _) = update(&state, &bank, QuizEvent::Answer(0));
        assert_eq!(state.difficulty, Difficulty::Easy);
    }

    #[test]
    fn test_retry_reloads_same_question() {
        let bank = QuestionBank::default();
        let (state, _) = update(&started(&bank), &bank, QuizEvent::Answer(0));
        let (state, effects) = update(&state, &bank, QuizEvent::Retry);
        assert_eq!(state.current, 0);
        assert!(!state.answered);
        assert_eq!(effects[0], Effect::ShowQuestion(0));

        let (state, _) = update(&state, &bank, QuizEvent::Answer(1));
        assert_eq!(state.answered_total, 2);
    }

    #[test]
    fn test_completion() {
        let bank = QuestionBank::default();
        let mut state = started(&bank);
        for i in 0..bank.len() {
            let last = i + 1 == bank.len();
            if last {
                let choice = bank.get(state.current).unwrap().correct_index;
                state = update(&state, &bank, QuizEvent::Answer(choice)).0;
            } else {
                state = answer_and_next(state, &bank, i != 1);
            }
        }

        let (state, effects) = update(&state, &bank, QuizEvent::Next);
        assert!(state.is_complete(&bank));
        let summary = CompletionSummary { correct: 4, total: 5 };
        assert_eq!(
            effects,
            vec![
                Effect::Completed(summary),
                Effect::Speak(
                    "Congratulations! You scored 4 out of 5. Great job! Keep up the excellent work!"
                        .to_string()
                ),
            ]
        );
    }

    #[test]
    fn test_performance_thresholds() {
        assert_eq!(performance_message(100), "Outstanding performance!");
        assert_eq!(performance_message(90), "Outstanding performance!");
        assert_eq!(performance_message(80), "Great job! Keep up the excellent work!");
        assert_eq!(performance_message(70), "Good work! You're learning well!");
        assert_eq!(performance_message(60), "Nice effort! Keep practicing!");
        assert_eq!(performance_message(59), "Keep learning and trying your best!");
        assert_eq!(CompletionSummary { correct: 0, total: 0 }.percentage(), 0);
        assert_eq!(CompletionSummary { correct: 2, total: 3 }.percentage(), 67);
    }
}
