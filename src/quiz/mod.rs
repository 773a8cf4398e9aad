//! Adaptive multiple-choice quiz

pub mod bank;
pub mod state;

pub use bank::{Difficulty, Question, QuestionBank};
pub use state::{performance_message, update, CompletionSummary, Effect, QuizEvent, QuizState};
