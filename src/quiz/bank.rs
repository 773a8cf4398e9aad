//! Question bank
//!
//! Questions ship with a small built-in set. A JSON file with the same
//! shape can replace it (see `[quiz] questions` in the config).

use crate::error::{QuizVoiceError, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Difficulty level, used both for questions and for the learner's level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// One level up, saturating at hard
    pub fn raised(self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Medium,
            Difficulty::Medium | Difficulty::Hard => Difficulty::Hard,
        }
    }

    /// One level down, saturating at easy
    pub fn lowered(self) -> Self {
        match self {
            Difficulty::Hard => Difficulty::Medium,
            Difficulty::Medium | Difficulty::Easy => Difficulty::Easy,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        };
        f.write_str(label)
    }
}

/// A multiple-choice question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: u32,
    pub question: String,
    pub options: Vec<String>,
    pub correct_index: usize,
    #[serde(default)]
    pub difficulty: Difficulty,
    pub explanation: String,
    pub correct_answer: String,
}

impl Question {
    pub fn is_correct(&self, answer: usize) -> bool {
        answer == self.correct_index
    }
}

/// Ordered questions for one quiz run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    /// Build a bank, rejecting questions whose answer index is out of range
    pub fn new(questions: Vec<Question>) -> Result<Self> {
        if questions.is_empty() {
            return Err(QuizVoiceError::Config("Question bank is empty".into()));
        }
        if let Some(q) = questions
            .iter()
            .find(|q| q.correct_index >= q.options.len())
        {
            return Err(QuizVoiceError::Config(format!(
                "Question {} has correct_index {} but only {} options",
                q.id,
                q.correct_index,
                q.options.len()
            )));
        }
        Ok(Self { questions })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let questions: Vec<Question> = serde_json::from_str(json)
            .map_err(|e| QuizVoiceError::Config(format!("Bad question file: {}", e)))?;
        Self::new(questions)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let bank = Self::from_json(&json)?;
        info!("Loaded {} questions from {:?}", bank.len(), path);
        Ok(bank)
    }

    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

impl Default for QuestionBank {
    fn default() -> Self {
        Self {
            questions: sample_questions(),
        }
    }
}

fn question(
    id: u32,
    text: &str,
    options: [&str; 4],
    correct_index: usize,
    difficulty: Difficulty,
    explanation: &str,
) -> Question {
    Question {
        id,
        question: text.to_string(),
        options: options.iter().map(|o| o.to_string()).collect(),
        correct_index,
        difficulty,
        explanation: explanation.to_string(),
        correct_answer: options[correct_index].to_string(),
    }
}

/// The built-in question set
pub fn sample_questions() -> Vec<Question> {
    vec![
        question(
            1,
            "What is 2 + 2?",
            ["3", "4", "5", "6"],
            1,
            Difficulty::Easy,
            "When you add 2 + 2, you are counting: 1, 2, then 1 more, 2 more. That gives us 4!",
        ),
        question(
            2,
            "Which animal says 'meow'?",
            ["Dog", "Cat", "Bird", "Fish"],
            1,
            Difficulty::Easy,
            "Cats make a 'meow' sound to communicate with humans. Dogs bark, birds chirp, and fish don't make sounds!",
        ),
        question(
            3,
            "What color do you get when you mix red and blue?",
            ["Green", "Purple", "Orange", "Yellow"],
            1,
            Difficulty::Easy,
            "When you mix red and blue paint or light, you get purple! This is how colors combine together.",
        ),
        question(
            4,
            "How many days are there in a week?",
            ["5", "6", "7", "8"],
            2,
            Difficulty::Easy,
            "A week has 7 days: Monday, Tuesday, Wednesday, Thursday, Friday, Saturday, and Sunday!",
        ),
        question(
            5,
            "What do plants need to grow?",
            ["Only water", "Only sunlight", "Water, sunlight, and air", "Only soil"],
            2,
            Difficulty::Medium,
            "Plants need water to drink, sunlight for energy, and air (carbon dioxide) to make food through photosynthesis!",
        ),
    ]
}
