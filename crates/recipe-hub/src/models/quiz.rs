//! Quiz questions, submissions and results.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A question from the question bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    /// Question id.
    pub id: String,

    /// Prompt text.
    #[serde(alias = "question")]
    pub text: String,

    /// Offered answers.
    #[serde(default, alias = "options")]
    pub choices: Vec<String>,

    /// The answer that earns the point.
    pub correct_answer: String,
}

/// Question as served to the client, without the correct answer.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    pub id: String,
    pub text: String,
    pub choices: Vec<String>,
}

impl From<&QuizQuestion> for QuestionView {
    fn from(q: &QuizQuestion) -> Self {
        Self { id: q.id.clone(), text: q.text.clone(), choices: q.choices.clone() }
    }
}

/// Answers posted by the client: question id to chosen answer.
pub type QuizSubmission = HashMap<String, String>;

/// Outcome of grading a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizResult {
    /// Correct answers.
    pub score: u32,
    /// Questions that were found in the bank.
    pub total: u32,
}
