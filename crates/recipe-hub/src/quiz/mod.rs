//! Quiz engine: draw a question set, grade submissions, sign results.
//!
//! Lifecycle per session: a served quiz records a [`QuizAttempt`]; the
//! submission is graded against the bank and the attempt is cleared. A late
//! submission is refused and the attempt stays, so it cannot be retried.
//! Grading only counts questions the bank knows about (and, with an attempt,
//! that were served), so foreign ids add to neither `score` nor `total`.

mod share;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::QuizError;
use crate::models::{QuestionView, QuizQuestion, QuizResult, QuizSubmission};
use crate::store::QuestionBank;

pub use share::ShareSigner;

/// A quiz handed to a session, kept for the server-side deadline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizAttempt {
    pub question_ids: Vec<String>,
    pub issued_at: DateTime<Utc>,
}

/// Questions plus time limit, ready to render.
#[derive(Debug, Clone, Serialize)]
pub struct QuizSheet {
    pub questions: Vec<QuestionView>,
    /// Seconds the client countdown runs for.
    pub time_limit: u64,
}

/// Samples and grades quizzes.
#[derive(Clone)]
pub struct QuizEngine {
    bank: Arc<dyn QuestionBank>,
    size: usize,
    time_limit: Duration,
    grace: Duration,
}

impl QuizEngine {
    #[must_use]
    pub fn new(bank: Arc<dyn QuestionBank>, size: usize, time_limit: Duration, grace: Duration) -> Self {
        Self { bank, size, time_limit, grace }
    }

    /// Draw a fresh question set and the attempt to store in the session.
    pub async fn start(&self) -> Result<(QuizSheet, QuizAttempt), QuizError> {
        let questions = self.bank.sample_questions(self.size).await?;
        let attempt = QuizAttempt {
            question_ids: questions.iter().map(|q| q.id.clone()).collect(),
            issued_at: Utc::now(),
        };
        let sheet = QuizSheet {
            questions: questions.iter().map(QuestionView::from).collect(),
            time_limit: self.time_limit.as_secs(),
        };
        tracing::debug!(questions = sheet.questions.len(), "Started quiz");
        Ok((sheet, attempt))
    }

    /// Grade a submission.
    ///
    /// When the session holds an attempt, submissions later than the time
    /// limit plus grace are refused and answers to questions outside the
    /// attempt are ignored. Without an attempt the submission is graded as-is.
    pub async fn submit(
        &self,
        attempt: Option<&QuizAttempt>,
        submission: &QuizSubmission,
    ) -> Result<QuizResult, QuizError> {
        let ids: Vec<String> = match attempt {
            Some(attempt) => {
                self.check_deadline(attempt, Utc::now())?;
                submission
                    .keys()
                    .filter(|id| attempt.question_ids.contains(id))
                    .cloned()
                    .collect()
            }
            None => submission.keys().cloned().collect(),
        };
        let questions = self.bank.find_questions_by_ids(&ids).await?;
        let result = grade(&questions, submission);

        tracing::info!(score = result.score, total = result.total, "Graded quiz");
        Ok(result)
    }

    fn check_deadline(&self, attempt: &QuizAttempt, now: DateTime<Utc>) -> Result<(), QuizError> {
        let elapsed = (now - attempt.issued_at).to_std().unwrap_or_default();
        let allowed = self.time_limit + self.grace;
        if elapsed > allowed {
            return Err(QuizError::DeadlineExceeded { overdue: elapsed - allowed });
        }
        Ok(())
    }
}

impl std::fmt::Debug for QuizEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuizEngine")
            .field("size", &self.size)
            .field("time_limit", &self.time_limit)
            .finish()
    }
}

/// One point per exact (case-sensitive) match; `total` counts the given questions.
#[must_use]
pub fn grade(questions: &[QuizQuestion], submission: &QuizSubmission) -> QuizResult {
    let score = questions
        .iter()
        .filter(|q| submission.get(&q.id).is_some_and(|answer| *answer == q.correct_answer))
        .count();
    QuizResult { score: score as u32, total: questions.len() as u32 }
}
