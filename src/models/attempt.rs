// src/models/attempt.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    question::{PublicQuestion, Question},
    quiz::Quiz,
};

/// Ordered question ids frozen into an attempt.
/// Owned by value, so later bank edits cannot change what was asked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionSet(Vec<Uuid>);

impl QuestionSet {
    pub fn new(ids: Vec<Uuid>) -> Self {
        Self(ids)
    }

    pub fn as_slice(&self) -> &[Uuid] {
        &self.0
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.0.contains(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Uuid> {
        self.0.iter()
    }
}

impl FromIterator<Uuid> for QuestionSet {
    fn from_iter<I: IntoIterator<Item = Uuid>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One answer as sent by the client. The id is still unparsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedAnswer {
    /// Raw id as sent; parsed during submission.
    pub question_id: String,

    /// Selected option text.
    pub answer: String,
}

impl SubmittedAnswer {
    pub fn new(question_id: impl ToString, answer: impl Into<String>) -> Self {
        Self {
            question_id: question_id.to_string(),
            answer: answer.into(),
        }
    }
}

/// A validated answer as persisted on the attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question_id: Uuid,

    /// Compared verbatim against the answer key.
    pub answer: String,
}

/// One student's attempt at one quiz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attempt {
    /// Changes on every restart.
    pub id: Uuid,
    pub student_id: Uuid,
    pub quiz_id: Uuid,

    /// Drawn at start; the graded set after submission.
    pub question_ids: QuestionSet,

    /// Empty while open.
    pub answers: Vec<AnswerRecord>,

    /// Number of answers matching the key.
    pub correct_answers: usize,

    /// Number of questions graded.
    pub total_answered: usize,

    /// 0 to 100.
    pub score: f64,

    /// Reset on every restart.
    pub started_at: DateTime<Utc>,

    /// `None` while the attempt is open.
    pub completed_at: Option<DateTime<Utc>>,
}

impl Attempt {
    pub fn open(student_id: Uuid, quiz_id: Uuid, question_ids: QuestionSet) -> Self {
        Self {
            id: Uuid::new_v4(),
            student_id,
            quiz_id,
            question_ids,
            answers: Vec::new(),
            correct_answers: 0,
            total_answered: 0,
            score: 0.0,
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.completed_at.is_none()
    }

    pub fn is_closed(&self) -> bool {
        self.completed_at.is_some()
    }
}

/// Per-question feedback returned after submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub question_id: Uuid,

    /// `None` when the question was not answered.
    pub selected_answer: Option<String>,

    pub correct_answer: String,
}

/// Returned by `start_attempt`.
#[derive(Debug, Clone, Serialize)]
pub struct StartedAttempt {
    pub attempt: Attempt,

    /// In frozen order, without answers.
    pub questions: Vec<PublicQuestion>,
}

/// Returned by `submit_attempt`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionResult {
    /// 0 to 100.
    pub score: f64,
    pub correct_answers: usize,

    /// Number of questions graded.
    pub total_questions: usize,

    /// One entry per graded question.
    pub feedback: Vec<Feedback>,

    /// Seconds between start and submission.
    pub time_taken: i64,
}

/// A closed attempt together with the current bank text of its questions.
#[derive(Debug, Clone, Serialize)]
pub struct AttemptReview {
    pub attempt: Attempt,

    /// Current bank text, which may differ from what was shown at the time.
    pub questions: Vec<Question>,

    /// Frozen ids that are no longer in the bank.
    pub missing_question_ids: Vec<Uuid>,
}

/// Every submitted attempt on one quiz, for the instructor.
#[derive(Debug, Clone, Serialize)]
pub struct QuizResponses {
    pub quiz: Quiz,

    /// Closed attempts only, oldest submission first.
    pub responses: Vec<Attempt>,
}
