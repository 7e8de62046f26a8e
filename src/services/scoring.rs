// src/services/scoring.rs

use std::collections::HashMap;

use uuid::Uuid;

use crate::models::{
    attempt::{AnswerRecord, Attempt, Feedback},
    question::Question,
};

/// Result of grading one submission.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreOutcome {
    pub correct_count: usize,

    /// 0 to 100.
    pub score: f64,

    /// One entry per question, in `questions` order.
    pub feedback: Vec<Feedback>,
}

/// Grades `answers` against the answer key carried by `questions`.
///
/// Exact, case-sensitive string match. Questions without an answer count as
/// wrong and get `selected_answer: None`. An empty question list scores 0.
pub fn score(questions: &[Question], answers: &[AnswerRecord]) -> ScoreOutcome {
    let key: HashMap<Uuid, &str> = questions
        .iter()
        .map(|q| (q.id, q.correct_answer.as_str()))
        .collect();

    let correct_count = answers
        .iter()
        .filter(|a| key.get(&a.question_id) == Some(&a.answer.as_str()))
        .count();

    let feedback = questions
        .iter()
        .map(|q| Feedback {
            question_id: q.id,
            selected_answer: answers
                .iter()
                .find(|a| a.question_id == q.id)
                .map(|a| a.answer.clone()),
            correct_answer: q.correct_answer.clone(),
        })
        .collect();

    let score = if questions.is_empty() {
        0.0
    } else {
        (correct_count as f64 / questions.len() as f64) * 100.0
    };

    ScoreOutcome {
        correct_count,
        score,
        feedback,
    }
}

/// Mean score over `attempts`, or `None` when there are none.
pub fn average_score(attempts: &[Attempt]) -> Option<f64> {
    if attempts.is_empty() {
        return None;
    }
    let total: f64 = attempts.iter().map(|a| a.score).sum();
    Some(total / attempts.len() as f64)
}
