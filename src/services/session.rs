// src/services/session.rs

//! Attempt lifecycle for one (student, quiz) pair.
//!
//! ```text
//! [no attempt] --start--> [open] --submit--> [closed]
//! [open]       --start--> [open]   previous open attempt discarded
//! [closed]     --start--> [open]   previous closed attempt superseded
//! ```
//!
//! Start and submit for the same pair are serialized through
//! `EngineState::locks`, and the store replaces attempts by pair key, so a
//! pair never holds more than one attempt.

use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::EngineError,
    models::{
        attempt::{
            AnswerRecord, Attempt, AttemptReview, QuestionSet, StartedAttempt, SubmissionResult,
            SubmittedAnswer,
        },
        question::Question,
        quiz::Quiz,
        student::Student,
    },
    services::{scoring, selector},
    state::EngineState,
};

async fn load_quiz(state: &EngineState, quiz_id: Uuid) -> Result<Quiz, EngineError> {
    state
        .store
        .get_quiz(quiz_id)
        .await?
        .ok_or_else(|| EngineError::NotFound("Quiz not found".to_string()))
}

async fn load_student(state: &EngineState, student_id: Uuid) -> Result<Student, EngineError> {
    state
        .store
        .get_student(student_id)
        .await?
        .ok_or_else(|| EngineError::NotFound("Student not found".to_string()))
}

/// Starts (or restarts) a student's attempt at a quiz.
///
/// * Draws a fresh question set for the student's tier.
/// * Replaces whatever attempt the pair had, open or closed.
/// * Returns the questions without their answers.
///
/// On `InsufficientQuestions` nothing is written.
pub async fn start_attempt(
    state: &EngineState,
    quiz_id: Uuid,
    student_id: Uuid,
) -> Result<StartedAttempt, EngineError> {
    let quiz = load_quiz(state, quiz_id).await?;
    let student = load_student(state, student_id).await?;

    let _guard = state.locks.acquire(student_id, quiz_id).await;

    let difficulties = student.tier.allowed_difficulties();
    let pool = state
        .store
        .eligible_questions(quiz.module_id, difficulties)
        .await?;

    let question_ids =
        selector::select_questions(&pool, quiz.question_count, quiz.quiz_type, difficulties)
            .inspect_err(|e| {
                tracing::warn!(
                    "Cannot start quiz {} for student {} ({} tier): {}",
                    quiz_id,
                    student_id,
                    student.tier,
                    e
                );
            })?;

    let attempt = Attempt::open(student_id, quiz_id, question_ids);
    state.store.replace_attempt(&attempt).await?;

    let by_id: HashMap<Uuid, &Question> = pool.iter().map(|q| (q.id, q)).collect();
    let questions = attempt
        .question_ids
        .iter()
        .filter_map(|id| by_id.get(id))
        .map(|q| q.to_public())
        .collect();

    tracing::info!(
        "Attempt {} started: student {} quiz {} with {} questions",
        attempt.id,
        student_id,
        quiz_id,
        attempt.question_ids.len()
    );

    Ok(StartedAttempt { attempt, questions })
}

/// Grades and closes the open attempt for a (student, quiz) pair.
///
/// * Rejects malformed ids and answers outside the attempt's frozen set.
/// * Persists the graded attempt and records the student on the quiz in one step.
pub async fn submit_attempt(
    state: &EngineState,
    quiz_id: Uuid,
    student_id: Uuid,
    submitted: &[SubmittedAnswer],
) -> Result<SubmissionResult, EngineError> {
    load_quiz(state, quiz_id).await?;
    load_student(state, student_id).await?;

    let _guard = state.locks.acquire(student_id, quiz_id).await;

    let attempt = match state.store.find_attempt(student_id, quiz_id).await? {
        Some(attempt) if attempt.is_open() => attempt,
        Some(_) => {
            tracing::warn!(
                "Student {} resubmitted closed attempt for quiz {}",
                student_id,
                quiz_id
            );
            return Err(EngineError::InvalidSession(
                "Attempt has already been submitted".to_string(),
            ));
        }
        None => {
            tracing::warn!("Student {} submitted quiz {} without starting it", student_id, quiz_id);
            return Err(EngineError::InvalidSession(
                "No open attempt for this quiz".to_string(),
            ));
        }
    };

    if submitted.is_empty() {
        return Err(EngineError::BadRequest("No answers submitted".to_string()));
    }

    let answers: Vec<AnswerRecord> = submitted
        .iter()
        .map(|a| {
            Uuid::parse_str(&a.question_id)
                .map(|question_id| AnswerRecord {
                    question_id,
                    answer: a.answer.clone(),
                })
                .map_err(|_| EngineError::BadRequest(format!("Invalid questionId: {}", a.question_id)))
        })
        .collect::<Result<_, _>>()?;

    let ids: Vec<Uuid> = answers.iter().map(|a| a.question_id).collect();
    let mut questions = state.store.questions_by_ids(&ids).await?;
    questions.retain(|q| attempt.question_ids.contains(&q.id));

    // Duplicates collapse in the fetch, so they land here too.
    if questions.len() != answers.len() {
        return Err(EngineError::BadRequest(
            "Some questions are missing or invalid".to_string(),
        ));
    }

    let outcome = scoring::score(&questions, &answers);

    let now = Utc::now();
    let time_taken = (now - attempt.started_at).num_seconds().max(0);
    let total_questions = questions.len();

    let graded = Attempt {
        question_ids: questions.iter().map(|q| q.id).collect::<QuestionSet>(),
        answers,
        correct_answers: outcome.correct_count,
        total_answered: total_questions,
        score: outcome.score,
        completed_at: Some(now),
        ..attempt
    };
    state.store.complete_attempt(&graded).await?;

    tracing::info!(
        "Attempt {} submitted: student {} quiz {} scored {:.1} ({}/{}) in {}s",
        graded.id,
        student_id,
        quiz_id,
        outcome.score,
        outcome.correct_count,
        total_questions,
        time_taken
    );

    Ok(SubmissionResult {
        score: outcome.score,
        correct_answers: outcome.correct_count,
        total_questions,
        feedback: outcome.feedback,
        time_taken,
    })
}

/// Returns the governing attempt for a pair, open or closed.
pub async fn get_attempt(
    state: &EngineState,
    quiz_id: Uuid,
    student_id: Uuid,
) -> Result<Attempt, EngineError> {
    load_quiz(state, quiz_id).await?;
    load_student(state, student_id).await?;

    state
        .store
        .find_attempt(student_id, quiz_id)
        .await?
        .ok_or_else(|| EngineError::NotFound("You have not taken this quiz".to_string()))
}

/// A submitted attempt with the bank's current text for its questions.
/// Question text may have been edited since the attempt was graded.
pub async fn review_attempt(
    state: &EngineState,
    quiz_id: Uuid,
    student_id: Uuid,
) -> Result<AttemptReview, EngineError> {
    let attempt = get_attempt(state, quiz_id, student_id).await?;
    if attempt.is_open() {
        return Err(EngineError::InvalidSession(
            "Attempt has not been submitted yet".to_string(),
        ));
    }

    let questions = state
        .store
        .questions_by_ids(attempt.question_ids.as_slice())
        .await?;
    let missing_question_ids = attempt
        .question_ids
        .iter()
        .filter(|id| !questions.iter().any(|q| q.id == **id))
        .copied()
        .collect();

    Ok(AttemptReview {
        attempt,
        questions,
        missing_question_ids,
    })
}
