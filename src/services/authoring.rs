// src/services/authoring.rs

//! Writes to the question bank and quiz definitions.
//! Anything an attempt has already used is frozen.

use uuid::Uuid;
use validator::Validate;

use crate::{
    error::EngineError,
    models::{
        question::{NewQuestion, Question, QuestionUpdate},
        quiz::{NewQuiz, Quiz, QuizUpdate},
    },
    state::EngineState,
};

async fn ensure_module(state: &EngineState, module_id: Uuid) -> Result<(), EngineError> {
    state
        .store
        .get_module(module_id)
        .await?
        .map(|_| ())
        .ok_or_else(|| EngineError::NotFound("Module not found".to_string()))
}

async fn load_quiz(state: &EngineState, quiz_id: Uuid) -> Result<Quiz, EngineError> {
    state
        .store
        .get_quiz(quiz_id)
        .await?
        .ok_or_else(|| EngineError::NotFound(format!("Quiz with ID {} not found", quiz_id)))
}

/// Adds a question to a module's bank.
pub async fn add_question(state: &EngineState, payload: NewQuestion) -> Result<Question, EngineError> {
    payload.check_shape()?;
    ensure_module(state, payload.module_id).await?;

    let duplicate = state
        .store
        .has_duplicate_question(
            payload.module_id,
            &payload.prompt,
            payload.question_type,
            payload.difficulty,
        )
        .await?;
    if duplicate {
        return Err(EngineError::Conflict(
            "Duplicate question detected. The question already exists in this module".to_string(),
        ));
    }

    let question = payload.into_question();
    state.store.insert_question(&question).await?;

    tracing::info!(
        "Question {} added to module {} ({}, {})",
        question.id,
        question.module_id,
        question.question_type,
        question.difficulty
    );
    Ok(question)
}

/// Edits a question in place. The merged question must pass the same shape
/// rules as a new one. The answer key is frozen while any attempt holds it.
pub async fn update_question(
    state: &EngineState,
    question_id: Uuid,
    update: QuestionUpdate,
) -> Result<Question, EngineError> {
    update.validate()?;
    let current = state
        .store
        .get_question(question_id)
        .await?
        .ok_or_else(|| EngineError::NotFound("Question not found".to_string()))?;

    let candidate = update.merge(&current);
    candidate.check_shape()?;

    let retagged = candidate.prompt != current.prompt
        || candidate.question_type != current.question_type
        || candidate.difficulty != current.difficulty;
    if retagged
        && state
            .store
            .has_duplicate_question(
                candidate.module_id,
                &candidate.prompt,
                candidate.question_type,
                candidate.difficulty,
            )
            .await?
    {
        return Err(EngineError::Conflict(
            "Duplicate question detected. The question already exists in this module".to_string(),
        ));
    }

    let question = Question {
        id: current.id,
        ..candidate.into_question()
    };
    state.store.update_question(&question).await?;

    tracing::info!("Question {} updated", question_id);
    Ok(question)
}

/// Removes a question unless some attempt has drawn it.
pub async fn delete_question(state: &EngineState, question_id: Uuid) -> Result<(), EngineError> {
    state.store.delete_question(question_id).await?;
    tracing::info!("Question {} deleted", question_id);
    Ok(())
}

pub async fn create_quiz(state: &EngineState, payload: NewQuiz) -> Result<Quiz, EngineError> {
    payload.validate()?;
    ensure_module(state, payload.module_id).await?;

    if state
        .store
        .find_quiz_by_name(payload.module_id, &payload.name)
        .await?
        .is_some()
    {
        return Err(EngineError::Conflict("Choose a unique quiz name".to_string()));
    }

    let quiz = payload.into_quiz();
    state.store.insert_quiz(&quiz).await?;

    tracing::info!("Quiz {} '{}' created in module {}", quiz.id, quiz.name, quiz.module_id);
    Ok(quiz)
}

/// Changes a quiz definition. Rejected once any student has submitted.
pub async fn update_quiz(
    state: &EngineState,
    quiz_id: Uuid,
    update: QuizUpdate,
) -> Result<Quiz, EngineError> {
    update.validate()?;
    let mut quiz = load_quiz(state, quiz_id).await?;

    if let Some(name) = update.name.as_deref().filter(|n| *n != quiz.name) {
        if state
            .store
            .find_quiz_by_name(quiz.module_id, name)
            .await?
            .is_some()
        {
            return Err(EngineError::Conflict("Choose a unique quiz name".to_string()));
        }
    }

    update.apply_to(&mut quiz);
    // The store rejects the write if a submission landed since the load.
    state.store.update_quiz(&quiz).await?;

    tracing::info!("Quiz {} updated", quiz_id);
    Ok(quiz)
}

/// Deletes a quiz. Rejected once any student has submitted.
pub async fn delete_quiz(state: &EngineState, quiz_id: Uuid) -> Result<(), EngineError> {
    state.store.delete_quiz(quiz_id).await?;
    tracing::info!("Quiz {} deleted", quiz_id);
    Ok(())
}
