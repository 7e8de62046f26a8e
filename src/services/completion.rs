// src/services/completion.rs

use uuid::Uuid;

use crate::{
    config::MODULE_COMPLETION_THRESHOLD,
    error::EngineError,
    services::scoring::average_score,
    state::EngineState,
};

/// Decides whether a student has completed a module.
///
/// All lessons must be complete, every quiz in the module must have a
/// submitted attempt, and the average of those attempts must reach
/// `MODULE_COMPLETION_THRESHOLD`. A positive result is recorded on the student.
pub async fn is_module_complete(
    state: &EngineState,
    module_id: Uuid,
    student_id: Uuid,
) -> Result<bool, EngineError> {
    let module = state
        .store
        .get_module(module_id)
        .await?
        .ok_or_else(|| EngineError::NotFound("Module not found".to_string()))?;

    state
        .store
        .get_student(student_id)
        .await?
        .ok_or_else(|| EngineError::NotFound("Student not found".to_string()))?;

    for lesson_id in &module.lesson_ids {
        if !state.lessons.is_lesson_complete(*lesson_id, student_id).await? {
            tracing::debug!(
                "Module {} incomplete for student {}: lesson {} not done",
                module_id,
                student_id,
                lesson_id
            );
            return Ok(false);
        }
    }

    let quizzes = state.store.quizzes_in_module(module_id).await?;
    if quizzes.is_empty() {
        return Err(EngineError::NotFound(
            "Module has no quizzes to evaluate".to_string(),
        ));
    }

    let quiz_ids: Vec<Uuid> = quizzes.iter().map(|q| q.id).collect();
    let attempts = state.store.closed_attempts(student_id, &quiz_ids).await?;
    if attempts.len() < quizzes.len() {
        return Ok(false);
    }

    // Non-empty: attempts.len() >= quizzes.len() > 0.
    let average = average_score(&attempts).unwrap_or_default();
    if average < MODULE_COMPLETION_THRESHOLD {
        return Ok(false);
    }

    state
        .store
        .mark_module_completed(student_id, module_id)
        .await?;
    tracing::info!(
        "Student {} completed module {} (average {:.1})",
        student_id,
        module_id,
        average
    );

    Ok(true)
}
