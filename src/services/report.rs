// src/services/report.rs

use uuid::Uuid;

use crate::{
    config::GRADE_REPORT_TARGET,
    error::EngineError,
    models::{attempt::QuizResponses, module::ModuleGradeReport},
    services::scoring::average_score,
    state::EngineState,
};

/// Average grade over every submitted attempt on a module's quizzes.
pub async fn module_grade_report(
    state: &EngineState,
    module_id: Uuid,
) -> Result<ModuleGradeReport, EngineError> {
    let quizzes = state.store.quizzes_in_module(module_id).await?;
    if quizzes.is_empty() {
        return Err(EngineError::NotFound(
            "No quizzes found for this module".to_string(),
        ));
    }

    let quiz_ids: Vec<Uuid> = quizzes.iter().map(|q| q.id).collect();
    let attempts = state.store.closed_attempts_for_quizzes(&quiz_ids).await?;
    let average = average_score(&attempts).unwrap_or(0.0);

    Ok(ModuleGradeReport {
        module_id,
        quiz_count: quizzes.len(),
        attempt_count: attempts.len(),
        average_score: average,
        meets_target: average >= GRADE_REPORT_TARGET,
    })
}

/// Lists every submitted attempt on a quiz, oldest submission first.
pub async fn quiz_responses(state: &EngineState, quiz_id: Uuid) -> Result<QuizResponses, EngineError> {
    let quiz = state
        .store
        .get_quiz(quiz_id)
        .await?
        .ok_or_else(|| EngineError::NotFound("Quiz not found".to_string()))?;

    let mut responses = state.store.closed_attempts_for_quizzes(&[quiz_id]).await?;
    responses.sort_by_key(|a| a.completed_at);

    tracing::debug!("Quiz {} has {} responses", quiz_id, responses.len());
    Ok(QuizResponses { quiz, responses })
}
