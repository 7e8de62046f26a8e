// src/services/tier.rs

use uuid::Uuid;

use crate::{
    config::{AVERAGE_PROMOTION_THRESHOLD, BEGINNER_PROMOTION_THRESHOLD},
    error::EngineError,
    models::student::Tier,
    services::scoring::average_score,
    state::EngineState,
};

/// Tier transition for a given average score. Never demotes.
pub fn next_tier(current: Tier, average_score: f64) -> Tier {
    match current {
        Tier::Beginner if average_score >= BEGINNER_PROMOTION_THRESHOLD => Tier::Average,
        Tier::Average if average_score >= AVERAGE_PROMOTION_THRESHOLD => Tier::Advanced,
        other => other,
    }
}

/// Re-evaluates a student's tier from their submitted attempts.
/// Called on demand, not after every submission.
pub async fn evaluate_tier(state: &EngineState, student_id: Uuid) -> Result<Tier, EngineError> {
    let student = state
        .store
        .get_student(student_id)
        .await?
        .ok_or_else(|| EngineError::NotFound("Student not found".to_string()))?;

    let quizzes = state.store.quizzes_attempted_by(student_id).await?;
    if quizzes.is_empty() {
        return Err(EngineError::NotFound(
            "Student has not taken any quizzes".to_string(),
        ));
    }

    let quiz_ids: Vec<Uuid> = quizzes.iter().map(|q| q.id).collect();
    let attempts = state.store.closed_attempts(student_id, &quiz_ids).await?;

    let average = average_score(&attempts).ok_or_else(|| {
        EngineError::NotFound("No submitted attempts found for this student".to_string())
    })?;

    let new_tier = next_tier(student.tier, average);
    if new_tier != student.tier {
        state.store.set_tier(student_id, new_tier).await?;
        tracing::info!(
            "Student {} promoted from {} to {} (average {:.1})",
            student_id,
            student.tier,
            new_tier,
            average
        );
    }

    Ok(new_tier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_beginner_promotion_boundary() {
        assert_eq!(next_tier(Tier::Beginner, 74.9), Tier::Beginner);
        assert_eq!(next_tier(Tier::Beginner, 75.0), Tier::Average);
    }

    #[test]
    fn test_beginner_does_not_skip_a_tier() {
        assert_eq!(next_tier(Tier::Beginner, 100.0), Tier::Average);
    }

    #[test]
    fn test_average_promotion_boundary() {
        assert_eq!(next_tier(Tier::Average, 89.9), Tier::Average);
        assert_eq!(next_tier(Tier::Average, 90.0), Tier::Advanced);
    }

    #[test]
    fn test_never_demotes() {
        for tier in [Tier::Beginner, Tier::Average, Tier::Advanced] {
            for score in [0.0, 50.0, 75.0, 90.0, 100.0] {
                assert!(next_tier(tier, score) >= tier);
            }
        }
        assert_eq!(next_tier(Tier::Advanced, 0.0), Tier::Advanced);
    }
}
