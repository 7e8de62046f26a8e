// src/services/selector.rs

use std::collections::HashSet;

use uuid::Uuid;

use crate::{
    error::EngineError,
    models::{
        attempt::QuestionSet,
        question::{Difficulty, Question, QuestionType},
        quiz::QuizType,
    },
};

/// Picks `requested_count` question ids out of `pool`.
///
/// Difficulties are walked in the given order. At each difficulty the
/// remaining deficit is filled from questions of the requested type; for
/// `both` the deficit is split `ceil(deficit / 2)` multiple-choice, then the
/// rest true-false. Stops as soon as the count is reached. Within a
/// difficulty, questions are taken in `pool` order and never repeated.
///
/// Fails with `InsufficientQuestions` rather than returning a short set.
pub fn select_questions(
    pool: &[Question],
    requested_count: usize,
    quiz_type: QuizType,
    allowed_difficulties: &[Difficulty],
) -> Result<QuestionSet, EngineError> {
    let mut picker = Picker::new(pool);

    for &difficulty in allowed_difficulties {
        let deficit = requested_count - picker.selected.len();
        if deficit == 0 {
            break;
        }

        match quiz_type.single_type() {
            Some(question_type) => picker.take(question_type, difficulty, deficit),
            None => {
                let multiple_choice = deficit.div_ceil(2);
                picker.take(QuestionType::MultipleChoice, difficulty, multiple_choice);
                picker.take(QuestionType::TrueFalse, difficulty, deficit - multiple_choice);
            }
        }

        tracing::debug!(
            "Selected {} of {} questions after difficulty {}",
            picker.selected.len(),
            requested_count,
            difficulty
        );
    }

    if picker.selected.len() < requested_count {
        return Err(EngineError::InsufficientQuestions {
            requested: requested_count,
            available: picker.selected.len(),
        });
    }

    Ok(picker.selected.into_iter().collect())
}

struct Picker<'a> {
    pool: &'a [Question],
    used: HashSet<Uuid>,
    selected: Vec<Uuid>,
}

impl<'a> Picker<'a> {
    fn new(pool: &'a [Question]) -> Self {
        Self {
            pool,
            used: HashSet::new(),
            selected: Vec::new(),
        }
    }

    fn take(&mut self, question_type: QuestionType, difficulty: Difficulty, count: usize) {
        if count == 0 {
            return;
        }

        let batch: Vec<Uuid> = self
            .pool
            .iter()
            .filter(|q| q.question_type == question_type && q.difficulty == difficulty)
            .filter(|q| !self.used.contains(&q.id))
            .map(|q| q.id)
            .take(count)
            .collect();

        for id in batch {
            // The bank may hand back the same row twice; only the first counts.
            if self.used.insert(id) {
                self.selected.push(id);
            }
        }
    }
}
