// src/models/module.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A course module: an ordered list of lessons. Quizzes point back to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseModule {
    pub id: Uuid,
    pub title: String,
    pub lesson_ids: Vec<Uuid>,
}

impl CourseModule {
    pub fn new(title: impl Into<String>, lesson_ids: Vec<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            lesson_ids,
        }
    }
}

/// Instructor-facing average grade for a module.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleGradeReport {
    pub module_id: Uuid,
    pub quiz_count: usize,

    /// Submitted attempts across all the module's quizzes.
    pub attempt_count: usize,

    /// 0 when nothing has been submitted.
    pub average_score: f64,

    /// `average_score >= GRADE_REPORT_TARGET`.
    pub meets_target: bool,
}
