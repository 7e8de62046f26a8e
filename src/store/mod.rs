// src/store/mod.rs

//! Collaborator boundaries the engine reads and writes through.
//!
//! `memory` keeps everything in process and is what the tests use.
//! `postgres` is the production backend.

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::EngineError,
    models::{
        attempt::Attempt,
        module::CourseModule,
        question::{Difficulty, Question, QuestionType},
        quiz::Quiz,
        student::{Student, Tier},
    },
};

pub mod memory;
pub mod postgres;

pub use memory::{MemoryLessonProgress, MemoryStore};
pub use postgres::PgStore;

/// Read side of the question bank, plus the authoring writes.
#[async_trait]
pub trait QuestionBank: Send + Sync {
    /// Questions of `module_id` whose difficulty is in `difficulties`.
    /// Implementations may shuffle; the selector keeps whatever order it gets.
    async fn eligible_questions(
        &self,
        module_id: Uuid,
        difficulties: &[Difficulty],
    ) -> Result<Vec<Question>, EngineError>;

    /// Questions whose id is in `ids`. Unknown ids are skipped; duplicates collapse.
    async fn questions_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Question>, EngineError>;

    async fn get_question(&self, id: Uuid) -> Result<Option<Question>, EngineError>;

    /// Whether a question with the same prompt already exists under these tags.
    async fn has_duplicate_question(
        &self,
        module_id: Uuid,
        prompt: &str,
        question_type: QuestionType,
        difficulty: Difficulty,
    ) -> Result<bool, EngineError>;

    async fn insert_question(&self, question: &Question) -> Result<(), EngineError>;

    /// Overwrites a stored question. `NotFound` if it is gone.
    /// Changing `correct_answer` while any attempt holds the question is a
    /// `Conflict`; the check and the write are one step.
    async fn update_question(&self, question: &Question) -> Result<(), EngineError>;

    /// `NotFound` if absent, `Conflict` while any attempt's frozen set holds
    /// the id. The check and the delete are one step.
    async fn delete_question(&self, id: Uuid) -> Result<(), EngineError>;
}

#[async_trait]
pub trait QuizStore: Send + Sync {
    async fn get_quiz(&self, id: Uuid) -> Result<Option<Quiz>, EngineError>;

    async fn quizzes_in_module(&self, module_id: Uuid) -> Result<Vec<Quiz>, EngineError>;

    /// Quizzes whose `attempted_users` contains the student.
    async fn quizzes_attempted_by(&self, student_id: Uuid) -> Result<Vec<Quiz>, EngineError>;

    async fn find_quiz_by_name(
        &self,
        module_id: Uuid,
        name: &str,
    ) -> Result<Option<Quiz>, EngineError>;

    async fn insert_quiz(&self, quiz: &Quiz) -> Result<(), EngineError>;

    /// Overwrites the defining fields. Leaves `attempted_users` alone.
    /// `Conflict` once any student has submitted, checked in the same step
    /// as the write.
    async fn update_quiz(&self, quiz: &Quiz) -> Result<(), EngineError>;

    /// Removes the quiz and its attempts. `NotFound` if absent, `Conflict`
    /// once any student has submitted, checked in the same step as the delete.
    async fn delete_quiz(&self, id: Uuid) -> Result<(), EngineError>;
}

#[async_trait]
pub trait AttemptStore: Send + Sync {
    /// Stores `attempt` as the only attempt for its (student, quiz) pair,
    /// replacing whatever was there in one step.
    /// `Conflict` if a question in its set was deleted after it was drawn.
    async fn replace_attempt(&self, attempt: &Attempt) -> Result<(), EngineError>;

    async fn find_attempt(
        &self,
        student_id: Uuid,
        quiz_id: Uuid,
    ) -> Result<Option<Attempt>, EngineError>;

    /// Persists a graded attempt and adds the student to the quiz's
    /// `attempted_users`. Both writes land or neither does.
    /// Fails with `InvalidSession` if the stored attempt is no longer the
    /// open attempt with `attempt.id`.
    async fn complete_attempt(&self, attempt: &Attempt) -> Result<(), EngineError>;

    /// Closed attempts by `student_id` against any of `quiz_ids`.
    async fn closed_attempts(
        &self,
        student_id: Uuid,
        quiz_ids: &[Uuid],
    ) -> Result<Vec<Attempt>, EngineError>;

    /// Closed attempts by anyone against any of `quiz_ids`.
    async fn closed_attempts_for_quizzes(
        &self,
        quiz_ids: &[Uuid],
    ) -> Result<Vec<Attempt>, EngineError>;
}

#[async_trait]
pub trait StudentStore: Send + Sync {
    async fn get_student(&self, id: Uuid) -> Result<Option<Student>, EngineError>;

    async fn set_tier(&self, id: Uuid, tier: Tier) -> Result<(), EngineError>;

    /// Idempotent.
    async fn mark_module_completed(&self, id: Uuid, module_id: Uuid) -> Result<(), EngineError>;
}

#[async_trait]
pub trait ModuleStore: Send + Sync {
    async fn get_module(&self, id: Uuid) -> Result<Option<CourseModule>, EngineError>;
}

/// Lesson-completion oracle owned by the course side of the application.
#[async_trait]
pub trait LessonProgress: Send + Sync {
    async fn is_lesson_complete(&self, lesson_id: Uuid, student_id: Uuid)
    -> Result<bool, EngineError>;
}

/// Everything the engine persists through.
pub trait Store: QuestionBank + QuizStore + AttemptStore + StudentStore + ModuleStore {}

impl<T> Store for T where T: QuestionBank + QuizStore + AttemptStore + StudentStore + ModuleStore {}
