// src/store/memory.rs

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;
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
    store::{AttemptStore, LessonProgress, ModuleStore, QuestionBank, QuizStore, StudentStore},
};

#[derive(Default)]
struct Inner {
    modules: HashMap<Uuid, CourseModule>,
    // Insertion order is the order the selector sees.
    questions: Vec<Question>,
    quizzes: HashMap<Uuid, Quiz>,
    attempts: HashMap<(Uuid, Uuid), Attempt>,
    students: HashMap<Uuid, Student>,
}

/// In-process store keyed the same way the Postgres schema is.
/// Attempts are keyed by (student, quiz), so a pair can never hold two.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_module(&self, module: CourseModule) {
        self.inner.write().await.modules.insert(module.id, module);
    }

    pub async fn insert_student(&self, student: Student) {
        self.inner.write().await.students.insert(student.id, student);
    }

    /// Number of attempt records held for a pair. At most one by construction.
    pub async fn attempt_count(&self, student_id: Uuid, quiz_id: Uuid) -> usize {
        usize::from(
            self.inner
                .read()
                .await
                .attempts
                .contains_key(&(student_id, quiz_id)),
        )
    }
}

impl Inner {
    fn holds_question(&self, question_id: Uuid) -> bool {
        self.attempts
            .values()
            .any(|a| a.question_ids.contains(&question_id))
    }
}

fn closed_matching<'a>(
    attempts: impl Iterator<Item = &'a Attempt>,
    quiz_ids: &[Uuid],
) -> Vec<Attempt> {
    let wanted: HashSet<&Uuid> = quiz_ids.iter().collect();
    attempts
        .filter(|a| a.is_closed() && wanted.contains(&a.quiz_id))
        .cloned()
        .collect()
}

#[async_trait]
impl QuestionBank for MemoryStore {
    async fn eligible_questions(
        &self,
        module_id: Uuid,
        difficulties: &[Difficulty],
    ) -> Result<Vec<Question>, EngineError> {
        let inner = self.inner.read().await;
        Ok(inner
            .questions
            .iter()
            .filter(|q| q.module_id == module_id && difficulties.contains(&q.difficulty))
            .cloned()
            .collect())
    }

    async fn questions_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Question>, EngineError> {
        let inner = self.inner.read().await;
        let mut seen = HashSet::new();
        Ok(ids
            .iter()
            .filter(|id| seen.insert(**id))
            .filter_map(|id| inner.questions.iter().find(|q| q.id == *id).cloned())
            .collect())
    }

    async fn get_question(&self, id: Uuid) -> Result<Option<Question>, EngineError> {
        let inner = self.inner.read().await;
        Ok(inner.questions.iter().find(|q| q.id == id).cloned())
    }

    async fn has_duplicate_question(
        &self,
        module_id: Uuid,
        prompt: &str,
        question_type: QuestionType,
        difficulty: Difficulty,
    ) -> Result<bool, EngineError> {
        let inner = self.inner.read().await;
        Ok(inner.questions.iter().any(|q| {
            q.module_id == module_id
                && q.prompt == prompt
                && q.question_type == question_type
                && q.difficulty == difficulty
        }))
    }

    async fn insert_question(&self, question: &Question) -> Result<(), EngineError> {
        self.inner.write().await.questions.push(question.clone());
        Ok(())
    }

    async fn update_question(&self, question: &Question) -> Result<(), EngineError> {
        let mut inner = self.inner.write().await;
        let index = inner
            .questions
            .iter()
            .position(|q| q.id == question.id)
            .ok_or_else(|| EngineError::NotFound("Question not found".to_string()))?;

        let key_changed = inner.questions[index].correct_answer != question.correct_answer;
        if key_changed && inner.holds_question(question.id) {
            return Err(EngineError::Conflict(
                "Correct answer cannot change while the question is part of an attempt".to_string(),
            ));
        }

        inner.questions[index] = question.clone();
        Ok(())
    }

    async fn delete_question(&self, id: Uuid) -> Result<(), EngineError> {
        let mut inner = self.inner.write().await;
        if !inner.questions.iter().any(|q| q.id == id) {
            return Err(EngineError::NotFound("Question not found".to_string()));
        }
        if inner.holds_question(id) {
            return Err(EngineError::Conflict(
                "Question cannot be deleted as it is part of an attempt".to_string(),
            ));
        }

        inner.questions.retain(|q| q.id != id);
        Ok(())
    }
}

#[async_trait]
impl QuizStore for MemoryStore {
    async fn get_quiz(&self, id: Uuid) -> Result<Option<Quiz>, EngineError> {
        Ok(self.inner.read().await.quizzes.get(&id).cloned())
    }

    async fn quizzes_in_module(&self, module_id: Uuid) -> Result<Vec<Quiz>, EngineError> {
        let inner = self.inner.read().await;
        Ok(inner
            .quizzes
            .values()
            .filter(|q| q.module_id == module_id)
            .cloned()
            .collect())
    }

    async fn quizzes_attempted_by(&self, student_id: Uuid) -> Result<Vec<Quiz>, EngineError> {
        let inner = self.inner.read().await;
        Ok(inner
            .quizzes
            .values()
            .filter(|q| q.attempted_users.contains(&student_id))
            .cloned()
            .collect())
    }

    async fn find_quiz_by_name(
        &self,
        module_id: Uuid,
        name: &str,
    ) -> Result<Option<Quiz>, EngineError> {
        let inner = self.inner.read().await;
        Ok(inner
            .quizzes
            .values()
            .find(|q| q.module_id == module_id && q.name == name)
            .cloned())
    }

    async fn insert_quiz(&self, quiz: &Quiz) -> Result<(), EngineError> {
        self.inner.write().await.quizzes.insert(quiz.id, quiz.clone());
        Ok(())
    }

    async fn update_quiz(&self, quiz: &Quiz) -> Result<(), EngineError> {
        let mut inner = self.inner.write().await;
        let stored = inner
            .quizzes
            .get_mut(&quiz.id)
            .ok_or_else(|| EngineError::NotFound("Quiz not found".to_string()))?;
        if stored.is_locked() {
            return Err(EngineError::Conflict(
                "Quiz cannot be modified as it has been attempted by users".to_string(),
            ));
        }

        stored.name = quiz.name.clone();
        stored.question_count = quiz.question_count;
        stored.quiz_type = quiz.quiz_type;
        stored.time_limit_minutes = quiz.time_limit_minutes;
        Ok(())
    }

    async fn delete_quiz(&self, id: Uuid) -> Result<(), EngineError> {
        let mut inner = self.inner.write().await;
        let locked = inner
            .quizzes
            .get(&id)
            .ok_or_else(|| EngineError::NotFound(format!("Quiz with ID {} not found", id)))?
            .is_locked();
        if locked {
            return Err(EngineError::Conflict(
                "Quiz cannot be deleted as it has been attempted by users".to_string(),
            ));
        }

        inner.quizzes.remove(&id);
        // Attempts go with their quiz, as the foreign key cascade does in Postgres.
        inner.attempts.retain(|(_, quiz_id), _| *quiz_id != id);
        Ok(())
    }
}

#[async_trait]
impl AttemptStore for MemoryStore {
    async fn replace_attempt(&self, attempt: &Attempt) -> Result<(), EngineError> {
        let mut inner = self.inner.write().await;
        let all_present = attempt
            .question_ids
            .iter()
            .all(|id| inner.questions.iter().any(|q| q.id == *id));
        if !all_present {
            return Err(EngineError::Conflict(
                "A drawn question was deleted. Start the quiz again".to_string(),
            ));
        }

        inner
            .attempts
            .insert((attempt.student_id, attempt.quiz_id), attempt.clone());
        Ok(())
    }

    async fn find_attempt(
        &self,
        student_id: Uuid,
        quiz_id: Uuid,
    ) -> Result<Option<Attempt>, EngineError> {
        Ok(self
            .inner
            .read()
            .await
            .attempts
            .get(&(student_id, quiz_id))
            .cloned())
    }

    async fn complete_attempt(&self, attempt: &Attempt) -> Result<(), EngineError> {
        let mut inner = self.inner.write().await;
        let key = (attempt.student_id, attempt.quiz_id);

        let still_open = inner
            .attempts
            .get(&key)
            .is_some_and(|stored| stored.id == attempt.id && stored.is_open());
        if !still_open {
            return Err(EngineError::InvalidSession(
                "Attempt is no longer open".to_string(),
            ));
        }

        let quiz = inner
            .quizzes
            .get_mut(&attempt.quiz_id)
            .ok_or_else(|| EngineError::NotFound("Quiz not found".to_string()))?;
        quiz.attempted_users.insert(attempt.student_id);

        inner.attempts.insert(key, attempt.clone());
        Ok(())
    }

    async fn closed_attempts(
        &self,
        student_id: Uuid,
        quiz_ids: &[Uuid],
    ) -> Result<Vec<Attempt>, EngineError> {
        let inner = self.inner.read().await;
        Ok(closed_matching(
            inner.attempts.values().filter(|a| a.student_id == student_id),
            quiz_ids,
        ))
    }

    async fn closed_attempts_for_quizzes(
        &self,
        quiz_ids: &[Uuid],
    ) -> Result<Vec<Attempt>, EngineError> {
        let inner = self.inner.read().await;
        Ok(closed_matching(inner.attempts.values(), quiz_ids))
    }
}

#[async_trait]
impl StudentStore for MemoryStore {
    async fn get_student(&self, id: Uuid) -> Result<Option<Student>, EngineError> {
        Ok(self.inner.read().await.students.get(&id).cloned())
    }

    async fn set_tier(&self, id: Uuid, tier: Tier) -> Result<(), EngineError> {
        let mut inner = self.inner.write().await;
        let student = inner
            .students
            .get_mut(&id)
            .ok_or_else(|| EngineError::NotFound("Student not found".to_string()))?;
        student.tier = tier;
        Ok(())
    }

    async fn mark_module_completed(&self, id: Uuid, module_id: Uuid) -> Result<(), EngineError> {
        let mut inner = self.inner.write().await;
        let student = inner
            .students
            .get_mut(&id)
            .ok_or_else(|| EngineError::NotFound("Student not found".to_string()))?;
        student.completed_modules.insert(module_id);
        Ok(())
    }
}

#[async_trait]
impl ModuleStore for MemoryStore {
    async fn get_module(&self, id: Uuid) -> Result<Option<CourseModule>, EngineError> {
        Ok(self.inner.read().await.modules.get(&id).cloned())
    }
}

/// Lesson completions held as a set of (lesson, student) pairs.
#[derive(Default)]
pub struct MemoryLessonProgress {
    completed: RwLock<HashSet<(Uuid, Uuid)>>,
}

impl MemoryLessonProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn mark_complete(&self, lesson_id: Uuid, student_id: Uuid) {
        self.completed.write().await.insert((lesson_id, student_id));
    }
}

#[async_trait]
impl LessonProgress for MemoryLessonProgress {
    async fn is_lesson_complete(
        &self,
        lesson_id: Uuid,
        student_id: Uuid,
    ) -> Result<bool, EngineError> {
        Ok(self
            .completed
            .read()
            .await
            .contains(&(lesson_id, student_id)))
    }
}
