// src/store/postgres.rs

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction, types::Json};
use uuid::Uuid;

use crate::{
    error::EngineError,
    models::{
        attempt::{AnswerRecord, Attempt, QuestionSet},
        module::CourseModule,
        question::{Difficulty, Question, QuestionType},
        quiz::Quiz,
        student::{Student, Tier},
    },
    store::{AttemptStore, LessonProgress, ModuleStore, QuestionBank, QuizStore, StudentStore},
};

const QUESTION_COLUMNS: &str = r#"
    id,
    module_id,
    type AS question_type,
    prompt,
    options,
    correct_answer,
    difficulty
"#;

const QUIZ_COLUMNS: &str = r#"
    q.id,
    q.module_id,
    q.name,
    q.question_count,
    q.quiz_type,
    q.time_limit_minutes,
    ARRAY(
        SELECT u.student_id FROM quiz_attempted_users u WHERE u.quiz_id = q.id
    ) AS attempted_users
"#;

const ATTEMPT_COLUMNS: &str = r#"
    id,
    student_id,
    quiz_id,
    question_ids,
    answers,
    correct_answers,
    total_answered,
    score,
    started_at,
    completed_at
"#;

/// Row shape of the `questions` table.
#[derive(FromRow)]
struct QuestionRow {
    id: Uuid,
    module_id: Uuid,
    question_type: String,
    prompt: String,
    options: Json<Vec<String>>,
    correct_answer: String,
    difficulty: String,
}

impl TryFrom<QuestionRow> for Question {
    type Error = EngineError;

    fn try_from(row: QuestionRow) -> Result<Self, Self::Error> {
        Ok(Question {
            id: row.id,
            module_id: row.module_id,
            question_type: row.question_type.parse()?,
            prompt: row.prompt,
            options: row.options.0,
            correct_answer: row.correct_answer,
            difficulty: row.difficulty.parse()?,
        })
    }
}

#[derive(FromRow)]
struct QuizRow {
    id: Uuid,
    module_id: Uuid,
    name: String,
    question_count: i32,
    quiz_type: String,
    time_limit_minutes: i32,
    attempted_users: Vec<Uuid>,
}

impl TryFrom<QuizRow> for Quiz {
    type Error = EngineError;

    fn try_from(row: QuizRow) -> Result<Self, Self::Error> {
        Ok(Quiz {
            id: row.id,
            module_id: row.module_id,
            name: row.name,
            question_count: from_db_int(row.question_count, "question_count")?,
            quiz_type: row.quiz_type.parse()?,
            time_limit_minutes: u32::try_from(row.time_limit_minutes).map_err(|_| {
                EngineError::Internal("Stored time limit is negative".to_string())
            })?,
            attempted_users: row.attempted_users.into_iter().collect(),
        })
    }
}

#[derive(FromRow)]
struct AttemptRow {
    id: Uuid,
    student_id: Uuid,
    quiz_id: Uuid,
    question_ids: Vec<Uuid>,
    answers: Json<Vec<AnswerRecord>>,
    correct_answers: i32,
    total_answered: i32,
    score: f64,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl TryFrom<AttemptRow> for Attempt {
    type Error = EngineError;

    fn try_from(row: AttemptRow) -> Result<Self, Self::Error> {
        Ok(Attempt {
            id: row.id,
            student_id: row.student_id,
            quiz_id: row.quiz_id,
            question_ids: QuestionSet::new(row.question_ids),
            answers: row.answers.0,
            correct_answers: from_db_int(row.correct_answers, "correct_answers")?,
            total_answered: from_db_int(row.total_answered, "total_answered")?,
            score: row.score,
            started_at: row.started_at,
            completed_at: row.completed_at,
        })
    }
}

#[derive(FromRow)]
struct StudentRow {
    id: Uuid,
    tier: String,
    completed_modules: Vec<Uuid>,
}

#[derive(FromRow)]
struct ModuleRow {
    id: Uuid,
    title: String,
    lesson_ids: Vec<Uuid>,
}

fn from_db_int(value: i32, column: &str) -> Result<usize, EngineError> {
    usize::try_from(value)
        .map_err(|_| EngineError::Internal(format!("Stored {} is negative: {}", column, value)))
}

fn to_db_int(value: usize, column: &str) -> Result<i32, EngineError> {
    i32::try_from(value)
        .map_err(|_| EngineError::BadRequest(format!("{} is too large: {}", column, value)))
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}

async fn question_held(
    tx: &mut Transaction<'_, Postgres>,
    question_id: Uuid,
) -> Result<bool, EngineError> {
    let held = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM attempts WHERE $1 = ANY(question_ids))",
    )
    .bind(question_id)
    .fetch_one(&mut **tx)
    .await?;
    Ok(held)
}

/// Takes the quiz row lock that `complete_attempt` shares.
async fn lock_quiz(tx: &mut Transaction<'_, Postgres>, quiz_id: Uuid) -> Result<(), EngineError> {
    sqlx::query_scalar::<_, Uuid>("SELECT id FROM quizzes WHERE id = $1 FOR UPDATE")
        .bind(quiz_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| EngineError::NotFound(format!("Quiz with ID {} not found", quiz_id)))?;
    Ok(())
}

async fn quiz_attempted(
    tx: &mut Transaction<'_, Postgres>,
    quiz_id: Uuid,
) -> Result<bool, EngineError> {
    let attempted = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM quiz_attempted_users WHERE quiz_id = $1)",
    )
    .bind(quiz_id)
    .fetch_one(&mut **tx)
    .await?;
    Ok(attempted)
}

/// Postgres-backed store. The schema lives in `migrations/`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates a module and its lessons in lesson order.
    pub async fn insert_module(&self, module: &CourseModule) -> Result<(), EngineError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO modules (id, title) VALUES ($1, $2)")
            .bind(module.id)
            .bind(&module.title)
            .execute(&mut *tx)
            .await?;

        for (position, lesson_id) in module.lesson_ids.iter().enumerate() {
            sqlx::query("INSERT INTO lessons (id, module_id, position) VALUES ($1, $2, $3)")
                .bind(lesson_id)
                .bind(module.id)
                .bind(to_db_int(position, "position")?)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn insert_student(&self, student: &Student) -> Result<(), EngineError> {
        sqlx::query("INSERT INTO students (id, tier) VALUES ($1, $2)")
            .bind(student.id)
            .bind(student.tier.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn mark_lesson_complete(
        &self,
        lesson_id: Uuid,
        student_id: Uuid,
    ) -> Result<(), EngineError> {
        sqlx::query(
            r#"
            INSERT INTO lesson_completions (lesson_id, student_id)
            VALUES ($1, $2)
            ON CONFLICT (lesson_id, student_id) DO NOTHING
            "#,
        )
        .bind(lesson_id)
        .bind(student_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl QuestionBank for PgStore {
    async fn eligible_questions(
        &self,
        module_id: Uuid,
        difficulties: &[Difficulty],
    ) -> Result<Vec<Question>, EngineError> {
        let difficulties: Vec<String> = difficulties.iter().map(|d| d.as_str().to_string()).collect();

        let rows = sqlx::query_as::<_, QuestionRow>(&format!(
            "SELECT {} FROM questions WHERE module_id = $1 AND difficulty = ANY($2) ORDER BY RANDOM()",
            QUESTION_COLUMNS
        ))
        .bind(module_id)
        .bind(difficulties)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Question::try_from).collect()
    }

    async fn questions_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Question>, EngineError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, QuestionRow>(&format!(
            "SELECT {} FROM questions WHERE id = ANY($1)",
            QUESTION_COLUMNS
        ))
        .bind(ids.to_vec())
        .fetch_all(&self.pool)
        .await?;

        // Keep the caller's order; duplicates collapse to the first occurrence.
        let mut by_id: HashMap<Uuid, QuestionRow> = rows.into_iter().map(|r| (r.id, r)).collect();
        ids.iter()
            .filter_map(|id| by_id.remove(id))
            .map(Question::try_from)
            .collect()
    }

    async fn get_question(&self, id: Uuid) -> Result<Option<Question>, EngineError> {
        sqlx::query_as::<_, QuestionRow>(&format!(
            "SELECT {} FROM questions WHERE id = $1",
            QUESTION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(Question::try_from)
        .transpose()
    }

    async fn has_duplicate_question(
        &self,
        module_id: Uuid,
        prompt: &str,
        question_type: QuestionType,
        difficulty: Difficulty,
    ) -> Result<bool, EngineError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM questions
                WHERE module_id = $1 AND prompt = $2 AND type = $3 AND difficulty = $4
            )
            "#,
        )
        .bind(module_id)
        .bind(prompt)
        .bind(question_type.as_str())
        .bind(difficulty.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn insert_question(&self, question: &Question) -> Result<(), EngineError> {
        sqlx::query(
            r#"
            INSERT INTO questions (id, module_id, type, prompt, options, correct_answer, difficulty)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(question.id)
        .bind(question.module_id)
        .bind(question.question_type.as_str())
        .bind(&question.prompt)
        .bind(Json(&question.options))
        .bind(&question.correct_answer)
        .bind(question.difficulty.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_question(&self, question: &Question) -> Result<(), EngineError> {
        let mut tx = self.pool.begin().await?;

        let stored_answer = sqlx::query_scalar::<_, String>(
            "SELECT correct_answer FROM questions WHERE id = $1 FOR UPDATE",
        )
        .bind(question.id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| EngineError::NotFound("Question not found".to_string()))?;

        if stored_answer != question.correct_answer && question_held(&mut tx, question.id).await? {
            return Err(EngineError::Conflict(
                "Correct answer cannot change while the question is part of an attempt".to_string(),
            ));
        }

        sqlx::query(
            r#"
            UPDATE questions
            SET type = $2, prompt = $3, options = $4, correct_answer = $5, difficulty = $6
            WHERE id = $1
            "#,
        )
        .bind(question.id)
        .bind(question.question_type.as_str())
        .bind(&question.prompt)
        .bind(Json(&question.options))
        .bind(&question.correct_answer)
        .bind(question.difficulty.as_str())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn delete_question(&self, id: Uuid) -> Result<(), EngineError> {
        let mut tx = self.pool.begin().await?;

        // Row lock first: a concurrent start holds FOR SHARE on the drawn rows.
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM questions WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| EngineError::NotFound("Question not found".to_string()))?;

        if question_held(&mut tx, id).await? {
            return Err(EngineError::Conflict(
                "Question cannot be deleted as it is part of an attempt".to_string(),
            ));
        }

        sqlx::query("DELETE FROM questions WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl QuizStore for PgStore {
    async fn get_quiz(&self, id: Uuid) -> Result<Option<Quiz>, EngineError> {
        sqlx::query_as::<_, QuizRow>(&format!("SELECT {} FROM quizzes q WHERE q.id = $1", QUIZ_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Quiz::try_from)
            .transpose()
    }

    async fn quizzes_in_module(&self, module_id: Uuid) -> Result<Vec<Quiz>, EngineError> {
        let rows = sqlx::query_as::<_, QuizRow>(&format!(
            "SELECT {} FROM quizzes q WHERE q.module_id = $1 ORDER BY q.created_at",
            QUIZ_COLUMNS
        ))
        .bind(module_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Quiz::try_from).collect()
    }

    async fn quizzes_attempted_by(&self, student_id: Uuid) -> Result<Vec<Quiz>, EngineError> {
        let rows = sqlx::query_as::<_, QuizRow>(&format!(
            r#"
            SELECT {} FROM quizzes q
            WHERE EXISTS (
                SELECT 1 FROM quiz_attempted_users u
                WHERE u.quiz_id = q.id AND u.student_id = $1
            )
            "#,
            QUIZ_COLUMNS
        ))
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Quiz::try_from).collect()
    }

    async fn find_quiz_by_name(
        &self,
        module_id: Uuid,
        name: &str,
    ) -> Result<Option<Quiz>, EngineError> {
        sqlx::query_as::<_, QuizRow>(&format!(
            "SELECT {} FROM quizzes q WHERE q.module_id = $1 AND q.name = $2",
            QUIZ_COLUMNS
        ))
        .bind(module_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?
        .map(Quiz::try_from)
        .transpose()
    }

    async fn insert_quiz(&self, quiz: &Quiz) -> Result<(), EngineError> {
        sqlx::query(
            r#"
            INSERT INTO quizzes (id, module_id, name, question_count, quiz_type, time_limit_minutes)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(quiz.id)
        .bind(quiz.module_id)
        .bind(&quiz.name)
        .bind(to_db_int(quiz.question_count, "question_count")?)
        .bind(quiz.quiz_type.as_str())
        .bind(to_db_int(quiz.time_limit_minutes as usize, "time_limit_minutes")?)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                EngineError::Conflict(format!("Quiz name '{}' is already used in this module", quiz.name))
            } else {
                EngineError::from(e)
            }
        })?;

        Ok(())
    }

    async fn update_quiz(&self, quiz: &Quiz) -> Result<(), EngineError> {
        let mut tx = self.pool.begin().await?;

        lock_quiz(&mut tx, quiz.id).await?;
        if quiz_attempted(&mut tx, quiz.id).await? {
            return Err(EngineError::Conflict(
                "Quiz cannot be modified as it has been attempted by users".to_string(),
            ));
        }

        sqlx::query(
            r#"
            UPDATE quizzes
            SET name = $2, question_count = $3, quiz_type = $4, time_limit_minutes = $5
            WHERE id = $1
            "#,
        )
        .bind(quiz.id)
        .bind(&quiz.name)
        .bind(to_db_int(quiz.question_count, "question_count")?)
        .bind(quiz.quiz_type.as_str())
        .bind(to_db_int(quiz.time_limit_minutes as usize, "time_limit_minutes")?)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                EngineError::Conflict(format!("Quiz name '{}' is already used in this module", quiz.name))
            } else {
                EngineError::from(e)
            }
        })?;

        tx.commit().await?;
        Ok(())
    }

    async fn delete_quiz(&self, id: Uuid) -> Result<(), EngineError> {
        let mut tx = self.pool.begin().await?;

        lock_quiz(&mut tx, id).await?;
        if quiz_attempted(&mut tx, id).await? {
            return Err(EngineError::Conflict(
                "Quiz cannot be deleted as it has been attempted by users".to_string(),
            ));
        }

        // Open attempts cascade with the quiz.
        sqlx::query("DELETE FROM quizzes WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl AttemptStore for PgStore {
    async fn replace_attempt(&self, attempt: &Attempt) -> Result<(), EngineError> {
        let mut tx = self.pool.begin().await?;

        // Share-lock the drawn questions so a concurrent delete waits for us or wins first.
        let present = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM questions WHERE id = ANY($1) FOR SHARE",
        )
        .bind(attempt.question_ids.as_slice().to_vec())
        .fetch_all(&mut *tx)
        .await?;
        if present.len() != attempt.question_ids.len() {
            return Err(EngineError::Conflict(
                "A drawn question was deleted. Start the quiz again".to_string(),
            ));
        }

        // Upsert on (student_id, quiz_id): the new attempt supersedes any previous one.
        sqlx::query(
            r#"
            INSERT INTO attempts (
                id, student_id, quiz_id, question_ids, answers,
                correct_answers, total_answered, score, started_at, completed_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (student_id, quiz_id) DO UPDATE SET
                id = EXCLUDED.id,
                question_ids = EXCLUDED.question_ids,
                answers = EXCLUDED.answers,
                correct_answers = EXCLUDED.correct_answers,
                total_answered = EXCLUDED.total_answered,
                score = EXCLUDED.score,
                started_at = EXCLUDED.started_at,
                completed_at = EXCLUDED.completed_at
            "#,
        )
        .bind(attempt.id)
        .bind(attempt.student_id)
        .bind(attempt.quiz_id)
        .bind(attempt.question_ids.as_slice().to_vec())
        .bind(Json(&attempt.answers))
        .bind(to_db_int(attempt.correct_answers, "correct_answers")?)
        .bind(to_db_int(attempt.total_answered, "total_answered")?)
        .bind(attempt.score)
        .bind(attempt.started_at)
        .bind(attempt.completed_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn find_attempt(
        &self,
        student_id: Uuid,
        quiz_id: Uuid,
    ) -> Result<Option<Attempt>, EngineError> {
        sqlx::query_as::<_, AttemptRow>(&format!(
            "SELECT {} FROM attempts WHERE student_id = $1 AND quiz_id = $2",
            ATTEMPT_COLUMNS
        ))
        .bind(student_id)
        .bind(quiz_id)
        .fetch_optional(&self.pool)
        .await?
        .map(Attempt::try_from)
        .transpose()
    }

    async fn complete_attempt(&self, attempt: &Attempt) -> Result<(), EngineError> {
        let mut tx = self.pool.begin().await?;

        // Quiz row before attempt row, the same order delete_quiz takes them.
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM quizzes WHERE id = $1 FOR SHARE")
            .bind(attempt.quiz_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| EngineError::NotFound("Quiz not found".to_string()))?;

        // Lock the governing row so a concurrent restart waits for us.
        let current = sqlx::query_as::<_, (Uuid, Option<DateTime<Utc>>)>(
            "SELECT id, completed_at FROM attempts WHERE student_id = $1 AND quiz_id = $2 FOR UPDATE",
        )
        .bind(attempt.student_id)
        .bind(attempt.quiz_id)
        .fetch_optional(&mut *tx)
        .await?;

        match current {
            Some((id, None)) if id == attempt.id => {}
            _ => {
                return Err(EngineError::InvalidSession(
                    "Attempt is no longer open".to_string(),
                ));
            }
        }

        sqlx::query(
            r#"
            UPDATE attempts
            SET question_ids = $2, answers = $3, correct_answers = $4,
                total_answered = $5, score = $6, completed_at = $7
            WHERE id = $1
            "#,
        )
        .bind(attempt.id)
        .bind(attempt.question_ids.as_slice().to_vec())
        .bind(Json(&attempt.answers))
        .bind(to_db_int(attempt.correct_answers, "correct_answers")?)
        .bind(to_db_int(attempt.total_answered, "total_answered")?)
        .bind(attempt.score)
        .bind(attempt.completed_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO quiz_attempted_users (quiz_id, student_id)
            VALUES ($1, $2)
            ON CONFLICT (quiz_id, student_id) DO NOTHING
            "#,
        )
        .bind(attempt.quiz_id)
        .bind(attempt.student_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn closed_attempts(
        &self,
        student_id: Uuid,
        quiz_ids: &[Uuid],
    ) -> Result<Vec<Attempt>, EngineError> {
        let rows = sqlx::query_as::<_, AttemptRow>(&format!(
            r#"
            SELECT {} FROM attempts
            WHERE student_id = $1 AND quiz_id = ANY($2) AND completed_at IS NOT NULL
            "#,
            ATTEMPT_COLUMNS
        ))
        .bind(student_id)
        .bind(quiz_ids.to_vec())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Attempt::try_from).collect()
    }

    async fn closed_attempts_for_quizzes(
        &self,
        quiz_ids: &[Uuid],
    ) -> Result<Vec<Attempt>, EngineError> {
        let rows = sqlx::query_as::<_, AttemptRow>(&format!(
            "SELECT {} FROM attempts WHERE quiz_id = ANY($1) AND completed_at IS NOT NULL",
            ATTEMPT_COLUMNS
        ))
        .bind(quiz_ids.to_vec())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Attempt::try_from).collect()
    }
}

#[async_trait]
impl StudentStore for PgStore {
    async fn get_student(&self, id: Uuid) -> Result<Option<Student>, EngineError> {
        let row = sqlx::query_as::<_, StudentRow>(
            r#"
            SELECT
                s.id,
                s.tier,
                ARRAY(
                    SELECT c.module_id FROM student_completed_modules c WHERE c.student_id = s.id
                ) AS completed_modules
            FROM students s
            WHERE s.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| -> Result<Student, EngineError> {
            Ok(Student {
                id: r.id,
                tier: r.tier.parse::<Tier>()?,
                completed_modules: r.completed_modules.into_iter().collect(),
            })
        })
        .transpose()
    }

    async fn set_tier(&self, id: Uuid, tier: Tier) -> Result<(), EngineError> {
        let result = sqlx::query("UPDATE students SET tier = $2 WHERE id = $1")
            .bind(id)
            .bind(tier.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(EngineError::NotFound("Student not found".to_string()));
        }
        Ok(())
    }

    async fn mark_module_completed(&self, id: Uuid, module_id: Uuid) -> Result<(), EngineError> {
        sqlx::query(
            r#"
            INSERT INTO student_completed_modules (student_id, module_id)
            VALUES ($1, $2)
            ON CONFLICT (student_id, module_id) DO NOTHING
            "#,
        )
        .bind(id)
        .bind(module_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl ModuleStore for PgStore {
    async fn get_module(&self, id: Uuid) -> Result<Option<CourseModule>, EngineError> {
        let row = sqlx::query_as::<_, ModuleRow>(
            r#"
            SELECT
                m.id,
                m.title,
                ARRAY(
                    SELECT l.id FROM lessons l WHERE l.module_id = m.id ORDER BY l.position, l.id
                ) AS lesson_ids
            FROM modules m
            WHERE m.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| CourseModule {
            id: r.id,
            title: r.title,
            lesson_ids: r.lesson_ids,
        }))
    }
}

#[async_trait]
impl LessonProgress for PgStore {
    async fn is_lesson_complete(
        &self,
        lesson_id: Uuid,
        student_id: Uuid,
    ) -> Result<bool, EngineError> {
        let completed = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM lesson_completions WHERE lesson_id = $1 AND student_id = $2)",
        )
        .bind(lesson_id)
        .bind(student_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(completed)
    }
}
