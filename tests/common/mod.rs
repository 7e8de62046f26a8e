// tests/common/mod.rs

#![allow(dead_code)]

use std::{collections::HashMap, sync::Arc};

use quiz_engine::{
    EngineState,
    models::{
        attempt::SubmittedAnswer,
        module::CourseModule,
        question::{Difficulty, NewQuestion, Question, QuestionType},
        quiz::{NewQuiz, Quiz, QuizType},
        student::{Student, Tier},
    },
    services::{authoring, session},
    store::{MemoryLessonProgress, MemoryStore, QuestionBank},
};
use uuid::Uuid;

pub struct TestApp {
    pub state: EngineState,
    pub store: Arc<MemoryStore>,
    pub lessons: Arc<MemoryLessonProgress>,
    pub module: CourseModule,
}

/// Builds an engine over the in-memory store with one module of `lesson_count` lessons.
pub async fn spawn_app(lesson_count: usize) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let lessons = Arc::new(MemoryLessonProgress::new());

    let module = CourseModule::new(
        "Module 1",
        (0..lesson_count).map(|_| Uuid::new_v4()).collect(),
    );
    store.insert_module(module.clone()).await;

    let state = EngineState::new(store.clone(), lessons.clone());

    TestApp {
        state,
        store,
        lessons,
        module,
    }
}

impl TestApp {
    pub async fn add_student(&self, tier: Tier) -> Uuid {
        let student = Student::new(tier);
        let id = student.id;
        self.store.insert_student(student).await;
        id
    }

    /// Seeds `count` questions. Multiple-choice answers are "A", true-false are "True".
    pub async fn add_questions(
        &self,
        question_type: QuestionType,
        difficulty: Difficulty,
        count: usize,
    ) -> Vec<Question> {
        let mut created = Vec::with_capacity(count);
        for _ in 0..count {
            let (options, answer) = match question_type {
                QuestionType::MultipleChoice => (vec!["A", "B", "C", "D"], "A"),
                QuestionType::TrueFalse => (vec!["True", "False"], "True"),
            };
            let payload = NewQuestion {
                module_id: self.module.id,
                question_type,
                prompt: format!("{} {} {}", question_type, difficulty, Uuid::new_v4()),
                options: options.into_iter().map(String::from).collect(),
                correct_answer: answer.to_string(),
                difficulty,
            };
            created.push(authoring::add_question(&self.state, payload).await.unwrap());
        }
        created
    }

    pub async fn add_quiz(&self, name: &str, question_count: usize, quiz_type: QuizType) -> Quiz {
        authoring::create_quiz(
            &self.state,
            NewQuiz {
                module_id: self.module.id,
                name: name.to_string(),
                question_count,
                quiz_type,
                time_limit_minutes: 30,
            },
        )
        .await
        .unwrap()
    }

    pub async fn complete_all_lessons(&self, student_id: Uuid) {
        for lesson_id in &self.module.lesson_ids {
            self.lessons.mark_complete(*lesson_id, student_id).await;
        }
    }

    /// Answers for `question_ids`: the first `correct` right, the rest wrong.
    pub async fn answers_for(&self, question_ids: &[Uuid], correct: usize) -> Vec<SubmittedAnswer> {
        let questions = self.store.questions_by_ids(question_ids).await.unwrap();
        let key: HashMap<Uuid, Question> = questions.into_iter().map(|q| (q.id, q)).collect();

        question_ids
            .iter()
            .enumerate()
            .map(|(i, id)| {
                let q = &key[id];
                let answer = if i < correct {
                    q.correct_answer.clone()
                } else {
                    q.options
                        .iter()
                        .find(|o| **o != q.correct_answer)
                        .cloned()
                        .unwrap()
                };
                SubmittedAnswer::new(id, answer)
            })
            .collect()
    }

    /// Starts and submits a quiz with `correct` right answers. Returns the score.
    pub async fn take_quiz(&self, quiz_id: Uuid, student_id: Uuid, correct: usize) -> f64 {
        let started = session::start_attempt(&self.state, quiz_id, student_id)
            .await
            .unwrap();
        let answers = self
            .answers_for(started.attempt.question_ids.as_slice(), correct)
            .await;
        session::submit_attempt(&self.state, quiz_id, student_id, &answers)
            .await
            .unwrap()
            .score
    }
}
