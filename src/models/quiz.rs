// src/models/quiz.rs

use std::{collections::BTreeSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    config::DEFAULT_TIME_LIMIT_MINUTES,
    error::EngineError,
    models::question::QuestionType,
};

/// Which question types a quiz draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuizType {
    MultipleChoice,
    TrueFalse,
    Both,
}

impl QuizType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuizType::MultipleChoice => "multiple-choice",
            QuizType::TrueFalse => "true-false",
            QuizType::Both => "both",
        }
    }

    /// The single question type this quiz is restricted to, if any.
    pub fn single_type(&self) -> Option<QuestionType> {
        match self {
            QuizType::MultipleChoice => Some(QuestionType::MultipleChoice),
            QuizType::TrueFalse => Some(QuestionType::TrueFalse),
            QuizType::Both => None,
        }
    }
}

impl fmt::Display for QuizType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuizType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "multiple-choice" => Ok(QuizType::MultipleChoice),
            "true-false" => Ok(QuizType::TrueFalse),
            "both" => Ok(QuizType::Both),
            other => Err(EngineError::BadRequest(format!("Invalid quiz type '{}'", other))),
        }
    }
}

/// Quiz definition owned by a module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    pub id: Uuid,

    /// Owning module; questions are drawn from its bank.
    pub module_id: Uuid,

    /// Unique within the module.
    pub name: String,

    /// Exact number of questions each attempt draws.
    pub question_count: usize,

    /// Question types the draw may use.
    pub quiz_type: QuizType,

    /// Stored for clients; not enforced at submission.
    pub time_limit_minutes: u32,

    /// Students who have submitted at least once.
    pub attempted_users: BTreeSet<Uuid>,
}

impl Quiz {
    /// Once anyone has submitted, the definition is frozen.
    pub fn is_locked(&self) -> bool {
        !self.attempted_users.is_empty()
    }
}

/// DTO for creating a quiz.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewQuiz {
    pub module_id: Uuid,

    #[validate(length(min = 1, max = 200))]
    pub name: String,

    /// At least one question.
    #[validate(range(min = 1, max = 500))]
    pub question_count: usize,

    pub quiz_type: QuizType,

    /// Minutes, defaults to 30.
    #[validate(range(min = 1))]
    #[serde(default = "default_time_limit")]
    pub time_limit_minutes: u32,
}

impl NewQuiz {
    pub fn into_quiz(self) -> Quiz {
        Quiz {
            id: Uuid::new_v4(),
            module_id: self.module_id,
            name: self.name,
            question_count: self.question_count,
            quiz_type: self.quiz_type,
            time_limit_minutes: self.time_limit_minutes,
            attempted_users: BTreeSet::new(),
        }
    }
}

fn default_time_limit() -> u32 {
    DEFAULT_TIME_LIMIT_MINUTES
}

/// DTO for updating a quiz. Fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct QuizUpdate {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(range(min = 1, max = 500))]
    pub question_count: Option<usize>,
    pub quiz_type: Option<QuizType>,
    #[validate(range(min = 1))]
    pub time_limit_minutes: Option<u32>,
}

impl QuizUpdate {
    pub fn apply_to(self, quiz: &mut Quiz) {
        if let Some(name) = self.name {
            quiz.name = name;
        }
        if let Some(count) = self.question_count {
            quiz.question_count = count;
        }
        if let Some(quiz_type) = self.quiz_type {
            quiz.quiz_type = quiz_type;
        }
        if let Some(minutes) = self.time_limit_minutes {
            quiz.time_limit_minutes = minutes;
        }
    }
}
