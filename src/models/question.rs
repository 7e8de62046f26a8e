// src/models/question.rs

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::EngineError;

pub const TRUE_FALSE_OPTIONS: [&str; 2] = ["True", "False"];
pub const MULTIPLE_CHOICE_OPTION_COUNT: usize = 4;

/// Shape of a single question in the bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionType {
    MultipleChoice,
    TrueFalse,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "multiple-choice",
            QuestionType::TrueFalse => "true-false",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "multiple-choice" => Ok(QuestionType::MultipleChoice),
            "true-false" => Ok(QuestionType::TrueFalse),
            other => Err(EngineError::BadRequest(format!(
                "Invalid question type '{}'. Must be 'multiple-choice' or 'true-false'",
                other
            ))),
        }
    }
}

/// Difficulty tag. Ordered from easiest to hardest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(EngineError::BadRequest(format!("Invalid difficulty '{}'", other))),
        }
    }
}

/// A reusable question in the bank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: Uuid,
    pub module_id: Uuid,
    pub question_type: QuestionType,
    pub prompt: String,
    pub options: Vec<String>,

    /// Always one of `options`.
    pub correct_answer: String,

    pub difficulty: Difficulty,
}

impl Question {
    /// Strips the answer key for client rendering.
    pub fn to_public(&self) -> PublicQuestion {
        PublicQuestion {
            id: self.id,
            question_type: self.question_type,
            prompt: self.prompt.clone(),
            options: self.options.clone(),
            difficulty: self.difficulty,
        }
    }
}

/// DTO for sending a question to the client (excludes the answer).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicQuestion {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub prompt: String,
    pub options: Vec<String>,
    pub difficulty: Difficulty,
}

/// DTO for adding a question to a module's bank.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewQuestion {
    pub module_id: Uuid,
    pub question_type: QuestionType,
    #[validate(length(min = 1, max = 1000))]
    pub prompt: String,
    #[validate(custom(function = validate_options))]
    pub options: Vec<String>,
    #[validate(length(min = 1, max = 500))]
    pub correct_answer: String,
    pub difficulty: Difficulty,
}

impl NewQuestion {
    /// Applies the per-type option rules on top of field validation.
    pub fn check_shape(&self) -> Result<(), EngineError> {
        self.validate()?;

        match self.question_type {
            QuestionType::TrueFalse => {
                let well_formed = self.options.len() == TRUE_FALSE_OPTIONS.len()
                    && TRUE_FALSE_OPTIONS
                        .iter()
                        .all(|expected| self.options.iter().any(|o| o == expected));
                if !well_formed {
                    return Err(EngineError::BadRequest(
                        "For true-false questions, options must be exactly [\"True\", \"False\"]"
                            .to_string(),
                    ));
                }
                if !TRUE_FALSE_OPTIONS.contains(&self.correct_answer.as_str()) {
                    return Err(EngineError::BadRequest(
                        "For true-false questions, the correct answer must be \"True\" or \"False\""
                            .to_string(),
                    ));
                }
            }
            QuestionType::MultipleChoice => {
                if self.options.len() != MULTIPLE_CHOICE_OPTION_COUNT {
                    return Err(EngineError::BadRequest(format!(
                        "For multiple-choice questions, exactly {} options are required",
                        MULTIPLE_CHOICE_OPTION_COUNT
                    )));
                }
                let mut distinct = self.options.clone();
                distinct.sort();
                distinct.dedup();
                if distinct.len() != self.options.len() {
                    return Err(EngineError::BadRequest(
                        "Multiple-choice options must be distinct".to_string(),
                    ));
                }
                if !self.options.contains(&self.correct_answer) {
                    return Err(EngineError::BadRequest(
                        "The correct answer must be one of the provided options".to_string(),
                    ));
                }
            }
        }

        Ok(())
    }

    pub fn into_question(self) -> Question {
        Question {
            id: Uuid::new_v4(),
            module_id: self.module_id,
            question_type: self.question_type,
            prompt: self.prompt,
            options: self.options,
            correct_answer: self.correct_answer,
            difficulty: self.difficulty,
        }
    }
}

/// DTO for editing a question. Fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct QuestionUpdate {
    pub question_type: Option<QuestionType>,

    #[validate(length(min = 1, max = 1000))]
    pub prompt: Option<String>,

    /// Replaces the whole option list.
    pub options: Option<Vec<String>>,

    #[validate(length(min = 1, max = 500))]
    pub correct_answer: Option<String>,

    pub difficulty: Option<Difficulty>,
}

impl QuestionUpdate {
    /// The question as it would read after the edit, in authoring form so
    /// the usual shape rules can run on it.
    pub fn merge(self, question: &Question) -> NewQuestion {
        NewQuestion {
            module_id: question.module_id,
            question_type: self.question_type.unwrap_or(question.question_type),
            prompt: self.prompt.unwrap_or_else(|| question.prompt.clone()),
            options: self.options.unwrap_or_else(|| question.options.clone()),
            correct_answer: self
                .correct_answer
                .unwrap_or_else(|| question.correct_answer.clone()),
            difficulty: self.difficulty.unwrap_or(question.difficulty),
        }
    }
}

fn validate_options(options: &[String]) -> Result<(), validator::ValidationError> {
    if options.is_empty() {
        return Err(validator::ValidationError::new("options_cannot_be_empty"));
    }
    for opt in options {
        if opt.is_empty() {
            return Err(validator::ValidationError::new("option_cannot_be_empty"));
        }
        if opt.len() > 500 {
            return Err(validator::ValidationError::new("option_too_long"));
        }
    }
    Ok(())
}
