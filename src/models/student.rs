// src/models/student.rs

use std::{collections::BTreeSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::EngineError, models::question::Difficulty};

/// Difficulty tier of a student. Ordered from lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Beginner,
    Average,
    Advanced,
}

impl Tier {
    /// Difficulties a student of this tier draws from, easiest first.
    pub fn allowed_difficulties(&self) -> &'static [Difficulty] {
        match self {
            Tier::Beginner => &[Difficulty::Easy],
            Tier::Average => &[Difficulty::Easy, Difficulty::Medium],
            Tier::Advanced => &[Difficulty::Easy, Difficulty::Medium, Difficulty::Hard],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Beginner => "beginner",
            Tier::Average => "average",
            Tier::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "beginner" => Ok(Tier::Beginner),
            "average" => Ok(Tier::Average),
            "advanced" => Ok(Tier::Advanced),
            other => Err(EngineError::BadRequest(format!("Invalid tier '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: Uuid,
    pub tier: Tier,
    pub completed_modules: BTreeSet<Uuid>,
}

impl Student {
    pub fn new(tier: Tier) -> Self {
        Self {
            id: Uuid::new_v4(),
            tier,
            completed_modules: BTreeSet::new(),
        }
    }
}
