// src/lib.rs

pub mod config;
pub mod db;
pub mod error;
pub mod locks;
pub mod models;
pub mod services;
pub mod state;
pub mod store;
pub mod telemetry;

// Re-export the engine surface for callers in the controller layer.
pub use error::EngineError;
pub use services::{
    authoring::{
        add_question, create_quiz, delete_question, delete_quiz, update_question, update_quiz,
    },
    completion::is_module_complete,
    report::{module_grade_report, quiz_responses},
    session::{get_attempt, review_attempt, start_attempt, submit_attempt},
    tier::evaluate_tier,
};
pub use state::EngineState;
