// src/models/mod.rs

pub mod attempt;
pub mod module;
pub mod question;
pub mod quiz;
pub mod student;
