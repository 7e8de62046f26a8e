// src/services/mod.rs

pub mod authoring;
pub mod completion;
pub mod report;
pub mod scoring;
pub mod selector;
pub mod session;
pub mod tier;
