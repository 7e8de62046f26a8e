// src/state.rs

use std::sync::Arc;

use crate::{
    locks::AttemptLocks,
    store::{LessonProgress, PgStore, Store},
};

/// Context handed to every engine operation.
#[derive(Clone)]
pub struct EngineState {
    pub store: Arc<dyn Store>,
    pub lessons: Arc<dyn LessonProgress>,
    pub locks: Arc<AttemptLocks>,
}

impl EngineState {
    pub fn new(store: Arc<dyn Store>, lessons: Arc<dyn LessonProgress>) -> Self {
        Self {
            store,
            lessons,
            locks: Arc::new(AttemptLocks::new()),
        }
    }

    /// Postgres for everything, including lesson completion.
    pub fn postgres(store: PgStore) -> Self {
        let store = Arc::new(store);
        Self::new(store.clone(), store)
    }
}
