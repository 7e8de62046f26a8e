// src/locks.rs

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

/// One async mutex per (student, quiz) pair.
///
/// `start_attempt` and `submit_attempt` for the same pair run one at a time;
/// different pairs never contend. Idle entries are pruned on the next acquire.
#[derive(Default)]
pub struct AttemptLocks {
    slots: Mutex<HashMap<(Uuid, Uuid), Arc<AsyncMutex<()>>>>,
}

impl AttemptLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, student_id: Uuid, quiz_id: Uuid) -> OwnedMutexGuard<()> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            // Only the map holds a reference: nobody is waiting or inside.
            slots.retain(|_, slot| Arc::strong_count(slot) > 1);
            slots
                .entry((student_id, quiz_id))
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        slot.lock_owned().await
    }

    /// Number of pairs currently tracked.
    pub fn tracked(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}
