use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Per-stack write serialization.
///
/// Push and pop read a whole stack, change it in memory and write it back.
/// Two writers on the same id can therefore lose one update. When enabled,
/// writers on one id take turns; when disabled, `acquire` is a no-op and the
/// store sees exactly the unguarded read-modify-write sequence.
///
/// An id's entry lives only while some writer holds or waits on it.
pub struct StackLocks {
    enabled: bool,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl StackLocks {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            locks: DashMap::new(),
        }
    }

    pub async fn acquire(&self, stack_id: &str) -> Option<StackGuard<'_>> {
        if !self.enabled {
            return None;
        }
        let lock = self.locks.entry(stack_id.to_string()).or_default().clone();
        let guard = lock.lock_owned().await;
        Some(StackGuard {
            locks: &self.locks,
            stack_id: stack_id.to_string(),
            guard: Some(guard),
        })
    }
}

/// Held write turn on one stack id.
pub struct StackGuard<'a> {
    locks: &'a DashMap<String, Arc<Mutex<()>>>,
    stack_id: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for StackGuard<'_> {
    fn drop(&mut self) {
        self.guard.take();
        // the map's own Arc is the last one: nobody holds or waits on this id
        self.locks
            .remove_if(&self.stack_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}
