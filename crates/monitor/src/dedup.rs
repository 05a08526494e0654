//! Per-channel record of listings already notified.

use std::{collections::HashSet, sync::Mutex};

/// Set of listing identifiers seen by one channel.
///
/// Shared between the channel's monitor and the reclamation task. All
/// operations are synchronous and never held across an `.await`.
#[derive(Debug, Default)]
pub struct DedupStore {
    seen: Mutex<HashSet<String>>,
}

impl DedupStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.lock().contains(id)
    }

    /// Returns `true` when `id` was not present before.
    pub fn insert(&self, id: impl Into<String>) -> bool {
        self.lock().insert(id.into())
    }

    /// Atomic test-and-set. `true` means the caller is the first to see `id`
    /// and owns its notification.
    pub fn check_and_insert(&self, id: &str) -> bool {
        let mut seen = self.lock();
        if seen.contains(id) {
            return false;
        }
        seen.insert(id.to_string())
    }

    /// Forget everything, returning how many identifiers were dropped.
    pub fn clear(&self) -> usize {
        let mut seen = self.lock();
        let cleared = seen.len();
        seen.clear();
        cleared
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        self.seen.lock().unwrap_or_else(|e| e.into_inner())
    }
}
