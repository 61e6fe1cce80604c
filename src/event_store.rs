use std::collections::HashMap;
use std::sync::Mutex;

use crate::events::RawEvent;

/// Read-through cache of fetched raw events keyed by match id. Unbounded, no
/// eviction or expiry: entries live for the process lifetime. Constructed
/// explicitly so tests get an isolated empty store per case.
#[derive(Debug, Default)]
pub struct EventStore {
    entries: Mutex<HashMap<String, Vec<RawEvent>>>,
}

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, match_id: &str) -> Option<Vec<RawEvent>> {
        let guard = self.entries.lock().expect("event store lock poisoned");
        guard.get(match_id).cloned()
    }

    pub fn insert(&self, match_id: &str, events: Vec<RawEvent>) {
        let mut guard = self.entries.lock().expect("event store lock poisoned");
        guard.insert(match_id.to_string(), events);
    }

    pub fn len(&self) -> usize {
        let guard = self.entries.lock().expect("event store lock poisoned");
        guard.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
