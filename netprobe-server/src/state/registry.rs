use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use parking_lot::RwLock;
use netprobe_core::{UserId, UserRecord};

/// Shared user store. Every operation takes the lock exactly once, so no
/// caller ever observes a half-applied change.
#[derive(Debug)]
pub struct Registry {
    users: RwLock<HashMap<UserId, UserRecord>>,
    /// Last issued sequence number; ids are never handed out twice.
    seq: AtomicU64,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self { users: RwLock::new(HashMap::new()), seq: AtomicU64::new(0) }
    }

    /// Registry pre-filled with the three demo users (`user1`..`user3`).
    pub fn with_demo_users() -> Self {
        let registry = Self::new();
        registry.insert("Alice", 30);
        registry.insert("Bob", 25);
        registry.insert("Charlie", 35);
        registry
    }

    pub fn insert(&self, name: impl Into<String>, age: i64) -> UserId {
        let id = UserId::from_seq(self.seq.fetch_add(1, Ordering::Relaxed) + 1);
        self.users.write().insert(id.clone(), UserRecord::new(name, age));
        id
    }

    pub fn get(&self, id: &UserId) -> Option<UserRecord> {
        self.users.read().get(id).cloned()
    }

    /// Removing an absent id is a no-op.
    pub fn remove(&self, id: &UserId) -> Option<UserRecord> {
        self.users.write().remove(id)
    }

    pub fn len(&self) -> usize {
        self.users.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
