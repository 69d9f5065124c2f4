//! Process-wide write serialization.
//!
//! Every store operation is a read-modify-write over a flat file with no
//! cross-request cache, so two concurrent writers can interleave and lose one
//! write. Each idea id gets its own mutex; the sprint collection and the
//! notification log are single files and get singleton locks. Id assignment
//! during idea creation takes the store-wide ideas lock.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

static IDEA_LOCKS: OnceLock<Mutex<HashMap<String, Arc<Mutex<()>>>>> = OnceLock::new();
static IDEAS_STORE: OnceLock<Mutex<()>> = OnceLock::new();
static SPRINTS: OnceLock<Mutex<()>> = OnceLock::new();
static NOTIFICATIONS: OnceLock<Mutex<()>> = OnceLock::new();

/// Lock guarding a single idea's read-modify-write cycle.
pub fn idea(id: &str) -> Arc<Mutex<()>> {
    let map = IDEA_LOCKS.get_or_init(|| Mutex::new(HashMap::new()));
    let mut map = map.lock().unwrap_or_else(PoisonError::into_inner);
    map.entry(id.to_string())
        .or_insert_with(|| Arc::new(Mutex::new(())))
        .clone()
}

/// Store-wide lock serializing id assignment across concurrent creates.
pub fn ideas_store() -> MutexGuard<'static, ()> {
    IDEAS_STORE
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

/// Singleton lock for the sprint collection file.
pub fn sprints() -> MutexGuard<'static, ()> {
    SPRINTS
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

/// Singleton lock for the notification log file.
pub fn notifications() -> MutexGuard<'static, ()> {
    NOTIFICATIONS
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}
