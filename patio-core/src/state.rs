use parking_lot::Mutex;
use std::sync::Arc;

/// Cheap clonable handle over small shared state (connectivity flag,
/// session credential, subscriber map). Collections with async mutation
/// paths use `tokio::sync::RwLock` instead.
pub type Shared<T> = Arc<Mutex<T>>;

pub fn new_state<T>(value: T) -> Shared<T> {
    Arc::new(Mutex::new(value))
}
