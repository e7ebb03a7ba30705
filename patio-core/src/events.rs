//! In-process change notifications.
//!
//! Screens used to rely on framework re-renders to notice store mutations;
//! here every successful mutation (and every connectivity transition) goes
//! through an explicit subscribe/unsubscribe bus instead, so consumers are
//! decoupled from any rendering layer.

use crate::state::{new_state, Shared};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    Created { id: String },
    Updated { id: String },
    Deleted { id: String },
    Placed { id: String, x: i32, y: i32 },
    Removed { id: String },
    WentOffline,
    WentOnline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

type Callback = Arc<dyn Fn(&StoreEvent) + Send + Sync>;

/// Clonable fanout handle shared by the stores and the connectivity state.
/// Callbacks run synchronously on the emitting task; subscribers that need
/// real work should hand the event off to their own channel.
#[derive(Clone)]
pub struct EventBus {
    subscribers: Shared<HashMap<SubscriptionId, Callback>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            subscribers: new_state(HashMap::new()),
        }
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&StoreEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(Uuid::new_v4());
        self.subscribers.lock().insert(id, Arc::new(callback));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.lock().remove(&id).is_some()
    }

    /// Delivers to a snapshot of the subscriber map taken before any
    /// callback runs, so callbacks may re-enter the bus (unsubscribe
    /// themselves, add listeners, trigger mutations that emit) without
    /// deadlocking on the non-reentrant lock.
    pub fn emit(&self, event: StoreEvent) {
        let callbacks: Vec<Callback> = self.subscribers.lock().values().cloned().collect();
        for callback in callbacks {
            callback(&event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
