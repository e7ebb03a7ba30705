//! Process-wide online/offline flag.
//!
//! Owned by the composition root and passed by handle to both stores, never a
//! module-level singleton, so parallel tests can run independent instances.
//! Starts `Online`; flipped to `Offline` only by the error classifier's
//! routing step, and back to `Online` only by an explicit external action
//! (a successful call never resets it).

use crate::events::{EventBus, StoreEvent};
use crate::state::{new_state, Shared};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityState {
    Online,
    Offline,
}

#[derive(Clone)]
pub struct ConnectivityHandle {
    state: Shared<ConnectivityState>,
    bus: EventBus,
}

impl ConnectivityHandle {
    pub fn new(bus: EventBus) -> Self {
        Self {
            state: new_state(ConnectivityState::Online),
            bus,
        }
    }

    pub fn current(&self) -> ConnectivityState {
        *self.state.lock()
    }

    pub fn is_online(&self) -> bool {
        self.current() == ConnectivityState::Online
    }

    /// Classifier side effect. Affects subsequent calls only; the call that
    /// triggered the flip still fails with its classified error.
    pub fn set_offline(&self) {
        let mut state = self.state.lock();
        if *state == ConnectivityState::Offline {
            return;
        }
        *state = ConnectivityState::Offline;
        drop(state);
        info!("connectivity: switched to offline mode");
        self.bus.emit(StoreEvent::WentOffline);
    }

    /// Explicit external action (user-triggered reconnect). This is the only
    /// way back to online.
    pub fn set_online(&self) {
        let mut state = self.state.lock();
        if *state == ConnectivityState::Online {
            return;
        }
        *state = ConnectivityState::Online;
        drop(state);
        info!("connectivity: back online");
        self.bus.emit(StoreEvent::WentOnline);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_starts_online() {
        let handle = ConnectivityHandle::new(EventBus::new());
        assert!(handle.is_online());
    }

    #[test]
    fn test_transitions_emit_once() {
        let bus = EventBus::new();
        let offline_events = Arc::new(AtomicUsize::new(0));
        let counter = offline_events.clone();
        bus.subscribe(move |event| {
            if *event == StoreEvent::WentOffline {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        let handle = ConnectivityHandle::new(bus);
        handle.set_offline();
        handle.set_offline(); // already offline, no second event
        assert_eq!(handle.current(), ConnectivityState::Offline);
        assert_eq!(offline_events.load(Ordering::SeqCst), 1);

        handle.set_online();
        assert!(handle.is_online());
    }
}
