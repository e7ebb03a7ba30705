//! Append-only audit log fed by store mutations.

use crate::errors::StoreError;
use crate::models::{epoch_ms, HistoryEvent};
use crate::storage::LocalMirror;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;

#[derive(Clone)]
pub struct HistoryLog {
    entries: Arc<RwLock<Vec<HistoryEvent>>>,
    mirror: LocalMirror,
}

impl HistoryLog {
    pub async fn open(mirror: LocalMirror) -> Result<Self, StoreError> {
        let entries = mirror.load_history().await?;
        Ok(Self {
            entries: Arc::new(RwLock::new(entries)),
            mirror,
        })
    }

    /// Appends an `(action, details)` pair. A persistence failure is logged
    /// and swallowed so an audit hiccup never fails the mutation it records.
    pub async fn append(&self, action: &str, details: Option<String>) {
        let mut entries = self.entries.write().await;
        let timestamp_ms = epoch_ms();
        let mut id = format!("evt_{timestamp_ms}");
        // timestamp-derived ids can collide within one millisecond
        let mut bump = 1;
        while entries.iter().any(|e| e.id == id) {
            id = format!("evt_{timestamp_ms}_{bump}");
            bump += 1;
        }
        entries.push(HistoryEvent {
            id,
            action: action.to_string(),
            details,
            timestamp_ms,
        });
        if let Err(e) = self.mirror.save_history(&entries).await {
            warn!(action, "failed to persist history entry: {e}");
        }
    }

    /// Newest-first snapshot. Entries sharing a millisecond keep reverse
    /// append order: reversing before the stable sort makes the later
    /// append win every timestamp tie.
    pub async fn entries(&self) -> Vec<HistoryEvent> {
        let mut snapshot = self.entries.read().await.clone();
        snapshot.reverse();
        snapshot.sort_by(|a, b| b.timestamp_ms.cmp(&a.timestamp_ms));
        snapshot
    }

    /// Bulk clear, the only destructive operation the log supports.
    pub async fn clear(&self) -> Result<(), StoreError> {
        let mut entries = self.entries.write().await;
        entries.clear();
        self.mirror.save_history(&entries).await
    }
}
