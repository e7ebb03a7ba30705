//! Record store: CRUD over motorcycle records with transparent routing.
//!
//! Online, every call goes to the remote service and the authoritative
//! result is mirrored locally; offline, the local mirror is the store.
//! Remote failures never escape raw: they pass through the classifier,
//! which may flip the shared connectivity flag for subsequent calls (the
//! in-flight call always fails with its classified error, no retry).
//!
//! All read-modify-write-persist sequences run under one write guard, so
//! two quick mutations serialize instead of losing the first update.

use crate::classifier::{classify_and_route, MessageOverrides};
use crate::connectivity::ConnectivityHandle;
use crate::errors::StoreError;
use crate::events::{EventBus, StoreEvent};
use crate::history::HistoryLog;
use crate::models::{epoch_ms, Motorcycle, MotorcycleDraft, RemotePayload};
use crate::state::{new_state, Shared};
use crate::storage::LocalMirror;
use crate::transport::RecordTransport;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

pub struct RecordStore {
    records: Arc<RwLock<Vec<Motorcycle>>>,
    transport: Arc<dyn RecordTransport>,
    mirror: LocalMirror,
    connectivity: ConnectivityHandle,
    overrides: MessageOverrides,
    history: HistoryLog,
    bus: EventBus,
    session: Shared<Option<String>>,
}

impl RecordStore {
    /// Primes the in-memory list from the mirror so offline reads work
    /// before any remote call has succeeded.
    pub async fn open(
        transport: Arc<dyn RecordTransport>,
        mirror: LocalMirror,
        connectivity: ConnectivityHandle,
        overrides: MessageOverrides,
        history: HistoryLog,
        bus: EventBus,
    ) -> Result<Self, StoreError> {
        let records = mirror.load_records().await?;
        info!("record store opened ({} mirrored records)", records.len());
        Ok(Self {
            records: Arc::new(RwLock::new(records)),
            transport,
            mirror,
            connectivity,
            overrides,
            history,
            bus,
            session: new_state(None),
        })
    }

    /// The bearer credential is handed in per session by the auth layer;
    /// the store only consumes it.
    pub fn set_session(&self, token: Option<String>) {
        *self.session.lock() = token;
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.lock().is_some()
    }

    /// Fail-fast credential check, done before any transport call.
    fn token(&self) -> Result<String, StoreError> {
        self.session.lock().clone().ok_or(StoreError::NotAuthenticated)
    }

    /// Online: fetch, normalize, overwrite the mirror, return the server's
    /// shape. On failure the classified error is returned as-is; the stale
    /// mirror is deliberately not served in its place. Offline: the mirror
    /// is the store.
    pub async fn list(&self) -> Result<Vec<Motorcycle>, StoreError> {
        if !self.connectivity.is_online() {
            return Ok(self.records.read().await.clone());
        }
        let token = self.token()?;
        match self.transport.fetch_all(&token).await {
            Ok(remote) => {
                let normalized: Vec<Motorcycle> =
                    remote.into_iter().map(|r| r.normalize()).collect();
                let mut records = self.records.write().await;
                *records = normalized.clone();
                self.mirror.save_records(&records).await?;
                Ok(normalized)
            }
            Err(failure) => Err(classify_and_route(
                failure,
                &self.overrides,
                &self.connectivity,
            )),
        }
    }

    /// Registers a motorcycle. Online the server assigns id and entry
    /// timestamp (a 409 means the plate already exists); offline the id is
    /// synthesized as `local_<millis>` and the timestamp is wall-clock.
    pub async fn create(&self, draft: &MotorcycleDraft) -> Result<Motorcycle, StoreError> {
        let token = self.token()?;

        if !self.connectivity.is_online() {
            let mut records = self.records.write().await;
            let created = Motorcycle {
                id: synthesize_local_id(&records),
                plate: draft.plate.clone(),
                model: draft.model,
                color: draft.color.clone(),
                status: draft.status,
                entered_at_ms: epoch_ms(),
                position: None,
                reserved: false,
            };
            records.push(created.clone());
            self.mirror.save_records(&records).await?;
            drop(records);
            self.finish_mutation("create", &created.plate, StoreEvent::Created {
                id: created.id.clone(),
            })
            .await;
            return Ok(created);
        }

        let payload = RemotePayload::from_draft(draft);
        match self.transport.create(&token, &payload).await {
            Ok(remote) => {
                let created = remote.normalize();
                let mut records = self.records.write().await;
                records.push(created.clone());
                self.mirror.save_records(&records).await?;
                drop(records);
                self.finish_mutation("create", &created.plate, StoreEvent::Created {
                    id: created.id.clone(),
                })
                .await;
                Ok(created)
            }
            Err(failure) => Err(classify_and_route(
                failure,
                &self.overrides,
                &self.connectivity,
            )),
        }
    }

    /// Full-record update. The plate is sent on the wire but immutable: a
    /// changed plate against the stored record is rejected before any call.
    /// Position, reservation flag and entry timestamp stay caller/locally
    /// owned; the server response never silently clears them.
    pub async fn update(&self, motorcycle: &Motorcycle) -> Result<Motorcycle, StoreError> {
        let token = self.token()?;

        {
            let records = self.records.read().await;
            if let Some(stored) = records.iter().find(|m| m.id == motorcycle.id) {
                if stored.plate != motorcycle.plate {
                    return Err(StoreError::Validation(
                        "placa is immutable after registration".into(),
                    ));
                }
            } else if !self.connectivity.is_online() {
                return Err(StoreError::not_found());
            }
        }

        if !self.connectivity.is_online() {
            let mut records = self.records.write().await;
            let stored = records
                .iter_mut()
                .find(|m| m.id == motorcycle.id)
                .ok_or_else(StoreError::not_found)?;
            let entered_at_ms = stored.entered_at_ms;
            *stored = motorcycle.clone();
            stored.entered_at_ms = entered_at_ms;
            let updated = stored.clone();
            self.mirror.save_records(&records).await?;
            drop(records);
            self.finish_mutation("update", &updated.plate, StoreEvent::Updated {
                id: updated.id.clone(),
            })
            .await;
            return Ok(updated);
        }

        let payload = RemotePayload::from_motorcycle(motorcycle);
        match self.transport.update(&token, &motorcycle.id, &payload).await {
            Ok(remote) => {
                let mut updated = remote.normalize();
                updated.position = motorcycle.position;
                updated.reserved = motorcycle.reserved;
                updated.entered_at_ms = motorcycle.entered_at_ms;
                let mut records = self.records.write().await;
                match records.iter_mut().find(|m| m.id == updated.id) {
                    Some(stored) => *stored = updated.clone(),
                    None => records.push(updated.clone()),
                }
                self.mirror.save_records(&records).await?;
                drop(records);
                self.finish_mutation("update", &updated.plate, StoreEvent::Updated {
                    id: updated.id.clone(),
                })
                .await;
                Ok(updated)
            }
            Err(failure) => Err(classify_and_route(
                failure,
                &self.overrides,
                &self.connectivity,
            )),
        }
    }

    /// Deletes a record. Callers clear any grid cell holding the id first;
    /// the record store does not reach into the occupancy engine. Offline
    /// the id is filtered out of the mirror (absent id is a no-op).
    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let token = self.token()?;

        if !self.connectivity.is_online() {
            let mut records = self.records.write().await;
            records.retain(|m| m.id != id);
            self.mirror.save_records(&records).await?;
            drop(records);
            self.finish_mutation("delete", id, StoreEvent::Deleted { id: id.to_string() })
                .await;
            return Ok(());
        }

        match self.transport.delete(&token, id).await {
            Ok(()) => {
                let mut records = self.records.write().await;
                records.retain(|m| m.id != id);
                self.mirror.save_records(&records).await?;
                drop(records);
                self.finish_mutation("delete", id, StoreEvent::Deleted { id: id.to_string() })
                    .await;
                Ok(())
            }
            Err(failure) => Err(classify_and_route(
                failure,
                &self.overrides,
                &self.connectivity,
            )),
        }
    }

    pub async fn get(&self, id: &str) -> Option<Motorcycle> {
        self.records.read().await.iter().find(|m| m.id == id).cloned()
    }

    async fn finish_mutation(&self, action: &str, details: &str, event: StoreEvent) {
        self.history.append(action, Some(details.to_string())).await;
        self.bus.emit(event);
    }
}

/// Offline ids are `local_<millis>`; bump on same-millisecond collisions.
fn synthesize_local_id(records: &[Motorcycle]) -> String {
    let millis = epoch_ms();
    let mut id = format!("local_{millis}");
    let mut bump = 1;
    while records.iter().any(|m| m.id == id) {
        id = format!("local_{millis}_{bump}");
        bump += 1;
    }
    id
}
