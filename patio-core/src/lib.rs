/**
 * PATIO CORE - Offline-resilient motorcycle yard library
 *
 * ROLE: Registering motorcycles, assigning them to cells of a 2-D placement
 * grid, and keeping that state consistent whether or not the remote record
 * service is reachable.
 *
 * ARCHITECTURE: Record store (remote CRUD + local JSON mirror) + occupancy
 * engine (grid with one-to-one cell/motorcycle invariant) + error classifier
 * feeding a process-wide connectivity flag + append-only history log + event
 * bus for change notifications. Screens, auth and rendering live outside;
 * this crate is the library they compose.
 */

pub mod classifier;
pub mod config;
pub mod connectivity;
pub mod errors;
pub mod events;
pub mod grid;
pub mod history;
pub mod models;
pub mod records;
pub mod state;
pub mod storage;
pub mod transport;

pub use classifier::{classify, classify_and_route, MessageOverrides};
pub use config::{load_config, PatioConfig};
pub use connectivity::{ConnectivityHandle, ConnectivityState};
pub use errors::{ErrorKind, StoreError};
pub use events::{EventBus, StoreEvent, SubscriptionId};
pub use grid::{GridStore, PlacementPolicy};
pub use history::HistoryLog;
pub use models::{
    GridCell, GridPosition, HistoryEvent, MotoModel, MotoStatus, Motorcycle, MotorcycleDraft,
    RemoteMotorcycle, RemotePayload,
};
pub use records::RecordStore;
pub use storage::LocalMirror;
pub use transport::{HttpTransport, RecordTransport, TransportFailure};

use std::sync::Arc;

/// Composition root. Owns the wiring of mirror, connectivity, history, event
/// bus and the two stores; the grid write and the record position-update it
/// pairs with stay two sequential operations (see `place_and_record`).
pub struct Patio {
    pub records: RecordStore,
    pub grid: GridStore,
    pub history: HistoryLog,
    pub connectivity: ConnectivityHandle,
    pub events: EventBus,
}

impl Patio {
    /// Production wiring: reqwest transport against the configured endpoint.
    pub async fn open(config: &PatioConfig) -> Result<Self, StoreError> {
        let transport = HttpTransport::new(&config.api.base_url, config.api.timeout_secs)
            .map_err(|f| match f {
                TransportFailure::NoResponse(reason) => StoreError::NetworkUnavailable(reason),
                TransportFailure::Status { code, .. } => StoreError::Unexpected {
                    status: code,
                    message: "client construction failed".into(),
                },
            })?;
        Self::open_with_transport(config, Arc::new(transport), MessageOverrides::new()).await
    }

    /// Test/devkit wiring: any transport, any message table.
    pub async fn open_with_transport(
        config: &PatioConfig,
        transport: Arc<dyn RecordTransport>,
        overrides: MessageOverrides,
    ) -> Result<Self, StoreError> {
        let events = EventBus::new();
        let connectivity = ConnectivityHandle::new(events.clone());
        let mirror = LocalMirror::open(&config.storage.data_dir).await?;
        let history = HistoryLog::open(mirror.clone()).await?;
        let grid = GridStore::open(
            mirror.clone(),
            config.grid.columns,
            config.grid.rows,
            PlacementPolicy::default(),
            history.clone(),
            events.clone(),
        )
        .await?;
        let records = RecordStore::open(
            transport,
            mirror,
            connectivity.clone(),
            overrides,
            history.clone(),
            events.clone(),
        )
        .await?;
        Ok(Self {
            records,
            grid,
            history,
            connectivity,
            events,
        })
    }

    /// The two writes of a "place motorcycle" user action, issued
    /// sequentially: grid first, then the record's stored position. A
    /// failure between them leaves the grid authoritative until the next
    /// record update; the grid is always the source for who sits where.
    pub async fn place_and_record(
        &self,
        motorcycle: &Motorcycle,
        x: i32,
        y: i32,
    ) -> Result<Motorcycle, StoreError> {
        let placed = self.grid.place(motorcycle, x, y).await?;
        self.records.update(&placed).await
    }

    /// Deletion protocol: clear any grid cell first, then drop the record.
    pub async fn delete_and_clear(&self, id: &str) -> Result<(), StoreError> {
        self.grid.remove(id).await?;
        self.records.delete(id).await
    }
}
