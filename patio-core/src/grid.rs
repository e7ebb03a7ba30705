//! Occupancy engine.
//!
//! Owns the placement grid and the one-to-one cell/motorcycle invariant: a
//! motorcycle occupies at most one cell and a cell holds at most one
//! motorcycle. Every mutation runs under a single write guard held across
//! persistence, so back-to-back placements serialize instead of racing on
//! the whole-grid rewrite.

use crate::errors::StoreError;
use crate::events::{EventBus, StoreEvent};
use crate::history::HistoryLog;
use crate::models::{GridCell, GridPosition, Motorcycle};
use crate::storage::{LocalMirror, DEFAULT_COLUMNS, DEFAULT_ROWS};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// What `place` does when the target cell already holds a different
/// motorcycle. Strict rejects with `OccupiedCell` and leaves the grid
/// untouched; Permissive reproduces the legacy silent overwrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlacementPolicy {
    #[default]
    Strict,
    Permissive,
}

pub struct GridStore {
    cells: Arc<RwLock<Vec<GridCell>>>,
    columns: u32,
    rows: u32,
    policy: PlacementPolicy,
    mirror: LocalMirror,
    history: HistoryLog,
    bus: EventBus,
}

impl GridStore {
    /// Loads the persisted grid verbatim when one exists, otherwise
    /// initializes `columns * rows` unoccupied cells in row-major order.
    /// Dimensions whose product overflows are replaced by the default size,
    /// matching what the mirror hands back for them.
    pub async fn open(
        mirror: LocalMirror,
        columns: u32,
        rows: u32,
        policy: PlacementPolicy,
        history: HistoryLog,
        bus: EventBus,
    ) -> Result<Self, StoreError> {
        let (columns, rows) = match columns.checked_mul(rows) {
            Some(_) => (columns, rows),
            None => (DEFAULT_COLUMNS, DEFAULT_ROWS),
        };
        let cells = mirror.load_grid(columns, rows).await?;
        info!(columns, rows, "grid store opened ({} cells)", cells.len());
        Ok(Self {
            cells: Arc::new(RwLock::new(cells)),
            columns,
            rows,
            policy,
            mirror,
            history,
            bus,
        })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.columns as i32 || y >= self.rows as i32 {
            return None;
        }
        Some((y * self.columns as i32 + x) as usize)
    }

    /// Places a motorcycle on cell `(x, y)` and returns the stored snapshot
    /// with its position set. A motorcycle already on the grid is vacated
    /// from its old cell first, so placing is also the move operation.
    pub async fn place(
        &self,
        motorcycle: &Motorcycle,
        x: i32,
        y: i32,
    ) -> Result<Motorcycle, StoreError> {
        let target = self
            .index(x, y)
            .ok_or_else(|| StoreError::Validation(format!("cell ({x},{y}) does not exist")))?;

        let mut cells = self.cells.write().await;

        if self.policy == PlacementPolicy::Strict {
            if let Some(current) = &cells[target].motorcycle {
                if current.id != motorcycle.id {
                    return Err(StoreError::OccupiedCell { x, y });
                }
            }
        }

        // idempotent move: vacate wherever this id currently sits
        for cell in cells.iter_mut() {
            if cell
                .motorcycle
                .as_ref()
                .is_some_and(|m| m.id == motorcycle.id)
            {
                cell.occupied = false;
                cell.motorcycle = None;
            }
        }

        let mut snapshot = motorcycle.clone();
        snapshot.position = Some(GridPosition { x, y });
        cells[target].occupied = true;
        cells[target].motorcycle = Some(snapshot.clone());

        self.mirror.save_grid(&cells).await?;
        drop(cells);

        info!(id = %snapshot.id, x, y, "motorcycle placed");
        self.history
            .append("place", Some(format!("{} -> ({x},{y})", snapshot.plate)))
            .await;
        self.bus.emit(StoreEvent::Placed {
            id: snapshot.id.clone(),
            x,
            y,
        });
        Ok(snapshot)
    }

    /// Clears any cell holding the given id. Not an error when the
    /// motorcycle is not on the grid; removing twice equals removing once.
    pub async fn remove(&self, motorcycle_id: &str) -> Result<(), StoreError> {
        let mut cells = self.cells.write().await;
        let mut cleared = false;
        for cell in cells.iter_mut() {
            if cell
                .motorcycle
                .as_ref()
                .is_some_and(|m| m.id == motorcycle_id)
            {
                cell.occupied = false;
                cell.motorcycle = None;
                cleared = true;
            }
        }
        if !cleared {
            return Ok(());
        }
        self.mirror.save_grid(&cells).await?;
        drop(cells);

        info!(id = %motorcycle_id, "motorcycle removed from grid");
        self.history
            .append("remove", Some(motorcycle_id.to_string()))
            .await;
        self.bus.emit(StoreEvent::Removed {
            id: motorcycle_id.to_string(),
        });
        Ok(())
    }

    pub async fn is_occupied(&self, x: i32, y: i32) -> bool {
        match self.index(x, y) {
            Some(i) => self.cells.read().await[i].occupied,
            None => false,
        }
    }

    pub async fn cell(&self, x: i32, y: i32) -> Option<GridCell> {
        let i = self.index(x, y)?;
        Some(self.cells.read().await[i].clone())
    }

    pub async fn cells(&self) -> Vec<GridCell> {
        self.cells.read().await.clone()
    }

    /// Where a motorcycle currently sits, if anywhere.
    pub async fn position_of(&self, motorcycle_id: &str) -> Option<GridPosition> {
        self.cells
            .read()
            .await
            .iter()
            .find(|c| {
                c.motorcycle
                    .as_ref()
                    .is_some_and(|m| m.id == motorcycle_id)
            })
            .map(|c| GridPosition { x: c.x, y: c.y })
    }
}
