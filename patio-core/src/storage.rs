//! Local mirror persistence.
//!
//! One JSON file per persisted key under the data directory: the motorcycle
//! list mirror, the grid cell array, and the history log. Absent files decode
//! to their documented defaults (empty list, fresh unoccupied grid, empty
//! history). Writes always rewrite the whole collection.

use crate::errors::StoreError;
use crate::models::{GridCell, HistoryEvent, Motorcycle};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

const RECORDS_FILE: &str = "motorcycles.json";
const GRID_FILE: &str = "grid.json";
const HISTORY_FILE: &str = "history.json";

pub const DEFAULT_COLUMNS: u32 = 8;
pub const DEFAULT_ROWS: u32 = 8;

#[derive(Clone)]
pub struct LocalMirror {
    data_dir: PathBuf,
}

impl LocalMirror {
    pub async fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self, StoreError> {
        let data_dir = data_dir.as_ref().to_path_buf();
        fs::create_dir_all(&data_dir).await?;
        info!(dir = %data_dir.display(), "local mirror opened");
        Ok(Self { data_dir })
    }

    fn path(&self, file: &str) -> PathBuf {
        self.data_dir.join(file)
    }

    async fn read_or<T: DeserializeOwned>(
        &self,
        file: &str,
        default: impl FnOnce() -> T,
    ) -> Result<T, StoreError> {
        let path = self.path(file);
        if !path.exists() {
            return Ok(default());
        }
        let content = fs::read_to_string(&path).await?;
        if content.trim().is_empty() {
            return Ok(default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    async fn write<T: Serialize>(&self, file: &str, value: &T) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(value)?;
        fs::write(self.path(file), content).await?;
        Ok(())
    }

    pub async fn load_records(&self) -> Result<Vec<Motorcycle>, StoreError> {
        self.read_or(RECORDS_FILE, Vec::new).await
    }

    pub async fn save_records(&self, records: &[Motorcycle]) -> Result<(), StoreError> {
        self.write(RECORDS_FILE, &records).await
    }

    /// Loads the persisted grid verbatim when present; the stored grid, not
    /// the motorcycle records, is authoritative for who sits where. Absent
    /// or dimension-mismatched data falls back to a fresh grid; dimensions
    /// whose product overflows fall back to the default size.
    pub async fn load_grid(&self, columns: u32, rows: u32) -> Result<Vec<GridCell>, StoreError> {
        let Some(expected) = columns.checked_mul(rows) else {
            return Ok(fresh_grid(DEFAULT_COLUMNS, DEFAULT_ROWS));
        };
        let fresh = || fresh_grid(columns, rows);
        let cells: Vec<GridCell> = self.read_or(GRID_FILE, fresh).await?;
        if cells.len() != expected as usize {
            return Ok(fresh_grid(columns, rows));
        }
        Ok(cells)
    }

    pub async fn save_grid(&self, cells: &[GridCell]) -> Result<(), StoreError> {
        self.write(GRID_FILE, &cells).await
    }

    pub async fn load_history(&self) -> Result<Vec<HistoryEvent>, StoreError> {
        self.read_or(HISTORY_FILE, Vec::new).await
    }

    pub async fn save_history(&self, entries: &[HistoryEvent]) -> Result<(), StoreError> {
        self.write(HISTORY_FILE, &entries).await
    }
}

/// Row-major unoccupied grid. Dimensions whose product overflows are
/// replaced by the default size instead of panicking.
pub fn fresh_grid(columns: u32, rows: u32) -> Vec<GridCell> {
    let (columns, rows) = match columns.checked_mul(rows) {
        Some(_) => (columns, rows),
        None => (DEFAULT_COLUMNS, DEFAULT_ROWS),
    };
    let mut cells = Vec::with_capacity((columns as usize) * (rows as usize));
    for y in 0..rows as i32 {
        for x in 0..columns as i32 {
            cells.push(GridCell::empty(x, y));
        }
    }
    cells
}
