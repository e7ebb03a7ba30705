//! Canonical data model of the yard plus the remote wire shape.
//!
//! The remote service speaks the Brazilian field vocabulary (`placa`,
//! `modelo`, `cor`, `posicao`, `reservada`); the canonical structs keep
//! English names and explicit normalization between the two, so unknown or
//! missing optional fields get deterministic defaults instead of leaking
//! server quirks into the stores.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Wall-clock epoch milliseconds, the timestamp unit of the whole core.
pub fn epoch_ms() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

/// Fixed model catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotoModel {
    #[serde(rename = "Mottu Sport")]
    Sport,
    #[serde(rename = "Mottu E")]
    Eletrica,
    #[serde(rename = "Mottu Pop")]
    Pop,
}

impl MotoModel {
    /// Catalog lookup with a deterministic fallback for unknown server
    /// strings (normalization rule, not an error path).
    pub fn parse_or_default(raw: &str) -> Self {
        match raw.trim() {
            "Mottu Sport" | "sport" => MotoModel::Sport,
            "Mottu E" | "e" | "eletrica" => MotoModel::Eletrica,
            "Mottu Pop" | "pop" => MotoModel::Pop,
            _ => MotoModel::Pop,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MotoModel::Sport => "Mottu Sport",
            MotoModel::Eletrica => "Mottu E",
            MotoModel::Pop => "Mottu Pop",
        }
    }
}

/// Fixed status catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotoStatus {
    #[serde(rename = "pronta")]
    ReadyForRental,
    #[serde(rename = "manutencao")]
    InMaintenance,
    #[serde(rename = "quarentena")]
    Quarantined,
    #[serde(rename = "reservada")]
    Reserved,
    #[serde(rename = "aguardando_vistoria")]
    AwaitingInspection,
}

impl MotoStatus {
    pub fn parse_or_default(raw: &str) -> Self {
        match raw.trim() {
            "pronta" => MotoStatus::ReadyForRental,
            "manutencao" | "manutenção" => MotoStatus::InMaintenance,
            "quarentena" => MotoStatus::Quarantined,
            "reservada" => MotoStatus::Reserved,
            "aguardando_vistoria" => MotoStatus::AwaitingInspection,
            _ => MotoStatus::AwaitingInspection,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MotoStatus::ReadyForRental => "pronta",
            MotoStatus::InMaintenance => "manutencao",
            MotoStatus::Quarantined => "quarentena",
            MotoStatus::Reserved => "reservada",
            MotoStatus::AwaitingInspection => "aguardando_vistoria",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridPosition {
    pub x: i32,
    pub y: i32,
}

/// A registered motorcycle. `plate` is immutable after creation and
/// `entered_at_ms` is set once at registration; both are enforced by the
/// record store, not by this struct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Motorcycle {
    pub id: String,
    pub plate: String,
    pub model: MotoModel,
    pub color: String,
    pub status: MotoStatus,
    pub entered_at_ms: i64,
    pub position: Option<GridPosition>,
    #[serde(default)]
    pub reserved: bool,
}

/// Payload for register/update operations. Field-presence and plate-length
/// validation is the caller's job; the stores validate only what they own
/// (session, plate immutability).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotorcycleDraft {
    pub plate: String,
    pub model: MotoModel,
    pub color: String,
    pub status: MotoStatus,
}

/// One slot of the placement grid. The embedded motorcycle is a denormalized
/// snapshot taken at placement, not a live reference into the record store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    pub x: i32,
    pub y: i32,
    pub occupied: bool,
    pub motorcycle: Option<Motorcycle>,
}

impl GridCell {
    pub fn empty(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            occupied: false,
            motorcycle: None,
        }
    }
}

/// Append-only audit entry fed by store mutations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEvent {
    pub id: String,
    pub action: String,
    pub details: Option<String>,
    pub timestamp_ms: i64,
}

/// Shape of a motorcycle record as the remote service returns it. Optional
/// fields the server may omit get fixed defaults during normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteMotorcycle {
    pub id: String,
    pub placa: String,
    pub modelo: String,
    pub cor: String,
    pub status: String,
    #[serde(rename = "dataEntrada", default)]
    pub data_entrada: Option<i64>,
    #[serde(default)]
    pub posicao: Option<GridPosition>,
    #[serde(default)]
    pub reservada: Option<bool>,
}

impl RemoteMotorcycle {
    /// Explicit field mapping into the canonical shape: `reservada` defaults
    /// to false, `posicao` to None, a missing entry timestamp to "now".
    pub fn normalize(self) -> Motorcycle {
        Motorcycle {
            id: self.id,
            plate: self.placa,
            model: MotoModel::parse_or_default(&self.modelo),
            color: self.cor,
            status: MotoStatus::parse_or_default(&self.status),
            entered_at_ms: self.data_entrada.unwrap_or_else(epoch_ms),
            position: self.posicao,
            reserved: self.reservada.unwrap_or(false),
        }
    }
}

/// Body sent on POST/PUT: the four caller-owned fields, Brazilian vocabulary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemotePayload {
    pub placa: String,
    pub modelo: String,
    pub cor: String,
    pub status: String,
}

impl RemotePayload {
    pub fn from_draft(draft: &MotorcycleDraft) -> Self {
        Self {
            placa: draft.plate.clone(),
            modelo: draft.model.as_str().to_string(),
            cor: draft.color.clone(),
            status: draft.status.as_str().to_string(),
        }
    }

    pub fn from_motorcycle(moto: &Motorcycle) -> Self {
        Self {
            placa: moto.plate.clone(),
            modelo: moto.model.as_str().to_string(),
            cor: moto.color.clone(),
            status: moto.status.as_str().to_string(),
        }
    }
}
