//! Test-data builders for yard records.

use anyhow::Context;
use patio_core::models::{
    MotoModel, MotoStatus, Motorcycle, MotorcycleDraft, RemoteMotorcycle,
};

pub fn draft(plate: &str) -> MotorcycleDraft {
    MotorcycleDraft {
        plate: plate.to_string(),
        model: MotoModel::Sport,
        color: "verde".to_string(),
        status: MotoStatus::ReadyForRental,
    }
}

pub fn motorcycle(id: &str, plate: &str) -> Motorcycle {
    Motorcycle {
        id: id.to_string(),
        plate: plate.to_string(),
        model: MotoModel::Sport,
        color: "verde".to_string(),
        status: MotoStatus::ReadyForRental,
        entered_at_ms: 1_700_000_000_000,
        position: None,
        reserved: false,
    }
}

/// Server-shaped record, the minimal fields the service always returns.
pub fn remote_motorcycle(id: &str, plate: &str) -> RemoteMotorcycle {
    RemoteMotorcycle {
        id: id.to_string(),
        placa: plate.to_string(),
        modelo: "Mottu Sport".to_string(),
        cor: "verde".to_string(),
        status: "pronta".to_string(),
        data_entrada: Some(1_700_000_000_000),
        posicao: None,
        reservada: None,
    }
}

/// Parses a raw JSON fleet (the `GET /motorcycles` body) for stub seeding.
pub fn remote_fleet_from_json(raw: &str) -> anyhow::Result<Vec<RemoteMotorcycle>> {
    serde_json::from_str(raw).context("invalid remote fleet JSON")
}
