//! Yard configuration: remote endpoint, data directory, grid dimensions.
//!
//! Loaded from the YAML file named by `PATIO_CONFIG` (default `patio.yaml`);
//! missing or invalid files fall back to defaults so the core always starts.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatioConfig {
    pub api: ApiConf,
    pub storage: StorageConf,
    pub grid: GridConf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConf {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConf {
    pub data_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConf {
    pub columns: u32,
    pub rows: u32,
}

impl Default for PatioConfig {
    fn default() -> Self {
        Self {
            api: ApiConf {
                base_url: "http://localhost:3000".into(),
                timeout_secs: 15,
            },
            storage: StorageConf {
                data_dir: "./patio-data".into(),
            },
            grid: GridConf {
                columns: 8,
                rows: 8,
            },
        }
    }
}

pub async fn load_config() -> PatioConfig {
    let path = std::env::var("PATIO_CONFIG").unwrap_or_else(|_| "patio.yaml".into());
    if !Path::new(&path).exists() {
        warn!("no {path}, using default config");
        return PatioConfig::default();
    }
    let text = fs::read_to_string(&path).await.unwrap_or_default();
    if text.trim().is_empty() {
        return PatioConfig::default();
    }
    serde_yaml::from_str(&text).unwrap_or_else(|e| {
        warn!("invalid config {path}: {e}, using defaults");
        PatioConfig::default()
    })
}
