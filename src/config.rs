//! Конфигурация сервиса из переменных окружения

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;

use crate::artifacts::ArtifactPaths;

pub const SCALER_PATH_VAR: &str = "HOUSE_ML_SCALER_PATH";
pub const MODEL_PATH_VAR: &str = "HOUSE_ML_MODEL_PATH";
pub const BIND_ADDR_VAR: &str = "HOUSE_ML_BIND_ADDR";

const DEFAULT_SCALER_PATH: &str = "artifacts/scaler.json";
const DEFAULT_MODEL_PATH: &str = "artifacts/model.json";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

#[derive(Debug, Clone)]
pub struct Config {
    pub artifacts: ArtifactPaths,
    pub bind_addr: SocketAddr,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Чтение через произвольный источник, чтобы не трогать окружение процесса в тестах
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let scaler = lookup(SCALER_PATH_VAR).unwrap_or_else(|| DEFAULT_SCALER_PATH.to_string());
        let model = lookup(MODEL_PATH_VAR).unwrap_or_else(|| DEFAULT_MODEL_PATH.to_string());
        let bind = lookup(BIND_ADDR_VAR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let bind_addr = bind
            .parse::<SocketAddr>()
            .with_context(|| format!("invalid {} value: {}", BIND_ADDR_VAR, bind))?;

        Ok(Self {
            artifacts: ArtifactPaths {
                scaler: PathBuf::from(scaler),
                model: PathBuf::from(model),
            },
            bind_addr,
        })
    }
}
