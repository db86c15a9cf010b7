//! Загрузка артефактов (скейлер и модель) с диска

use std::fs;
use std::path::{Path, PathBuf};

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::{MlError, MlResult};
use crate::models::{Activation, DenseLayer, FeedForwardNetwork};
use crate::preprocessing::StandardScaler;
use crate::types::{FEATURE_COUNT, FEATURE_NAMES};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalerArtifact {
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerArtifact {
    pub kernel: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
    pub activation: Activation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub input_dim: usize,
    pub layers: Vec<LayerArtifact>,
}

#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub scaler: PathBuf,
    pub model: PathBuf,
}

/// Загружает оба артефакта. Любая ошибка фатальна для старта.
pub fn load(paths: &ArtifactPaths) -> MlResult<(StandardScaler, FeedForwardNetwork)> {
    let scaler = load_scaler(&paths.scaler)?;
    let model = load_model(&paths.model)?;

    tracing::info!(
        "Artifacts loaded: scaler={}, model={} ({} layers)",
        paths.scaler.display(),
        paths.model.display(),
        model.layers().len()
    );
    tracing::debug!(
        "Scaler mean={} scale={}; activations={:?}",
        scaler.mean(),
        scaler.scale(),
        model.layers().iter().map(DenseLayer::activation).collect::<Vec<_>>()
    );

    Ok((scaler, model))
}

pub fn load_scaler(path: &Path) -> MlResult<StandardScaler> {
    let artifact: ScalerArtifact = read_json(path)?;

    if let Some(names) = &artifact.feature_names {
        if names.iter().map(String::as_str).ne(FEATURE_NAMES.iter().copied()) {
            return Err(MlError::artifact(
                path,
                format!("feature order {:?} does not match {:?}", names, FEATURE_NAMES),
            ));
        }
    }

    if artifact.mean.len() != FEATURE_COUNT {
        return Err(MlError::artifact(
            path,
            format!(
                "scaler was fit on {} features, expected {}",
                artifact.mean.len(),
                FEATURE_COUNT
            ),
        ));
    }

    StandardScaler::new(artifact.mean, artifact.scale).map_err(|e| MlError::artifact(path, e))
}

pub fn load_model(path: &Path) -> MlResult<FeedForwardNetwork> {
    let artifact: ModelArtifact = read_json(path)?;

    if artifact.input_dim != FEATURE_COUNT {
        return Err(MlError::artifact(
            path,
            format!(
                "model expects {} inputs, expected {}",
                artifact.input_dim, FEATURE_COUNT
            ),
        ));
    }

    let layers = artifact
        .layers
        .into_iter()
        .enumerate()
        .map(|(i, layer)| build_layer(layer).map_err(|e| format!("layer {}: {}", i, e)))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| MlError::artifact(path, e))?;

    let network = FeedForwardNetwork::new(layers).map_err(|e| MlError::artifact(path, e))?;

    if network.layers()[0].input_dim() != artifact.input_dim {
        return Err(MlError::artifact(
            path,
            format!(
                "first layer takes {} inputs but input_dim is {}",
                network.layers()[0].input_dim(),
                artifact.input_dim
            ),
        ));
    }

    Ok(network)
}

fn build_layer(layer: LayerArtifact) -> Result<DenseLayer, String> {
    let rows = layer.kernel.len();
    let cols = layer.kernel.first().map(Vec::len).unwrap_or(0);

    if layer.kernel.iter().any(|row| row.len() != cols) {
        return Err("kernel rows have different lengths".to_string());
    }

    let flat: Vec<f64> = layer.kernel.into_iter().flatten().collect();
    let kernel = Array2::from_shape_vec((rows, cols), flat).map_err(|e| e.to_string())?;

    DenseLayer::new(kernel, Array1::from(layer.bias), layer.activation)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> MlResult<T> {
    let raw = fs::read_to_string(path).map_err(|e| MlError::artifact(path, e))?;
    serde_json::from_str(&raw).map_err(|e| MlError::artifact(path, e))
}
