//! Ошибки инференса

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MlError {
    /// Артефакт отсутствует, поврежден или не совпадает со схемой.
    /// Фатально при старте.
    #[error("Failed to load artifact {path}: {reason}")]
    ArtifactLoad { path: PathBuf, reason: String },

    #[error("Shape mismatch: expected {expected} features, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Inference error: {0}")]
    Inference(String),

    /// Всё остальное, что случилось внутри вызова `estimate`
    #[error("Prediction failed: {0}")]
    PredictionFailed(String),
}

impl MlError {
    pub fn artifact(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        MlError::ArtifactLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Сообщение, которое можно показать пользователю
    pub fn display_message(&self) -> String {
        match self {
            MlError::ShapeMismatch { .. } => self.to_string(),
            other => format!("An error occurred while making predictions: {}", other),
        }
    }
}

pub type MlResult<T> = Result<T, MlError>;
