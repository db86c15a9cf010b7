//! Нормализация признаков предобученным скейлером

use ndarray::{Array1, ArrayView1};

use crate::error::{MlError, MlResult};

/// Преобразование сырых признаков в масштаб, на котором обучалась модель
pub trait Normalizer: Send + Sync {
    fn normalize(&self, features: ArrayView1<f64>) -> MlResult<Array1<f64>>;

    fn n_features(&self) -> usize;
}

/// Standard scaler: `(x - mean) / scale`. Параметры берутся из артефакта и не меняются.
#[derive(Debug, Clone)]
pub struct StandardScaler {
    mean: Array1<f64>,
    scale: Array1<f64>,
}

impl StandardScaler {
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self, String> {
        if mean.is_empty() {
            return Err("Empty scaler parameters".to_string());
        }
        if mean.len() != scale.len() {
            return Err(format!(
                "mean has {} entries but scale has {}",
                mean.len(),
                scale.len()
            ));
        }
        if let Some(i) = mean.iter().position(|m| !m.is_finite()) {
            return Err(format!("mean[{}] is not finite", i));
        }
        // Деление на ноль недопустимо
        if let Some(i) = scale.iter().position(|s| !s.is_finite() || s.abs() < 1e-12) {
            return Err(format!("scale[{}] must be finite and non-zero", i));
        }

        Ok(Self {
            mean: Array1::from(mean),
            scale: Array1::from(scale),
        })
    }

    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    pub fn scale(&self) -> &Array1<f64> {
        &self.scale
    }
}

impl Normalizer for StandardScaler {
    fn normalize(&self, features: ArrayView1<f64>) -> MlResult<Array1<f64>> {
        if features.len() != self.mean.len() {
            return Err(MlError::ShapeMismatch {
                expected: self.mean.len(),
                actual: features.len(),
            });
        }

        Ok((&features - &self.mean) / &self.scale)
    }

    fn n_features(&self) -> usize {
        self.mean.len()
    }
}
