/// ML модели

pub mod network;

pub use network::{Activation, DenseLayer, FeedForwardNetwork};

use ndarray::ArrayView1;

use crate::error::MlResult;

/// Модель как capability: нормализованный вектор -> цена.
/// Внутренняя архитектура не важна для пайплайна.
pub trait Predictor: Send + Sync {
    fn predict(&self, input: ArrayView1<f64>) -> MlResult<f64>;

    fn input_dim(&self) -> usize;
}
