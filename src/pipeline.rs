//! Пайплайн инференса: скейлер -> модель -> цена

use std::sync::Arc;

use ndarray::ArrayView1;

use crate::artifacts::{self, ArtifactPaths};
use crate::error::{MlError, MlResult};
use crate::models::Predictor;
use crate::preprocessing::Normalizer;
use crate::types::{FeatureVector, PricePrediction, FEATURE_COUNT};

/// Единственная точка входа для слоя представления.
/// Параметры неизменяемы после загрузки, поэтому пайплайн можно
/// делить между потоками через `Arc` без блокировок.
#[derive(Clone)]
pub struct InferencePipeline {
    scaler: Arc<dyn Normalizer>,
    model: Arc<dyn Predictor>,
}

impl InferencePipeline {
    pub fn new(scaler: Arc<dyn Normalizer>, model: Arc<dyn Predictor>) -> MlResult<Self> {
        if scaler.n_features() != FEATURE_COUNT {
            return Err(MlError::ShapeMismatch {
                expected: FEATURE_COUNT,
                actual: scaler.n_features(),
            });
        }
        if model.input_dim() != scaler.n_features() {
            return Err(MlError::ShapeMismatch {
                expected: scaler.n_features(),
                actual: model.input_dim(),
            });
        }

        Ok(Self { scaler, model })
    }

    /// Загрузка обоих артефактов при старте. Ошибка здесь означает, что сервис не поднимается.
    pub fn from_artifacts(paths: &ArtifactPaths) -> MlResult<Self> {
        let (scaler, model) = artifacts::load(paths)?;
        Self::new(Arc::new(scaler), Arc::new(model))
            .map_err(|e| MlError::artifact(&paths.model, format!("incompatible with scaler: {}", e)))
    }

    /// `model.predict(scaler.normalize(input))`
    pub fn estimate(&self, features: &[f64]) -> MlResult<PricePrediction> {
        if features.len() != FEATURE_COUNT {
            return Err(MlError::ShapeMismatch {
                expected: FEATURE_COUNT,
                actual: features.len(),
            });
        }

        let normalized = self
            .scaler
            .normalize(ArrayView1::from(features))
            .map_err(into_call_error)?;
        let price = self
            .model
            .predict(normalized.view())
            .map_err(into_call_error)?;

        tracing::debug!("Estimated {:.2} for {:?}", price, features);
        Ok(PricePrediction(price))
    }

    pub fn estimate_features(&self, features: &FeatureVector) -> MlResult<PricePrediction> {
        self.estimate(&features.to_array())
    }
}

/// ShapeMismatch и Inference уходят как есть, остальное сворачивается в PredictionFailed
fn into_call_error(err: MlError) -> MlError {
    match err {
        MlError::ShapeMismatch { .. } | MlError::Inference(_) | MlError::PredictionFailed(_) => err,
        other => MlError::PredictionFailed(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Activation, DenseLayer, FeedForwardNetwork};
    use crate::preprocessing::StandardScaler;
    use ndarray::{array, Array1, Array2};

    fn pipeline() -> InferencePipeline {
        let scaler = StandardScaler::new(vec![0.0; 5], vec![1.0, 1.0, 1.0, 1.0, 10.0]).unwrap();
        let layer = DenseLayer::new(Array2::ones((5, 1)), array![100.0], Activation::Linear).unwrap();
        let model = FeedForwardNetwork::new(vec![layer]).unwrap();
        InferencePipeline::new(Arc::new(scaler), Arc::new(model)).unwrap()
    }

    /// Модель, которая всегда падает с заданной ошибкой
    struct Failing(fn() -> MlError);

    impl Predictor for Failing {
        fn predict(&self, _input: ArrayView1<f64>) -> MlResult<f64> {
            Err((self.0)())
        }

        fn input_dim(&self) -> usize {
            FEATURE_COUNT
        }
    }

    fn with_failing_model(make: fn() -> MlError) -> InferencePipeline {
        let scaler = StandardScaler::new(vec![0.0; 5], vec![1.0; 5]).unwrap();
        InferencePipeline::new(Arc::new(scaler), Arc::new(Failing(make))).unwrap()
    }

    #[test]
    fn composes_scaler_and_model() {
        let price = pipeline().estimate(&[1.0, 2.0, 3.0, 4.0, 50.0]).unwrap();
        assert_eq!(price.value(), 1.0 + 2.0 + 3.0 + 4.0 + 5.0 + 100.0);
    }

    #[test]
    fn wrong_length_is_shape_mismatch() {
        let p = pipeline();
        for len in [0usize, 4, 6] {
            let input = vec![1.0; len];
            match p.estimate(&input) {
                Err(MlError::ShapeMismatch { expected, actual }) => {
                    assert_eq!(expected, 5);
                    assert_eq!(actual, len);
                }
                other => panic!("expected ShapeMismatch for len {}, got {:?}", len, other),
            }
        }
    }

    #[test]
    fn inference_errors_pass_through() {
        let p = with_failing_model(|| MlError::Inference("overflow".to_string()));
        assert!(matches!(p.estimate(&[0.0; 5]), Err(MlError::Inference(_))));
    }

    #[test]
    fn unexpected_errors_become_prediction_failed() {
        let p = with_failing_model(|| MlError::artifact("model.json", "weights were swapped out"));
        match p.estimate(&[0.0; 5]) {
            Err(MlError::PredictionFailed(msg)) => assert!(msg.contains("weights were swapped out")),
            other => panic!("expected PredictionFailed, got {:?}", other),
        }
    }

    #[test]
    fn rejects_incompatible_components() {
        let scaler = StandardScaler::new(vec![0.0; 5], vec![1.0; 5]).unwrap();
        let layer = DenseLayer::new(Array2::ones((3, 1)), Array1::zeros(1), Activation::Linear).unwrap();
        let model = FeedForwardNetwork::new(vec![layer]).unwrap();
        assert!(InferencePipeline::new(Arc::new(scaler), Arc::new(model)).is_err());

        let short = StandardScaler::new(vec![0.0; 3], vec![1.0; 3]).unwrap();
        let layer = DenseLayer::new(Array2::ones((3, 1)), Array1::zeros(1), Activation::Linear).unwrap();
        let model = FeedForwardNetwork::new(vec![layer]).unwrap();
        assert!(InferencePipeline::new(Arc::new(short), Arc::new(model)).is_err());
    }

    #[test]
    fn estimate_is_deterministic() {
        let p = pipeline();
        let fv = FeatureVector::defaults();
        let a = p.estimate_features(&fv).unwrap();
        let b = p.estimate_features(&fv).unwrap();
        assert_eq!(a.value().to_bits(), b.value().to_bits());
    }
}
