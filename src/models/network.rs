//! Полносвязная сеть для регрессии цены

use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

use super::Predictor;
use crate::error::{MlError, MlResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Linear,
    Relu,
    Sigmoid,
    Tanh,
}

impl Activation {
    fn apply(self, x: f64) -> f64 {
        match self {
            Activation::Linear => x,
            Activation::Relu => x.max(0.0),
            Activation::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Activation::Tanh => x.tanh(),
        }
    }
}

/// Dense слой: `y = act(x · kernel + bias)`, kernel имеет форму (in, units)
#[derive(Debug, Clone)]
pub struct DenseLayer {
    kernel: Array2<f64>,
    bias: Array1<f64>,
    activation: Activation,
}

impl DenseLayer {
    pub fn new(kernel: Array2<f64>, bias: Array1<f64>, activation: Activation) -> Result<Self, String> {
        if kernel.nrows() == 0 || kernel.ncols() == 0 {
            return Err("Empty kernel".to_string());
        }
        if bias.len() != kernel.ncols() {
            return Err(format!(
                "bias has {} entries but kernel has {} units",
                bias.len(),
                kernel.ncols()
            ));
        }
        if kernel.iter().chain(bias.iter()).any(|v| !v.is_finite()) {
            return Err("Non-finite parameter".to_string());
        }

        Ok(Self {
            kernel,
            bias,
            activation,
        })
    }

    pub fn input_dim(&self) -> usize {
        self.kernel.nrows()
    }

    pub fn units(&self) -> usize {
        self.kernel.ncols()
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    /// Переполнение проверяется до активации: ReLU превратил бы NaN в 0
    fn forward(&self, input: ArrayView1<f64>) -> Result<Array1<f64>, String> {
        let pre_activation = input.dot(&self.kernel) + &self.bias;
        if let Some(i) = pre_activation.iter().position(|v| !v.is_finite()) {
            return Err(format!("unit {} is {}", i, pre_activation[i]));
        }

        let activation = self.activation;
        Ok(pre_activation.mapv_into(|x| activation.apply(x)))
    }
}

/// Последовательность dense слоев с одним выходом
#[derive(Debug, Clone)]
pub struct FeedForwardNetwork {
    layers: Vec<DenseLayer>,
}

impl FeedForwardNetwork {
    pub fn new(layers: Vec<DenseLayer>) -> Result<Self, String> {
        let first = layers.first().ok_or("Network has no layers")?;
        let mut width = first.input_dim();

        for (i, layer) in layers.iter().enumerate() {
            if layer.input_dim() != width {
                return Err(format!(
                    "layer {} expects {} inputs but previous layer emits {}",
                    i,
                    layer.input_dim(),
                    width
                ));
            }
            width = layer.units();
        }

        if width != 1 {
            return Err(format!("last layer must emit 1 unit, got {}", width));
        }

        Ok(Self { layers })
    }

    pub fn layers(&self) -> &[DenseLayer] {
        &self.layers
    }
}

impl Predictor for FeedForwardNetwork {
    fn predict(&self, input: ArrayView1<f64>) -> MlResult<f64> {
        let expected = self.input_dim();
        if input.len() != expected {
            return Err(MlError::ShapeMismatch {
                expected,
                actual: input.len(),
            });
        }

        let mut hidden = input.to_owned();
        for (i, layer) in self.layers.iter().enumerate() {
            hidden = layer.forward(hidden.view()).map_err(|e| {
                MlError::Inference(format!("layer {} produced a non-finite value: {}", i, e))
            })?;
        }

        Ok(hidden[0])
    }

    fn input_dim(&self) -> usize {
        self.layers[0].input_dim()
    }
}
