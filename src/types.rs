/// Типы данных для модели оценки стоимости жилья

use serde::{Deserialize, Serialize};

use crate::error::{MlError, MlResult};

/// Количество признаков, на которых обучены скейлер и модель
pub const FEATURE_COUNT: usize = 5;

/// Фиксированный порядок признаков. Менять нельзя: артефакты обучены именно на нем.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "average_area_income",
    "average_area_house_age",
    "average_area_number_of_rooms",
    "average_area_number_of_bedrooms",
    "area_population",
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub average_area_income: f64,
    pub average_area_house_age: f64,
    pub average_area_number_of_rooms: f64,
    pub average_area_number_of_bedrooms: f64,
    pub area_population: f64,
}

impl FeatureVector {
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.average_area_income,
            self.average_area_house_age,
            self.average_area_number_of_rooms,
            self.average_area_number_of_bedrooms,
            self.area_population,
        ]
    }

    /// Сборка из сырого среза. Длина должна быть ровно 5, без усечения и дополнения.
    pub fn from_slice(values: &[f64]) -> MlResult<Self> {
        match *values {
            [income, age, rooms, bedrooms, population] => Ok(Self {
                average_area_income: income,
                average_area_house_age: age,
                average_area_number_of_rooms: rooms,
                average_area_number_of_bedrooms: bedrooms,
                area_population: population,
            }),
            _ => Err(MlError::ShapeMismatch {
                expected: FEATURE_COUNT,
                actual: values.len(),
            }),
        }
    }

    /// Значения слайдеров по умолчанию
    pub fn defaults() -> Self {
        Self::from_bounds(|b| b.default)
    }

    /// Все слайдеры на максимуме
    pub fn maximums() -> Self {
        Self::from_bounds(|b| b.max)
    }

    fn from_bounds(pick: impl Fn(&FeatureBounds) -> f64) -> Self {
        let b = slider_bounds();
        Self {
            average_area_income: pick(&b[0]),
            average_area_house_age: pick(&b[1]),
            average_area_number_of_rooms: pick(&b[2]),
            average_area_number_of_bedrooms: pick(&b[3]),
            area_population: pick(&b[4]),
        }
    }
}

/// Предсказанная цена в долларах США. Не обрезается: модель может экстраполировать.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PricePrediction(pub f64);

impl PricePrediction {
    pub fn value(&self) -> f64 {
        self.0
    }

    /// `$1,234,567.89`
    pub fn formatted(&self) -> String {
        format_usd(self.0)
    }
}

pub fn format_usd(value: f64) -> String {
    let rounded = format!("{:.2}", value.abs());
    let (int_part, frac_part) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && rounded != "0.00" { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, frac_part)
}

/// Границы слайдера для одного признака (используются только формой)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureBounds {
    pub name: String,
    pub label: String,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default: f64,
    /// Внешний слайдер диапазона: сужает min/max основного слайдера
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<SliderRange>,
}

/// Настраиваемый диапазон. Ходит в пределах `min..=max` основного слайдера
/// с шагом `step`; `default_low..=default_high` задает стартовые границы.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliderRange {
    pub label: String,
    pub step: f64,
    pub default_low: f64,
    pub default_high: f64,
}

pub fn slider_bounds() -> [FeatureBounds; FEATURE_COUNT] {
    let bound = |name: &str, label: &str, min: f64, max: f64, step: f64, default: f64| {
        FeatureBounds {
            name: name.to_string(),
            label: label.to_string(),
            min,
            max,
            step,
            default,
            range: None,
        }
    };
    let range = |label: &str, step: f64, default_low: f64, default_high: f64| {
        Some(SliderRange {
            label: label.to_string(),
            step,
            default_low,
            default_high,
        })
    };

    let mut income = bound(FEATURE_NAMES[0], "Average Area Income ($)", 50_000.0, 200_000.0, 1_000.0, 70_000.0);
    income.range = range("Average Area Income Range ($)", 5_000.0, 50_000.0, 150_000.0);

    let mut population = bound(FEATURE_NAMES[4], "Area Population", 1_000.0, 200_000.0, 100.0, 30_000.0);
    population.range = range("Area Population Range", 1_000.0, 10_000.0, 50_000.0);

    [
        income,
        bound(FEATURE_NAMES[1], "Average Area House Age (years)", 0.0, 100.0, 1.0, 5.0),
        bound(FEATURE_NAMES[2], "Average Number of Rooms", 1.0, 20.0, 1.0, 7.0),
        bound(FEATURE_NAMES[3], "Average Number of Bedrooms", 1.0, 10.0, 1.0, 4.0),
        population,
    ]
}

/// Тело запроса `/api/predict`: либо именованные поля, либо сырой массив
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PredictRequest {
    Raw { features: Vec<f64> },
    Named(FeatureVector),
}

impl PredictRequest {
    pub fn values(&self) -> Vec<f64> {
        match self {
            PredictRequest::Raw { features } => features.clone(),
            PredictRequest::Named(fv) => fv.to_array().to_vec(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub predicted_price: f64,
    pub formatted: String,
    pub features: FeatureVector,
    pub generated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaResponse {
    pub feature_order: Vec<String>,
    pub features: Vec<FeatureBounds>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
