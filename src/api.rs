/// HTTP слой: форма, health, схема слайдеров и предсказание

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{Method, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::error::MlError;
use crate::pipeline::InferencePipeline;
use crate::types::{
    slider_bounds, ErrorResponse, FeatureBounds, FeatureVector, PredictRequest, PredictResponse,
    SchemaResponse, FEATURE_NAMES,
};

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<InferencePipeline>,
}

pub fn router(pipeline: Arc<InferencePipeline>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/schema", get(schema))
        .route("/api/predict", post(predict))
        .layer(cors)
        .with_state(AppState { pipeline })
}

/// Ошибка одного вызова. Процесс продолжает работать.
pub enum ApiError {
    Prediction(MlError),
    /// Тело запроса не разобралось
    BadRequest { status: StatusCode, message: String },
}

impl From<MlError> for ApiError {
    fn from(err: MlError) -> Self {
        ApiError::Prediction(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::Prediction(err) => {
                let status = match err {
                    MlError::ShapeMismatch { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, err.display_message())
            }
            ApiError::BadRequest { status, message } => (status, message),
        };
        (status, Json(ErrorResponse { error })).into_response()
    }
}

async fn index() -> Html<String> {
    Html(render_form())
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn schema() -> Json<SchemaResponse> {
    Json(SchemaResponse {
        feature_order: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
        features: slider_bounds().to_vec(),
    })
}

async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::warn!("Rejected predict body: {}", rejection.body_text());
        rejection
    })?;
    let values = request.values();
    tracing::debug!("Predict request: {} features", values.len());

    let result = FeatureVector::from_slice(&values).and_then(|features| {
        state
            .pipeline
            .estimate_features(&features)
            .map(|prediction| (features, prediction))
    });
    let (features, prediction) = result.map_err(|e| {
        tracing::warn!("Prediction failed: {}", e);
        e
    })?;

    Ok(Json(PredictResponse {
        predicted_price: prediction.value(),
        formatted: prediction.formatted(),
        features,
        generated_at: chrono::Utc::now(),
    }))
}

fn render_form() -> String {
    let sliders: String = slider_bounds().iter().map(render_slider).collect();

    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Smart Home Value Estimator</title></head>
<body>
<h1>Smart Home Value Estimator for the USA</h1>
<form id="house">
{sliders}<button type="submit">Predict Price</button>
</form>
<p id="result"></p>
<script>{script}</script>
</body>
</html>
"#,
        sliders = sliders,
        script = FORM_SCRIPT
    )
}

/// Основной слайдер; для признаков с настраиваемым диапазоном перед ним
/// идут два слайдера нижней и верхней границы
fn render_slider(b: &FeatureBounds) -> String {
    let (min, max, range_inputs) = match &b.range {
        Some(r) => {
            let edge = |side: &str, value: f64| {
                format!(
                    r#"<input type="range" class="range" id="{name}_range_{edge}" data-target="{name}" min="{min}" max="{max}" step="{step}" value="{value}" oninput="applyRange('{name}')">
"#,
                    name = b.name,
                    edge = side,
                    min = b.min,
                    max = b.max,
                    step = r.step,
                    value = value,
                )
            };
            let inputs = format!(
                "<fieldset><legend>{}</legend>\n{}{}</fieldset>\n",
                r.label,
                edge("low", r.default_low),
                edge("high", r.default_high)
            );
            (r.default_low, r.default_high, inputs)
        }
        None => (b.min, b.max, String::new()),
    };

    format!(
        r#"{range_inputs}<label>{label}: <output id="{name}_value">{default}</output>
<input type="range" class="feature" name="{name}" min="{min}" max="{max}" step="{step}" value="{default}"
  oninput="document.getElementById('{name}_value').value = this.value"></label>
"#,
        range_inputs = range_inputs,
        label = b.label,
        name = b.name,
        min = min,
        max = max,
        step = b.step,
        default = b.default,
    )
}

const FORM_SCRIPT: &str = r#"
function applyRange(name) {
  const low = Number(document.getElementById(name + '_range_low').value);
  const high = Number(document.getElementById(name + '_range_high').value);
  const slider = document.querySelector('input.feature[name="' + name + '"]');
  slider.min = Math.min(low, high);
  slider.max = Math.max(low, high);
  const value = Math.min(Math.max(Number(slider.value), Number(slider.min)), Number(slider.max));
  slider.value = value;
  document.getElementById(name + '_value').value = slider.value;
}
document.getElementById('house').addEventListener('submit', async (e) => {
  e.preventDefault();
  const body = {};
  for (const input of e.target.querySelectorAll('input.feature')) {
    body[input.name] = Number(input.value);
  }
  const res = await fetch('/api/predict', {
    method: 'POST',
    headers: { 'Content-Type': 'application/json' },
    body: JSON.stringify(body),
  });
  const data = await res.json();
  document.getElementById('result').textContent = res.ok
    ? 'The predicted house price is ' + data.formatted + '!'
    : data.error;
});
"#;
