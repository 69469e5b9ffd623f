use std::sync::Arc;

use actix_web::{web, HttpResponse};

use crate::error::ApiError;
use crate::inference::{predict_from_model, Classifier};
use crate::models::PredictionResponse;
use crate::validation::{validate, Payload};

/// Read-only state shared by every worker.
pub struct AppState {
    pub model: Arc<dyn Classifier>,
}

impl AppState {
    pub fn new(model: Arc<dyn Classifier>) -> Self {
        Self { model }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/predict").route(web::post().to(predict)));
}

pub async fn predict(
    state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let payload = parse_payload(&body)?;

    let errors = validate(&payload);
    if !errors.is_empty() {
        log::debug!("Rejected request: {:?}", errors);
        return Err(ApiError::Validation(errors));
    }

    // Model execution is CPU bound; keep it off the async workers.
    let model = Arc::clone(&state.model);
    let prediction = web::block(move || predict_from_model(model.as_ref(), &payload))
        .await
        .map_err(|e| ApiError::Prediction(e.to_string()))?
        .map_err(|e| {
            log::error!("Prediction failed: {}", e);
            ApiError::from(e)
        })?;

    log::info!(
        "Predicted {} (confidence {:.3})",
        prediction.label,
        prediction.confidence
    );

    Ok(HttpResponse::Ok().json(PredictionResponse::from(prediction)))
}

/// Decodes the body as a non-empty JSON object, whatever the content type.
fn parse_payload(body: &[u8]) -> Result<Payload, ApiError> {
    match serde_json::from_slice::<serde_json::Value>(body) {
        Ok(serde_json::Value::Object(map)) if !map.is_empty() => Ok(map),
        _ => Err(ApiError::MalformedRequest),
    }
}
