use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use culturefit_classifiers::predictor::PredictionResult;
use culturefit_classifiers::schema::FeatureRecord;

use crate::serve::errors::AppError;
use crate::serve::state::AppState;

/// GET /health
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "culturefit"
    }))
}

/// POST /predict_all
///
/// A body that fails to deserialise (missing field, wrong type) is a
/// validation error and never reaches the models.
pub async fn predict_all_handler(
    State(state): State<AppState>,
    payload: Result<Json<FeatureRecord>, JsonRejection>,
) -> Result<Json<PredictionResult>, AppError> {
    let Json(record) = payload?;
    let result = state.predictor.predict_all(&record)?;
    log::debug!(
        "Predicted score={:.2} risk={} team={}",
        result.culture_fit_score,
        result.conflict_risk,
        result.recommended_team
    );
    Ok(Json(result))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/predict_all", post(predict_all_handler))
        .with_state(state)
}
