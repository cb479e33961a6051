use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use culturefit_classifiers::error::PredictError;

/// Request-level failure. Converts into a `{"error": ...}` JSON body.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Prediction failed: {0}")]
    Prediction(String),
}

impl From<PredictError> for AppError {
    fn from(err: PredictError) -> Self {
        match err {
            PredictError::Validation(msg) => AppError::Validation(msg),
            PredictError::Prediction(msg) => AppError::Prediction(msg),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Prediction(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::Validation(msg) => log::warn!("Rejected request: {}", msg),
            AppError::Prediction(msg) => log::error!("Prediction error: {}", msg),
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
