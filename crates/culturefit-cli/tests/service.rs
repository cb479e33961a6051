//! Router tests driven through `tower::ServiceExt::oneshot`.

mod common;

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use culturefit_classifiers::config::{ForestConfig, TrainingOptions};
use culturefit_classifiers::data_handling::Dataset;
use culturefit_classifiers::error::PredictError;
use culturefit_classifiers::predictor::{CulturePredictor, PredictionResult};
use culturefit_classifiers::schema::{ConflictRisk, FeatureRecord};
use culturefit_classifiers::training::train_all;
use culturefit_cli::serve::routes::build_router;
use culturefit_cli::serve::state::AppState;

struct FixedPredictor;

impl CulturePredictor for FixedPredictor {
    fn predict_all(&self, record: &FeatureRecord) -> Result<PredictionResult, PredictError> {
        record.validate()?;
        Ok(PredictionResult {
            culture_fit_score: 77.5,
            conflict_risk: ConflictRisk::Low,
            recommended_team: "Research".to_string(),
        })
    }
}

struct FailingPredictor;

impl CulturePredictor for FailingPredictor {
    fn predict_all(&self, _record: &FeatureRecord) -> Result<PredictionResult, PredictError> {
        Err(PredictError::Prediction("model exploded".to_string()))
    }
}

fn router(predictor: impl CulturePredictor + 'static) -> Router {
    build_router(AppState::new(Arc::new(predictor)))
}

fn post_json(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/predict_all")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn health_reports_ok() {
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(router(FixedPredictor), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn predict_all_returns_combined_result() {
    let (status, body) = send(router(FixedPredictor), post_json(common::SCENARIO_JSON)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["culture_fit_score"], 77.5);
    assert_eq!(body["conflict_risk"], "Low");
    assert_eq!(body["recommended_team"], "Research");
}

#[tokio::test]
async fn missing_field_is_unprocessable() {
    let mut record: Value = serde_json::from_str(common::SCENARIO_JSON).unwrap();
    record.as_object_mut().unwrap().remove("Value_Ethics");

    let (status, body) = send(router(FixedPredictor), post_json(&record.to_string())).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("Value_Ethics"));
}

#[tokio::test]
async fn wrong_type_and_malformed_body_are_unprocessable() {
    let wrong_type = common::SCENARIO_JSON.replace("\"Value_Teamwork\": 9", "\"Value_Teamwork\": \"nine\"");
    let (status, body) = send(router(FixedPredictor), post_json(&wrong_type)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].is_string());

    let (status, _) = send(router(FixedPredictor), post_json("{ nope")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn out_of_range_value_score_is_unprocessable() {
    let too_high = common::SCENARIO_JSON.replace("\"Value_Ethics\": 9", "\"Value_Ethics\": 1000");
    let (status, body) = send(router(FixedPredictor), post_json(&too_high)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("Value_Ethics"));

    let negative = common::SCENARIO_JSON.replace("\"Value_Teamwork\": 9", "\"Value_Teamwork\": -3");
    let (status, _) = send(router(FixedPredictor), post_json(&negative)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn prediction_failure_is_internal_error() {
    let (status, body) = send(router(FailingPredictor), post_json(common::SCENARIO_JSON)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("model exploded"));
}

#[tokio::test]
async fn trained_models_answer_the_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = Dataset::from_csv(common::write_training_csv(dir.path(), 60)).unwrap();
    let options = TrainingOptions {
        regressor: ForestConfig::default().with_n_estimators(10),
        classifier: ForestConfig::default().with_n_estimators(10),
        ..TrainingOptions::default()
    };
    let models = train_all(&dataset, &options).unwrap().models;

    let (status, body) = send(router(models), post_json(common::SCENARIO_JSON)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["culture_fit_score"].is_f64());
    assert!(["Low", "Medium", "High"].contains(&body["conflict_risk"].as_str().unwrap()));
    assert!(["Engineering", "Sales", "Research"].contains(&body["recommended_team"].as_str().unwrap()));
}
