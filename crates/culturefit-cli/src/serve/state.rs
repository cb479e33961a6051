use std::sync::Arc;

use culturefit_classifiers::predictor::CulturePredictor;

/// Shared state injected into the route handlers.
#[derive(Clone)]
pub struct AppState {
    /// Loaded once at startup; swap in a stub for tests.
    pub predictor: Arc<dyn CulturePredictor>,
}

impl AppState {
    pub fn new(predictor: Arc<dyn CulturePredictor>) -> Self {
        AppState { predictor }
    }
}
