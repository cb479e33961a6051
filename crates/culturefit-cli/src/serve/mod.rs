pub mod errors;
pub mod routes;
pub mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use culturefit_classifiers::predictor::ModelBundle;

use crate::serve::routes::build_router;
use crate::serve::state::AppState;

#[derive(Debug, Clone)]
pub struct ServeConfig {
    pub models_dir: PathBuf,
    pub host: String,
    pub port: u16,
}

/// Load the models and serve until the process is stopped. A missing or
/// unreadable model file fails before the socket is bound.
pub async fn run_server(config: ServeConfig) -> Result<()> {
    let models = ModelBundle::load(&config.models_dir)
        .with_context(|| format!("Failed to load models from {:?}", config.models_dir))?;
    let state = AppState::new(Arc::new(models));

    let app = build_router(state).layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", config.host, config.port))?;
    let addr: SocketAddr = listener.local_addr()?;
    log::info!("Listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
