mod config;
mod errors;
mod extraction;
mod models;
mod qa;
mod resume;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::qa::{DistilBertAnswerer, QuestionAnswerer, UnavailableAnswerer};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume title finder v{}", env!("CARGO_PKG_VERSION"));

    // Load the QA model once; every request shares it read-only
    let answerer = load_answerer(&config).await?;

    let state = AppState {
        config: config.clone(),
        answerer,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Loads the model on the blocking pool. A load failure does not stop the
/// server: uploads still extract text and report the failure as the answer.
async fn load_answerer(config: &Config) -> Result<Arc<dyn QuestionAnswerer>> {
    let model_config = config.model.clone();
    let loaded = tokio::task::spawn_blocking(move || DistilBertAnswerer::load(&model_config)).await?;

    Ok(match loaded {
        Ok(model) => Arc::new(model),
        Err(e) => {
            warn!("QA model unavailable, job titles will report the error: {e}");
            Arc::new(UnavailableAnswerer::new(e))
        }
    })
}
