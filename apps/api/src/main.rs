mod config;
mod cv;
mod db;
mod errors;
mod llm_client;
mod models;
mod profiles;
mod render;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::cv::prompt::{FileTemplateStore, StaticTemplateStore, TemplateStore};
use crate::cv::store::{CvStore, PgCvStore};
use crate::cv::CvPipeline;
use crate::db::create_pool;
use crate::llm_client::prompts::DEFAULT_CV_TEMPLATE;
use crate::llm_client::{LlmClient, LlmConfig};
use crate::profiles::PgProfileStore;
use crate::render::PdfRenderer;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CVSmith API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    let profiles = Arc::new(PgProfileStore::new(db.clone()));
    let cvs: Arc<dyn CvStore> = Arc::new(PgCvStore::new(db));

    // Initialize LLM client
    let llm = LlmClient::new(LlmConfig {
        api_url: config.llm_api_url.clone(),
        api_key: config.llm_api_key.clone(),
        model: config.llm_model.clone(),
        temperature: config.llm_temperature,
        request_timeout: config.llm_request_timeout,
    })?;
    info!(
        "LLM client initialized (model: {}, attempt timeout: {}s)",
        llm.model(),
        config.llm_request_timeout.as_secs()
    );

    // Prompt template: file on disk when configured, built-in otherwise
    let templates: Arc<dyn TemplateStore> = match &config.prompt_template_path {
        Some(path) => {
            info!("Using prompt template {}", path.display());
            Arc::new(FileTemplateStore::new(path.clone()))
        }
        None => Arc::new(StaticTemplateStore::new(DEFAULT_CV_TEMPLATE)),
    };

    let pipeline = CvPipeline::new(
        templates,
        Arc::new(llm),
        cvs.clone(),
        Arc::new(PdfRenderer::default()),
    )
    .with_strategy(config.normalizer)
    .with_completion_timeout(config.completion_timeout);
    info!(
        "CV pipeline ready (normalizer: {:?}, completion timeout: {}s)",
        config.normalizer,
        config.completion_timeout.as_secs()
    );

    // Build app state
    let state = AppState {
        profiles,
        cvs,
        pipeline,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
