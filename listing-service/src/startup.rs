//! Application startup and lifecycle management.

use crate::config::{ListingConfig, LlmConfig};
use crate::handlers::{
    health_check, metrics_endpoint, readiness_check,
    texts::{generate_texts, llm_debug, llm_last, llm_test},
    watermark::{get_watermark, save_watermark},
    zip::create_zip,
};
use crate::services::providers::groq::{GroqConfig, GroqTextProvider};
use crate::services::providers::{GenerationParams, TextProvider};
use crate::services::{Database, TextGenerator};
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::metrics::metrics_middleware;
use service_core::middleware::tracing::{request_id_middleware, REQUEST_ID_HEADER};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// JSON bodies up to 10 MB.
const BODY_LIMIT_BYTES: usize = 10 * 1024 * 1024;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ListingConfig,
    pub db: Arc<Database>,
    pub text_generator: Arc<TextGenerator>,
}

/// Groq-backed generator with the configured sampling parameters.
pub fn build_text_generator(llm: &LlmConfig) -> Result<TextGenerator, AppError> {
    let provider = GroqTextProvider::new(GroqConfig {
        api_key: llm.api_key.clone(),
        model: llm.model.clone(),
        base_url: llm.base_url.clone(),
        timeout: Duration::from_secs(llm.timeout_secs),
    })
    .map_err(|e| AppError::ConfigError(anyhow::Error::new(e)))?;

    if !llm.has_key() {
        tracing::warn!("GROQ_API_KEY not configured - text generation will use fallback copy");
    }

    let provider: Arc<dyn TextProvider> = Arc::new(provider);
    Ok(TextGenerator::new(
        provider,
        GenerationParams {
            temperature: Some(llm.temperature),
            top_p: Some(llm.top_p),
            max_tokens: Some(llm.max_completion_tokens),
            json_output: true,
        },
    ))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics_endpoint))
        .route("/watermark", post(save_watermark))
        .route("/watermark/:user_id", get(get_watermark))
        .route("/texts/generate", post(generate_texts))
        .route("/llm/debug", get(llm_debug))
        .route("/llm/last", get(llm_last))
        .route("/llm/test", get(llm_test))
        .route("/zip/create", post(create_zip))
        .route_layer(middleware::from_fn(metrics_middleware))
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Open the database, run migrations and bind the listener.
    pub async fn build(config: ListingConfig) -> Result<Self, AppError> {
        let db = Database::new(
            &config.database.url,
            config.database.max_connections,
            config.database.min_connections,
        )
        .await?;

        db.run_migrations().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to run database migrations");
            e
        })?;

        let text_generator = build_text_generator(&config.llm)?;

        // Port 0 = random port for testing
        let addr = config.common.socket_addr();
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!(%addr, error = %e, "Failed to bind HTTP listener");
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        let state = AppState {
            config,
            db: Arc::new(db),
            text_generator: Arc::new(text_generator),
        };

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn db(&self) -> Arc<Database> {
        self.state.db.clone()
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state);

        tracing::info!(
            service = "listing-service",
            version = env!("CARGO_PKG_VERSION"),
            http_port = self.port,
            "Service ready to accept connections"
        );

        axum::serve(self.listener, router).await.map_err(|e| {
            tracing::error!(error = %e, "HTTP server error");
            std::io::Error::other(format!("HTTP server error: {}", e))
        })
    }
}
