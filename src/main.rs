mod auth;
mod classifier;
mod config;
mod engine;
mod types;

use axum::{
    Router,
    extract::State,
    http::{HeaderMap, header},
    response::Json,
    routing::{get, post},
};
use axum_prometheus::PrometheusMetricLayer;
use clap::Parser;
use metrics::counter;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use classifier::{ClassifierConfig, ToxicityClassifier};
use config::Config;
use engine::Engine;
use types::{ApiError, ClassifyRequest, ClassifyResponse};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Pick up SERVICE_JWT and friends from a local .env file if present
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,verdict=debug".into()),
        )
        .init();

    let config = Config::parse();
    tracing::info!("Starting classification server with config: {:?}", config);

    // Validate that either model_id or model_path is provided
    let Some(model_name) = config.model_name() else {
        anyhow::bail!("Either --model-id or --model-path must be provided");
    };

    let secret = config.secret();
    if secret.is_none() {
        tracing::warn!("SERVICE_JWT is not set; every request will be rejected with 401");
    }

    let classifier_config = ClassifierConfig {
        model_id: config.model_id.clone(),
        model_path: config.model_path.clone(),
        revision: config.model_revision.clone(),
        use_pth: config.use_pth,
        cpu: config.cpu_only,
        max_sequence_length: config.max_sequence_length,
    };

    tracing::info!("Loading classifier model...");
    let classifier = ToxicityClassifier::new(classifier_config).await?;
    tracing::info!("Model loaded successfully");

    let state = AppState::new(Arc::new(classifier), model_name, secret);

    let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();

    let app = Router::new()
        .route("/classify", post(classify_handler))
        .route("/metrics", get(|| async move { metric_handle.render() }))
        .layer(prometheus_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = TcpListener::bind(&config.server_address()).await?;
    tracing::info!("Server running on http://{}", config.server_address());

    axum::serve(listener, app).await?;
    Ok(())
}

#[derive(Clone)]
struct AppState {
    engine: Arc<dyn Engine>,
    model: String,
    secret: Option<String>,
}

impl AppState {
    fn new(engine: Arc<dyn Engine>, model: String, secret: Option<String>) -> Self {
        Self {
            engine,
            model,
            secret,
        }
    }
}

#[tracing::instrument(skip(state, headers, request), fields(text_len = request.text.len(), lang = %request.lang))]
async fn classify_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<ClassifyRequest>,
) -> Result<Json<ClassifyResponse>, ApiError> {
    counter!("classification_requests_total").increment(1);

    if !auth::authorize(&headers, state.secret.as_deref()) {
        counter!("classification_auth_failures_total").increment(1);
        tracing::warn!(
            header_present = headers.contains_key(header::AUTHORIZATION),
            "Rejecting request with bad token"
        );
        return Err(ApiError::unauthorized());
    }

    let logits = state.engine.score(&request.text).await.map_err(|e| {
        tracing::error!(error = %e, "Classification failed");
        ApiError::internal()
    })?;

    tracing::info!("Classification completed successfully");
    Ok(Json(ClassifyResponse::from_logits(
        state.model.clone(),
        logits,
    )))
}
