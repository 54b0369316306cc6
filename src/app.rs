use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::config::Config;
use crate::handlers::{health_handler, parse_question_handler, ready_handler, upload_question_handler};
use crate::middleware::{logging_middleware, AccessGuard};
use crate::services::{ExtractorRegistry, QuestionParser, QuestionStore};

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub guard: AccessGuard,
    pub extractors: Arc<ExtractorRegistry>,
    pub parser: Arc<dyn QuestionParser>,
    pub store: Arc<dyn QuestionStore>,
}

impl AppState {
    pub fn new(
        config: Config,
        parser: Arc<dyn QuestionParser>,
        store: Arc<dyn QuestionStore>,
    ) -> Self {
        let extractors = ExtractorRegistry::from_config(&config);
        Self::with_extractors(config, extractors, parser, store)
    }

    pub fn with_extractors(
        config: Config,
        extractors: ExtractorRegistry,
        parser: Arc<dyn QuestionParser>,
        store: Arc<dyn QuestionStore>,
    ) -> Self {
        Self {
            guard: AccessGuard::new(config.access_id.clone()),
            config: Arc::new(config),
            extractors: Arc::new(extractors),
            parser,
            store,
        }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_allowed_origins);
    let body_limit = DefaultBodyLimit::max(state.config.max_body_bytes());

    Router::new()
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/api/parse-question", post(parse_question_handler))
        .route("/api/upload-question", post(upload_question_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(axum::middleware::from_fn(logging_middleware))
                .layer(cors)
                .layer(body_limit),
        )
        .with_state(state)
}

/// Only the configured origins are allowed; methods and headers are mirrored
/// back so any of them pass for those origins.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}
