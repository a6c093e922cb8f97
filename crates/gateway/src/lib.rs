//! HTTP gateway for shuttlechat.
//!
//! Exposes a health check and the v1 chat API. The dialogue engine itself
//! lives in `shuttlechat-dialogue`; this crate is transport only.
//!
//! Built on Axum.

pub mod api_v1;

use axum::extract::{ConnectInfo, DefaultBodyLimit};
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    middleware::{self, Next},
    response::Json,
    routing::get,
};
use serde::Serialize;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info, warn};

use shuttlechat_config::AppConfig;
use shuttlechat_core::clock::SystemClock;
use shuttlechat_core::event::EventBus;
use shuttlechat_core::language::FixedLanguageDetector;
use shuttlechat_dialogue::{ContextStore, DialogueOrchestrator, InMemoryContextStore};
use shuttlechat_knowledge::StaticKnowledgeBase;

pub use api_v1::{ApiV1State, SharedApiState};

/// Request bodies above this size are rejected with 413.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Header carrying the client API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Wire the dialogue engine from configuration.
///
/// Builds the provider, knowledge base, session store and event bus once
/// and shares them between the HTTP handlers and the CLI.
pub fn build_state(config: &AppConfig) -> Result<SharedApiState, Box<dyn std::error::Error>> {
    let provider = shuttlechat_providers::router::build_default(config);

    let knowledge = Arc::new(match &config.knowledge.corpus_path {
        Some(path) => StaticKnowledgeBase::from_path(path)?,
        None => StaticKnowledgeBase::builtin(),
    });

    let clock = Arc::new(SystemClock);
    let store: Arc<dyn ContextStore> = Arc::new(InMemoryContextStore::with_ttl_secs(
        clock.clone(),
        config.session.ttl_secs,
    ));
    let event_bus = Arc::new(EventBus::default());

    let orchestrator = DialogueOrchestrator::new(
        provider,
        knowledge.clone(),
        store.clone(),
        shuttlechat_providers::router::resolve_model(config),
    )
    .with_location_search(knowledge)
    .with_broadcaster(event_bus.clone())
    .with_clock(clock)
    .with_language_detector(Arc::new(FixedLanguageDetector::new(config.language.primary)))
    .with_temperature(config.temperature)
    .with_max_tokens(config.max_tokens);

    Ok(Arc::new(ApiV1State {
        orchestrator: Arc::new(orchestrator),
        store,
        event_bus,
        api_key: config.gateway.api_key.clone(),
    }))
}

/// Build the full router.
///
/// Layers applied:
/// - `X-API-Key` authentication on all /v1 routes (when a key is configured)
/// - Sliding-window rate limiting per client address
/// - Request body size limit (64 KB)
/// - CORS
/// - HTTP trace logging
pub fn build_router(state: SharedApiState, rate_limit_per_minute: usize) -> Router {
    let v1 = api_v1::v1_router(state.clone())
        .layer(middleware::from_fn_with_state(state, auth_middleware));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::HeaderName::from_static(API_KEY_HEADER),
        ])
        .max_age(Duration::from_secs(3600));

    let rate_limiter = Arc::new(RateLimiter::new(rate_limit_per_minute, Duration::from_secs(60)));

    Router::new()
        .route("/health", get(health_handler))
        .nest("/v1", v1)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(middleware::from_fn(move |req, next| {
            let limiter = rate_limiter.clone();
            rate_limit_middleware(limiter, req, next)
        }))
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Periodically drop expired sessions from the store.
///
/// Lazy expiry on read already hides them; this only reclaims memory.
pub fn spawn_session_sweeper(
    store: Arc<dyn ContextStore>,
    every: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = store.purge_expired().await;
            if removed > 0 {
                debug!(removed, "Expired sessions purged");
            }
        }
    })
}

/// Start the gateway HTTP server.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let state = build_state(&config)?;

    if config.session.sweep_interval_secs > 0 {
        spawn_session_sweeper(
            state.store.clone(),
            Duration::from_secs(config.session.sweep_interval_secs),
        );
    }
    if state.api_key.is_none() {
        warn!("No gateway API key configured; /v1 is open to any client");
    }

    let app = build_router(state, config.gateway.rate_limit_per_minute);

    info!(addr = %addr, model = %config.default_model, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}

// --- Rate Limiter ---

/// Simple in-memory sliding-window rate limiter.
///
/// Tracks request timestamps per client address.
/// Thread-safe via `std::sync::Mutex` (non-async, held briefly).
struct RateLimiter {
    max_requests: usize,
    window: Duration,
    clients: std::sync::Mutex<HashMap<String, Vec<std::time::Instant>>>,
}

impl RateLimiter {
    fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            clients: std::sync::Mutex::new(HashMap::new()),
        }
    }

    /// Check if the client is within rate limits. Returns `true` if allowed.
    fn check(&self, client_key: &str) -> bool {
        let now = std::time::Instant::now();
        let mut clients = self.clients.lock().unwrap_or_else(|e| e.into_inner());

        // Evict idle clients once the map gets large
        if clients.len() > 10_000 {
            clients.retain(|_, timestamps| {
                timestamps
                    .last()
                    .is_some_and(|t| now.duration_since(*t) < self.window)
            });
        }

        let timestamps = clients.entry(client_key.to_string()).or_default();
        timestamps.retain(|t| now.duration_since(*t) < self.window);

        if timestamps.len() >= self.max_requests {
            return false;
        }

        timestamps.push(now);
        true
    }
}

/// Rate limiting middleware, keyed by the peer IP address.
///
/// All clients share the one gateway key, so the key cannot tell them
/// apart. Requests without connection info share the "unknown" bucket.
/// `/health` is exempt.
async fn rate_limit_middleware(
    limiter: Arc<RateLimiter>,
    req: axum::extract::Request,
    next: Next,
) -> Result<axum::response::Response, StatusCode> {
    if req.uri().path() == "/health" {
        return Ok(next.run(req).await);
    }

    let client = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    if !limiter.check(&client) {
        warn!(client = %client, "Rate limit exceeded");
        return Err(StatusCode::TOO_MANY_REQUESTS);
    }

    Ok(next.run(req).await)
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Authentication middleware for the /v1 API.
///
/// Requires `X-API-Key` to equal the configured key. With no key
/// configured every request is let through.
async fn auth_middleware(
    State(state): State<SharedApiState>,
    req: axum::extract::Request,
    next: Next,
) -> Result<axum::response::Response, StatusCode> {
    let Some(expected) = state.api_key.as_deref() else {
        return Ok(next.run(req).await);
    };

    let provided = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    if provided == Some(expected) {
        Ok(next.run(req).await)
    } else {
        warn!("Unauthorized request to /v1 API: missing or invalid API key");
        Err(StatusCode::UNAUTHORIZED)
    }
}
