//! HTTP API v1 for the dialogue engine.
//!
//! Endpoints:
//!
//! - `POST /v1/chat`           : Run one dialogue turn
//! - `GET  /v1/sessions/{id}`  : Stored context of a live session
//! - `GET  /v1/events`         : SSE stream of conversation events

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    response::sse::{Event as SseEvent, KeepAlive, Sse},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use tokio_stream::StreamExt;
use tracing::{error, info};

use shuttlechat_core::context::{ContextView, SessionId};
use shuttlechat_core::error::Error;
use shuttlechat_core::event::EventBus;
use shuttlechat_core::language::Language;
use shuttlechat_dialogue::{ContextStore, DialogueOrchestrator};

// ── State ─────────────────────────────────────────────────────────────────

/// Shared state for the v1 API.
pub struct ApiV1State {
    pub orchestrator: Arc<DialogueOrchestrator>,
    pub store: Arc<dyn ContextStore>,
    pub event_bus: Arc<EventBus>,

    /// Client key expected in `X-API-Key`; `None` disables auth.
    pub api_key: Option<String>,
}

pub type SharedApiState = Arc<ApiV1State>;

// ── Router ────────────────────────────────────────────────────────────────

/// Build the v1 API router. Nest this under "/v1" in the main router.
pub fn v1_router(state: SharedApiState) -> Router {
    Router::new()
        .route("/chat", post(chat_handler))
        .route("/sessions/{id}", get(session_handler))
        .route("/events", get(events_handler))
        .with_state(state)
}

// ── Request / Response types ──────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChatRequest {
    /// Missing is treated like empty and rejected.
    #[serde(default)]
    message: String,

    /// Existing session id (omit to start a new session).
    #[serde(default)]
    session_id: Option<String>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChatResponse {
    message: String,
    language: Language,
    session_id: SessionId,
    context: ContextView,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionResponse {
    session_id: SessionId,
    language: Language,
    context: ContextView,
    message_count: usize,
    updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

// ── Handlers ──────────────────────────────────────────────────────────────

/// `POST /v1/chat`: failed turns still carry the normal body, with a 500.
async fn chat_handler(
    State(state): State<SharedApiState>,
    Json(payload): Json<ChatRequest>,
) -> Result<(StatusCode, Json<ChatResponse>), (StatusCode, Json<ErrorResponse>)> {
    info!(len = payload.message.len(), "v1/chat request");

    let session_id = payload
        .session_id
        .filter(|id| !id.trim().is_empty())
        .map(SessionId::from);

    match state.orchestrator.handle_turn(session_id, &payload.message).await {
        Ok(outcome) => {
            let status = if outcome.is_failed() {
                StatusCode::INTERNAL_SERVER_ERROR
            } else {
                StatusCode::OK
            };
            Ok((
                status,
                Json(ChatResponse {
                    message: outcome.reply,
                    language: outcome.language,
                    session_id: outcome.session_id,
                    context: outcome.context,
                }),
            ))
        }
        Err(Error::InvalidInput(reason)) => Err(error_response(StatusCode::BAD_REQUEST, reason)),
        Err(e) => {
            error!(error = %e, "Chat turn aborted");
            Err(error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal error"))
        }
    }
}

/// `GET /v1/sessions/{id}`: 404 once the session is absent or expired.
async fn session_handler(
    State(state): State<SharedApiState>,
    Path(id): Path<String>,
) -> Result<Json<SessionResponse>, (StatusCode, Json<ErrorResponse>)> {
    let session_id = SessionId::from(id);
    let context = state
        .store
        .get(&session_id)
        .await
        .ok_or_else(|| error_response(StatusCode::NOT_FOUND, format!("session {session_id} not found")))?;

    Ok(Json(SessionResponse {
        session_id,
        language: context.language,
        context: context.view(),
        message_count: context.messages.len(),
        updated_at: context.timestamp,
    }))
}

/// `GET /v1/events`: every answered turn as a `conversation` event.
async fn events_handler(
    State(state): State<SharedApiState>,
) -> Sse<impl futures::Stream<Item = Result<SseEvent, Infallible>>> {
    let rx = state.event_bus.subscribe();
    let stream = tokio_stream::wrappers::BroadcastStream::new(rx)
        .filter_map(|result| result.ok())
        .map(|event| {
            let data = serde_json::to_string(event.as_ref()).unwrap_or_default();
            Ok(SseEvent::default().event("conversation").data(data))
        });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use chrono::Duration;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use shuttlechat_core::clock::{Clock, ManualClock};
    use shuttlechat_core::error::ProviderError;
    use shuttlechat_core::message::Message;
    use shuttlechat_core::provider::{Provider, ProviderRequest, ProviderResponse};
    use shuttlechat_dialogue::InMemoryContextStore;
    use shuttlechat_knowledge::StaticKnowledgeBase;

    /// Lightweight mock provider for gateway tests.
    struct MockProvider {
        fail: bool,
    }

    #[async_trait::async_trait]
    impl Provider for MockProvider {
        fn name(&self) -> &str {
            "gateway_mock"
        }

        async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
            if self.fail {
                return Err(ProviderError::Timeout("upstream timed out".into()));
            }
            Ok(ProviderResponse {
                message: Message::assistant("Be at your pickup point at 10:00."),
                usage: None,
                model: "mock-model".into(),
            })
        }
    }

    fn test_api_state(fail: bool) -> (SharedApiState, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        let store: Arc<dyn ContextStore> =
            Arc::new(InMemoryContextStore::new(clock.clone(), Duration::minutes(30)));
        let event_bus = Arc::new(EventBus::default());
        let orchestrator = DialogueOrchestrator::new(
            Arc::new(MockProvider { fail }),
            Arc::new(StaticKnowledgeBase::builtin()),
            store.clone(),
            "mock-model",
        )
        .with_broadcaster(event_bus.clone())
        .with_clock(clock.clone());

        let state = Arc::new(ApiV1State {
            orchestrator: Arc::new(orchestrator),
            store,
            event_bus,
            api_key: None,
        });
        (state, clock)
    }

    fn chat_request(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/chat")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn chat_returns_public_shape() {
        let (state, _) = test_api_state(false);
        let app = v1_router(state);

        let response = app
            .oneshot(chat_request(serde_json::json!({
                "message": "What time is my pickup? Flight to Canada at 14:00",
                "sessionId": "abc"
            })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = json_body(response).await;
        assert_eq!(json["message"], "Be at your pickup point at 10:00.");
        assert_eq!(json["language"], "en");
        assert_eq!(json["sessionId"], "abc");
        assert_eq!(json["context"]["lastTopic"], "flight_timing");
        assert_eq!(json["context"]["flightTime"], "14:00");
        assert_eq!(json["context"]["flightDestination"], "us_canada");
    }

    #[tokio::test]
    async fn chat_generates_session_id() {
        let (state, _) = test_api_state(false);
        let response = v1_router(state)
            .oneshot(chat_request(serde_json::json!({"message": "blah blah"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = json_body(response).await;
        assert!(!json["sessionId"].as_str().unwrap().is_empty());
        assert!(json["context"]["lastTopic"].is_null());
    }

    #[tokio::test]
    async fn empty_message_is_bad_request() {
        let (state, _) = test_api_state(false);
        let app = v1_router(state.clone());

        let response = app
            .oneshot(chat_request(serde_json::json!({"message": "  ", "sessionId": "abc"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = v1_router(state.clone())
            .oneshot(chat_request(serde_json::json!({"sessionId": "abc"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(state.store.len().await, 0);
    }

    #[tokio::test]
    async fn failed_turn_is_500_with_apology() {
        let (state, _) = test_api_state(true);
        let response = v1_router(state)
            .oneshot(chat_request(serde_json::json!({
                "message": "Flight to Spain at 18:00",
                "sessionId": "abc"
            })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = json_body(response).await;
        assert!(json["message"].as_str().unwrap().starts_with("Sorry"));
        assert!(json["context"]["flightTime"].is_null());
    }

    #[tokio::test]
    async fn session_lookup_and_expiry() {
        let (state, clock) = test_api_state(false);
        v1_router(state.clone())
            .oneshot(chat_request(serde_json::json!({
                "message": "Flight to Canada at 14:00",
                "sessionId": "abc"
            })))
            .await
            .unwrap();

        let req = Request::builder().uri("/sessions/abc").body(Body::empty()).unwrap();
        let response = v1_router(state.clone()).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = json_body(response).await;
        assert_eq!(json["messageCount"], 2);
        assert_eq!(json["context"]["flightTime"], "14:00");
        assert_eq!(json["updatedAt"], serde_json::json!(clock.now()));

        clock.advance(Duration::minutes(31));
        let req = Request::builder().uri("/sessions/abc").body(Body::empty()).unwrap();
        let response = v1_router(state).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unknown_session_not_found() {
        let (state, _) = test_api_state(false);
        let req = Request::builder()
            .uri("/sessions/nonexistent")
            .body(Body::empty())
            .unwrap();
        let response = v1_router(state).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn events_endpoint_streams_sse() {
        let (state, _) = test_api_state(false);
        let req = Request::builder().uri("/events").body(Body::empty()).unwrap();
        let response = v1_router(state.clone()).oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()["content-type"].to_str().unwrap();
        assert!(content_type.starts_with("text/event-stream"));
        assert_eq!(state.event_bus.subscriber_count(), 1);
    }
}
