use axum::{
    extract::State,
    response::{sse::Sse, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::trace::TraceLayer;

use crate::backend::BackendError;
use crate::models::chat::{ChatCompletionRequest, ModelInfo, ModelList};
use crate::prompt::{self, LessonConfig};
use crate::session::SessionRecord;
use crate::stream::{completion_response, word_stream};
use crate::util::{cors_layer_from_env, AppState};

/// Answer given when the backend is unreachable or errors out. The caller
/// always receives a well-formed completion, never a raw error.
pub const FALLBACK_REPLY: &str = "I'm having a small technical issue. Could you repeat that?";

/// Answer given when the backend responds without any message text.
pub const EMPTY_REPLY: &str = "I apologize, but I didn't catch that. Could you please repeat?";

/// Build the Axum router with the OpenAI-compatible surface.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/v1/models", get(list_models))
        .route("/v1/chat/completions", post(chat_completions))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer_from_env())
}

/// Root endpoint with service information.
async fn root(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "service": "tutorbridge",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "description": "OpenAI-compatible bridge for avatar platforms",
        "backend": state.backend_url,
    }))
}

/// Liveness probe. Reports on the bridge process only; backend
/// reachability is deliberately not consulted.
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// Model listing some avatar platforms query before connecting.
async fn list_models() -> impl IntoResponse {
    Json(ModelList {
        object: "list".into(),
        data: vec![ModelInfo::new("ai-teacher"), ModelInfo::new("tutorbridge")],
    })
}

/// Main endpoint: translate a chat completion request into backend session
/// traffic and shape the reply back.
async fn chat_completions(
    State(state): State<AppState>,
    Json(req): Json<ChatCompletionRequest>,
) -> Response {
    let config = LessonConfig::from_system_prompt(prompt::system_prompt(&req.messages));
    let fingerprint = prompt::fingerprint(&req.messages);
    let user_message = prompt::last_user_message(&req.messages).to_string();

    tracing::debug!(
        model = %req.model,
        stream = req.stream,
        %fingerprint,
        subject = %config.subject,
        lesson = %config.lesson,
        "chat completion request"
    );

    let reply = match resolve_reply(&state, &fingerprint, &config, &user_message).await {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!(error = %err, %fingerprint, "backend call failed, using fallback reply");
            FALLBACK_REPLY.to_string()
        }
    };

    if req.stream {
        Sse::new(word_stream(req.model, reply, state.stream_delay)).into_response()
    } else {
        Json(completion_response(&req.model, &reply)).into_response()
    }
}

/// Resolve a conversation to its backend session and obtain the reply text.
///
/// First contact for a fingerprint starts a session and answers with the
/// backend's greeting; later requests relay the latest user message.
async fn resolve_reply(
    state: &AppState,
    fingerprint: &str,
    config: &LessonConfig,
    user_message: &str,
) -> Result<String, BackendError> {
    if let Some(record) = state.sessions.get(fingerprint).await {
        tracing::debug!(session_id = %record.session_id, "reusing backend session");
        let reply = state
            .teacher
            .send_message(&record.session_id, user_message)
            .await?;
        if let Some(status) = reply.status.as_deref() {
            tracing::debug!(session_id = %record.session_id, %status, awaiting_input = ?reply.awaiting_input, "backend reply");
        }
        return Ok(reply
            .teacher_message
            .unwrap_or_else(|| EMPTY_REPLY.to_string()));
    }

    let start = state.teacher.start_session(config).await?;
    let record = state
        .sessions
        .insert_or_keep(
            fingerprint.to_string(),
            SessionRecord::from_start(config.clone(), start),
        )
        .await;
    Ok(record.greeting)
}
