//! Stub tutoring backend for integration tests.
//!
//! Serves the two backend endpoints on an ephemeral port and records the
//! traffic so tests can assert on session reuse and payload shapes.

use axum::{extract::State, routing::post, Json, Router};
use http::StatusCode;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// How the stub should answer.
#[derive(Clone)]
pub enum StubBehavior {
    /// Happy path: sessions are created with sequential ids and every
    /// message is echoed back as `You said: {message}`.
    Normal { initial_message: Option<String> },
    /// Sessions start normally but message replies carry no text.
    Silent,
    /// Every call fails with the given status.
    Error { status: StatusCode },
}

#[derive(Clone)]
struct StubState {
    behavior: StubBehavior,
    starts: Arc<AtomicUsize>,
    messages: Arc<Mutex<Vec<serde_json::Value>>>,
}

#[derive(Clone)]
pub struct BackendStub {
    base_url: String,
    starts: Arc<AtomicUsize>,
    messages: Arc<Mutex<Vec<serde_json::Value>>>,
    shutdown: Arc<Mutex<Option<oneshot::Sender<()>>>>,
}

impl BackendStub {
    pub async fn start(behavior: StubBehavior) -> Self {
        let starts = Arc::new(AtomicUsize::new(0));
        let messages = Arc::new(Mutex::new(Vec::new()));
        let state = StubState {
            behavior,
            starts: starts.clone(),
            messages: messages.clone(),
        };

        let router = Router::new()
            .route("/api/v1/teacher/start", post(start_handler))
            .route("/api/v1/teacher/message", post(message_handler))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub backend");
        let addr = listener.local_addr().expect("stub backend local addr");
        let (tx, rx) = oneshot::channel::<()>();

        let server = axum::serve(listener, router.into_make_service());
        tokio::spawn(async move {
            tokio::select! {
                res = server => {
                    if let Err(err) = res {
                        eprintln!("Stub backend server error: {err:?}");
                    }
                }
                _ = rx => {}
            }
        });

        BackendStub {
            base_url: format!("http://{}", addr),
            starts,
            messages,
            shutdown: Arc::new(Mutex::new(Some(tx))),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Number of session-start calls received.
    pub fn start_calls(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    /// Message payloads received, in order.
    pub fn message_payloads(&self) -> Vec<serde_json::Value> {
        self.messages.lock().expect("messages lock").clone()
    }

    pub fn stop(&self) {
        if let Some(tx) = self.shutdown.lock().expect("shutdown lock").take() {
            let _ = tx.send(());
        }
    }
}

async fn start_handler(
    State(state): State<StubState>,
    Json(payload): Json<serde_json::Value>,
) -> (StatusCode, Json<serde_json::Value>) {
    if let StubBehavior::Error { status } = &state.behavior {
        return (*status, Json(serde_json::json!({"detail": "stub failure"})));
    }

    let n = state.starts.fetch_add(1, Ordering::SeqCst) + 1;
    let mut body = serde_json::json!({ "session_id": format!("sess-{n}") });
    if let StubBehavior::Normal {
        initial_message: Some(greeting),
    } = &state.behavior
    {
        body["initial_message"] = serde_json::Value::String(greeting.clone());
    }

    // Minimal contract check: the bridge must send these fields.
    assert!(payload.get("subject").is_some(), "missing subject: {payload}");
    assert!(
        payload.get("student_name").is_some(),
        "missing student_name: {payload}"
    );

    (StatusCode::CREATED, Json(body))
}

async fn message_handler(
    State(state): State<StubState>,
    Json(payload): Json<serde_json::Value>,
) -> (StatusCode, Json<serde_json::Value>) {
    if let StubBehavior::Error { status } = &state.behavior {
        return (*status, Json(serde_json::json!({"detail": "stub failure"})));
    }

    state
        .messages
        .lock()
        .expect("messages lock")
        .push(payload.clone());

    if matches!(state.behavior, StubBehavior::Silent) {
        return (StatusCode::OK, Json(serde_json::json!({"status": "idle"})));
    }

    let text = payload
        .get("message")
        .and_then(|m| m.as_str())
        .unwrap_or_default();
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "teacher_message": format!("You said: {text}"),
            "status": "active",
            "awaiting_input": true
        })),
    )
}
