#![forbid(unsafe_code)]
#![doc = r#"
TutorBridge

Translate OpenAI Chat Completions traffic from avatar platforms into session
calls against a proprietary tutoring backend, and shape the replies back into
completion objects or word-paced SSE streams.

Crate highlights
- Library: prompt-tag parsing (`prompt`), session memoization (`session`),
  and reply shaping (`stream`) are usable without the server.
- HTTP server (in `server`): `/`, `/health`, `/v1/models`,
  `/v1/chat/completions` (OpenAI-compatible, streaming and non-streaming).
- Backend client (`backend`): injectable trait over the tutoring backend's
  start/message endpoints.

Modules
- `models`: Data structures for the Chat Completions and backend APIs.
- `prompt`: Bracketed-tag extraction and conversation fingerprinting.
- `session`: In-memory fingerprint-to-session store.
- `backend`: Outbound client trait and reqwest implementation.
- `stream`: Completion and SSE chunk formatting.
- `server`: Axum router/handlers (the binary uses this).
- `util`: Shared helpers (tracing, env, HTTP client, CORS).
"#]

pub mod backend;
pub mod models;
pub mod prompt;
pub mod server;
pub mod session;
pub mod stream;
pub mod util;

// Re-export the primary entry points for ergonomic library use.
pub use crate::backend::{BackendError, HttpTeacherApi, TeacherApi};
pub use crate::prompt::{fingerprint, LessonConfig};
pub use crate::server::build_router;
pub use crate::session::{SessionRecord, SessionStore};

// Re-export model namespaces for convenience (downstream users can do `use tutorbridge::chat`).
pub use crate::models::{backend as backend_models, chat};
