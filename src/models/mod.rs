//! Data models for the two API surfaces the bridge translates between.
//!
//! This module groups two submodules:
//! - `chat`: Types representing the commonly used subset of the OpenAI Chat Completions API
//!   that avatar platforms send and expect back.
//! - `backend`: Types representing the tutoring backend's session-start and message wire shapes.
//!
//! The translation logic that connects the two lives in `crate::server` and
//! `crate::stream`.

pub mod backend;
pub mod chat;

// Optional convenience re-exports for downstream users.
// These allow importing commonly-used types directly from `tutorbridge::models::*`.
pub use backend::{SessionStart, StartSessionRequest, TeacherMessageRequest, TeacherReply};
pub use chat::{
    ChatCompletionChunk, ChatCompletionRequest, ChatCompletionResponse, ChatMessage, Role,
};
