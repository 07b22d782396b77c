//! Shaping backend replies into OpenAI-compatible responses.
//!
//! Non-streaming callers get a single `chat.completion` object. Streaming
//! callers get the reply re-chunked word by word as SSE
//! `chat.completion.chunk` events with a fixed inter-token delay, closed by
//! a stop chunk and the literal `[DONE]` sentinel. The pacing exists for
//! avatar lip-sync: the consumer speaks tokens as they arrive, and a burst
//! of the whole reply at once reads unnaturally.

use std::convert::Infallible;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_stream::stream;
use axum::response::sse::Event;
use futures_util::Stream;
use serde::Serialize;
use uuid::Uuid;

use crate::models::chat::{
    ChatChoice, ChatCompletionChunk, ChatCompletionResponse, ChatDelta, ChatResponseMessage,
    ChatStreamChoice,
};

/// Delay between emitted words. Chosen to approximate natural speech pacing.
pub const DEFAULT_WORD_DELAY: Duration = Duration::from_millis(20);

/// Completion ids follow the OpenAI convention of a `chatcmpl-` prefix.
pub fn completion_id() -> String {
    format!("chatcmpl-{}", Uuid::new_v4())
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Wrap a full reply in one `chat.completion` object.
pub fn completion_response(model: &str, text: &str) -> ChatCompletionResponse {
    ChatCompletionResponse {
        id: completion_id(),
        object: "chat.completion".into(),
        created: unix_now(),
        model: model.to_string(),
        choices: vec![ChatChoice {
            index: 0,
            message: ChatResponseMessage {
                role: "assistant".into(),
                content: text.to_string(),
            },
            finish_reason: Some("stop".into()),
        }],
    }
}

/// Split a reply into its streaming chunk sequence: one content chunk per
/// word (with a trailing space, so concatenation reconstructs the text),
/// then a final chunk with an empty delta and a stop reason. An N-word
/// reply yields N+1 chunks.
pub fn chunk_sequence(id: &str, created: u64, model: &str, text: &str) -> Vec<ChatCompletionChunk> {
    let chunk = |delta: ChatDelta, finish_reason: Option<String>| ChatCompletionChunk {
        id: id.to_string(),
        object: "chat.completion.chunk".into(),
        created,
        model: model.to_string(),
        choices: vec![ChatStreamChoice {
            index: 0,
            delta,
            finish_reason,
        }],
    };

    let mut chunks: Vec<ChatCompletionChunk> = text
        .split_whitespace()
        .map(|word| {
            chunk(
                ChatDelta {
                    role: None,
                    content: Some(format!("{word} ")),
                },
                None,
            )
        })
        .collect();

    chunks.push(chunk(
        ChatDelta {
            role: None,
            content: None,
        },
        Some("stop".into()),
    ));

    chunks
}

fn sse_json<T: Serialize>(payload: &T) -> Event {
    match Event::default().json_data(payload) {
        Ok(event) => event,
        Err(err) => {
            tracing::error!(error = %err, "failed to encode SSE payload");
            Event::default().data("{}")
        }
    }
}

/// Emit a reply as a paced SSE stream. The delay is applied between chunks;
/// emission simply stops once the sequence is exhausted.
pub fn word_stream(
    model: String,
    text: String,
    delay: Duration,
) -> impl Stream<Item = Result<Event, Infallible>> {
    let id = completion_id();
    let created = unix_now();

    stream! {
        for chunk in chunk_sequence(&id, created, &model, &text) {
            let is_final = chunk.choices[0].finish_reason.is_some();
            yield Ok(sse_json(&chunk));
            if !is_final {
                tokio::time::sleep(delay).await;
            }
        }
        yield Ok(Event::default().data("[DONE]"));
    }
}
