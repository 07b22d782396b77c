use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::prompt::LessonConfig;

/// Payload for `POST /api/v1/teacher/start`.
///
/// Field names (`student_name`, `teacher_language`) are fixed by the backend
/// contract and differ from the tag names used in system prompts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartSessionRequest {
    pub subject: String,
    pub chapter: String,
    pub lesson: String,
    pub level: String,
    pub student_name: String,
    pub teacher_language: String,
    pub competence: Vec<String>,
}

impl From<&LessonConfig> for StartSessionRequest {
    fn from(cfg: &LessonConfig) -> Self {
        Self {
            subject: cfg.subject.clone(),
            chapter: cfg.chapter.clone(),
            lesson: cfg.lesson.clone(),
            level: cfg.level.clone(),
            student_name: cfg.student.clone(),
            teacher_language: cfg.language.clone(),
            competence: cfg.competence.clone(),
        }
    }
}

/// Successful reply to a session-start call (HTTP 201).
///
/// The backend may omit the greeting; `crate::session` substitutes a default
/// before the record is stored.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStart {
    pub session_id: String,
    #[serde(default)]
    pub initial_message: Option<String>,
}

/// Payload for `POST /api/v1/teacher/message`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeacherMessageRequest {
    pub session_id: String,
    pub message: String,
}

/// Reply to a message call (HTTP 200).
///
/// `teacher_message` can be absent when the backend has nothing to say for a
/// turn; `status` and `awaiting_input` are informational flags the bridge
/// logs but does not act on.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeacherReply {
    #[serde(default)]
    pub teacher_message: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub awaiting_input: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_request_uses_backend_field_names() {
        let cfg = LessonConfig::default();
        let req = StartSessionRequest::from(&cfg);
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["student_name"], "Student");
        assert_eq!(v["teacher_language"], "en");
        assert!(v["competence"].is_array());
    }

    #[test]
    fn reply_tolerates_missing_fields() {
        let reply: TeacherReply = serde_json::from_str(r#"{"status":"active"}"#).unwrap();
        assert!(reply.teacher_message.is_none());
        assert_eq!(reply.status.as_deref(), Some("active"));
        assert!(reply.awaiting_input.is_none());
    }
}
