//! Extraction of lesson configuration from free-text system prompts.
//!
//! Avatar platforms cannot pass structured session parameters, so the
//! convention is to embed bracketed `[KEY: value]` tags inside the system
//! prompt. Parsing is best-effort: unrecognized brackets are ignored,
//! missing keys fall back to defaults, and nothing here ever fails.

use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};

use crate::models::chat::{ChatMessage, Role};

/// Matches one `[KEY: value]` tag. Keys are matched case-insensitively;
/// values run to the closing bracket and are trimmed afterwards.
static TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\[(SUBJECT|CHAPTER|LESSON|LEVEL|LANGUAGE|STUDENT|COMPETENCE):\s*([^\]]+)\]")
        .expect("tag regex is valid")
});

/// Session parameters extracted from a system prompt.
///
/// Every field carries a default so that a prompt with no tags at all still
/// yields a usable configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LessonConfig {
    pub subject: String,
    pub chapter: String,
    pub lesson: String,
    pub level: String,
    pub language: String,
    pub student: String,
    pub competence: Vec<String>,
}

impl Default for LessonConfig {
    fn default() -> Self {
        Self {
            subject: "Physics".into(),
            chapter: "General".into(),
            lesson: "Introduction".into(),
            level: "High School".into(),
            language: "en".into(),
            student: "Student".into(),
            competence: vec!["Understanding the core concepts".into()],
        }
    }
}

impl LessonConfig {
    /// Parse tags out of a system prompt.
    ///
    /// When no explicit competence tag is present, one is derived from the
    /// lesson so the backend always receives a concrete learning goal.
    pub fn from_system_prompt(text: &str) -> Self {
        let mut cfg = Self::default();
        let mut competence_tagged = false;

        for caps in TAG_RE.captures_iter(text) {
            let key = caps[1].to_ascii_uppercase();
            let value = caps[2].trim().to_string();
            if value.is_empty() {
                continue;
            }
            match key.as_str() {
                "SUBJECT" => cfg.subject = value,
                "CHAPTER" => cfg.chapter = value,
                "LESSON" => cfg.lesson = value,
                "LEVEL" => cfg.level = value,
                "LANGUAGE" => cfg.language = value,
                "STUDENT" => cfg.student = value,
                "COMPETENCE" => {
                    cfg.competence = vec![value];
                    competence_tagged = true;
                }
                _ => {}
            }
        }

        if !competence_tagged && !cfg.lesson.is_empty() {
            cfg.competence = vec![format!("Understanding {}", cfg.lesson)];
        }

        cfg
    }
}

/// The first system message's content, or empty when the conversation has none.
pub fn system_prompt(messages: &[ChatMessage]) -> &str {
    messages
        .iter()
        .find(|m| m.role == Role::System)
        .map(|m| m.content.as_str())
        .unwrap_or("")
}

/// The most recent user message's content, or empty when the conversation has none.
pub fn last_user_message(messages: &[ChatMessage]) -> &str {
    messages
        .iter()
        .rev()
        .find(|m| m.role == Role::User)
        .map(|m| m.content.as_str())
        .unwrap_or("")
}

/// Derive the session key for a conversation: hex-encoded SHA-256 of the
/// system prompt. Conversations sharing a system prompt share a backend
/// session for the lifetime of the process.
pub fn fingerprint(messages: &[ChatMessage]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(system_prompt(messages).as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(role: Role, content: &str) -> ChatMessage {
        ChatMessage {
            role,
            content: content.into(),
            name: None,
        }
    }

    #[test]
    fn parses_tagged_fields() {
        let cfg = LessonConfig::from_system_prompt(
            "You are a tutor. [SUBJECT: Chemistry] [CHAPTER: Atoms] [LESSON: Bonding] \
             [LEVEL: University] [LANGUAGE: fr] [STUDENT: Ada]",
        );
        assert_eq!(cfg.subject, "Chemistry");
        assert_eq!(cfg.chapter, "Atoms");
        assert_eq!(cfg.lesson, "Bonding");
        assert_eq!(cfg.level, "University");
        assert_eq!(cfg.language, "fr");
        assert_eq!(cfg.student, "Ada");
    }

    #[test]
    fn defaults_apply_when_tags_absent() {
        let cfg = LessonConfig::from_system_prompt("You are a friendly tutor.");
        assert_eq!(cfg.subject, "Physics");
        assert_eq!(cfg.chapter, "General");
        assert_eq!(cfg.level, "High School");
        assert_eq!(cfg.language, "en");
        assert_eq!(cfg.student, "Student");
    }

    #[test]
    fn keys_match_case_insensitively() {
        let cfg = LessonConfig::from_system_prompt("[subject: Biology] [Level: Middle School]");
        assert_eq!(cfg.subject, "Biology");
        assert_eq!(cfg.level, "Middle School");
    }

    #[test]
    fn unrecognized_brackets_are_ignored() {
        let cfg = LessonConfig::from_system_prompt("[MOOD: cheerful] [SUBJECT: Math] [NOTE]");
        assert_eq!(cfg.subject, "Math");
        assert_eq!(cfg.chapter, "General");
    }

    #[test]
    fn competence_derived_from_lesson() {
        let cfg = LessonConfig::from_system_prompt("[LESSON: Photosynthesis]");
        assert_eq!(cfg.competence, vec!["Understanding Photosynthesis"]);
    }

    #[test]
    fn explicit_competence_wins() {
        let cfg =
            LessonConfig::from_system_prompt("[LESSON: Optics] [COMPETENCE: Ray diagrams]");
        assert_eq!(cfg.competence, vec!["Ray diagrams"]);
    }

    #[test]
    fn values_are_trimmed() {
        let cfg = LessonConfig::from_system_prompt("[SUBJECT:   History  ]");
        assert_eq!(cfg.subject, "History");
    }

    #[test]
    fn last_user_message_scans_backwards() {
        let messages = vec![
            msg(Role::System, "[SUBJECT: Math]"),
            msg(Role::User, "first"),
            msg(Role::Assistant, "reply"),
            msg(Role::User, "second"),
        ];
        assert_eq!(last_user_message(&messages), "second");
        assert_eq!(last_user_message(&[]), "");
    }

    #[test]
    fn fingerprint_depends_only_on_system_prompt() {
        let a = vec![msg(Role::System, "[SUBJECT: Math]"), msg(Role::User, "one")];
        let b = vec![msg(Role::System, "[SUBJECT: Math]"), msg(Role::User, "two")];
        let c = vec![msg(Role::System, "[SUBJECT: Art]"), msg(Role::User, "one")];
        assert_eq!(fingerprint(&a), fingerprint(&b));
        assert_ne!(fingerprint(&a), fingerprint(&c));
    }
}
