// Type definitions shared by the model client and the session controller

use std::fmt;

/// Role of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LLMMessage {
    pub role: Role,
    pub content: String,
}

impl LLMMessage {
    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LLMRequest {
    pub model: String,
    pub messages: Vec<LLMMessage>,
    pub max_tokens: u32,
    pub system_instruction: String,
}

/// One decoded event of a streaming response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Incremental answer text
    TextDelta(String),
    /// Anything that carries no answer text (message start/stop, pings, ...)
    Other,
}

impl StreamEvent {
    pub fn into_text(self) -> Option<String> {
        match self {
            StreamEvent::TextDelta(text) => Some(text),
            StreamEvent::Other => None,
        }
    }
}

/// A user-supplied provider credential.
///
/// `Debug` and `Display` never reveal the key.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Returns `None` for a blank key.
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into().trim().to_string();
        if key.is_empty() {
            None
        } else {
            Some(Self(key))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("LLM API error: {0}")]
    LLMApi(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Load(#[from] crate::loader::LoadError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

pub type AppResult<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_is_redacted() {
        let key = ApiKey::new("sk-ant-secret-1234").unwrap();
        assert_eq!(format!("{:?}", key), "ApiKey(<redacted>)");
        assert_eq!(key.to_string(), "<redacted>");
        for shown in [format!("{:?}", key), key.to_string()] {
            assert!(!shown.contains("sk-ant"));
            assert!(!shown.contains("1234"));
        }
        assert_eq!(key.expose(), "sk-ant-secret-1234");
    }

    #[test]
    fn test_blank_api_key_rejected() {
        assert!(ApiKey::new("   ").is_none());
        assert!(ApiKey::new("").is_none());
    }

    #[test]
    fn test_message_role_serializes_lowercase() {
        let json = serde_json::to_string(&LLMMessage::assistant("hi")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"hi"}"#);
    }

    #[test]
    fn test_stream_event_text() {
        assert_eq!(StreamEvent::TextDelta("a".into()).into_text(), Some("a".to_string()));
        assert_eq!(StreamEvent::Other.into_text(), None);
    }
}
