//! Session state
//!
//! One [`Session`] per interactive user. It owns the API key, the
//! append-only [`Conversation`] and at most one [`UploadedDocument`]. The
//! system prompt lives inside the document, so it exists exactly as long as
//! a valid document does.
//!
//! ```text
//!   NeedsApiKey ──key──▶ NeedsDocument ──upload ok──▶ Ready
//!                              ▲                        │
//!                              └── expired / bad upload ┘
//! ```

pub mod banner;
pub mod controller;

pub use banner::{Banner, BannerLevel};
pub use controller::{PendingQuestion, QuestionBlocked, SessionController};

use crate::loader::{LoadError, LoadedContent, UploadedFile};
use crate::types::{ApiKey, LLMMessage};
use chrono::{DateTime, Utc};
use uuid::Uuid;

const SYSTEM_PROMPT_PREFIX: &str = "The following is the content of a file:\n\n";

/// Build the model instruction for a decoded document.
pub fn build_system_prompt(context: &str) -> String {
    format!("{}{}", SYSTEM_PROMPT_PREFIX, context)
}

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NeedsApiKey,
    NeedsDocument,
    Ready,
}

/// Ordered, append-only list of turns.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    turns: Vec<LLMMessage>,
}

impl Conversation {
    pub fn push(&mut self, turn: LLMMessage) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[LLMMessage] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    fn clear(&mut self) {
        self.turns.clear();
    }
}

#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub file: UploadedFile,
    pub content: LoadedContent,
    pub uploaded_at: DateTime<Utc>,
    system_prompt: String,
}

impl UploadedDocument {
    pub fn new(
        file: UploadedFile,
        content: LoadedContent,
        uploaded_at: DateTime<Utc>,
    ) -> Result<Self, LoadError> {
        let system_prompt = build_system_prompt(&content.context()?);
        Ok(Self {
            file,
            content,
            uploaded_at,
            system_prompt,
        })
    }

    pub fn name(&self) -> &str {
        &self.file.name
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Expired once strictly more than `ttl_secs` have passed since upload.
    pub fn is_expired(&self, now: DateTime<Utc>, ttl_secs: i64) -> bool {
        (now - self.uploaded_at).num_milliseconds() > ttl_secs * 1000
    }
}

#[derive(Debug)]
pub struct Session {
    id: Uuid,
    api_key: Option<ApiKey>,
    conversation: Conversation,
    document: Option<UploadedDocument>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            api_key: None,
            conversation: Conversation::default(),
            document: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SessionState {
        match (&self.api_key, &self.document) {
            (None, _) => SessionState::NeedsApiKey,
            (Some(_), None) => SessionState::NeedsDocument,
            (Some(_), Some(_)) => SessionState::Ready,
        }
    }

    pub fn api_key(&self) -> Option<&ApiKey> {
        self.api_key.as_ref()
    }

    pub fn set_api_key(&mut self, key: ApiKey) {
        self.api_key = Some(key);
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn document(&self) -> Option<&UploadedDocument> {
        self.document.as_ref()
    }

    /// System prompt of the current document, if it is still valid at `now`.
    pub fn system_prompt_at(&self, now: DateTime<Utc>, ttl_secs: i64) -> Option<&str> {
        self.document
            .as_ref()
            .filter(|doc| !doc.is_expired(now, ttl_secs))
            .map(|doc| doc.system_prompt())
    }

    pub fn attach_document(&mut self, document: UploadedDocument) {
        self.document = Some(document);
    }

    /// Drop the document and, with it, the system prompt.
    pub fn discard_document(&mut self) -> Option<UploadedDocument> {
        self.document.take()
    }

    /// Discard the document if it has outlived `ttl_secs`. Returns whether it
    /// did.
    pub fn expire_if_stale(&mut self, now: DateTime<Utc>, ttl_secs: i64) -> bool {
        let stale = self
            .document
            .as_ref()
            .is_some_and(|doc| doc.is_expired(now, ttl_secs));
        if stale {
            self.document = None;
        }
        stale
    }

    pub fn push_turn(&mut self, turn: LLMMessage) {
        self.conversation.push(turn);
    }

    pub fn clear_conversation(&mut self) {
        self.conversation.clear();
    }
}
