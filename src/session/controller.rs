//! Session Controller
//!
//! Orchestrates the loader and the model client on behalf of one session.
//! Every user-triggered operation first calls [`SessionController::refresh`],
//! which is where an idle document expires; there is no background timer.

use super::{Banner, Clock, Session, SessionState, SystemClock, UploadedDocument};
use crate::config::{SessionConfig, MAX_OUTPUT_TOKENS, MODEL_ID};
use crate::llm::LLM;
use crate::loader::{self, LoadError, UploadedFile};
use crate::types::{ApiKey, AppError, AppResult, LLMMessage, LLMRequest};
use futures::StreamExt;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Why a question was not sent
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuestionBlocked {
    #[error("no API key has been entered")]
    MissingApiKey,
    #[error("no valid document is loaded")]
    MissingDocument,
    #[error("the question is empty")]
    EmptyQuestion,
}

/// Everything needed to open the model stream for one question.
#[derive(Debug, Clone)]
pub struct PendingQuestion {
    pub api_key: ApiKey,
    pub request: LLMRequest,
}

pub struct SessionController {
    session: Session,
    llm: LLM,
    clock: Arc<dyn Clock>,
    config: SessionConfig,
    notices: Vec<Banner>,
}

impl SessionController {
    pub fn new(llm: LLM, config: SessionConfig) -> Self {
        Self::with_clock(llm, config, Arc::new(SystemClock))
    }

    pub fn with_clock(llm: LLM, config: SessionConfig, clock: Arc<dyn Clock>) -> Self {
        let session = Session::new();
        info!(session_id = %session.id(), "Session started");
        Self {
            session,
            llm,
            clock,
            config,
            notices: Vec::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn llm(&self) -> LLM {
        self.llm.clone()
    }

    /// Start of a user interaction: forget the previous interaction's notices
    /// and expire a stale document.
    pub fn refresh(&mut self) {
        self.notices.clear();

        let now = self.clock.now();
        if self.session.expire_if_stale(now, self.config.upload_ttl_secs) {
            warn!(
                session_id = %self.session.id(),
                turns = self.session.conversation().len(),
                "Uploaded document expired"
            );
            if self.config.clear_history_on_expiry {
                self.session.clear_conversation();
            }
            self.notices.push(Banner::SessionExpired);
        }
    }

    /// Banners for the current state, in display order.
    pub fn banners(&self) -> Vec<Banner> {
        if self.session.api_key().is_none() {
            return vec![Banner::AwaitingApiKey];
        }

        let mut banners = vec![Banner::UploadHint];
        banners.extend(self.notices.iter().cloned());
        match self.session.document() {
            Some(doc) => banners.push(Banner::UploadSucceeded(doc.name().to_string())),
            None => banners.push(Banner::AwaitingUpload),
        }
        banners
    }

    /// Accept a key typed by the user. Blank input is ignored.
    pub fn submit_api_key(&mut self, raw: &str) -> bool {
        self.refresh();
        match ApiKey::new(raw) {
            Some(key) => {
                info!(session_id = %self.session.id(), "API key entered");
                self.session.set_api_key(key);
                true
            }
            None => false,
        }
    }

    /// Decode and store an upload. Any failure leaves the session without a
    /// document; unsupported types are reported as a banner only.
    pub fn upload(&mut self, file: UploadedFile) -> Result<(), LoadError> {
        self.refresh();
        if self.session.api_key().is_none() {
            return Ok(());
        }
        self.store_upload(file)
    }

    /// Read `path` from disk and upload it.
    pub fn upload_path(&mut self, path: &Path) -> Result<(), LoadError> {
        self.refresh();
        if self.session.api_key().is_none() {
            return Ok(());
        }
        match UploadedFile::from_path(path) {
            Ok(file) => self.store_upload(file),
            Err(e) => {
                self.session.discard_document();
                self.notices.push(Banner::LoadFailed(e.to_string()));
                Err(e)
            }
        }
    }

    fn store_upload(&mut self, file: UploadedFile) -> Result<(), LoadError> {
        // the previous document is replaced before decoding
        self.session.discard_document();

        let content_type = file.content_type.clone();
        let bytes = file.bytes.len();
        let now = self.clock.now();
        let loaded = loader::load_file(&file)
            .and_then(|content| UploadedDocument::new(file, content, now));

        match loaded {
            Ok(document) => {
                info!(
                    session_id = %self.session.id(),
                    %content_type,
                    bytes,
                    "Document uploaded"
                );
                self.session.attach_document(document);
                Ok(())
            }
            Err(LoadError::UnsupportedType(content_type)) => {
                warn!(session_id = %self.session.id(), %content_type, "Unsupported upload");
                self.notices.push(Banner::UnsupportedFileType);
                Ok(())
            }
            Err(e) => {
                warn!(session_id = %self.session.id(), error = %e, "Upload could not be decoded");
                self.notices.push(Banner::LoadFailed(e.to_string()));
                Err(e)
            }
        }
    }

    /// Append the user turn and build the request for it.
    pub fn prepare_question(&mut self, question: &str) -> Result<PendingQuestion, QuestionBlocked> {
        self.refresh();

        let api_key = self
            .session
            .api_key()
            .cloned()
            .ok_or(QuestionBlocked::MissingApiKey)?;
        let system_prompt = self
            .session
            .document()
            .map(|doc| doc.system_prompt().to_string())
            .ok_or(QuestionBlocked::MissingDocument)?;

        if question.trim().is_empty() {
            return Err(QuestionBlocked::EmptyQuestion);
        }

        self.session.push_turn(LLMMessage::user(question));

        let request = LLMRequest {
            model: MODEL_ID.to_string(),
            messages: self.session.conversation().turns().to_vec(),
            max_tokens: MAX_OUTPUT_TOKENS,
            system_instruction: system_prompt,
        };

        info!(
            session_id = %self.session.id(),
            turns = request.messages.len(),
            "Question accepted"
        );
        Ok(PendingQuestion { api_key, request })
    }

    /// Record the finished answer.
    pub fn complete_answer(&mut self, answer: String) {
        info!(
            session_id = %self.session.id(),
            answer_len = answer.len(),
            "Answer complete"
        );
        self.session.push_turn(LLMMessage::assistant(answer));
    }

    /// Record a failed answer. The user turn stays; no assistant turn is added.
    pub fn fail_answer(&mut self, error: &str) {
        warn!(session_id = %self.session.id(), %error, "Answer failed");
        self.notices.push(Banner::ModelFailed(error.to_string()));
    }

    /// Run one full question cycle, handing each fragment to `on_fragment` as
    /// it arrives. Returns the complete answer.
    pub async fn ask<F>(&mut self, question: &str, mut on_fragment: F) -> AppResult<String>
    where
        F: FnMut(&str),
    {
        let pending = self.prepare_question(question)?;

        let mut stream = match self.llm.stream_chat(&pending.api_key, &pending.request).await {
            Ok(stream) => stream,
            Err(e) => {
                self.fail_answer(&e.to_string());
                return Err(e);
            }
        };

        let mut answer = String::new();
        while let Some(fragment) = stream.next().await {
            match fragment {
                Ok(text) => {
                    answer.push_str(&text);
                    on_fragment(&text);
                }
                Err(e) => {
                    self.fail_answer(&e.to_string());
                    return Err(e);
                }
            }
        }

        self.complete_answer(answer.clone());
        Ok(answer)
    }
}

impl From<QuestionBlocked> for AppError {
    fn from(blocked: QuestionBlocked) -> Self {
        AppError::InvalidRequest(blocked.to_string())
    }
}
