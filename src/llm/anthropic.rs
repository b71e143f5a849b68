// Anthropic Messages API adapter (streaming)
// API Reference: https://docs.anthropic.com/en/api/messages-streaming

use crate::llm::provider::{LLMAdapter, TextStream};
use crate::llm::sse::{SseDecoder, SseEvent};
use crate::types::{ApiKey, AppError, AppResult, LLMMessage, LLMRequest, StreamEvent};
use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, info, warn};

const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

pub struct AnthropicAdapter {
    client: Client,
    base_url: String,
}

// Request types for the Messages API
#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    system: &'a str,
    messages: &'a [LLMMessage],
    max_tokens: u32,
    stream: bool,
}

// Streamed event payloads. Only text deltas and errors matter; every other
// event type collapses into `Other`.
#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WireEvent {
    ContentBlockDelta { delta: WireDelta },
    Error { error: AnthropicError },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WireDelta {
    TextDelta { text: String },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct AnthropicErrorResponse {
    error: AnthropicError,
}

#[derive(Deserialize)]
struct AnthropicError {
    #[serde(rename = "type")]
    error_type: String,
    message: String,
}

impl AnthropicAdapter {
    pub fn new() -> Self {
        Self::with_base_url(ANTHROPIC_API_BASE)
    }

    /// Point the adapter at another host (proxies, local mocks).
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url)
    }
}

impl Default for AnthropicAdapter {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode one SSE block into a typed stream event.
pub fn decode_event(event: &SseEvent) -> AppResult<StreamEvent> {
    if event.data.trim().is_empty() {
        return Ok(StreamEvent::Other);
    }

    let wire: WireEvent = serde_json::from_str(&event.data)
        .map_err(|e| AppError::LLMApi(format!("Malformed stream event: {}", e)))?;

    match wire {
        WireEvent::ContentBlockDelta {
            delta: WireDelta::TextDelta { text },
        } => Ok(StreamEvent::TextDelta(text)),
        WireEvent::ContentBlockDelta { .. } | WireEvent::Other => Ok(StreamEvent::Other),
        WireEvent::Error { error } => Err(AppError::LLMApi(format!(
            "Anthropic stream error ({}): {}",
            error.error_type, error.message
        ))),
    }
}

/// Turn a raw byte stream into SSE events. A transport error ends the stream
/// after being yielded.
pub fn sse_events<S>(bytes: S) -> impl Stream<Item = AppResult<SseEvent>> + Send + 'static
where
    S: Stream<Item = reqwest::Result<Bytes>> + Send + Unpin + 'static,
{
    let state = (bytes, SseDecoder::new(), VecDeque::new(), false);

    futures::stream::unfold(state, |(mut bytes, mut decoder, mut pending, mut done)| async move {
        loop {
            if let Some(event) = pending.pop_front() {
                return Some((Ok(event), (bytes, decoder, pending, done)));
            }
            if done {
                return None;
            }
            match bytes.next().await {
                Some(Ok(chunk)) => pending.extend(decoder.feed(&chunk)),
                Some(Err(e)) => {
                    done = true;
                    return Some((Err(AppError::Http(e)), (bytes, decoder, pending, done)));
                }
                None => {
                    done = true;
                    pending.extend(decoder.finish());
                }
            }
        }
    })
}

/// Keep only answer text from a stream of SSE events.
pub fn text_fragments<S>(events: S) -> TextStream
where
    S: Stream<Item = AppResult<SseEvent>> + Send + 'static,
{
    let fragments = events.filter_map(|item| async move {
        match item.and_then(|event| decode_event(&event)) {
            Ok(event) => event.into_text().map(Ok),
            Err(e) => Some(Err(e)),
        }
    });
    Box::pin(fragments)
}

#[async_trait]
impl LLMAdapter for AnthropicAdapter {
    async fn stream_chat(&self, api_key: &ApiKey, request: &LLMRequest) -> AppResult<TextStream> {
        let body = MessagesRequest {
            model: &request.model,
            system: &request.system_instruction,
            messages: &request.messages,
            max_tokens: request.max_tokens,
            stream: true,
        };

        info!(
            model = %request.model,
            turns = request.messages.len(),
            system_len = request.system_instruction.len(),
            "Opening Anthropic stream"
        );

        let response = self
            .client
            .post(self.messages_url())
            .header("x-api-key", api_key.expose())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::LLMApi(format!("Anthropic request failed: {}", e)))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(%status, "Anthropic rejected the request");

            if let Ok(error_response) = serde_json::from_str::<AnthropicErrorResponse>(&error_text) {
                return Err(AppError::LLMApi(format!(
                    "Anthropic API error ({}): {} ({})",
                    status, error_response.error.message, error_response.error.error_type
                )));
            }

            return Err(AppError::LLMApi(format!(
                "Anthropic API error ({}): {}",
                status, error_text
            )));
        }

        debug!("Anthropic stream opened");
        Ok(text_fragments(sse_events(Box::pin(response.bytes_stream()))))
    }
}
