use async_trait::async_trait;
use futures::stream::BoxStream;
use std::sync::Arc;

use crate::types::{ApiKey, AppError, AppResult, LLMRequest};

/// Lazy, finite sequence of answer fragments. Not restartable.
pub type TextStream = BoxStream<'static, AppResult<String>>;

#[async_trait]
pub trait LLMAdapter: Send + Sync {
    /// Open one streaming completion. Fails before yielding anything if the
    /// provider rejects the request.
    async fn stream_chat(&self, api_key: &ApiKey, request: &LLMRequest) -> AppResult<TextStream>;
}

/// Configuration for LLM provider
pub struct LLMProviderConfig {
    pub name: String,
    pub api_base: String,
}

/// Provider-independent entry point, cheap to clone.
#[derive(Clone)]
pub struct LLM {
    adapter: Arc<dyn LLMAdapter>,
    provider_name: String,
}

impl LLM {
    pub fn new(provider: LLMProviderConfig) -> AppResult<Self> {
        let adapter: Arc<dyn LLMAdapter> = match provider.name.as_str() {
            "anthropic" => Arc::new(crate::llm::anthropic::AnthropicAdapter::with_base_url(
                &provider.api_base,
            )),
            other => {
                return Err(AppError::InvalidRequest(format!(
                    "Unsupported provider: {}",
                    other
                )))
            }
        };

        Ok(Self {
            adapter,
            provider_name: provider.name,
        })
    }

    /// Wrap an existing adapter (used for alternative backends and tests).
    pub fn from_adapter(name: impl Into<String>, adapter: Arc<dyn LLMAdapter>) -> Self {
        Self {
            adapter,
            provider_name: name.into(),
        }
    }

    pub fn provider_name(&self) -> &str {
        &self.provider_name
    }

    pub async fn stream_chat(&self, api_key: &ApiKey, request: &LLMRequest) -> AppResult<TextStream> {
        self.adapter.stream_chat(api_key, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_provider_is_an_error() {
        let result = LLM::new(LLMProviderConfig {
            name: "nope".to_string(),
            api_base: "http://localhost".to_string(),
        });
        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
    }

    #[test]
    fn test_anthropic_provider() {
        let llm = LLM::new(LLMProviderConfig {
            name: "anthropic".to_string(),
            api_base: "https://api.anthropic.com".to_string(),
        })
        .unwrap();
        assert_eq!(llm.provider_name(), "anthropic");
    }
}
