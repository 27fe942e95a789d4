//! Provider configuration and request routing.

mod openai;

use std::time::Duration;

use crate::domain::config::ProviderEntry;
use crate::domain::error::{Failure, ServiceResult};
use crate::domain::types::Provider;
use crate::infrastructure::llm::{Message, Response};

/// Resolved settings for one provider
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub provider: Provider,
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Option<Duration>,
}

impl ProviderConfig {
    /// Fills endpoint and model from the provider's defaults when the entry leaves them out.
    pub fn from_entry(provider: Provider, entry: &ProviderEntry) -> ServiceResult<Self> {
        let api_key = entry.api_key().ok_or_else(|| {
            Failure::unauthorized(format!(
                "[{}] no API key provided - set api_key or api_key_env",
                provider.as_str()
            ))
        })?;

        Ok(Self {
            provider,
            api_key,
            base_url: entry
                .endpoint
                .clone()
                .unwrap_or_else(|| provider.default_endpoint().to_string()),
            model: entry
                .model
                .clone()
                .unwrap_or_else(|| provider.default_model().to_string()),
            timeout: entry.timeout.map(Duration::from_secs),
        })
    }
}

/// Execute a chat request with the specified provider
pub async fn chat(config: &ProviderConfig, messages: Vec<Message>) -> ServiceResult<Response> {
    match config.provider {
        Provider::DeepSeek | Provider::Mistral => openai::chat(config, messages).await,
    }
}
