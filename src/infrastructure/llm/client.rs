//! # Chat Client
//!
//! Holds one resolved `ProviderConfig` per configured provider and routes prompts to them.

use std::collections::HashMap;

use crate::domain::config::AppConfig;
use crate::domain::error::{Failure, ServiceResult};
use crate::domain::types::Provider;
use crate::infrastructure::llm::providers::{self, ProviderConfig};
use crate::infrastructure::llm::Message;

pub struct ChatClient {
    providers: HashMap<Provider, ProviderConfig>,
}

impl ChatClient {
    /// Create a new client from application configuration
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let mut providers = HashMap::new();
        for (provider, entry) in config.provider_entries()? {
            providers.insert(provider, ProviderConfig::from_entry(provider, entry)?);
        }
        Ok(Self { providers })
    }

    pub fn configured(&self) -> Vec<Provider> {
        Provider::ALL
            .iter()
            .copied()
            .filter(|p| self.providers.contains_key(p))
            .collect()
    }

    /// Sends a user prompt, preceded by `system` when given, and returns the assistant's text.
    pub async fn prompt(
        &self,
        provider: Provider,
        system: Option<&str>,
        prompt: &str,
    ) -> ServiceResult<String> {
        let config = self.providers.get(&provider).ok_or_else(|| {
            Failure::unauthorized(format!("[{}] provider is not configured", provider.as_str()))
        })?;

        let response = providers::chat(config, conversation(system, prompt)).await?;
        tracing::debug!(
            "[{}] {} replied using {} tokens",
            provider.as_str(),
            response.model,
            response.usage.total_tokens
        );
        Ok(response.content)
    }
}

fn conversation(system: Option<&str>, prompt: &str) -> Vec<Message> {
    system
        .map(Message::system)
        .into_iter()
        .chain(std::iter::once(Message::user(prompt)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ErrorKind;
    use crate::infrastructure::llm::types::MessageRole;

    const CONFIG: &str = r#"
services:
  matrix:
    homeserver: https://matrix.example.org
    username: courier
    password: secret
  reddit:
    client_id: id
    client_secret: shh
    username: courier
    password: secret
providers:
  deepseek:
    api_key: sk-ds
"#;

    #[test]
    fn test_only_configured_providers_are_routed() {
        let config = AppConfig::from_yaml(CONFIG).unwrap();
        let client = ChatClient::from_config(&config).unwrap();
        assert_eq!(client.configured(), vec![Provider::DeepSeek]);
    }

    #[test]
    fn test_system_instruction_leads_conversation() {
        let messages = conversation(Some("Be brief."), "Hello");
        let roles: Vec<MessageRole> = messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![MessageRole::System, MessageRole::User]);
        assert_eq!(messages[0].content, "Be brief.");

        let messages = conversation(None, "Hello");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, MessageRole::User);
    }

    #[tokio::test]
    async fn test_unconfigured_provider_is_unauthorized() {
        let config = AppConfig::from_yaml(CONFIG).unwrap();
        let client = ChatClient::from_config(&config).unwrap();
        let err = client.prompt(Provider::Mistral, None, "hi").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unauthorized);
    }
}
