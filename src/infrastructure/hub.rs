//! # Service Hub
//!
//! The production `ServiceAdapter`: owns one client per external service and forwards
//! each capability to it.

use async_trait::async_trait;

use crate::domain::config::AppConfig;
use crate::domain::error::ServiceResult;
use crate::domain::traits::ServiceAdapter;
use crate::domain::types::{Attachment, Post, Provider};
use crate::infrastructure::llm::ChatClient;
use crate::infrastructure::reddit::{RedditClient, RedditCredentials};
use crate::infrastructure::speech::SpeechClient;
use crate::infrastructure::translate::Translator;

pub struct ServiceHub {
    reddit: RedditClient,
    chat: ChatClient,
    translator: Translator,
    speech: SpeechClient,
}

impl ServiceHub {
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let chat = ChatClient::from_config(config)?;
        tracing::info!(
            "Chat providers: {}",
            chat.configured()
                .iter()
                .map(|p| p.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(Self {
            reddit: RedditClient::new(RedditCredentials::from_config(&config.services.reddit)?),
            chat,
            translator: Translator::new(&config.translate),
            speech: SpeechClient::new(&config.speech),
        })
    }
}

#[async_trait]
impl ServiceAdapter for ServiceHub {
    async fn post(&self, resource_key: &str, title: &str, body: &str) -> ServiceResult<String> {
        self.reddit.submit(resource_key, title, body).await
    }

    async fn latest_post(&self, resource_key: &str) -> ServiceResult<Post> {
        self.reddit.newest(resource_key).await
    }

    async fn comment(&self, post: &Post, text: &str) -> ServiceResult<String> {
        self.reddit.comment(post, text).await
    }

    async fn converse(
        &self,
        provider: Provider,
        system: Option<&str>,
        prompt: &str,
    ) -> ServiceResult<String> {
        self.chat.prompt(provider, system, prompt).await
    }

    async fn translate(&self, source: &str, dest: &str, text: &str) -> ServiceResult<String> {
        self.translator.translate(source, dest, text).await
    }

    async fn speech_to_text(&self, audio: &Attachment) -> ServiceResult<String> {
        self.speech.transcribe(audio).await
    }

    async fn text_to_speech(&self, lang: &str, text: &str) -> ServiceResult<Attachment> {
        self.speech.synthesize(lang, text).await
    }
}
