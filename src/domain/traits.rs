//! # Domain Traits
//!
//! Abstract interfaces for the chat transport and the external services.
//! Allows for pluggable implementations in the Infrastructure layer (and stubs in tests).

use async_trait::async_trait;

use crate::domain::error::ServiceResult;
use crate::domain::types::{Attachment, Post, Provider};

/// Abstract interface for a Chat Provider (e.g., Matrix, Console)
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Send a message to the room, returning the new event id
    async fn send_message(&self, content: &str) -> Result<String, String>;

    /// Upload a file to the room, returning the new event id
    async fn send_attachment(&self, attachment: &Attachment) -> Result<String, String>;

    /// Send a typing indicator
    async fn typing(&self, active: bool) -> Result<(), String>;

    /// Get the current room ID
    fn room_id(&self) -> String;
}

/// One method per external capability the bot forwards to.
///
/// Implementations normalize every provider error into a `Failure` before returning;
/// callers never see transport or decoding errors directly.
#[async_trait]
pub trait ServiceAdapter: Send + Sync {
    /// Submit a text post, returning its URL.
    async fn post(&self, resource_key: &str, title: &str, body: &str) -> ServiceResult<String>;

    /// Newest post in the given community.
    async fn latest_post(&self, resource_key: &str) -> ServiceResult<Post>;

    /// Reply to a post, returning the comment permalink.
    async fn comment(&self, post: &Post, text: &str) -> ServiceResult<String>;

    /// Ask a chat-completion backend, optionally steering it with a system instruction.
    async fn converse(
        &self,
        provider: Provider,
        system: Option<&str>,
        prompt: &str,
    ) -> ServiceResult<String>;

    async fn translate(&self, source: &str, dest: &str, text: &str) -> ServiceResult<String>;

    async fn speech_to_text(&self, audio: &Attachment) -> ServiceResult<String>;

    async fn text_to_speech(&self, lang: &str, text: &str) -> ServiceResult<Attachment>;
}
