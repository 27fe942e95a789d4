//! # Domain Types
//!
//! Common data structures passed between the transport, the dispatcher and the services.

use bytes::Bytes;
use chrono::{DateTime, Utc};

/// Chat-completion backend selected by the `ai_chat` provider tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    DeepSeek,
    Mistral,
}

impl Provider {
    pub const ALL: [Provider; 2] = [Provider::DeepSeek, Provider::Mistral];

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::DeepSeek => "deepseek",
            Provider::Mistral => "mistral",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "deepseek" | "ds" => Some(Provider::DeepSeek),
            "mistral" | "openrouter" | "chat" => Some(Provider::Mistral),
            _ => None,
        }
    }

    /// Base URL of the OpenAI-compatible API when none is configured.
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Provider::DeepSeek => "https://api.deepseek.com/v1",
            Provider::Mistral => "https://openrouter.ai/api/v1",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::DeepSeek => "deepseek-chat",
            Provider::Mistral => "mistralai/mistral-7b-instruct",
        }
    }
}

/// Binary payload travelling with a message (voice notes in, synthesized speech out).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub data: Bytes,
    pub mime: String,
    pub file_name: String,
}

impl Attachment {
    pub fn new(data: impl Into<Bytes>, mime: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            mime: mime.into(),
            file_name: file_name.into(),
        }
    }

    pub fn is_audio(&self) -> bool {
        self.mime.starts_with("audio/")
    }
}

/// A command as received from the chat transport.
#[derive(Debug, Clone)]
pub struct InboundEvent {
    pub command: String,
    pub args: Vec<String>,
    /// Opaque sender id; only used for logging and reply targeting.
    pub sender: String,
    pub received_at: DateTime<Utc>,
    pub attachment: Option<Attachment>,
}

impl InboundEvent {
    pub fn new(command: impl Into<String>, args: Vec<String>, sender: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args,
            sender: sender.into(),
            received_at: Utc::now(),
            attachment: None,
        }
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }
}

/// What the dispatcher hands back to the transport for one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Audio(Attachment),
}

impl Reply {
    pub fn text(content: impl Into<String>) -> Self {
        Reply::Text(content.into())
    }

    /// Text content, if this is a text reply.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Reply::Text(t) => Some(t),
            Reply::Audio(_) => None,
        }
    }
}

/// A submission on the posting platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    /// Fullname (`t3_...`), used as the parent when commenting.
    pub id: String,
    pub title: String,
    pub body: String,
    pub url: String,
}
