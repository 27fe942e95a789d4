//! # LLM Client
//!
//! Chat completions against the OpenAI-compatible endpoints of the configured providers.
//! DeepSeek is called directly; Mistral is reached through OpenRouter. Both speak the same
//! wire format, so a single provider implementation serves them.

mod client;
pub mod providers;
mod types;

pub use client::ChatClient;
pub use types::{Message, Response, TokenUsage};
