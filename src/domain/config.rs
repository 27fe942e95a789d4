//! # Configuration
//!
//! Manages the loading and parsing of the application's configuration file (`config.yaml`).
//! Defines the structs for the chat transport, the external services, background jobs and logging.
//!
//! Secrets can be written inline (`password`, `api_key`) or read from the environment
//! (`password_env`, `api_key_env`); inline values win.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::domain::types::Provider;

/// Main application configuration structure.
/// Matches the layout of `data/config.yaml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub services: ServicesConfig,
    /// Chat backends keyed by provider tag (`deepseek`, `mistral`).
    #[serde(default)]
    pub providers: HashMap<String, ProviderEntry>,
    #[serde(default)]
    pub speech: SpeechConfig,
    #[serde(default)]
    pub translate: TranslateConfig,
    #[serde(default)]
    pub jobs: JobsConfig,
    #[serde(default)]
    pub commands: CommandsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("missing mandatory credentials: {}", .0.join(", "))]
    MissingCredentials(Vec<String>),
    #[error("unknown provider tag `{0}` in providers section")]
    UnknownProvider(String),
    #[error("jobs.provider `{0}` has no entry in the providers section")]
    JobProviderNotConfigured(String),
    #[error("jobs.interval_secs must be greater than zero")]
    ZeroInterval,
    #[error("commands.prefix must not be blank")]
    EmptyPrefix,
}

/// Configuration for the connected services.
#[derive(Debug, Deserialize, Clone)]
pub struct ServicesConfig {
    pub matrix: MatrixConfig,
    pub reddit: RedditConfig,
}

/// Specific configuration for the Matrix service.
#[derive(Debug, Deserialize, Clone)]
pub struct MatrixConfig {
    pub homeserver: String,
    pub username: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub password_env: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl MatrixConfig {
    pub fn password(&self) -> Option<String> {
        resolve_secret(&self.password, &self.password_env)
    }
}

/// Script-app credentials for the posting platform.
#[derive(Debug, Deserialize, Clone)]
pub struct RedditConfig {
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_id_env: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub client_secret_env: Option<String>,
    pub username: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub password_env: Option<String>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_reddit_auth_url")]
    pub auth_url: String,
    #[serde(default = "default_reddit_api_url")]
    pub api_url: String,
}

impl RedditConfig {
    pub fn client_id(&self) -> Option<String> {
        resolve_secret(&self.client_id, &self.client_id_env)
    }

    pub fn client_secret(&self) -> Option<String> {
        resolve_secret(&self.client_secret, &self.client_secret_env)
    }

    pub fn password(&self) -> Option<String> {
        resolve_secret(&self.password, &self.password_env)
    }
}

fn default_user_agent() -> String {
    format!("courier/{}", env!("CARGO_PKG_VERSION"))
}
fn default_reddit_auth_url() -> String {
    "https://www.reddit.com/api/v1/access_token".to_string()
}
fn default_reddit_api_url() -> String {
    "https://oauth.reddit.com".to_string()
}

/// One OpenAI-compatible chat backend.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct ProviderEntry {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_key_env: Option<String>, // e.g. "DEEPSEEK_API_KEY"
    #[serde(default)]
    pub timeout: Option<u64>,
}

impl ProviderEntry {
    pub fn api_key(&self) -> Option<String> {
        resolve_secret(&self.api_key, &self.api_key_env)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SpeechConfig {
    /// Base URL of a Whisper-compatible transcription API.
    #[serde(default = "default_stt_endpoint")]
    pub stt_endpoint: String,
    #[serde(default = "default_stt_model")]
    pub stt_model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_key_env: Option<String>,
    #[serde(default = "default_tts_endpoint")]
    pub tts_endpoint: String,
}

impl SpeechConfig {
    pub fn api_key(&self) -> Option<String> {
        resolve_secret(&self.api_key, &self.api_key_env)
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            stt_endpoint: default_stt_endpoint(),
            stt_model: default_stt_model(),
            api_key: None,
            api_key_env: None,
            tts_endpoint: default_tts_endpoint(),
        }
    }
}

fn default_stt_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_stt_model() -> String {
    "whisper-1".to_string()
}
fn default_tts_endpoint() -> String {
    "https://translate.google.com/translate_tts".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct TranslateConfig {
    #[serde(default = "default_translate_endpoint")]
    pub endpoint: String,
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            endpoint: default_translate_endpoint(),
        }
    }
}

fn default_translate_endpoint() -> String {
    "https://translate.googleapis.com/translate_a/single".to_string()
}

/// Settings for recurring per-subreddit jobs.
#[derive(Debug, Deserialize, Clone)]
pub struct JobsConfig {
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
    /// Upper bound of the random delay added to each sleep.
    #[serde(default = "default_jitter")]
    pub jitter_secs: u64,
    /// Provider tag used to write comments.
    #[serde(default = "default_job_provider")]
    pub provider: String,
    /// Grace period for in-flight iterations on shutdown.
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace_secs: u64,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
            jitter_secs: default_jitter(),
            provider: default_job_provider(),
            shutdown_grace_secs: default_shutdown_grace(),
        }
    }
}

fn default_interval() -> u64 {
    1200
}
fn default_jitter() -> u64 {
    30
}
fn default_job_provider() -> String {
    "mistral".to_string()
}
fn default_shutdown_grace() -> u64 {
    10
}

#[derive(Debug, Deserialize, Clone)]
pub struct CommandsConfig {
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Treat bare audio messages as `speech_to_text`.
    #[serde(default = "default_true")]
    pub transcribe_audio: bool,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            transcribe_audio: true,
        }
    }
}

fn default_prefix() -> String {
    ".".to_string()
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_filter")]
    pub filter: String,
    #[serde(default = "default_log_file")]
    pub file: Option<String>,
    #[serde(default = "default_true")]
    pub console: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            file: default_log_file(),
            console: true,
        }
    }
}

fn default_log_filter() -> String {
    "info,matrix_sdk=warn,matrix_sdk_base=warn,matrix_sdk_crypto=error,ruma=warn,hyper=warn"
        .to_string()
}
fn default_log_file() -> Option<String> {
    Some("data/session.log".to_string())
}

fn resolve_secret(inline: &Option<String>, env_var: &Option<String>) -> Option<String> {
    if let Some(value) = inline.as_ref().filter(|v| !v.trim().is_empty()) {
        return Some(value.clone());
    }
    env_var
        .as_ref()
        .and_then(|name| std::env::var(name).ok())
        .filter(|v| !v.trim().is_empty())
}

impl AppConfig {
    /// Reads and parses the YAML file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("Failed to parse config YAML")
    }

    /// Configured chat backends, keyed by provider.
    pub fn provider_entries(&self) -> Result<Vec<(Provider, &ProviderEntry)>, ConfigError> {
        let mut entries = Vec::new();
        for (tag, entry) in &self.providers {
            let provider =
                Provider::from_str(tag).ok_or_else(|| ConfigError::UnknownProvider(tag.clone()))?;
            entries.push((provider, entry));
        }
        Ok(entries)
    }

    /// Checks that every credential the bot cannot serve without is present and that
    /// the job and command settings are usable.
    ///
    /// Called before logging in; a failure here must stop the process.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let providers = self.provider_entries()?;
        let mut missing = Vec::new();

        if self.services.matrix.password().is_none() {
            missing.push("services.matrix.password".to_string());
        }

        let reddit = &self.services.reddit;
        if reddit.client_id().is_none() {
            missing.push("services.reddit.client_id".to_string());
        }
        if reddit.client_secret().is_none() {
            missing.push("services.reddit.client_secret".to_string());
        }
        if reddit.password().is_none() {
            missing.push("services.reddit.password".to_string());
        }

        for (provider, entry) in &providers {
            if entry.api_key().is_none() {
                missing.push(format!("providers.{}.api_key", provider.as_str()));
            }
        }

        if !missing.is_empty() {
            missing.sort();
            return Err(ConfigError::MissingCredentials(missing));
        }

        let job_provider = Provider::from_str(&self.jobs.provider)
            .ok_or_else(|| ConfigError::UnknownProvider(self.jobs.provider.clone()))?;
        if !providers.iter().any(|(provider, _)| *provider == job_provider) {
            return Err(ConfigError::JobProviderNotConfigured(self.jobs.provider.clone()));
        }
        if self.jobs.interval_secs == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        if self.commands.prefix.trim().is_empty() {
            return Err(ConfigError::EmptyPrefix);
        }

        Ok(())
    }
}
