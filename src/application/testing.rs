//! Deterministic `ServiceAdapter` and `ChatProvider` doubles for unit tests.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::domain::error::{Failure, ServiceResult};
use crate::domain::traits::{ChatProvider, ServiceAdapter};
use crate::domain::types::{Attachment, Post, Provider};

/// Answers every capability with the same outcome and records which ones were called.
pub struct StubAdapter {
    outcome: ServiceResult<String>,
    calls: Mutex<Vec<&'static str>>,
    last_comment: Mutex<Option<String>>,
    last_provider: Mutex<Option<Provider>>,
    last_system: Mutex<Option<String>>,
    last_prompt: Mutex<Option<String>>,
}

impl StubAdapter {
    pub fn ok(payload: &str) -> Self {
        Self::with_outcome(Ok(payload.to_string()))
    }

    pub fn failing(failure: Failure) -> Self {
        Self::with_outcome(Err(failure))
    }

    fn with_outcome(outcome: ServiceResult<String>) -> Self {
        Self {
            outcome,
            calls: Mutex::new(Vec::new()),
            last_comment: Mutex::new(None),
            last_provider: Mutex::new(None),
            last_system: Mutex::new(None),
            last_prompt: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_comment(&self) -> Option<String> {
        self.last_comment.lock().unwrap().clone()
    }

    pub fn last_provider(&self) -> Option<Provider> {
        *self.last_provider.lock().unwrap()
    }

    pub fn last_system(&self) -> Option<String> {
        self.last_system.lock().unwrap().clone()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().unwrap().clone()
    }

    fn record(&self, name: &'static str) -> ServiceResult<String> {
        self.calls.lock().unwrap().push(name);
        self.outcome.clone()
    }
}

#[async_trait]
impl ServiceAdapter for StubAdapter {
    async fn post(&self, _resource_key: &str, _title: &str, _body: &str) -> ServiceResult<String> {
        self.record("post")
    }

    async fn latest_post(&self, resource_key: &str) -> ServiceResult<Post> {
        self.record("latest_post")?;
        Ok(Post {
            id: "t3_abc".to_string(),
            title: format!("Newest in r/{resource_key}"),
            body: "body".to_string(),
            url: "https://reddit.example/t3_abc".to_string(),
        })
    }

    async fn comment(&self, _post: &Post, text: &str) -> ServiceResult<String> {
        *self.last_comment.lock().unwrap() = Some(text.to_string());
        self.record("comment")
    }

    async fn converse(
        &self,
        provider: Provider,
        system: Option<&str>,
        prompt: &str,
    ) -> ServiceResult<String> {
        *self.last_provider.lock().unwrap() = Some(provider);
        *self.last_system.lock().unwrap() = system.map(String::from);
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
        self.record("converse")
    }

    async fn translate(&self, _source: &str, _dest: &str, _text: &str) -> ServiceResult<String> {
        self.record("translate")
    }

    async fn speech_to_text(&self, _audio: &Attachment) -> ServiceResult<String> {
        self.record("speech_to_text")
    }

    async fn text_to_speech(&self, _lang: &str, text: &str) -> ServiceResult<Attachment> {
        self.record("text_to_speech")?;
        Ok(Attachment::new(
            text.as_bytes().to_vec(),
            "audio/mpeg",
            "speech.mp3",
        ))
    }
}

/// Collects everything the bot sends to a room.
#[derive(Default)]
pub struct RecordingChat {
    pub sent: Mutex<Vec<String>>,
    pub files: Mutex<Vec<Attachment>>,
}

impl RecordingChat {
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatProvider for RecordingChat {
    async fn send_message(&self, content: &str) -> Result<String, String> {
        let mut sent = self.sent.lock().unwrap();
        sent.push(content.to_string());
        Ok(format!("$event{}", sent.len()))
    }

    async fn send_attachment(&self, attachment: &Attachment) -> Result<String, String> {
        let mut files = self.files.lock().unwrap();
        files.push(attachment.clone());
        Ok(format!("$file{}", files.len()))
    }

    async fn typing(&self, _active: bool) -> Result<(), String> {
        Ok(())
    }

    fn room_id(&self) -> String {
        "!test:example.org".to_string()
    }
}
