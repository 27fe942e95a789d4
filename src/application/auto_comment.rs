//! # Auto-Comment Task
//!
//! The recurring work behind `.start_job`: fetch the newest post of a subreddit, ask a
//! chat backend for a fitting comment and reply with it. The same logic backs the
//! one-shot `.comment` command.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::application::jobs::JobTask;
use crate::domain::error::{Failure, ServiceResult};
use crate::domain::traits::ServiceAdapter;
use crate::domain::types::Provider;
use crate::strings::{messages, prompts};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentOutcome {
    Commented { post_id: String, url: String },
    /// The newest post is the one this task already answered.
    AlreadyCommented { post_id: String },
}

pub struct AutoCommentTask {
    adapter: Arc<dyn ServiceAdapter>,
    subreddit: String,
    provider: Provider,
    last_post: Mutex<Option<String>>,
}

impl AutoCommentTask {
    pub fn new(adapter: Arc<dyn ServiceAdapter>, subreddit: &str, provider: Provider) -> Self {
        Self {
            adapter,
            subreddit: subreddit.to_string(),
            provider,
            last_post: Mutex::new(None),
        }
    }

    pub async fn comment_latest(&self) -> ServiceResult<CommentOutcome> {
        let post = self.adapter.latest_post(&self.subreddit).await?;

        let mut last_post = self.last_post.lock().await;
        if last_post.as_deref() == Some(post.id.as_str()) {
            return Ok(CommentOutcome::AlreadyCommented { post_id: post.id });
        }

        let prompt = prompts::comment_prompt(&post.title, &post.body);
        let text = self
            .adapter
            .converse(self.provider, Some(prompts::COMMENT_INSTRUCTION), &prompt)
            .await?;
        let text = text.trim();
        if text.is_empty() {
            return Err(Failure::unknown(format!(
                "{} returned an empty comment",
                self.provider.as_str()
            )));
        }

        let url = self.adapter.comment(&post, text).await?;
        *last_post = Some(post.id.clone());
        Ok(CommentOutcome::Commented {
            post_id: post.id,
            url,
        })
    }
}

#[async_trait]
impl JobTask for AutoCommentTask {
    async fn run_once(&self) -> ServiceResult<String> {
        match self.comment_latest().await? {
            CommentOutcome::Commented { url, .. } => Ok(messages::commented(&url)),
            CommentOutcome::AlreadyCommented { post_id } => {
                Ok(messages::comment_skipped(&post_id))
            }
        }
    }
}
