//! # Reddit Commands
//!
//! Handles `.post` and `.comment`.

use std::sync::Arc;

use crate::application::auto_comment::{AutoCommentTask, CommentOutcome};
use crate::application::dispatcher::HandlerContext;
use crate::application::registry::ParsedArgs;
use crate::domain::error::{Failure, ServiceResult};
use crate::domain::types::Reply;
use crate::strings::messages;

/// Validates a subreddit argument and returns the canonical (lowercase, no `r/`) name.
pub fn normalize_subreddit(raw: &str) -> ServiceResult<String> {
    let name = raw.trim().trim_start_matches('/');
    let name = name
        .strip_prefix("r/")
        .or_else(|| name.strip_prefix("R/"))
        .unwrap_or(name);

    let valid = (2..=21).contains(&name.len())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        return Err(Failure::invalid_input(messages::invalid_subreddit(raw)));
    }
    Ok(name.to_lowercase())
}

pub async fn handle_post(ctx: &HandlerContext, args: &ParsedArgs) -> ServiceResult<Reply> {
    let subreddit = normalize_subreddit(args.token(0))?;
    let url = ctx
        .adapter
        .post(&subreddit, args.token(1), args.text())
        .await?;
    Ok(Reply::Text(url))
}

pub async fn handle_comment(ctx: &HandlerContext, args: &ParsedArgs) -> ServiceResult<Reply> {
    let subreddit = normalize_subreddit(args.token(0))?;
    let task = AutoCommentTask::new(Arc::clone(&ctx.adapter), &subreddit, ctx.job_provider);
    let reply = match task.comment_latest().await? {
        CommentOutcome::Commented { url, .. } => messages::commented(&url),
        CommentOutcome::AlreadyCommented { post_id } => messages::comment_skipped(&post_id),
    };
    Ok(Reply::Text(reply))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ErrorKind;

    #[test]
    fn test_normalize_subreddit() {
        assert_eq!(normalize_subreddit("rust").unwrap(), "rust");
        assert_eq!(normalize_subreddit("r/Rust").unwrap(), "rust");
        assert_eq!(normalize_subreddit("/r/learn_rust").unwrap(), "learn_rust");
    }

    #[test]
    fn test_invalid_subreddit() {
        for bad in ["", "r/", "a", "no spaces", "semi;colon", "waytoolongsubredditname_x"] {
            let err = normalize_subreddit(bad).unwrap_err();
            assert_eq!(err.kind, ErrorKind::InvalidInput, "{bad:?} accepted");
        }
    }
}
