//! # Job Commands
//!
//! Handles `.start_job`, `.stop_job` and `.jobs`.
//! Starting returns as soon as the loop is scheduled; the first iteration runs in the background.

use std::sync::Arc;

use crate::application::auto_comment::AutoCommentTask;
use crate::application::dispatcher::HandlerContext;
use crate::application::jobs::{JobSnapshot, StartOutcome};
use crate::application::registry::ParsedArgs;
use crate::domain::error::ServiceResult;
use crate::domain::types::Reply;
use crate::interface::commands::reddit::normalize_subreddit;
use crate::strings::messages;

fn summary(snapshot: &JobSnapshot) -> String {
    messages::job_summary(
        snapshot.runs,
        snapshot.consecutive_failures,
        snapshot.last_run,
    )
}

pub async fn handle_start_job(ctx: &HandlerContext, args: &ParsedArgs) -> ServiceResult<Reply> {
    let subreddit = normalize_subreddit(args.token(0))?;
    let task = Arc::new(AutoCommentTask::new(
        Arc::clone(&ctx.adapter),
        &subreddit,
        ctx.job_provider,
    ));

    let reply = match ctx.jobs.start(&subreddit, ctx.job_interval, task).await {
        StartOutcome::Started(snapshot) => {
            messages::job_started(&subreddit, snapshot.interval.as_secs())
        }
        StartOutcome::AlreadyRunning(snapshot) => {
            messages::job_already_running(&subreddit, &summary(&snapshot))
        }
    };
    Ok(Reply::Text(reply))
}

pub async fn handle_stop_job(ctx: &HandlerContext, args: &ParsedArgs) -> ServiceResult<Reply> {
    let subreddit = normalize_subreddit(args.token(0))?;
    let snapshot = ctx.jobs.stop(&subreddit).await?;
    Ok(Reply::Text(messages::job_stopped(&subreddit, snapshot.runs)))
}

pub async fn handle_list_jobs(ctx: &HandlerContext) -> Reply {
    let jobs = ctx.jobs.list().await;
    if jobs.is_empty() {
        return Reply::text(messages::NO_JOBS);
    }
    let lines: Vec<String> = jobs
        .iter()
        .map(|job| messages::job_list_entry(&job.key, &summary(job)))
        .collect();
    Reply::Text(lines.join("\n"))
}
