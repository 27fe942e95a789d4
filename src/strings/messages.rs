//! # Messages
//!
//! Contains constant strings and format functions for user-facing messages.
//! Includes failure templates, usage lines, and job status notifications.

use chrono::{DateTime, Utc};

// Failure templates
pub const UNAUTHORIZED: &str =
    "🚫 **Authorization failed.** The service rejected the bot's credentials.";
pub const UNAVAILABLE: &str = "⚠️ The service is unavailable right now. Please try again later.";
pub const RATE_LIMITED: &str = "⏳ The service is rate limiting us. Please wait a bit and retry.";
pub const UNKNOWN_FAILURE: &str = "❌ Something went wrong while talking to the service.";

pub fn invalid_input(detail: &str) -> String {
    format!("❌ Invalid input: {detail}")
}

pub fn unknown_command(prefix: &str, name: &str) -> String {
    format!("❓ Unknown command `{name}`. Send `{prefix}help` for the list.")
}

pub fn no_such_job(key: &str) -> String {
    format!("🤷 No running job for r/{key}.")
}

pub fn usage(prefix: &str, name: &str, args: &str) -> String {
    if args.is_empty() {
        format!("Usage: `{prefix}{name}`")
    } else {
        format!("Usage: `{prefix}{name} {args}`")
    }
}

pub fn welcome(prefix: &str) -> String {
    format!("🤖 Welcome! Send `{prefix}help` to see what I can do.")
}

pub fn job_started(key: &str, interval_secs: u64) -> String {
    format!(
        "🔄 Auto-commenting started in r/{key} (every {} min).",
        interval_secs / 60
    )
}

pub fn job_already_running(key: &str, summary: &str) -> String {
    format!("ℹ️ Job for r/{key} is already running. {summary}")
}

pub fn job_stopped(key: &str, runs: u64) -> String {
    format!("🛑 Job for r/{key} stopped after {runs} run(s).")
}

pub fn job_summary(
    runs: u64,
    consecutive_failures: u32,
    last_run: Option<DateTime<Utc>>,
) -> String {
    let last = last_run
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "never".to_string());
    format!("Runs: {runs}, consecutive failures: {consecutive_failures}, last run: {last}.")
}

pub fn job_list_entry(key: &str, summary: &str) -> String {
    format!("* r/{key}: {summary}")
}

pub const NO_JOBS: &str = "No background jobs running.";

pub fn commented(url: &str) -> String {
    format!("💬 Commented: {url}")
}

pub fn comment_skipped(post_id: &str) -> String {
    format!("Post {post_id} already has our comment, skipping.")
}

pub const ATTACH_AUDIO: &str = "attach a voice or audio message";

pub fn unsupported_language(code: &str) -> String {
    format!("unsupported language code `{code}` (see .languages)")
}

pub fn unsupported_provider(tag: &str, known: &[&str]) -> String {
    format!("unknown provider `{tag}`, expected one of: {}", known.join(", "))
}

pub fn invalid_subreddit(name: &str) -> String {
    format!("`{name}` is not a valid subreddit name")
}

pub fn event_dropped(err: &str) -> String {
    format!("Inbox closed, dropping event: {err}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_format() {
        assert_eq!(usage(".", "help", ""), "Usage: `.help`");
        assert_eq!(
            usage(".", "post", "<subreddit> <title> <body...>"),
            "Usage: `.post <subreddit> <title> <body...>`"
        );
    }

    #[test]
    fn test_job_summary_never_run() {
        assert_eq!(
            job_summary(0, 0, None),
            "Runs: 0, consecutive failures: 0, last run: never."
        );
    }
}
