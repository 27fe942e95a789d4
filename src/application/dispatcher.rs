//! # Command Dispatcher
//!
//! Routes inbound command events to the appropriate handler (in `interface/commands`).
//! It resolves the command in the registry, checks arity, parses the arguments and turns
//! whatever the handler returns into exactly one reply. Failures never escape: they are
//! rendered through the failure templates.

use std::sync::Arc;
use std::time::Duration;

use crate::application::jobs::JobManager;
use crate::application::registry::{Command, CommandRegistry, ParsedArgs};
use crate::domain::error::{Failure, ServiceResult};
use crate::domain::traits::ServiceAdapter;
use crate::domain::types::{InboundEvent, Provider, Reply};
use crate::interface::commands;
use crate::strings::messages;

/// Everything a handler may touch.
pub struct HandlerContext {
    pub adapter: Arc<dyn ServiceAdapter>,
    pub jobs: Arc<JobManager>,
    pub registry: Arc<CommandRegistry>,
    /// Interval for newly started jobs.
    pub job_interval: Duration,
    /// Backend used to write auto-comments.
    pub job_provider: Provider,
    pub prefix: String,
}

pub struct Dispatcher {
    ctx: HandlerContext,
}

impl Dispatcher {
    pub fn new(ctx: HandlerContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &HandlerContext {
        &self.ctx
    }

    /// Handles one event and returns the reply to send back.
    pub async fn handle(&self, event: &InboundEvent) -> Reply {
        tracing::info!(
            "Dispatching cmd='{}' args={:?} sender='{}'",
            event.command,
            event.args,
            event.sender
        );

        let descriptor = match self.ctx.registry.lookup(&event.command) {
            Ok(d) => d,
            Err(_) => {
                let failure = Failure::unknown_command(&event.command);
                return Reply::Text(failure.user_message(&self.ctx.prefix));
            }
        };

        if event.args.len() < descriptor.min_args {
            return Reply::Text(messages::usage(
                &self.ctx.prefix,
                descriptor.name,
                descriptor.usage,
            ));
        }

        let args = descriptor.rule.parse(&event.args);
        match self.invoke(descriptor.command, &args, event).await {
            Ok(reply) => reply,
            Err(failure) => {
                tracing::warn!(
                    command = descriptor.name,
                    kind = %failure.kind,
                    "Command failed: {}",
                    failure.message
                );
                Reply::Text(failure.user_message(&self.ctx.prefix))
            }
        }
    }

    async fn invoke(
        &self,
        command: Command,
        args: &ParsedArgs,
        event: &InboundEvent,
    ) -> ServiceResult<Reply> {
        let ctx = &self.ctx;
        match command {
            Command::Start => Ok(commands::help::handle_start(&self.ctx)),
            Command::Help => Ok(commands::help::handle_help(ctx)),
            Command::Post => commands::reddit::handle_post(ctx, args).await,
            Command::Comment => commands::reddit::handle_comment(ctx, args).await,
            Command::StartJob => commands::jobs::handle_start_job(ctx, args).await,
            Command::StopJob => commands::jobs::handle_stop_job(ctx, args).await,
            Command::Jobs => Ok(commands::jobs::handle_list_jobs(ctx).await),
            Command::AiChat => commands::ai::handle_ai_chat(ctx, args).await,
            Command::Translate => commands::translate::handle_translate(ctx, args).await,
            Command::Languages => Ok(commands::translate::handle_languages()),
            Command::SpeechToText => commands::speech::handle_speech_to_text(ctx, event).await,
            Command::TextToSpeech => commands::speech::handle_text_to_speech(ctx, args).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::StubAdapter;
    use crate::domain::types::Attachment;

    fn dispatcher(stub: Arc<StubAdapter>) -> Dispatcher {
        dispatcher_with_prefix(stub, ".")
    }

    fn dispatcher_with_prefix(stub: Arc<StubAdapter>, prefix: &str) -> Dispatcher {
        Dispatcher::new(HandlerContext {
            adapter: stub,
            jobs: Arc::new(JobManager::new(Duration::ZERO)),
            registry: Arc::new(CommandRegistry::standard().unwrap()),
            job_interval: Duration::from_secs(1200),
            job_provider: Provider::Mistral,
            prefix: prefix.to_string(),
        })
    }

    fn event(command: &str, args: &str) -> InboundEvent {
        InboundEvent::new(
            command,
            args.split_whitespace().map(String::from).collect(),
            "@alice:example.org",
        )
    }

    #[tokio::test]
    async fn test_post_replies_with_locator() {
        let stub = Arc::new(StubAdapter::ok("http://x/1"));
        let reply = dispatcher(stub.clone())
            .handle(&event("post", "testsub Hi body"))
            .await;
        assert_eq!(reply, Reply::text("http://x/1"));
        assert_eq!(stub.calls(), vec!["post"]);
    }

    #[tokio::test]
    async fn test_failure_uses_template() {
        let stub = Arc::new(StubAdapter::failing(Failure::unavailable(
            "[google] HTTP 503: backend error",
        )));
        let reply = dispatcher(stub).handle(&event("translate", "en fr hello")).await;
        assert_eq!(reply, Reply::text(messages::UNAVAILABLE));
    }

    #[tokio::test]
    async fn test_start_job_twice() {
        let stub = Arc::new(StubAdapter::ok("http://x/c1"));
        let d = dispatcher(stub);

        let first = d.handle(&event("start_job", "testsub")).await;
        let second = d.handle(&event("start_job", "testsub")).await;

        assert_eq!(first, Reply::Text(messages::job_started("testsub", 1200)));
        assert!(second.as_text().unwrap().contains("already running"));
        let jobs = d.context().jobs.list().await;
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].key, "testsub");
    }

    #[tokio::test]
    async fn test_stop_unknown_job() {
        let stub = Arc::new(StubAdapter::ok("unused"));
        let reply = dispatcher(stub.clone())
            .handle(&event("stop_job", "nosuchsub"))
            .await;
        assert_eq!(reply, Reply::Text(messages::no_such_job("nosuchsub")));
        assert_eq!(stub.call_count(), 0);
    }

    #[tokio::test]
    async fn test_short_args_never_reach_adapter() {
        let stub = Arc::new(StubAdapter::ok("unused"));
        let reply = dispatcher(stub.clone())
            .handle(&event("ai_chat", "deepseek"))
            .await;
        assert_eq!(
            reply,
            Reply::text("Usage: `.ai_chat <deepseek|mistral> <query...>`")
        );
        assert_eq!(stub.call_count(), 0);
    }

    #[tokio::test]
    async fn test_every_command_checks_arity() {
        let stub = Arc::new(StubAdapter::ok("unused"));
        let d = dispatcher(stub.clone());
        let registry = CommandRegistry::standard().unwrap();

        for descriptor in registry.descriptors().filter(|d| d.min_args > 0) {
            let args = vec!["x".to_string(); descriptor.min_args - 1];
            let reply = d
                .handle(&InboundEvent::new(descriptor.name, args, "@bob:example.org"))
                .await;
            assert!(
                reply.as_text().unwrap().starts_with("Usage:"),
                "{} did not reply with usage",
                descriptor.name
            );
        }
        assert_eq!(stub.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_command() {
        let stub = Arc::new(StubAdapter::ok("unused"));
        let d = dispatcher(stub.clone());

        let reply = d.handle(&event("Post", "testsub Hi body")).await;
        assert_eq!(reply, Reply::Text(messages::unknown_command(".", "Post")));
        assert_eq!(stub.call_count(), 0);
    }

    #[tokio::test]
    async fn test_replies_point_at_configured_prefix() {
        let d = dispatcher_with_prefix(Arc::new(StubAdapter::ok("unused")), "/");

        let unknown = d.handle(&event("nope", "")).await;
        let text = unknown.as_text().unwrap();
        assert!(text.contains("`/help`"));
        assert!(!text.contains("`.help`"));

        let welcome = d.handle(&event("start", "")).await;
        assert_eq!(welcome, Reply::Text(messages::welcome("/")));
        assert!(welcome.as_text().unwrap().contains("`/help`"));
    }

    #[tokio::test]
    async fn test_ai_chat_routes_provider() {
        let stub = Arc::new(StubAdapter::ok("42"));
        let reply = dispatcher(stub.clone())
            .handle(&event("ai_chat", "deepseek what is the answer"))
            .await;
        assert_eq!(reply, Reply::text("42"));
        assert_eq!(stub.last_provider(), Some(Provider::DeepSeek));
    }

    #[tokio::test]
    async fn test_ai_chat_unknown_provider_is_invalid_input() {
        let stub = Arc::new(StubAdapter::ok("42"));
        let reply = dispatcher(stub.clone())
            .handle(&event("ai_chat", "gpt hello"))
            .await;
        assert!(reply.as_text().unwrap().starts_with("❌ Invalid input"));
        assert_eq!(stub.call_count(), 0);
    }

    #[tokio::test]
    async fn test_text_to_speech_returns_audio() {
        let stub = Arc::new(StubAdapter::ok("unused"));
        let reply = dispatcher(stub)
            .handle(&event("text_to_speech", "en hello there"))
            .await;
        match reply {
            Reply::Audio(audio) => assert_eq!(&audio.data[..], b"hello there"),
            other => panic!("expected audio, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_speech_to_text_requires_audio() {
        let stub = Arc::new(StubAdapter::ok("transcript"));
        let d = dispatcher(stub.clone());

        let missing = d.handle(&event("speech_to_text", "")).await;
        assert!(missing.as_text().unwrap().starts_with("❌ Invalid input"));
        assert_eq!(stub.call_count(), 0);

        let voice = event("speech_to_text", "")
            .with_attachment(Attachment::new(vec![0u8; 4], "audio/ogg", "voice.ogg"));
        assert_eq!(d.handle(&voice).await, Reply::text("transcript"));
    }

    #[tokio::test]
    async fn test_help_lists_commands() {
        let stub = Arc::new(StubAdapter::ok("unused"));
        let reply = dispatcher(stub).handle(&event("help", "")).await;
        let text = reply.as_text().unwrap();
        for name in ["post", "start_job", "stop_job", "ai_chat", "translate"] {
            assert!(text.contains(&format!(".{name}")), "help misses {name}");
        }
    }
}
