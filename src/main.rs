#![recursion_limit = "256"]
//! # Main Entry Point
//!
//! Wires the layers together:
//! - Domain: Configuration, Types and Failures
//! - Infrastructure: Matrix, Reddit, LLM, Translation, Speech
//! - Application: Registry, Dispatcher, Inbox, Jobs
//! - Interface: Command Handlers
//!

mod application;
mod domain;
mod infrastructure;
mod interface;
mod strings;

use anyhow::{Context, Result};
use clap::Parser;
use matrix_sdk::{
    Client,
    config::SyncSettings,
    room::Room,
    ruma::events::room::{
        member::{MembershipState, StrippedRoomMemberEvent},
        message::{MessageType, SyncRoomMessageEvent},
    },
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::application::dispatcher::{Dispatcher, HandlerContext};
use crate::application::inbox::{self, Envelope, InboxSender};
use crate::application::jobs::JobManager;
use crate::application::parsing::parse_command;
use crate::application::registry::CommandRegistry;
use crate::domain::config::AppConfig;
use crate::domain::types::{InboundEvent, Provider};
use crate::infrastructure::hub::ServiceHub;
use crate::infrastructure::matrix::{MatrixService, download_audio};
use crate::strings::messages;

const INBOX_CAPACITY: usize = 256;

#[derive(Parser, Debug)]
#[command(version, about = "Matrix bot forwarding commands to Reddit, chat models, translation and speech services")]
struct Cli {
    /// Path to the YAML configuration
    #[arg(long, default_value = "data/config.yaml")]
    config: PathBuf,

    /// Validate the configuration and exit
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Load Configuration
    let config = AppConfig::load(&cli.config)?;
    if cli.check {
        config.validate()?;
        println!("{} is valid", cli.config.display());
        return Ok(());
    }

    // 2. Logging Setup
    let _guard = infrastructure::logging::init(&config.logging)?;
    tracing::info!("Starting Courier...");

    config
        .validate()
        .context("Refusing to start with incomplete configuration")?;

    // 3. Services and Application Components
    let adapter = Arc::new(ServiceHub::from_config(&config)?);
    let registry = Arc::new(CommandRegistry::standard()?);
    let jobs = Arc::new(
        JobManager::new(Duration::from_secs(config.jobs.jitter_secs))
            .with_drain_timeout(Duration::from_secs(config.jobs.shutdown_grace_secs)),
    );
    let job_provider = Provider::from_str(&config.jobs.provider).with_context(|| {
        format!("Unknown job provider `{}`", config.jobs.provider)
    })?;

    let dispatcher = Arc::new(Dispatcher::new(HandlerContext {
        adapter,
        jobs: jobs.clone(),
        registry,
        job_interval: Duration::from_secs(config.jobs.interval_secs),
        job_provider,
        prefix: config.commands.prefix.clone(),
    }));

    let (inbox_tx, inbox_rx) = inbox::channel(INBOX_CAPACITY);
    let inbox_handle = tokio::spawn(inbox::run(dispatcher, inbox_rx));

    // 4. Matrix Setup
    let matrix = &config.services.matrix;
    let password = matrix
        .password()
        .context("Matrix password missing after validation")?;

    let client = Client::builder()
        .homeserver_url(&matrix.homeserver)
        .build()
        .await
        .context("Failed to build Matrix client")?;

    client
        .matrix_auth()
        .login_username(&matrix.username, &password)
        .initial_device_display_name("courier")
        .send()
        .await
        .context("Matrix login failed")?;

    tracing::info!("Logged in as {}", matrix.username);

    if let Some(name) = &matrix.display_name
        && let Err(e) = client.account().set_display_name(Some(name.as_str())).await
    {
        tracing::warn!("Failed to set display name: {}", e);
    }

    // 5. Event Handlers
    let start_time = SystemTime::now();
    let prefix = config.commands.prefix.clone();
    let transcribe_audio = config.commands.transcribe_audio;

    client.add_event_handler(move |ev: SyncRoomMessageEvent, room: Room, client: Client| {
        let inbox_tx = inbox_tx.clone();
        let prefix = prefix.clone();

        async move {
            let Some(original_msg) = ev.as_original() else {
                return;
            };

            // Ignore events older than start_time
            let event_time = UNIX_EPOCH + Duration::from_millis(ev.origin_server_ts().get().into());
            if event_time < start_time {
                return;
            }
            if original_msg.sender == room.own_user_id() {
                return;
            }
            let sender = original_msg.sender.as_str();

            let event = match &original_msg.content.msgtype {
                MessageType::Text(text_content) => {
                    let Some((command, args)) = parse_command(&text_content.body, &prefix) else {
                        return;
                    };
                    tracing::info!("Received command from {}: {}", sender, text_content.body);
                    InboundEvent::new(command, args, sender)
                }
                MessageType::Audio(audio) if transcribe_audio => {
                    tracing::info!("Received audio message from {}", sender);
                    match download_audio(&client, audio).await {
                        Ok(attachment) => {
                            InboundEvent::new("speech_to_text", Vec::new(), sender)
                                .with_attachment(attachment)
                        }
                        Err(e) => {
                            tracing::error!("Failed to download audio from {}: {}", sender, e);
                            return;
                        }
                    }
                }
                _ => return,
            };

            enqueue(&inbox_tx, event, room).await;
        }
    });

    // Handle Invites
    client.add_event_handler(|ev: StrippedRoomMemberEvent, room: Room| async move {
        if ev.content.membership == MembershipState::Invite {
            tracing::info!("Joining {}", room.room_id());
            if let Err(e) = room.join().await {
                tracing::error!("Failed to join {}: {}", room.room_id(), e);
            }
        }
    });

    // 6. Start Loops
    let sync_client = client.clone();
    let mut sync_handle =
        tokio::spawn(async move { sync_client.sync(SyncSettings::default()).await });

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown requested");
            sync_handle.abort();
        }
        result = &mut sync_handle => {
            match result {
                Ok(Err(e)) => tracing::error!("Matrix sync stopped: {}", e),
                Err(e) => tracing::error!("Matrix sync panicked: {}", e),
                Ok(Ok(())) => tracing::info!("Matrix sync finished"),
            }
        }
    }

    jobs.shutdown(Duration::from_secs(config.jobs.shutdown_grace_secs)).await;
    inbox_handle.abort();
    tracing::info!("Courier stopped");

    Ok(())
}

async fn enqueue(inbox_tx: &InboxSender, event: InboundEvent, room: Room) {
    let envelope = Envelope {
        event,
        chat: Arc::new(MatrixService::new(room)),
    };
    if let Err(e) = inbox_tx.send(envelope).await {
        tracing::warn!("{}", messages::event_dropped(&e.to_string()));
    }
}
