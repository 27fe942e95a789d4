//! # Inbox
//!
//! Serializes inbound events. Transport callbacks may fire concurrently; they only enqueue,
//! and a single task drains the queue, running the dispatcher for one event at a time in
//! arrival order and delivering its reply.

use chrono::Utc;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::application::dispatcher::Dispatcher;
use crate::domain::traits::ChatProvider;
use crate::domain::types::{InboundEvent, Reply};

/// An event plus the room its reply goes to.
pub struct Envelope {
    pub event: InboundEvent,
    pub chat: Arc<dyn ChatProvider>,
}

pub type InboxSender = mpsc::Sender<Envelope>;

pub fn channel(capacity: usize) -> (InboxSender, mpsc::Receiver<Envelope>) {
    mpsc::channel(capacity)
}

/// Drains the inbox until every sender is dropped.
pub async fn run(dispatcher: Arc<Dispatcher>, mut rx: mpsc::Receiver<Envelope>) {
    while let Some(Envelope { event, chat }) = rx.recv().await {
        let queued = Utc::now() - event.received_at;
        tracing::debug!(
            room = %chat.room_id(),
            queued_ms = queued.num_milliseconds(),
            "Dequeued cmd='{}'",
            event.command
        );
        let _ = chat.typing(true).await;
        let reply = dispatcher.handle(&event).await;
        let _ = chat.typing(false).await;
        deliver(chat.as_ref(), reply).await;
    }
    tracing::info!("Inbox closed");
}

async fn deliver(chat: &dyn ChatProvider, reply: Reply) {
    let result = match &reply {
        Reply::Text(text) => chat.send_message(text).await,
        Reply::Audio(audio) => chat.send_attachment(audio).await,
    };
    if let Err(e) = result {
        tracing::error!("Failed to deliver reply to {}: {}", chat.room_id(), e);
    }
}
