//! # Matrix Service Adapter
//!
//! Implements the `ChatProvider` trait for the Matrix protocol using the `matrix_sdk`.
//! Also fetches the media behind inbound audio messages.

use crate::domain::traits::ChatProvider;
use crate::domain::types::Attachment;
use anyhow::Result;
use async_trait::async_trait;
use matrix_sdk::attachment::AttachmentConfig;
use matrix_sdk::media::{MediaFormat, MediaRequestParameters};
use matrix_sdk::room::Room;
use matrix_sdk::ruma::events::room::message::{AudioMessageEventContent, RoomMessageEventContent};
use matrix_sdk::Client;

#[derive(Clone)]
pub struct MatrixService {
    room: Room,
}

impl MatrixService {
    pub fn new(room: Room) -> Self {
        Self { room }
    }
}

#[async_trait]
impl ChatProvider for MatrixService {
    fn room_id(&self) -> String {
        self.room.room_id().as_str().to_string()
    }

    async fn send_message(&self, content: &str) -> Result<String, String> {
        tracing::info!("Bot sending message to {}: {}", self.room_id(), content);
        self.room
            .send(RoomMessageEventContent::text_markdown(content))
            .await
            .map(|resp| resp.event_id.to_string())
            .map_err(|e| e.to_string())
    }

    async fn send_attachment(&self, attachment: &Attachment) -> Result<String, String> {
        tracing::info!(
            "Bot uploading {} ({} bytes) to {}",
            attachment.file_name,
            attachment.data.len(),
            self.room_id()
        );
        let mime: mime::Mime = attachment.mime.parse().map_err(|e| format!("{e}"))?;
        self.room
            .send_attachment(
                attachment.file_name.clone(),
                &mime,
                attachment.data.to_vec(),
                AttachmentConfig::new(),
            )
            .await
            .map(|resp| resp.event_id.to_string())
            .map_err(|e| e.to_string())
    }

    async fn typing(&self, active: bool) -> Result<(), String> {
        self.room
            .typing_notice(active)
            .await
            .map_err(|e| e.to_string())
    }
}

/// Downloads (and decrypts, for encrypted rooms) the file behind an audio message.
pub async fn download_audio(client: &Client, content: &AudioMessageEventContent) -> Result<Attachment> {
    let request = MediaRequestParameters {
        source: content.source.clone(),
        format: MediaFormat::File,
    };
    let data = client.media().get_media_content(&request, true).await?;

    let mime = content
        .info
        .as_ref()
        .and_then(|info| info.mimetype.clone())
        .unwrap_or_else(|| "audio/ogg".to_string());
    let file_name = content
        .filename
        .clone()
        .unwrap_or_else(|| content.body.clone());

    Ok(Attachment::new(data, mime, file_name))
}
