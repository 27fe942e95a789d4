//! # Speech Commands
//!
//! Handles `.speech_to_text` (audio attachment in, transcript out) and
//! `.text_to_speech` (text in, audio attachment out).

use crate::application::dispatcher::HandlerContext;
use crate::application::registry::ParsedArgs;
use crate::domain::error::{Failure, ServiceResult};
use crate::domain::types::{InboundEvent, Reply};
use crate::interface::commands::translate::language_code;
use crate::strings::messages;

pub async fn handle_speech_to_text(
    ctx: &HandlerContext,
    event: &InboundEvent,
) -> ServiceResult<Reply> {
    let audio = event
        .attachment
        .as_ref()
        .filter(|a| a.is_audio() && !a.data.is_empty())
        .ok_or_else(|| Failure::invalid_input(messages::ATTACH_AUDIO))?;

    let transcript = ctx.adapter.speech_to_text(audio).await?;
    if transcript.trim().is_empty() {
        return Err(Failure::unknown("transcription came back empty"));
    }
    Ok(Reply::Text(transcript))
}

pub async fn handle_text_to_speech(
    ctx: &HandlerContext,
    args: &ParsedArgs,
) -> ServiceResult<Reply> {
    let lang = language_code(args.token(0), false)?;
    let audio = ctx.adapter.text_to_speech(&lang, args.text()).await?;
    Ok(Reply::Audio(audio))
}
