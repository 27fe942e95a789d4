//! # AI Chat Command
//!
//! Handles `.ai_chat <provider> <query...>`. Both backends go through the same
//! `converse` capability; the tag only selects which one.

use crate::application::dispatcher::HandlerContext;
use crate::application::registry::ParsedArgs;
use crate::domain::error::{Failure, ServiceResult};
use crate::domain::types::{Provider, Reply};
use crate::strings::messages;

pub async fn handle_ai_chat(ctx: &HandlerContext, args: &ParsedArgs) -> ServiceResult<Reply> {
    let tag = args.token(0);
    let provider = Provider::from_str(tag).ok_or_else(|| {
        let known: Vec<&str> = Provider::ALL.iter().map(|p| p.as_str()).collect();
        Failure::invalid_input(messages::unsupported_provider(tag, &known))
    })?;

    let answer = ctx.adapter.converse(provider, None, args.text()).await?;
    if answer.trim().is_empty() {
        return Err(Failure::unknown(format!(
            "{} returned an empty answer",
            provider.as_str()
        )));
    }
    Ok(Reply::Text(answer))
}
