//! # Translation Commands
//!
//! Handles `.translate` and `.languages`.

use crate::application::dispatcher::HandlerContext;
use crate::application::registry::ParsedArgs;
use crate::domain::error::{Failure, ServiceResult};
use crate::domain::types::Reply;
use crate::strings::{languages, messages};

/// Lowercased language code, or `InvalidInput` when unknown.
pub fn language_code(raw: &str, allow_auto: bool) -> ServiceResult<String> {
    let code = raw.trim().to_lowercase();
    if (allow_auto && code == languages::AUTO_DETECT) || languages::is_supported(&code) {
        Ok(code)
    } else {
        Err(Failure::invalid_input(messages::unsupported_language(raw)))
    }
}

pub async fn handle_translate(ctx: &HandlerContext, args: &ParsedArgs) -> ServiceResult<Reply> {
    let source = language_code(args.token(0), true)?;
    let dest = language_code(args.token(1), false)?;
    let translated = ctx.adapter.translate(&source, &dest, args.text()).await?;
    Ok(Reply::Text(translated))
}

pub fn handle_languages() -> Reply {
    Reply::Text(languages::listing())
}
