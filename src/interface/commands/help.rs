//! # Help Command
//!
//! Handles the `.help` and `.start` commands.
//! The listing is rendered from the registry so it always matches the usage replies.

use crate::application::dispatcher::HandlerContext;
use crate::application::registry::CommandDescriptor;
use crate::domain::types::Reply;
use crate::strings::{help, messages};

fn line(prefix: &str, d: &CommandDescriptor) -> String {
    if d.usage.is_empty() {
        format!("* {prefix}{}: {}\n", d.name, d.summary)
    } else {
        format!("* {prefix}{} {}: {}\n", d.name, d.usage, d.summary)
    }
}

pub fn handle_help(ctx: &HandlerContext) -> Reply {
    let mut out = String::from(help::HEADER);
    let mut listed = Vec::new();

    for (title, names) in help::GROUPS {
        out.push('\n');
        out.push_str(title);
        out.push('\n');
        for name in *names {
            if let Ok(d) = ctx.registry.lookup(name) {
                out.push_str(&line(&ctx.prefix, d));
                listed.push(d.name);
            }
        }
    }

    let rest: Vec<_> = ctx
        .registry
        .descriptors()
        .filter(|d| !listed.contains(&d.name))
        .collect();
    if !rest.is_empty() {
        out.push('\n');
        for d in rest {
            out.push_str(&line(&ctx.prefix, d));
        }
    }

    out.push('\n');
    out.push_str(help::AUDIO_HINT);
    Reply::Text(out)
}

pub fn handle_start(ctx: &HandlerContext) -> Reply {
    Reply::text(messages::welcome(&ctx.prefix))
}
