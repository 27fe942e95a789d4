//! # Application Layer
//!
//! Contains the core orchestration of the bot: the command registry and dispatcher,
//! the inbox that serializes inbound events, and the background job manager.

pub mod auto_comment;
pub mod dispatcher;
pub mod inbox;
pub mod jobs;
pub mod parsing;
pub mod registry;

#[cfg(test)]
pub mod testing;
