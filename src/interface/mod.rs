//! # Interface Layer
//!
//! User-facing command handlers.

pub mod commands;
