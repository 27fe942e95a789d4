//! # Command Handlers
//!
//! Contains specific handler functions for each supported command family.
//! These handlers are invoked by the Dispatcher after the arguments were validated.

pub mod ai;
pub mod help;
pub mod jobs;
pub mod reddit;
pub mod speech;
pub mod translate;
