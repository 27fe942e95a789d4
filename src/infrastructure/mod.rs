//! # Infrastructure Layer
//!
//! Handles interactions with external systems and services.
//! Implements the traits defined in the Domain layer (`ChatProvider`, `ServiceAdapter`).

pub mod http;
pub mod hub;
pub mod llm;
pub mod logging;
pub mod matrix;
pub mod reddit;
pub mod speech;
pub mod translate;
