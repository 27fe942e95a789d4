//! # Failure Taxonomy
//!
//! Every failure that can reach a user (or a background job log) is normalized into a
//! [`Failure`] carrying one [`ErrorKind`] from a small closed set. Service clients map
//! their provider-specific errors into this shape before returning, and the user-facing
//! text for each kind lives in `strings::messages`, so every service family fails with
//! the same phrasing.

use std::fmt;

use thiserror::Error;

use crate::strings::messages;

/// Closed set of failure categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad arguments, detected before any network call.
    InvalidInput,
    UnknownCommand,
    NoSuchJob,
    /// Missing or rejected credential.
    Unauthorized,
    /// Network error, timeout or non-2xx from the provider.
    Unavailable,
    RateLimited,
    Unknown,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::UnknownCommand => "unknown_command",
            ErrorKind::NoSuchJob => "no_such_job",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::Unavailable => "unavailable",
            ErrorKind::RateLimited => "rate_limited",
            ErrorKind::Unknown => "unknown",
        }
    }

    /// Classifies an HTTP status code returned by a provider.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => ErrorKind::Unauthorized,
            429 => ErrorKind::RateLimited,
            408 | 500..=599 => ErrorKind::Unavailable,
            400 | 404 | 413 | 415 | 422 => ErrorKind::InvalidInput,
            _ => ErrorKind::Unknown,
        }
    }

    /// Classifies a free-text provider error message.
    ///
    /// Providers that answer 200 with an error body (or SDK-style string errors) only give
    /// us text to work with, so this falls back to keyword matching.
    pub fn from_message(message: &str) -> Self {
        let lower = message.to_lowercase();

        if lower.contains("429")
            || lower.contains("too many requests")
            || lower.contains("rate limit")
            || lower.contains("ratelimit")
            || lower.contains("quota")
        {
            return ErrorKind::RateLimited;
        }

        if lower.contains("401")
            || lower.contains("403")
            || lower.contains("unauthorized")
            || lower.contains("forbidden")
            || lower.contains("invalid api key")
            || lower.contains("invalid_grant")
            || lower.contains("authentication")
        {
            return ErrorKind::Unauthorized;
        }

        if lower.contains("timeout")
            || lower.contains("timed out")
            || lower.contains("connection")
            || lower.contains("network")
            || lower.contains("service unavailable")
            || lower.contains("internal server error")
            || lower.contains("bad gateway")
        {
            return ErrorKind::Unavailable;
        }

        ErrorKind::Unknown
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized failure: the kind drives the reply, the message is diagnostic detail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct Failure {
    pub kind: ErrorKind,
    pub message: String,
}

impl Failure {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidInput, message)
    }

    pub fn unknown_command(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownCommand, name)
    }

    pub fn no_such_job(key: impl Into<String>) -> Self {
        Self::new(ErrorKind::NoSuchJob, key)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unavailable, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RateLimited, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unknown, message)
    }

    /// Failure for a non-success HTTP response from `service`.
    pub fn from_status(service: &str, status: u16, detail: &str) -> Self {
        Self::new(
            ErrorKind::from_status(status),
            format!("[{service}] HTTP {status}: {detail}"),
        )
    }

    /// Failure for an unstructured provider error message.
    pub fn classify(service: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new(
            ErrorKind::from_message(&message),
            format!("[{service}] {message}"),
        )
    }

    /// The text shown to the user. Only validation kinds echo their detail, since
    /// provider messages may contain request internals. `prefix` is the command prefix
    /// users are pointed at.
    pub fn user_message(&self, prefix: &str) -> String {
        match self.kind {
            ErrorKind::InvalidInput => messages::invalid_input(&self.message),
            ErrorKind::UnknownCommand => messages::unknown_command(prefix, &self.message),
            ErrorKind::NoSuchJob => messages::no_such_job(&self.message),
            ErrorKind::Unauthorized => messages::UNAUTHORIZED.to_string(),
            ErrorKind::Unavailable => messages::UNAVAILABLE.to_string(),
            ErrorKind::RateLimited => messages::RATE_LIMITED.to_string(),
            ErrorKind::Unknown => messages::UNKNOWN_FAILURE.to_string(),
        }
    }
}

/// Outcome of any service capability call.
pub type ServiceResult<T> = Result<T, Failure>;
