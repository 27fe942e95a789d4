//! # HTTP Helpers
//!
//! Shared `reqwest` client and the mapping from HTTP-level errors to `Failure`s.
//! Every service client funnels its transport errors through here so that a timeout from
//! Reddit and a timeout from a translation endpoint are reported the same way.

use reqwest::{Client, Response};
use std::sync::OnceLock;
use std::time::Duration;

use crate::domain::error::Failure;

const MAX_DETAIL_CHARS: usize = 300;

/// HTTP client reused across requests
pub fn http_client() -> &'static Client {
    static CLIENT: OnceLock<Client> = OnceLock::new();
    CLIENT.get_or_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Falling back to default HTTP client: {}", e);
                Client::new()
            })
    })
}

/// Failure for an error raised while sending or decoding.
pub fn transport_failure(service: &str, err: &reqwest::Error) -> Failure {
    if err.is_timeout() || err.is_connect() {
        Failure::unavailable(format!("[{service}] {err}"))
    } else if err.is_decode() {
        Failure::unknown(format!("[{service}] malformed response: {err}"))
    } else if let Some(status) = err.status() {
        Failure::from_status(service, status.as_u16(), &err.to_string())
    } else {
        Failure::classify(service, err.to_string())
    }
}

/// Passes successful responses through; converts anything else into a `Failure`.
pub async fn check(service: &str, response: Response) -> Result<Response, Failure> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read error response".to_string());
    Err(Failure::from_status(
        service,
        status.as_u16(),
        &error_detail(&body),
    ))
}

/// Pulls the human-readable part out of a JSON error body.
pub fn error_detail(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        let candidates = [
            json.pointer("/error/message"),
            json.get("error"),
            json.get("message"),
        ];
        for value in candidates.into_iter().flatten() {
            if let Some(text) = value.as_str() {
                return text.to_string();
            }
        }
    }
    body.chars().take(MAX_DETAIL_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_detail_openai_shape() {
        let body = r#"{"error":{"message":"Invalid API key","type":"auth"}}"#;
        assert_eq!(error_detail(body), "Invalid API key");
    }

    #[test]
    fn test_error_detail_flat_shapes() {
        assert_eq!(error_detail(r#"{"error":"invalid_grant"}"#), "invalid_grant");
        assert_eq!(error_detail(r#"{"message":"Forbidden"}"#), "Forbidden");
    }

    #[test]
    fn test_error_detail_plain_text_truncated() {
        let body = "x".repeat(1000);
        assert_eq!(error_detail(&body).len(), MAX_DETAIL_CHARS);
        assert_eq!(error_detail("Bad Gateway"), "Bad Gateway");
    }
}
