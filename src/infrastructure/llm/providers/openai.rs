//! OpenAI-compatible API provider
//!
//! Serves DeepSeek and OpenRouter, which both expose `/chat/completions`.

use serde::{Deserialize, Serialize};

use super::ProviderConfig;
use crate::domain::error::{Failure, ServiceResult};
use crate::infrastructure::http::{check, http_client, transport_failure};
use crate::infrastructure::llm::{Message, Response, TokenUsage};

/// OpenAI API request format
#[derive(Debug, Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAIMessage>,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

/// OpenAI API response format
#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    model: String,
    #[serde(default)]
    choices: Vec<OpenAIChoice>,
    #[serde(default)]
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

/// Execute a chat request using OpenAI-compatible API
pub async fn chat(config: &ProviderConfig, messages: Vec<Message>) -> ServiceResult<Response> {
    let service = config.provider.as_str();
    let url = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));

    let request = OpenAIRequest {
        model: &config.model,
        messages: messages
            .into_iter()
            .map(|msg| OpenAIMessage {
                role: msg.role.as_str().to_string(),
                content: msg.content,
            })
            .collect(),
    };

    let mut request_builder = http_client()
        .post(&url)
        .bearer_auth(&config.api_key)
        .json(&request);

    if let Some(timeout) = config.timeout {
        request_builder = request_builder.timeout(timeout);
    }

    let response = request_builder
        .send()
        .await
        .map_err(|e| transport_failure(service, &e))?;
    let body = check(service, response)
        .await?
        .text()
        .await
        .map_err(|e| transport_failure(service, &e))?;

    parse_response(service, &body)
}

/// Decodes a completion body. OpenRouter reports some upstream errors with a 200 status
/// and an `error` object, so that shape is checked before the choices.
fn parse_response(service: &str, body: &str) -> ServiceResult<Response> {
    let json: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| Failure::unknown(format!("[{service}] failed to parse response: {e}")))?;

    if let Some(error) = json.get("error") {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("provider returned an error");
        let status = error
            .get("code")
            .and_then(|c| c.as_u64())
            .and_then(|c| u16::try_from(c).ok())
            .filter(|c| *c >= 400);
        return Err(match status {
            Some(status) => Failure::from_status(service, status, message),
            None => Failure::classify(service, message),
        });
    }

    let parsed: OpenAIResponse = serde_json::from_value(json)
        .map_err(|e| Failure::unknown(format!("[{service}] failed to parse response: {e}")))?;

    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| Failure::unknown(format!("[{service}] no choices in response")))?;

    Ok(Response {
        content: choice.message.content.unwrap_or_default(),
        model: parsed.model,
        usage: parsed
            .usage
            .map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            })
            .unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ErrorKind;

    #[test]
    fn test_parse_completion() {
        let body = r#"{
            "id": "cmpl-1",
            "model": "deepseek-chat",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "Hello!"}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 5, "completion_tokens": 2, "total_tokens": 7}
        }"#;
        let response = parse_response("deepseek", body).unwrap();
        assert_eq!(response.content, "Hello!");
        assert_eq!(response.model, "deepseek-chat");
        assert_eq!(response.usage.total_tokens, 7);
    }

    #[test]
    fn test_parse_without_usage() {
        let body = r#"{"model": "m", "choices": [{"message": {"role": "assistant", "content": null}}]}"#;
        let response = parse_response("mistral", body).unwrap();
        assert_eq!(response.content, "");
        assert_eq!(response.usage, TokenUsage::default());
    }

    #[test]
    fn test_inline_error_uses_code() {
        let body = r#"{"error": {"message": "Rate limit exceeded", "code": 429}}"#;
        let err = parse_response("mistral", body).unwrap_err();
        assert_eq!(err.kind, ErrorKind::RateLimited);
    }

    #[test]
    fn test_inline_error_with_non_status_code_is_classified() {
        let body = r#"{"error": {"message": "Rate limit exceeded upstream", "code": 200}}"#;
        let err = parse_response("mistral", body).unwrap_err();
        assert_eq!(err.kind, ErrorKind::RateLimited);

        // 65965 would wrap to 429 if narrowed blindly
        let body = r#"{"error": {"message": "model overloaded", "code": 65965}}"#;
        let err = parse_response("mistral", body).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unknown);
    }

    #[test]
    fn test_empty_choices_and_garbage() {
        let err = parse_response("deepseek", r#"{"model": "m", "choices": []}"#).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unknown);
        let err = parse_response("deepseek", "<html>").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unknown);
    }
}
