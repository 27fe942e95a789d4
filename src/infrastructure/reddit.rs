//! # Reddit Client
//!
//! Script-app OAuth (password grant) plus the three calls the bot needs: submitting a
//! self post, reading a subreddit's newest post and replying to a post.
//!
//! The bearer token is cached until shortly before it expires and is dropped as soon as
//! the API answers 401, so the next call logs in again.

use reqwest::header::USER_AGENT;
use reqwest::Method;
use serde::Deserialize;
use serde_json::Value;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::domain::config::{ConfigError, RedditConfig};
use crate::domain::error::{Failure, ServiceResult};
use crate::domain::types::Post;
use crate::infrastructure::http::{check, http_client, transport_failure};

const SERVICE: &str = "reddit";
const WEB_URL: &str = "https://www.reddit.com";
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Credentials resolved from config and environment.
#[derive(Debug, Clone)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
    pub user_agent: String,
    pub auth_url: String,
    pub api_url: String,
}

impl RedditCredentials {
    pub fn from_config(config: &RedditConfig) -> Result<Self, ConfigError> {
        let mut missing = Vec::new();
        let client_id = config.client_id();
        let client_secret = config.client_secret();
        let password = config.password();
        if client_id.is_none() {
            missing.push("services.reddit.client_id".to_string());
        }
        if client_secret.is_none() {
            missing.push("services.reddit.client_secret".to_string());
        }
        if password.is_none() {
            missing.push("services.reddit.password".to_string());
        }

        match (client_id, client_secret, password) {
            (Some(client_id), Some(client_secret), Some(password)) => Ok(Self {
                client_id,
                client_secret,
                username: config.username.clone(),
                password,
                user_agent: config.user_agent.clone(),
                auth_url: config.auth_url.clone(),
                api_url: config.api_url.trim_end_matches('/').to_string(),
            }),
            _ => Err(ConfigError::MissingCredentials(missing)),
        }
    }
}

#[derive(Debug)]
struct AccessToken {
    value: String,
    expires_at: Instant,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<u64>,
    error: Option<String>,
}

pub struct RedditClient {
    credentials: RedditCredentials,
    token: Mutex<Option<AccessToken>>,
}

impl RedditClient {
    pub fn new(credentials: RedditCredentials) -> Self {
        Self {
            credentials,
            token: Mutex::new(None),
        }
    }

    /// Creates a self post; returns its URL.
    pub async fn submit(&self, subreddit: &str, title: &str, body: &str) -> ServiceResult<String> {
        let response = self
            .api(
                Method::POST,
                "/api/submit",
                &[
                    ("sr", subreddit),
                    ("kind", "self"),
                    ("title", title),
                    ("text", body),
                    ("api_type", "json"),
                ],
            )
            .await?;
        parse_submit(&response)
    }

    pub async fn newest(&self, subreddit: &str) -> ServiceResult<Post> {
        let path = format!("/r/{subreddit}/new");
        let response = self
            .api(Method::GET, &path, &[("limit", "1"), ("raw_json", "1")])
            .await?;
        parse_listing(subreddit, &response)
    }

    /// Replies to `post`; returns the comment's permalink.
    pub async fn comment(&self, post: &Post, text: &str) -> ServiceResult<String> {
        let response = self
            .api(
                Method::POST,
                "/api/comment",
                &[("thing_id", post.id.as_str()), ("text", text), ("api_type", "json")],
            )
            .await?;
        parse_comment(&response)
    }

    async fn api(&self, method: Method, path: &str, params: &[(&str, &str)]) -> ServiceResult<Value> {
        let token = self.access_token().await?;
        let url = format!("{}{}", self.credentials.api_url, path);

        let request = http_client()
            .request(method.clone(), &url)
            .bearer_auth(&token)
            .header(USER_AGENT, &self.credentials.user_agent);
        let request = if method == Method::GET {
            request.query(params)
        } else {
            request.form(params)
        };

        let response = request
            .send()
            .await
            .map_err(|e| transport_failure(SERVICE, &e))?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            self.token.lock().await.take();
        }

        check(SERVICE, response)
            .await?
            .json()
            .await
            .map_err(|e| transport_failure(SERVICE, &e))
    }

    async fn access_token(&self) -> ServiceResult<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref()
            && token.expires_at > Instant::now()
        {
            return Ok(token.value.clone());
        }

        let creds = &self.credentials;
        let response = http_client()
            .post(&creds.auth_url)
            .basic_auth(&creds.client_id, Some(&creds.client_secret))
            .header(USER_AGENT, &creds.user_agent)
            .form(&[
                ("grant_type", "password"),
                ("username", creds.username.as_str()),
                ("password", creds.password.as_str()),
            ])
            .send()
            .await
            .map_err(|e| transport_failure(SERVICE, &e))?;
        let body: TokenResponse = check(SERVICE, response)
            .await?
            .json()
            .await
            .map_err(|e| transport_failure(SERVICE, &e))?;

        let token = token_from_response(body, Instant::now())?;
        tracing::info!("Obtained Reddit access token for u/{}", creds.username);
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }
}

/// Reddit answers a bad password with 200 and `{"error": "invalid_grant"}`.
fn token_from_response(body: TokenResponse, now: Instant) -> ServiceResult<AccessToken> {
    if let Some(error) = body.error {
        return Err(Failure::unauthorized(format!("[{SERVICE}] {error}")));
    }
    let value = body
        .access_token
        .ok_or_else(|| Failure::unauthorized(format!("[{SERVICE}] no access token returned")))?;
    let lifetime = Duration::from_secs(body.expires_in.unwrap_or(3600));

    Ok(AccessToken {
        value,
        expires_at: now + lifetime.saturating_sub(EXPIRY_MARGIN),
    })
}

/// `api_type=json` responses report problems as `[code, message, field]` triples.
fn api_errors(response: &Value) -> ServiceResult<()> {
    let Some(first) = response
        .pointer("/json/errors")
        .and_then(Value::as_array)
        .and_then(|errors| errors.first())
    else {
        return Ok(());
    };

    let code = first.get(0).and_then(Value::as_str).unwrap_or("UNKNOWN");
    let message = first.get(1).and_then(Value::as_str).unwrap_or(code);
    let detail = format!("[{SERVICE}] {code}: {message}");

    Err(match code {
        "RATELIMIT" => Failure::rate_limited(detail),
        "USER_REQUIRED" | "INVALID_CREDENTIALS" => Failure::unauthorized(detail),
        "SUBREDDIT_NOEXIST" | "SUBREDDIT_NOTALLOWED" | "NO_TEXT" | "NO_SELFS" | "TOO_LONG"
        | "BAD_SR_NAME" | "THREAD_LOCKED" | "DELETED_LINK" => Failure::invalid_input(message),
        _ => Failure::classify(SERVICE, detail),
    })
}

fn parse_submit(response: &Value) -> ServiceResult<String> {
    api_errors(response)?;
    response
        .pointer("/json/data/url")
        .and_then(Value::as_str)
        .map(String::from)
        .ok_or_else(|| Failure::unknown(format!("[{SERVICE}] submit returned no url")))
}

fn parse_comment(response: &Value) -> ServiceResult<String> {
    api_errors(response)?;
    response
        .pointer("/json/data/things/0/data/permalink")
        .and_then(Value::as_str)
        .map(|permalink| format!("{WEB_URL}{permalink}"))
        .ok_or_else(|| Failure::unknown(format!("[{SERVICE}] comment returned no permalink")))
}

fn parse_listing(subreddit: &str, response: &Value) -> ServiceResult<Post> {
    let Some(data) = response.pointer("/data/children/0/data") else {
        return Err(Failure::invalid_input(format!("r/{subreddit} has no posts yet")));
    };

    let field = |name: &str| {
        data.get(name)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    let id = field("name");
    if id.is_empty() {
        return Err(Failure::unknown(format!("[{SERVICE}] listing entry has no name")));
    }
    let permalink = field("permalink");

    Ok(Post {
        id,
        title: field("title"),
        body: field("selftext"),
        url: if permalink.is_empty() {
            field("url")
        } else {
            format!("{WEB_URL}{permalink}")
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_parse_submit_success() {
        let response = json!({"json": {"errors": [], "data": {"url": "https://www.reddit.com/r/rust/comments/abc/hi/", "name": "t3_abc"}}});
        assert_eq!(
            parse_submit(&response).unwrap(),
            "https://www.reddit.com/r/rust/comments/abc/hi/"
        );
    }

    #[test]
    fn test_parse_submit_ratelimit() {
        let response = json!({"json": {"errors": [["RATELIMIT", "you are doing that too much. try again in 9 minutes.", "ratelimit"]]}});
        let err = parse_submit(&response).unwrap_err();
        assert_eq!(err.kind, ErrorKind::RateLimited);
    }

    #[test]
    fn test_parse_submit_bad_subreddit() {
        let response = json!({"json": {"errors": [["SUBREDDIT_NOEXIST", "that subreddit doesn't exist", "sr"]]}});
        let err = parse_submit(&response).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidInput);
        assert_eq!(err.message, "that subreddit doesn't exist");
    }

    #[test]
    fn test_parse_comment_permalink() {
        let response = json!({"json": {"errors": [], "data": {"things": [{"kind": "t1", "data": {"permalink": "/r/rust/comments/abc/hi/def/"}}]}}});
        assert_eq!(
            parse_comment(&response).unwrap(),
            "https://www.reddit.com/r/rust/comments/abc/hi/def/"
        );
    }

    #[test]
    fn test_parse_listing() {
        let response = json!({"kind": "Listing", "data": {"children": [{"kind": "t3", "data": {
            "name": "t3_abc",
            "title": "Hello",
            "selftext": "World",
            "url": "https://example.com",
            "permalink": "/r/rust/comments/abc/hello/"
        }}]}});
        let post = parse_listing("rust", &response).unwrap();
        assert_eq!(post.id, "t3_abc");
        assert_eq!(post.title, "Hello");
        assert_eq!(post.body, "World");
        assert_eq!(post.url, "https://www.reddit.com/r/rust/comments/abc/hello/");
    }

    #[test]
    fn test_parse_empty_listing() {
        let response = json!({"kind": "Listing", "data": {"children": []}});
        let err = parse_listing("quiet", &response).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidInput);
    }

    #[test]
    fn test_token_response() {
        let now = Instant::now();
        let token = token_from_response(
            TokenResponse {
                access_token: Some("abc".to_string()),
                expires_in: Some(3600),
                error: None,
            },
            now,
        )
        .unwrap();
        assert_eq!(token.value, "abc");
        assert_eq!(token.expires_at, now + Duration::from_secs(3540));

        let err = token_from_response(
            TokenResponse {
                access_token: None,
                expires_in: None,
                error: Some("invalid_grant".to_string()),
            },
            now,
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unauthorized);
    }

    #[test]
    fn test_credentials_report_missing_fields() {
        let config: RedditConfig = serde_yaml::from_str("username: courier").unwrap();
        match RedditCredentials::from_config(&config) {
            Err(ConfigError::MissingCredentials(missing)) => assert_eq!(missing.len(), 3),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
