use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;

use crate::config::DiscordSection;

#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("platform returned {status}: {body}")]
    Http { status: u16, body: String },
    #[error("request to platform failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("could not decode platform response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("{0} is not configured")]
    MissingConfig(&'static str),
}

/// Authenticated access to the platform's REST API. Paths are relative to
/// the API base, e.g. `/applications/123/commands`.
#[async_trait]
pub trait PlatformApi: Send + Sync {
    /// Perform a request. Empty response bodies come back as `Value::Null`.
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, PlatformError>;

    async fn get(&self, path: &str) -> Result<Value, PlatformError> {
        self.request(Method::GET, path, None).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, PlatformError> {
        self.request(Method::POST, path, Some(body)).await
    }

    async fn put(&self, path: &str, body: Option<&Value>) -> Result<Value, PlatformError> {
        self.request(Method::PUT, path, body).await
    }

    async fn delete(&self, path: &str) -> Result<Value, PlatformError> {
        self.request(Method::DELETE, path, None).await
    }
}

/// `PlatformApi` over HTTPS with a bot token.
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl RestClient {
    pub fn new(
        base_url: &str,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, PlatformError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(
                "DiscordBot (switchboard, ",
                env!("CARGO_PKG_VERSION"),
                ")"
            ))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    pub fn from_config(discord: &DiscordSection) -> Result<Self, PlatformError> {
        Self::new(
            &discord.api_base,
            discord.bot_token.clone(),
            Duration::from_secs(discord.request_timeout_secs),
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl PlatformApi for RestClient {
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, PlatformError> {
        if self.token.is_empty() {
            return Err(PlatformError::MissingConfig("bot token"));
        }

        let mut req = self
            .http
            .request(method, self.url(path))
            .header(AUTHORIZATION, format!("Bot {}", self.token))
            .header(CONTENT_TYPE, "application/json");

        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req.send().await?;
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PlatformError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = resp.bytes().await?;
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}
