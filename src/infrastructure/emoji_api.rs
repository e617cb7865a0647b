//! HTTP client for the Misskey emoji endpoints.
//!
//! Tokens travel in the JSON body (`i`), so no auth headers are sent.

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{AddEmojiRequest, AppError, Emoji, EmojisResponse, HttpSettings, Result};

const EMOJIS_PATH: &str = "/api/emojis";
const ADD_EMOJI_PATH: &str = "/api/admin/emoji/add";

/// Remote operations the transfer service depends on.
#[async_trait]
pub trait EmojiApi: Send + Sync {
    /// `GET {base_url}/api/emojis`, returning the raw (not deduplicated) list.
    async fn list_emojis(&self, base_url: &str) -> Result<Vec<Emoji>>;

    /// `POST {base_url}/api/admin/emoji/add`, returning the 2xx status code.
    async fn add_emoji(&self, base_url: &str, request: &AddEmojiRequest) -> Result<u16>;
}

/// `reqwest`-backed implementation.
pub struct HttpEmojiApi {
    http: reqwest::Client,
}

impl HttpEmojiApi {
    /// Build a client with the configured timeout and user agent.
    ///
    /// # Errors
    /// Returns error if the TLS backend cannot be initialized.
    pub fn new(settings: &HttpSettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(AppError::transport)?;

        Ok(Self { http })
    }
}

fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}{path}", base_url.trim_end_matches('/'))
}

#[async_trait]
impl EmojiApi for HttpEmojiApi {
    async fn list_emojis(&self, base_url: &str) -> Result<Vec<Emoji>> {
        let url = endpoint(base_url, EMOJIS_PATH);
        tracing::debug!(%url, "GET");

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(AppError::transport)?;

        let status = resp.status();
        let body = resp.text().await.map_err(AppError::transport)?;

        if !status.is_success() {
            return Err(AppError::HttpStatus {
                code: status.as_u16(),
                url,
                body,
            });
        }

        let parsed: EmojisResponse = serde_json::from_str(&body).map_err(AppError::json_parse)?;
        Ok(parsed.emojis)
    }

    async fn add_emoji(&self, base_url: &str, request: &AddEmojiRequest) -> Result<u16> {
        let url = endpoint(base_url, ADD_EMOJI_PATH);
        tracing::debug!(%url, name = %request.name, "POST");

        let resp = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(AppError::transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::HttpStatus {
                code: status.as_u16(),
                url,
                body,
            });
        }

        Ok(status.as_u16())
    }
}
