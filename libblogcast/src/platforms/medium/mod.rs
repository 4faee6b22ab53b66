//! Medium platform implementation
//!
//! Two mutually exclusive strategies, picked by `medium.strategy`:
//!
//! - [`MediumClient`]: the official REST API with an integration token
//! - [`browser::MediumBrowserPublisher`]: drives the web composer in a
//!   browser session restored from stored cookies

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PlatformError, Result};
use crate::platforms::{http, Platform};
use crate::types::{Document, PlatformKind, PublishReceipt};

pub mod browser;
pub mod cookies;
#[cfg(feature = "browser")]
pub mod webdriver;

/// Medium wraps every payload in `{"data": ...}`
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct User {
    id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatePostRequest<'a> {
    title: &'a str,
    content_format: &'a str,
    content: &'a str,
    publish_status: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct CreatedPost {
    id: Option<String>,
    url: Option<String>,
}

/// Medium REST API client
pub struct MediumClient {
    client: reqwest::Client,
    base_url: String,
    token: SecretString,
}

impl MediumClient {
    pub fn new(base_url: &str, token: SecretString, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: http::build_client(timeout)?,
            base_url: http::normalize_base_url(base_url),
            token,
        })
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.token.expose_secret())
    }

    /// JSON payload for the create-post request
    pub fn post_payload(document: &Document) -> serde_json::Value {
        serde_json::json!(CreatePostRequest {
            title: document.title(),
            content_format: "markdown",
            content: document.body(),
            publish_status: "public",
        })
    }

    /// Resolve the id of the user owning the integration token
    async fn fetch_user_id(&self) -> Result<String> {
        let url = format!("{}/v1/me", self.base_url);
        let request = self.client.get(&url).header("Authorization", self.bearer());

        let response = http::send(self.kind(), "user lookup", request).await?;
        let user: Envelope<User> = http::read_json(self.kind(), "user lookup", response).await?;

        if user.data.id.is_empty() {
            return Err(PlatformError::Posting(
                "Medium user lookup returned an empty user id".to_string(),
            )
            .into());
        }

        Ok(user.data.id)
    }
}

#[async_trait]
impl Platform for MediumClient {
    fn kind(&self) -> PlatformKind {
        PlatformKind::Medium
    }

    async fn publish(&self, document: &Document) -> Result<PublishReceipt> {
        let user_id = self.fetch_user_id().await?;
        debug!("Resolved Medium user id {}", user_id);

        let url = format!("{}/v1/users/{}/posts", self.base_url, user_id);
        let request = self
            .client
            .post(&url)
            .header("Authorization", self.bearer())
            .json(&Self::post_payload(document));

        let response = http::send(self.kind(), "post creation", request).await?;

        let post: CreatedPost = response
            .text()
            .await
            .ok()
            .and_then(|body| serde_json::from_str::<Envelope<CreatedPost>>(&body).ok())
            .map(|envelope| envelope.data)
            .unwrap_or_default();

        Ok(PublishReceipt {
            post_id: post.id,
            slug: None,
            url: post.url,
        })
    }
}
