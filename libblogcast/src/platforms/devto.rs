//! Dev.to platform implementation
//!
//! Publishes through the Forem articles API: a single authenticated
//! `POST /api/articles` with `published: true`, so the article goes live
//! immediately instead of landing in drafts.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::platforms::{http, Platform};
use crate::types::{Document, PlatformKind, PublishReceipt};

#[derive(Debug, Serialize)]
struct CreateArticleRequest<'a> {
    article: Article<'a>,
}

#[derive(Debug, Serialize)]
struct Article<'a> {
    title: &'a str,
    body_markdown: &'a str,
    published: bool,
}

#[derive(Debug, Default, Deserialize)]
struct ArticleResponse {
    id: Option<u64>,
    slug: Option<String>,
    url: Option<String>,
}

/// Dev.to client
pub struct DevtoClient {
    client: reqwest::Client,
    base_url: String,
    api_key: SecretString,
}

impl DevtoClient {
    /// Create a new Dev.to client
    ///
    /// An empty `api_key` is accepted; Dev.to answers with 401, which
    /// surfaces as an authentication error.
    pub fn new(base_url: &str, api_key: SecretString, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: http::build_client(timeout)?,
            base_url: http::normalize_base_url(base_url),
            api_key,
        })
    }

    /// JSON payload for the create-article request
    ///
    /// The body is the full document, title line included.
    pub fn article_payload(document: &Document) -> serde_json::Value {
        serde_json::json!(CreateArticleRequest {
            article: Article {
                title: document.title(),
                body_markdown: document.body(),
                published: true,
            },
        })
    }
}

#[async_trait]
impl Platform for DevtoClient {
    fn kind(&self) -> PlatformKind {
        PlatformKind::Devto
    }

    async fn publish(&self, document: &Document) -> Result<PublishReceipt> {
        let url = format!("{}/api/articles", self.base_url);
        debug!("Creating Dev.to article at {}", url);

        let request = self
            .client
            .post(&url)
            .header("api-key", self.api_key.expose_secret())
            .json(&Self::article_payload(document));

        let response = http::send(self.kind(), "article creation", request).await?;

        // Only transport and status failures matter; an unreadable success body is tolerated
        let article: ArticleResponse = response
            .text()
            .await
            .ok()
            .and_then(|body| serde_json::from_str(&body).ok())
            .unwrap_or_default();

        Ok(PublishReceipt {
            post_id: article.id.map(|id| id.to_string()),
            slug: article.slug,
            url: article.url,
        })
    }
}
