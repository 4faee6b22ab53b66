//! HTTP plumbing shared by the API-based adapters

use std::time::Duration;

use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::{PlatformError, Result};
use crate::types::PlatformKind;

pub(crate) fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("blogcast/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| PlatformError::Network(format!("Failed to create HTTP client: {}", e)).into())
}

/// Strip trailing slashes so paths can be appended with `format!`
pub(crate) fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

pub(crate) fn map_transport_error(
    platform: PlatformKind,
    context: &str,
    error: reqwest::Error,
) -> PlatformError {
    if error.is_timeout() {
        PlatformError::Network(format!("{} request timed out during {}: {}", platform, context, error))
    } else {
        PlatformError::Network(format!("{} request failed during {}: {}", platform, context, error))
    }
}

/// Map a response status to the error taxonomy
///
/// Non-2xx responses surface the upstream body when there is one, else the
/// status text.
pub(crate) async fn check_response(
    platform: PlatformKind,
    context: &str,
    response: Response,
) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let detail = if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("no response body")
            .to_string()
    } else {
        body
    };

    let error = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => PlatformError::Authentication(format!(
            "{} rejected the credential during {} ({}): {}",
            platform, context, status, detail
        )),
        StatusCode::TOO_MANY_REQUESTS => PlatformError::RateLimit(format!(
            "{} rate limit hit during {} ({}): {}",
            platform, context, status, detail
        )),
        _ => PlatformError::Posting(format!(
            "{} {} failed ({}): {}",
            platform, context, status, detail
        )),
    };

    Err(error.into())
}

/// Send a request and return the checked response
pub(crate) async fn send(
    platform: PlatformKind,
    context: &str,
    request: reqwest::RequestBuilder,
) -> Result<Response> {
    let response = request
        .send()
        .await
        .map_err(|e| map_transport_error(platform, context, e))?;
    check_response(platform, context, response).await
}

/// Decode a successful JSON response
pub(crate) async fn read_json<T: DeserializeOwned>(
    platform: PlatformKind,
    context: &str,
    response: Response,
) -> Result<T> {
    let body = response
        .text()
        .await
        .map_err(|e| map_transport_error(platform, context, e))?;

    serde_json::from_str(&body).map_err(|e| {
        PlatformError::Posting(format!(
            "{} returned an unexpected response during {}: {} (body: {})",
            platform, context, e, body
        ))
        .into()
    })
}
