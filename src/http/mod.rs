// ABOUTME: HTTP plumbing shared by public and authorized backend clients
// ABOUTME: Base URL joining, request ids, response decoding and status-to-error mapping
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ContestHub Contributors

//! Backend HTTP transport
//!
//! [`PublicClient`] issues requests anyone may make. [`AuthorizedClient`]
//! attaches the session credential and tears the session down when the
//! backend rejects it.

/// Credential-bearing client for protected endpoints
pub mod authorized;
/// Client for public endpoints
pub mod public;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;
use uuid::Uuid;

use crate::config::BackendConfig;
use crate::constants::defaults;
use crate::errors::{AppError, AppResult};

pub use authorized::AuthorizedClient;
pub use public::PublicClient;

const SERVICE: &str = "ContestHub API";

/// Shared connection pool and base URL
#[derive(Debug, Clone)]
pub struct Transport {
    http: Client,
    base_url: Url,
}

impl Transport {
    /// Transport for the configured backend
    ///
    /// # Errors
    ///
    /// `ConfigInvalid` if the HTTP client cannot be built
    pub fn new(config: &BackendConfig) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("contest-hub/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::config_invalid(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self::with_client(http, config.api_base_url.clone()))
    }

    /// Transport reusing an existing client
    #[must_use]
    pub const fn with_client(http: Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// Underlying HTTP client
    #[must_use]
    pub const fn client(&self) -> &Client {
        &self.http
    }

    /// Base URL, ending in `/`
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URL of a relative endpoint path
    ///
    /// # Errors
    ///
    /// `InvalidInput` if `path` does not form a valid URL
    pub fn url(&self, path: &str) -> AppResult<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| AppError::invalid_input(format!("Invalid endpoint path {path}: {e}")))
    }

    /// Request builder with a fresh request id
    ///
    /// # Errors
    ///
    /// `InvalidInput` if `path` does not form a valid URL
    pub fn request(&self, method: Method, path: &str) -> AppResult<RequestBuilder> {
        let url = self.url(path)?;
        Ok(self
            .http
            .request(method, url)
            .header(defaults::REQUEST_ID_HEADER, Uuid::new_v4().to_string()))
    }
}

/// Join path segments, percent-encoding each one
#[must_use]
pub fn endpoint(base: &str, segments: &[&str]) -> String {
    segments.iter().fold(base.trim_end_matches('/').to_owned(), |mut path, segment| {
        path.push('/');
        path.push_str(&urlencoding::encode(segment));
        path
    })
}

#[derive(Deserialize)]
struct ErrorPayload {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

impl ErrorPayload {
    fn into_message(self) -> Option<String> {
        self.message.or_else(|| match self.error? {
            serde_json::Value::String(message) => Some(message),
            serde_json::Value::Object(map) => map
                .get("message")
                .and_then(serde_json::Value::as_str)
                .map(str::to_owned),
            _ => None,
        })
    }
}

/// Decode a successful JSON response or map the failure
///
/// # Errors
///
/// See [`status_error`]; `SerializationError` when the body does not decode
pub async fn decode<T: DeserializeOwned>(response: Response) -> AppResult<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(status_error(status, &body));
    }
    Ok(response.json::<T>().await?)
}

/// Map a non-success status and body to an error
#[must_use]
pub fn status_error(status: StatusCode, body: &str) -> AppError {
    let detail = serde_json::from_str::<ErrorPayload>(body)
        .ok()
        .and_then(ErrorPayload::into_message)
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                status.canonical_reason().unwrap_or("no details").to_owned()
            } else {
                trimmed.chars().take(200).collect()
            }
        });

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AppError::authorization_expired(),
        StatusCode::NOT_FOUND => AppError::not_found(detail),
        StatusCode::CONFLICT => AppError::already_exists(detail),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            AppError::invalid_input(detail)
        }
        StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY | StatusCode::GATEWAY_TIMEOUT => {
            AppError::service_unavailable(SERVICE, detail)
        }
        _ => AppError::external_service(SERVICE, format!("status {}: {detail}", status.as_u16())),
    }
}
