// ABOUTME: Environment configuration management for deployment-specific client settings
// ABOUTME: Parses backend URL, payment key, identity provider settings and session file location
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Environment-based configuration

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;
use url::Url;

use crate::constants::{defaults, env_vars, firebase};
use crate::errors::{AppError, AppResult};
use crate::redaction::mask_token;

/// Environment type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Backend REST API settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// Base URL, always ending in `/` so relative endpoint paths join under it
    pub api_base_url: Url,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl BackendConfig {
    /// Build from a base URL string
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` if the URL does not parse or is not http(s)
    pub fn new(api_base_url: &str, request_timeout: Duration) -> AppResult<Self> {
        Ok(Self {
            api_base_url: parse_base_url(env_vars::API_URL, api_base_url)?,
            request_timeout,
        })
    }
}

/// Payment gateway settings; only the publishable key lives on the client
#[derive(Clone, PartialEq, Eq)]
pub struct PaymentConfig {
    /// Publishable key handed to the payment gateway SDK
    pub public_key: String,
}

impl fmt::Debug for PaymentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentConfig")
            .field("public_key", &mask_token(&self.public_key))
            .finish()
    }
}

/// Identity provider (Firebase Auth REST) settings
#[derive(Clone, PartialEq, Eq)]
pub struct FirebaseConfig {
    /// Web API key
    pub api_key: String,
    /// Project id, informational on the client
    pub project_id: Option<String>,
    /// Identity toolkit base URL
    pub identity_toolkit_url: Url,
    /// Secure token base URL
    pub secure_token_url: Url,
}

impl FirebaseConfig {
    /// Configuration pointing at Google's production endpoints
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` if the built-in endpoint URLs fail to parse
    pub fn new(api_key: impl Into<String>) -> AppResult<Self> {
        Ok(Self {
            api_key: api_key.into(),
            project_id: None,
            identity_toolkit_url: parse_base_url(
                env_vars::FIREBASE_IDENTITY_TOOLKIT_URL,
                firebase::IDENTITY_TOOLKIT_URL,
            )?,
            secure_token_url: parse_base_url(
                env_vars::FIREBASE_SECURE_TOKEN_URL,
                firebase::SECURE_TOKEN_URL,
            )?,
        })
    }
}

impl fmt::Debug for FirebaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FirebaseConfig")
            .field("api_key", &mask_token(&self.api_key))
            .field("project_id", &self.project_id)
            .field("identity_toolkit_url", &self.identity_toolkit_url.as_str())
            .field("secure_token_url", &self.secure_token_url.as_str())
            .finish()
    }
}

/// Complete client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Deployment environment
    pub environment: Environment,
    /// Backend REST API
    pub backend: BackendConfig,
    /// Payment gateway
    pub payment: PaymentConfig,
    /// Identity provider
    pub firebase: FirebaseConfig,
    /// Where the persisted session lives
    pub session_file: PathBuf,
}

impl ClientConfig {
    /// Load configuration from process environment variables
    ///
    /// # Errors
    ///
    /// Returns `ConfigMissing` when `CONTEST_HUB_API_URL`,
    /// `CONTEST_HUB_PAYMENT_PUBLIC_KEY` or `FIREBASE_API_KEY` is unset or
    /// blank, and `ConfigInvalid` when a value cannot be parsed
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// # Errors
    ///
    /// Same as [`ClientConfig::from_env`]
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };
        let required = |name: &str| optional(name).ok_or_else(|| AppError::config_missing(name));

        let environment = optional(env_vars::ENVIRONMENT)
            .map(|value| Environment::from_str_or_default(&value))
            .unwrap_or_default();

        let timeout_secs = match optional(env_vars::REQUEST_TIMEOUT_SECS) {
            Some(value) => parse_timeout_secs(&value)?,
            None => defaults::REQUEST_TIMEOUT_SECS,
        };

        let backend = BackendConfig::new(
            &required(env_vars::API_URL)?,
            Duration::from_secs(timeout_secs),
        )?;

        let payment = PaymentConfig {
            public_key: required(env_vars::PAYMENT_PUBLIC_KEY)?,
        };

        let firebase = FirebaseConfig {
            api_key: required(env_vars::FIREBASE_API_KEY)?,
            project_id: optional(env_vars::FIREBASE_PROJECT_ID),
            identity_toolkit_url: parse_base_url(
                env_vars::FIREBASE_IDENTITY_TOOLKIT_URL,
                &optional(env_vars::FIREBASE_IDENTITY_TOOLKIT_URL)
                    .unwrap_or_else(|| firebase::IDENTITY_TOOLKIT_URL.to_owned()),
            )?,
            secure_token_url: parse_base_url(
                env_vars::FIREBASE_SECURE_TOKEN_URL,
                &optional(env_vars::FIREBASE_SECURE_TOKEN_URL)
                    .unwrap_or_else(|| firebase::SECURE_TOKEN_URL.to_owned()),
            )?,
        };

        let session_file = match optional(env_vars::SESSION_FILE) {
            Some(path) => PathBuf::from(path),
            None => default_session_file()?,
        };

        let config = Self {
            environment,
            backend,
            payment,
            firebase,
            session_file,
        };

        info!(
            environment = %config.environment,
            api_base_url = %config.backend.api_base_url,
            session_file = %config.session_file.display(),
            "Client configuration loaded"
        );
        Ok(config)
    }
}

/// Default session file under the user's config directory
fn default_session_file() -> AppResult<PathBuf> {
    dirs::config_dir()
        .map(|dir| {
            dir.join(defaults::CONFIG_DIR_NAME)
                .join(defaults::SESSION_FILE_NAME)
        })
        .ok_or_else(|| {
            AppError::config_missing(format!(
                "{} (no user config directory available)",
                env_vars::SESSION_FILE
            ))
        })
}

/// Parse an http(s) base URL and make sure it ends with `/`
fn parse_base_url(variable: &str, raw: &str) -> AppResult<Url> {
    let mut url = Url::parse(raw)
        .map_err(|e| AppError::config_invalid(format!("{variable} is not a valid URL: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(AppError::config_invalid(format!(
            "{variable} must use http or https, got {}",
            url.scheme()
        )));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn parse_timeout_secs(raw: &str) -> AppResult<u64> {
    let variable = env_vars::REQUEST_TIMEOUT_SECS;
    let secs = raw.parse::<u64>().map_err(|e| {
        AppError::config_invalid(format!("{variable} must be a whole number of seconds: {e}"))
    })?;
    if secs == 0 {
        return Err(AppError::config_invalid(format!(
            "{variable} must be at least 1 second"
        )));
    }
    Ok(secs)
}
