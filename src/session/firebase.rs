// ABOUTME: Firebase Authentication REST client implementing the identity provider seam
// ABOUTME: Password and federated sign-in plus refresh-token based session restore
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ContestHub Contributors

//! Firebase Authentication over its REST API
//!
//! - `accounts:signInWithPassword` for email/password sign-in
//! - `accounts:signInWithIdp` for federated sign-in with an ID token
//!   obtained from a [`FederatedTokenSource`]
//! - `token` on the secure token service to mint a fresh ID token from a
//!   persisted refresh token
//!
//! The ID token returned by Firebase is the bearer credential the backend
//! validates on every authorized request.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::FirebaseConfig;
use crate::constants::firebase;
use crate::errors::{AppError, AppResult};
use crate::models::{Credential, Identity};
use crate::redaction::mask_email;

use super::persistence::PersistedSession;
use super::provider::{AuthProvider, FederatedTokenSource, ProviderSession};

const SERVICE: &str = "Firebase Auth";
const PASSWORD_PROVIDER: &str = "password";

/// Firebase error messages that mean the email/password pair was rejected
const CREDENTIAL_REJECTIONS: &[&str] = &[
    "INVALID_LOGIN_CREDENTIALS",
    "EMAIL_NOT_FOUND",
    "INVALID_PASSWORD",
    "USER_DISABLED",
    "INVALID_EMAIL",
    "MISSING_PASSWORD",
];

/// Secure token errors that mean the persisted session is no longer honored
const REFRESH_REJECTIONS: &[&str] = &[
    "TOKEN_EXPIRED",
    "INVALID_REFRESH_TOKEN",
    "USER_DISABLED",
    "USER_NOT_FOUND",
    "INVALID_GRANT_TYPE",
    "MISSING_REFRESH_TOKEN",
];

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordSignInRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IdpSignInRequest<'a> {
    post_body: String,
    request_uri: &'a str,
    return_secure_token: bool,
    return_idp_credential: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default, alias = "profilePicture")]
    photo_url: Option<String>,
    id_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    provider_id: Option<String>,
}

#[derive(Deserialize)]
struct RefreshResponse {
    id_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    user_id: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Identity provider backed by Firebase Authentication
pub struct FirebaseAuthProvider {
    config: FirebaseConfig,
    http: Client,
    federated: Option<Arc<dyn FederatedTokenSource>>,
}

impl fmt::Debug for FirebaseAuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FirebaseAuthProvider")
            .field("config", &self.config)
            .field("federated", &self.federated.is_some())
            .finish_non_exhaustive()
    }
}

impl FirebaseAuthProvider {
    /// Provider without a federated token source
    #[must_use]
    pub const fn new(config: FirebaseConfig, http: Client) -> Self {
        Self {
            config,
            http,
            federated: None,
        }
    }

    /// Attach the source consulted by federated sign-in
    #[must_use]
    pub fn with_federated_source(mut self, source: Arc<dyn FederatedTokenSource>) -> Self {
        self.federated = Some(source);
        self
    }

    fn accounts_url(&self, method: &str) -> String {
        // The colon in `accounts:method` rules out `Url::join`
        format!("{}accounts:{method}", self.config.identity_toolkit_url)
    }

    fn token_url(&self) -> String {
        format!("{}token", self.config.secure_token_url)
    }

    async fn post_accounts<B, T>(&self, method: &str, body: &B) -> Result<T, ProviderFailure>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .http
            .post(self.accounts_url(method))
            .query(&[("key", self.config.api_key.as_str())])
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderFailure::Transport(e.into()))?;
        read_response(response).await
    }
}

/// Failure talking to Firebase, before it is mapped to a caller-facing error
enum ProviderFailure {
    /// Firebase answered with an error message such as `INVALID_PASSWORD`
    Rejected { status: u16, message: String },
    /// Network or decoding failure
    Transport(AppError),
}

impl ProviderFailure {
    fn into_app_error(self) -> AppError {
        match self {
            Self::Rejected { status, message } => AppError::external_service(
                SERVICE,
                format!("request rejected with status {status}: {message}"),
            ),
            Self::Transport(error) => error,
        }
    }
}

async fn read_response<T: DeserializeOwned>(response: Response) -> Result<T, ProviderFailure> {
    let status = response.status();
    if status.is_success() {
        return response
            .json::<T>()
            .await
            .map_err(|e| ProviderFailure::Transport(e.into()));
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|envelope| envelope.error.message)
        .unwrap_or(body);
    Err(ProviderFailure::Rejected {
        status: status.as_u16(),
        message,
    })
}

/// `INVALID_PASSWORD : extra detail` -> `INVALID_PASSWORD`
fn error_code(message: &str) -> &str {
    message.split([' ', ':']).next().unwrap_or(message)
}

impl SignInResponse {
    fn into_session(self, fallback_email: Option<&str>, provider: &str) -> ProviderSession {
        let email = self
            .email
            .or_else(|| fallback_email.map(str::to_owned))
            .unwrap_or_default();
        ProviderSession {
            identity: Identity {
                id: self.local_id,
                email,
                display_name: self.display_name,
                photo_url: self.photo_url,
                credential: Credential::new(self.id_token),
            },
            refresh_token: self.refresh_token,
            sign_in_provider: self.provider_id.unwrap_or_else(|| provider.to_owned()),
        }
    }
}

#[async_trait]
impl AuthProvider for FirebaseAuthProvider {
    fn name(&self) -> &str {
        "firebase"
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> AppResult<ProviderSession> {
        let request = PasswordSignInRequest {
            email,
            password,
            return_secure_token: true,
        };

        match self
            .post_accounts::<_, SignInResponse>("signInWithPassword", &request)
            .await
        {
            Ok(response) => {
                info!(email = %mask_email(email), "Password sign-in accepted");
                Ok(response.into_session(Some(email), PASSWORD_PROVIDER))
            }
            Err(ProviderFailure::Rejected { message, .. })
                if CREDENTIAL_REJECTIONS.contains(&error_code(&message)) =>
            {
                debug!(email = %mask_email(email), reason = %error_code(&message), "Password sign-in rejected");
                Err(AppError::invalid_credentials("Email or password is incorrect"))
            }
            Err(failure) => Err(failure.into_app_error()),
        }
    }

    async fn sign_in_federated(&self) -> AppResult<ProviderSession> {
        let source = self
            .federated
            .as_ref()
            .ok_or_else(|| AppError::provider("No federated sign-in source is configured"))?;
        let assertion = source.assertion().await?;

        let post_body = format!(
            "id_token={}&providerId={}",
            urlencoding::encode(&assertion.id_token),
            urlencoding::encode(&assertion.provider_id)
        );
        let request = IdpSignInRequest {
            post_body,
            request_uri: firebase::IDP_REQUEST_URI,
            return_secure_token: true,
            return_idp_credential: true,
        };

        let response = self
            .post_accounts::<_, SignInResponse>("signInWithIdp", &request)
            .await
            .map_err(|failure| match failure {
                ProviderFailure::Rejected { message, .. } => {
                    AppError::provider(format!("Federated sign-in failed: {message}"))
                }
                ProviderFailure::Transport(error) => {
                    AppError::provider(format!("Federated sign-in failed: {error}"))
                }
            })?;

        let session = response.into_session(None, &assertion.provider_id);
        info!(
            email = %mask_email(&session.identity.email),
            provider = %session.sign_in_provider,
            "Federated sign-in accepted"
        );
        Ok(session)
    }

    async fn restore(&self, persisted: &PersistedSession) -> AppResult<Option<ProviderSession>> {
        let Some(refresh_token) = persisted.refresh_token.as_deref() else {
            debug!("Persisted session has no refresh token, reusing stored credential");
            return Ok(Some(ProviderSession {
                identity: persisted.identity(),
                refresh_token: None,
                sign_in_provider: persisted.sign_in_provider.clone(),
            }));
        };

        let response = self
            .http
            .post(self.token_url())
            .query(&[("key", self.config.api_key.as_str())])
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await?;

        match read_response::<RefreshResponse>(response).await {
            Ok(refreshed) => {
                if refreshed
                    .user_id
                    .as_deref()
                    .is_some_and(|user_id| user_id != persisted.user_id)
                {
                    warn!("Refreshed token belongs to a different user, discarding session");
                    return Ok(None);
                }
                Ok(Some(ProviderSession {
                    identity: persisted.identity_with(Credential::new(refreshed.id_token)),
                    refresh_token: refreshed
                        .refresh_token
                        .or_else(|| Some(refresh_token.to_owned())),
                    sign_in_provider: persisted.sign_in_provider.clone(),
                }))
            }
            Err(ProviderFailure::Rejected { status, message })
                if status == 400 || REFRESH_REJECTIONS.contains(&error_code(&message)) =>
            {
                info!(reason = %error_code(&message), "Persisted session no longer valid");
                Ok(None)
            }
            Err(failure) => Err(failure.into_app_error()),
        }
    }

    async fn sign_out(&self, identity: &Identity) -> AppResult<()> {
        // Firebase ID tokens cannot be revoked from the client; dropping them is the sign-out
        debug!(email = %mask_email(&identity.email), "Provider sign-out is local only");
        Ok(())
    }
}
