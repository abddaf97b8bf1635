// ABOUTME: Authorized request wrapper attaching the session credential as a bearer header
// ABOUTME: A 401/403 signs the session out, redirects to sign-in and rejects the call
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ContestHub Contributors

//! Authorized request wrapper
//!
//! Every protected backend call goes through [`AuthorizedClient`]. The
//! contract for callers:
//!
//! - no signed-in identity: the call fails with `AuthRequired` and the
//!   navigator is sent to sign-in
//! - 401 or 403: the session is signed out (if the rejected credential is
//!   still current), the navigator is sent to sign-in with the current path
//!   as return target, a warning notice is published and the call fails with
//!   `AuthorizationExpired`
//!
//! Callers must not retry on `AuthorizationExpired`.

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::errors::{AppError, AppResult};
use crate::navigator::Navigator;
use crate::notices::{Notice, NoticeBoard};
use crate::session::SessionStore;

use super::{decode, Transport};

/// Credential-bearing backend client
#[derive(Clone)]
pub struct AuthorizedClient {
    transport: Transport,
    session: Arc<SessionStore>,
    navigator: Arc<Navigator>,
    notices: NoticeBoard,
}

impl std::fmt::Debug for AuthorizedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizedClient")
            .field("base_url", &self.transport.base_url().as_str())
            .finish_non_exhaustive()
    }
}

impl AuthorizedClient {
    /// Wrapper reading credentials from `session`
    #[must_use]
    pub const fn new(
        transport: Transport,
        session: Arc<SessionStore>,
        navigator: Arc<Navigator>,
        notices: NoticeBoard,
    ) -> Self {
        Self {
            transport,
            session,
            navigator,
            notices,
        }
    }

    /// `GET path`
    ///
    /// # Errors
    ///
    /// `AuthRequired`, `AuthorizationExpired`, or transport/status failures
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        self.execute(Method::GET, path, None::<&()>, None::<&()>)
            .await
    }

    /// `GET path?query`
    ///
    /// # Errors
    ///
    /// Same as [`AuthorizedClient::get`]
    pub async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> AppResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized + Sync,
    {
        self.execute(Method::GET, path, Some(query), None::<&()>)
            .await
    }

    /// `POST path` with a JSON body
    ///
    /// # Errors
    ///
    /// Same as [`AuthorizedClient::get`]
    pub async fn post<B, T>(&self, path: &str, body: &B) -> AppResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        self.execute(Method::POST, path, None::<&()>, Some(body))
            .await
    }

    /// `PUT path` with a JSON body
    ///
    /// # Errors
    ///
    /// Same as [`AuthorizedClient::get`]
    pub async fn put<B, T>(&self, path: &str, body: &B) -> AppResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        self.execute(Method::PUT, path, None::<&()>, Some(body))
            .await
    }

    /// `PATCH path` with a JSON body
    ///
    /// # Errors
    ///
    /// Same as [`AuthorizedClient::get`]
    pub async fn patch<B, T>(&self, path: &str, body: &B) -> AppResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        self.execute(Method::PATCH, path, None::<&()>, Some(body))
            .await
    }

    /// `DELETE path`
    ///
    /// # Errors
    ///
    /// Same as [`AuthorizedClient::get`]
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        self.execute(Method::DELETE, path, None::<&()>, None::<&()>)
            .await
    }

    async fn execute<T, Q, B>(
        &self,
        method: Method,
        path: &str,
        query: Option<&Q>,
        body: Option<&B>,
    ) -> AppResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized + Sync,
        B: Serialize + ?Sized + Sync,
    {
        let Some(credential) = self.session.credential() else {
            debug!(%method, path, "Protected request without a signed-in identity");
            self.navigator
                .redirect_to_sign_in(&self.navigator.current_path());
            return Err(AppError::auth_required());
        };

        let mut request = self
            .transport
            .request(method.clone(), path)?
            .bearer_auth(credential.expose());
        if let Some(query) = query {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        debug!(%method, path, status = status.as_u16(), "Authorized request completed");

        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            let error = AppError::authorization_expired();
            if self.session.expire(&credential).await {
                warn!(%method, path, status = status.as_u16(), "Session credential rejected");
                self.navigator
                    .redirect_to_sign_in(&self.navigator.current_path());
                self.notices.publish(Notice::warning_from(&AppError::new(
                    error.code,
                    "Your session has expired. Please sign in again.",
                )));
            }
            return Err(error);
        }

        decode(response).await
    }
}
