// ABOUTME: Identity provider and user directory seams used by the session store
// ABOUTME: Password, federated and restore flows plus idempotent directory registration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ContestHub Contributors

use async_trait::async_trait;

use crate::errors::AppResult;
use crate::models::{Identity, NewUser, Role};

use super::persistence::PersistedSession;

/// Result of a successful provider sign-in or restore
#[derive(Debug, Clone)]
pub struct ProviderSession {
    /// Identity with a fresh credential
    pub identity: Identity,
    /// Long-lived token used to mint new credentials on restore
    pub refresh_token: Option<String>,
    /// Provider id that authenticated the user (`password`, `google.com`, ...)
    pub sign_in_provider: String,
}

impl ProviderSession {
    /// Directory entry describing this identity
    #[must_use]
    pub fn directory_entry(&self) -> NewUser {
        NewUser {
            name: self.identity.display_name.clone(),
            email: self.identity.email.clone(),
            photo: self.identity.photo_url.clone(),
            role: Role::User,
        }
    }
}

/// Identity provider operations the session store relies on
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Short provider name for logs and persisted sessions
    fn name(&self) -> &str;

    /// Email/password sign-in
    ///
    /// # Errors
    ///
    /// `InvalidCredentials` when the provider rejects the pair
    async fn sign_in_with_password(&self, email: &str, password: &str)
        -> AppResult<ProviderSession>;

    /// Federated (e.g. Google) sign-in
    ///
    /// # Errors
    ///
    /// `ProviderError` when the federated flow fails
    async fn sign_in_federated(&self) -> AppResult<ProviderSession>;

    /// Rebuild a session from what was persisted; `Ok(None)` when the
    /// provider no longer honors it
    ///
    /// # Errors
    ///
    /// Transport failures while contacting the provider
    async fn restore(&self, persisted: &PersistedSession) -> AppResult<Option<ProviderSession>>;

    /// Remote sign-out
    ///
    /// # Errors
    ///
    /// Transport failures; the session store treats them as non-fatal
    async fn sign_out(&self, identity: &Identity) -> AppResult<()>;
}

/// Assertion obtained from a federated identity provider
#[derive(Clone, PartialEq, Eq)]
pub struct FederatedAssertion {
    /// Provider id, e.g. `google.com`
    pub provider_id: String,
    /// OpenID Connect ID token issued by that provider
    pub id_token: String,
}

impl std::fmt::Debug for FederatedAssertion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FederatedAssertion")
            .field("provider_id", &self.provider_id)
            .field("id_token", &"***")
            .finish()
    }
}

/// Host-specific source of federated assertions (browser popup, device flow, flag)
#[async_trait]
pub trait FederatedTokenSource: Send + Sync {
    /// Obtain an assertion for the next federated sign-in
    ///
    /// # Errors
    ///
    /// `ProviderError` if the user cancels or the provider fails
    async fn assertion(&self) -> AppResult<FederatedAssertion>;
}

/// Assertion supplied up front, e.g. from a command-line flag
#[derive(Debug, Clone)]
pub struct StaticAssertion(FederatedAssertion);

impl StaticAssertion {
    /// Wrap an already-issued assertion
    #[must_use]
    pub const fn new(assertion: FederatedAssertion) -> Self {
        Self(assertion)
    }
}

#[async_trait]
impl FederatedTokenSource for StaticAssertion {
    async fn assertion(&self) -> AppResult<FederatedAssertion> {
        Ok(self.0.clone())
    }
}

/// Outcome of registering an identity in the backend user directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// A new directory entry was created
    Created,
    /// The identity was already registered
    AlreadyExists,
}

/// Backend user directory registration
#[async_trait]
pub trait DirectoryRegistrar: Send + Sync {
    /// Register `user`; registering an existing user is not an error
    ///
    /// # Errors
    ///
    /// Transport or backend failures other than "already exists"
    async fn register(&self, user: &NewUser) -> AppResult<Registration>;
}
