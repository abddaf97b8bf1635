// ABOUTME: Session store, the single writer of the signed-in identity and its credential
// ABOUTME: Publishes every identity transition on a watch channel and persists the credential
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ContestHub Contributors

//! Session store
//!
//! Owns "who is logged in". Every transition replaces the published
//! [`SessionSnapshot`] and bumps its revision; subscribers observe the new
//! value as soon as the sending call returns, so dependents never keep
//! rendering an identity the store has already dropped.
//!
//! [`SessionStore::restore_session`] runs at most once. It captures the
//! revision when it starts and only commits if nothing else (a sign-in or a
//! sign-out) has happened in the meantime.
//!
//! Writes to the credential store and the publication they belong to happen
//! under one lock, so the persisted record always matches the last published
//! transition. A sign-out still clearing the record cannot delete the record
//! of a sign-in that lands during the clear.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use crate::errors::{AppError, AppResult, ErrorCode};
use crate::models::{Credential, Identity, IdentityKey};
use crate::redaction::mask_email;
use crate::task::{Generation, Stamped};

use super::persistence::{CredentialStore, PersistedSession};
use super::provider::{AuthProvider, DirectoryRegistrar, ProviderSession, Registration};

/// Where the session lifecycle currently stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    /// Startup restore has not finished yet
    Restoring,
    /// Nobody is signed in
    SignedOut,
    /// An identity is signed in
    SignedIn(Arc<Identity>),
}

/// Published session state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Bumped on every transition
    pub revision: Generation,
    /// Current phase
    pub phase: SessionPhase,
}

impl SessionSnapshot {
    const fn initial() -> Self {
        Self {
            revision: Generation::INITIAL,
            phase: SessionPhase::Restoring,
        }
    }

    /// Signed-in identity, if any
    #[must_use]
    pub fn identity(&self) -> Option<&Arc<Identity>> {
        match &self.phase {
            SessionPhase::SignedIn(identity) => Some(identity),
            SessionPhase::Restoring | SessionPhase::SignedOut => None,
        }
    }

    /// Identifying key of the signed-in identity
    #[must_use]
    pub fn identity_key(&self) -> Option<IdentityKey> {
        self.identity().map(|identity| identity.key())
    }

    /// Whether the startup restore is still pending
    #[must_use]
    pub const fn is_restoring(&self) -> bool {
        matches!(self.phase, SessionPhase::Restoring)
    }

    /// Whether nobody is signed in and nothing is pending
    #[must_use]
    pub const fn is_signed_out(&self) -> bool {
        matches!(self.phase, SessionPhase::SignedOut)
    }
}

/// What a restore found in persistence
enum Restored {
    /// The provider honored the persisted session
    Session(ProviderSession),
    /// The persisted record is unreadable or no longer honored
    Forget,
    /// Nothing persisted, or the provider could not be asked
    Nothing,
}

/// Single source of truth for the signed-in identity
pub struct SessionStore {
    provider: Arc<dyn AuthProvider>,
    credentials: Arc<dyn CredentialStore>,
    registrar: Option<Arc<dyn DirectoryRegistrar>>,
    state: watch::Sender<SessionSnapshot>,
    restore_started: AtomicBool,
    persistence: Mutex<()>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("provider", &self.provider.name())
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Store in the `Restoring` phase
    pub fn new(provider: Arc<dyn AuthProvider>, credentials: Arc<dyn CredentialStore>) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::initial());
        Self {
            provider,
            credentials,
            registrar: None,
            state,
            restore_started: AtomicBool::new(false),
            persistence: Mutex::new(()),
        }
    }

    /// Register federated identities in the backend user directory
    #[must_use]
    pub fn with_registrar(mut self, registrar: Arc<dyn DirectoryRegistrar>) -> Self {
        self.registrar = Some(registrar);
        self
    }

    /// Receiver notified on every session transition
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    /// Current published state
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    /// Signed-in identity, if any
    #[must_use]
    pub fn current_identity(&self) -> Option<Arc<Identity>> {
        self.state.borrow().identity().cloned()
    }

    /// Credential of the signed-in identity
    #[must_use]
    pub fn credential(&self) -> Option<Credential> {
        self.state
            .borrow()
            .identity()
            .map(|identity| identity.credential.clone())
    }

    /// Whether an identity is signed in
    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.state.borrow().identity().is_some()
    }

    /// Email/password sign-in
    ///
    /// # Errors
    ///
    /// `InvalidInput` for a blank email or password, `InvalidCredentials`
    /// when the provider rejects the pair, transport errors otherwise.
    /// The published state is unchanged on error.
    pub async fn sign_in(&self, email: &str, password: &str) -> AppResult<Arc<Identity>> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AppError::invalid_input("Email and password are required"));
        }

        let session = self.provider.sign_in_with_password(email, password).await?;
        Ok(self.establish(session).await)
    }

    /// Federated sign-in; a newly seen identity is registered in the user
    /// directory before it is published
    ///
    /// # Errors
    ///
    /// `ProviderError` for any failure of the federated flow
    pub async fn sign_in_with_federated_provider(&self) -> AppResult<Arc<Identity>> {
        let session = self
            .provider
            .sign_in_federated()
            .await
            .map_err(|error| match error.code {
                ErrorCode::ProviderError => error,
                _ => AppError::provider(format!("Federated sign-in failed: {}", error.message))
                    .with_source(error),
            })?;

        if let Some(registrar) = &self.registrar {
            match registrar.register(&session.directory_entry()).await {
                Ok(Registration::Created) => {
                    info!(email = %mask_email(&session.identity.email), "Registered new user in directory");
                }
                Ok(Registration::AlreadyExists) => {
                    debug!(email = %mask_email(&session.identity.email), "User already in directory");
                }
                Err(e) => {
                    warn!(
                        email = %mask_email(&session.identity.email),
                        error = %e,
                        "Directory registration failed, continuing with sign-in"
                    );
                }
            }
        }

        Ok(self.establish(session).await)
    }

    /// Persist and publish a fresh provider session
    async fn establish(&self, session: ProviderSession) -> Arc<Identity> {
        let persisted = PersistedSession::from_provider(&session);
        let _persistence = self.persistence.lock().await;
        if let Err(e) = self.credentials.save(&persisted).await {
            warn!(error = %e, "Failed to persist session; it will not survive a restart");
        }

        let identity = Arc::new(session.identity);
        self.restore_started.store(true, Ordering::SeqCst);
        self.publish(SessionPhase::SignedIn(Arc::clone(&identity)));
        info!(
            email = %mask_email(&identity.email),
            provider = %session.sign_in_provider,
            "Signed in"
        );
        identity
    }

    /// Clear identity and credential; always succeeds locally
    ///
    /// Signing out while already signed out changes nothing.
    pub async fn sign_out(&self) {
        self.end_session(None).await;
    }

    /// Sign out if `credential` is still the current one
    ///
    /// Used when the backend rejects a credential. Returns whether a sign-out
    /// happened; a rejection of an already replaced credential is ignored.
    pub async fn expire(&self, credential: &Credential) -> bool {
        self.end_session(Some(credential)).await
    }

    async fn end_session(&self, rejected: Option<&Credential>) -> bool {
        let previous = {
            let _persistence = self.persistence.lock().await;
            let previous = {
                let snapshot = self.state.borrow();
                match (&snapshot.phase, rejected) {
                    (SessionPhase::SignedIn(identity), Some(credential))
                        if identity.credential != *credential =>
                    {
                        debug!("Ignoring rejection of a credential that is no longer current");
                        return false;
                    }
                    (SessionPhase::SignedIn(identity), _) => Some(Arc::clone(identity)),
                    (SessionPhase::Restoring, None) => None,
                    (SessionPhase::Restoring, Some(_)) | (SessionPhase::SignedOut, _) => {
                        debug!("Sign-out requested while already signed out");
                        return false;
                    }
                }
            };

            if rejected.is_some() {
                warn!("Backend rejected the session credential, signing out");
            }
            self.restore_started.store(true, Ordering::SeqCst);
            self.publish(SessionPhase::SignedOut);

            if let Err(e) = self.credentials.clear().await {
                warn!(error = %e, "Failed to clear persisted session");
            }
            previous
        };

        if let Some(identity) = previous {
            if let Err(e) = self.provider.sign_out(&identity).await {
                warn!(error = %e, "Remote sign-out failed; local session already cleared");
            }
            info!(email = %mask_email(&identity.email), "Signed out");
        }
        true
    }

    /// Rebuild the session from persistence; runs at most once
    ///
    /// Leaves the store signed out when nothing usable was persisted. A
    /// sign-in or sign-out that lands while the restore is in flight wins,
    /// and the stale result neither publishes nor touches persistence.
    pub async fn restore_session(&self) -> SessionSnapshot {
        if self.restore_started.swap(true, Ordering::SeqCst) {
            debug!("Session restore already ran");
            return self.snapshot();
        }

        let started_at = self.state.borrow().revision;
        let restored = Stamped::new(started_at, self.load_persisted().await);
        let _persistence = self.persistence.lock().await;

        let mut outcome = None;
        self.state.send_if_modified(|snapshot| {
            restored.commit_if_current(snapshot.revision, |found| {
                snapshot.revision = snapshot.revision.next();
                snapshot.phase = match &found {
                    Restored::Session(session) => {
                        SessionPhase::SignedIn(Arc::new(session.identity.clone()))
                    }
                    Restored::Forget | Restored::Nothing => SessionPhase::SignedOut,
                };
                outcome = Some(found);
            })
        });

        let snapshot = self.snapshot();
        match outcome {
            Some(restored) => {
                self.settle_persistence(restored).await;
                match snapshot.identity() {
                    Some(identity) => {
                        info!(email = %mask_email(&identity.email), "Session restored");
                    }
                    None => debug!("No session to restore"),
                }
            }
            None => debug!(
                started_at = %started_at,
                current = %snapshot.revision,
                "Session changed during restore, discarding restored state"
            ),
        }
        snapshot
    }

    async fn load_persisted(&self) -> Restored {
        let persisted = match self.credentials.load().await {
            Ok(Some(persisted)) => persisted,
            Ok(None) => return Restored::Nothing,
            Err(e) => {
                warn!(error = %e, "Persisted session unreadable, starting signed out");
                return Restored::Forget;
            }
        };

        match self.provider.restore(&persisted).await {
            Ok(Some(session)) => Restored::Session(session),
            Ok(None) => Restored::Forget,
            Err(e) => {
                warn!(error = %e, "Identity provider unreachable during restore, starting signed out");
                Restored::Nothing
            }
        }
    }

    /// Bring the persisted record in line with a committed restore
    async fn settle_persistence(&self, restored: Restored) {
        match restored {
            Restored::Session(session) => {
                if let Err(e) = self
                    .credentials
                    .save(&PersistedSession::from_provider(&session))
                    .await
                {
                    warn!(error = %e, "Failed to persist refreshed session");
                }
            }
            Restored::Forget => {
                if let Err(e) = self.credentials.clear().await {
                    warn!(error = %e, "Failed to remove unusable session");
                }
            }
            Restored::Nothing => {}
        }
    }

    fn publish(&self, phase: SessionPhase) {
        self.state.send_modify(|snapshot| {
            snapshot.revision = snapshot.revision.next();
            snapshot.phase = phase;
        });
    }
}
