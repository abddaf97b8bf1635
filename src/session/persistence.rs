// ABOUTME: Persisted session storage so a signed-in identity survives restarts
// ABOUTME: JSON file store with owner-only permissions plus an in-memory store for tests and embedding
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ContestHub Contributors

use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use crate::errors::{AppError, AppResult};
use crate::models::{Credential, Identity};
use crate::redaction::mask_email;

use super::provider::ProviderSession;

/// Everything needed to restore a session after a restart
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSession {
    /// Provider user id
    pub user_id: String,
    /// Account email
    pub email: String,
    /// Display name
    #[serde(default)]
    pub display_name: Option<String>,
    /// Profile photo URL
    #[serde(default)]
    pub photo_url: Option<String>,
    /// Last issued bearer credential
    pub id_token: String,
    /// Refresh token for minting a new credential
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Provider id that authenticated the user
    pub sign_in_provider: String,
    /// When this record was written
    pub saved_at: DateTime<Utc>,
}

impl PersistedSession {
    /// Capture a provider session for persistence
    #[must_use]
    pub fn from_provider(session: &ProviderSession) -> Self {
        let identity = &session.identity;
        Self {
            user_id: identity.id.clone(),
            email: identity.email.clone(),
            display_name: identity.display_name.clone(),
            photo_url: identity.photo_url.clone(),
            id_token: identity.credential.expose().to_owned(),
            refresh_token: session.refresh_token.clone(),
            sign_in_provider: session.sign_in_provider.clone(),
            saved_at: Utc::now(),
        }
    }

    /// Identity as it was when persisted, carrying the stored credential
    #[must_use]
    pub fn identity(&self) -> Identity {
        self.identity_with(Credential::new(self.id_token.clone()))
    }

    /// Identity as it was when persisted, carrying `credential`
    #[must_use]
    pub fn identity_with(&self, credential: Credential) -> Identity {
        Identity {
            id: self.user_id.clone(),
            email: self.email.clone(),
            display_name: self.display_name.clone(),
            photo_url: self.photo_url.clone(),
            credential,
        }
    }
}

impl fmt::Debug for PersistedSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistedSession")
            .field("user_id", &self.user_id)
            .field("email", &mask_email(&self.email))
            .field("sign_in_provider", &self.sign_in_provider)
            .field("saved_at", &self.saved_at)
            .finish_non_exhaustive()
    }
}

/// Storage for the persisted session
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Load the persisted session, if any
    ///
    /// # Errors
    ///
    /// `StorageError` on I/O failure, `SerializationError` on a corrupt record
    async fn load(&self) -> AppResult<Option<PersistedSession>>;

    /// Replace the persisted session
    ///
    /// # Errors
    ///
    /// `StorageError` on I/O failure
    async fn save(&self, session: &PersistedSession) -> AppResult<()>;

    /// Remove the persisted session; removing nothing succeeds
    ///
    /// # Errors
    ///
    /// `StorageError` on I/O failure
    async fn clear(&self) -> AppResult<()>;
}

/// JSON file next to the user's other configuration
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Store backed by `path`; parent directories are created on first save
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File location
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn load(&self) -> AppResult<Option<PersistedSession>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(AppError::storage(format!(
                    "Failed to read {}: {e}",
                    self.path.display()
                )))
            }
        };
        let session = serde_json::from_slice(&bytes).map_err(|e| {
            AppError::serialization(format!("Corrupt session file {}: {e}", self.path.display()))
        })?;
        Ok(Some(session))
    }

    async fn save(&self, session: &PersistedSession) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(session)?;
        let temp = self.temp_path();
        tokio::fs::write(&temp, bytes).await?;
        restrict_permissions(&temp).await?;
        tokio::fs::rename(&temp, &self.path).await?;
        debug!(path = %self.path.display(), "Session persisted");
        Ok(())
    }

    async fn clear(&self) -> AppResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                debug!(path = %self.path.display(), "Persisted session removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(unix)]
async fn restrict_permissions(path: &Path) -> AppResult<()> {
    use std::os::unix::fs::PermissionsExt;
    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).await?;
    Ok(())
}

#[cfg(not(unix))]
async fn restrict_permissions(_path: &Path) -> AppResult<()> {
    Ok(())
}

/// Process-local store; nothing survives a restart
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    session: RwLock<Option<PersistedSession>>,
}

impl MemoryCredentialStore {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `session`
    #[must_use]
    pub fn with_session(session: PersistedSession) -> Self {
        Self {
            session: RwLock::new(Some(session)),
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn load(&self) -> AppResult<Option<PersistedSession>> {
        Ok(self.session.read().await.clone())
    }

    async fn save(&self, session: &PersistedSession) -> AppResult<()> {
        *self.session.write().await = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> AppResult<()> {
        *self.session.write().await = None;
        Ok(())
    }
}
