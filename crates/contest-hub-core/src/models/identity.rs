// ABOUTME: Authenticated identity and opaque bearer credential types
// ABOUTME: Credential is redacted from Debug output and zeroized when dropped
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ContestHub Contributors

use std::fmt;

use zeroize::Zeroizing;

/// Opaque bearer token proving an identity to the backend
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(Zeroizing<String>);

impl Credential {
    /// Wrap a raw token
    pub fn new(token: impl Into<String>) -> Self {
        Self(Zeroizing::new(token.into()))
    }

    /// Raw token value, for the `Authorization` header and persistence only
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    /// `Authorization` header value
    #[must_use]
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.expose())
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Stable identifying key of an identity (the provider user id)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentityKey(String);

impl IdentityKey {
    /// Create a key from a provider user id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Key as string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The authenticated user's session-scoped identifying data
///
/// Owned by the session store; everything else reads it through an
/// `Arc<Identity>` handed out by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Provider user id
    pub id: String,
    /// Account email
    pub email: String,
    /// Display name, if the provider knows one
    pub display_name: Option<String>,
    /// Profile photo URL, if the provider knows one
    pub photo_url: Option<String>,
    /// Bearer credential for authorized requests
    pub credential: Credential,
}

impl Identity {
    /// Identifying key used to detect identity changes
    #[must_use]
    pub fn key(&self) -> IdentityKey {
        IdentityKey::new(self.id.clone())
    }

    /// Whether `other` is the same account (credential may differ)
    #[must_use]
    pub fn same_account(&self, other: &Self) -> bool {
        self.id == other.id
    }

    /// Name to show in headers and menus
    #[must_use]
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.email)
    }
}
