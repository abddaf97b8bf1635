// ABOUTME: Session management: who is signed in, how, and where the credential is kept
// ABOUTME: Exposes the session store, identity provider seam, and credential persistence
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ContestHub Contributors

//! Session management
//!
//! - [`store`]: the single writer of the current identity
//! - [`provider`]: identity provider and user directory seams
//! - [`firebase`]: Firebase Auth REST implementation of [`provider::AuthProvider`]
//! - [`persistence`]: persisted session storage across restarts

/// Firebase Auth REST identity provider
pub mod firebase;
/// Persisted session storage
pub mod persistence;
/// Identity provider and directory registration traits
pub mod provider;
/// Session store
pub mod store;

pub use firebase::FirebaseAuthProvider;
pub use persistence::{CredentialStore, FileCredentialStore, MemoryCredentialStore, PersistedSession};
pub use provider::{
    AuthProvider, DirectoryRegistrar, FederatedAssertion, FederatedTokenSource, ProviderSession,
    Registration, StaticAssertion,
};
pub use store::{SessionPhase, SessionSnapshot, SessionStore};
