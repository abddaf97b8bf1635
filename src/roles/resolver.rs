// ABOUTME: Role resolver mapping an identity to its role through one backend lookup
// ABOUTME: At most one lookup in flight per identity; results for superseded identities are dropped
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ContestHub Contributors

//! Role resolver
//!
//! The resolver tracks exactly one identity key at a time, optionally pinned
//! to the session revision it was signed in under. Changing either (through
//! [`RoleResolver::invalidate_session`], [`RoleResolver::invalidate`] or by
//! resolving a different identity) resets the status to pending and advances
//! the generation. Signing out and back in as the same account is a new
//! session revision, so the previous role is never carried over. A lookup carries
//! the generation it started under and is committed only if that generation
//! is still live, so a slow answer for a previous identity can never become
//! the role of the current one.
//!
//! Failures are cached as [`RoleStatus::Failed`], which reads as
//! [`Role::Unknown`]. Nothing retries automatically; a new identity or an
//! explicit [`RoleResolver::refresh`] starts the next lookup.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::errors::AppResult;
use crate::models::{Identity, IdentityKey, Role};
use crate::redaction::mask_email;
use crate::session::SessionSnapshot;
use crate::task::{stamped, Generation};

/// Backend role lookup
#[async_trait]
pub trait RoleLookup: Send + Sync {
    /// Fetch the role the backend assigns to `identity`
    ///
    /// # Errors
    ///
    /// Any transport or backend failure
    async fn lookup_role(&self, identity: &Identity) -> AppResult<Role>;
}

/// Resolution status for the tracked identity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleStatus {
    /// No identity is tracked
    Idle,
    /// Lookup not started or not finished
    Pending,
    /// Backend answered
    Resolved(Role),
    /// Lookup failed; least privilege applies
    Failed,
}

impl RoleStatus {
    /// Effective role; anything but a resolved answer is `Unknown`
    #[must_use]
    pub const fn role(self) -> Role {
        match self {
            Self::Resolved(role) => role,
            Self::Idle | Self::Pending | Self::Failed => Role::Unknown,
        }
    }

    /// Whether resolution has finished, successfully or not
    #[must_use]
    pub const fn is_settled(self) -> bool {
        matches!(self, Self::Resolved(_) | Self::Failed)
    }
}

/// Published resolver state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleState {
    /// Identity the status belongs to
    pub identity: Option<IdentityKey>,
    /// Session revision the identity was tracked under, when pinned
    pub epoch: Option<Generation>,
    /// Resolution status for that identity
    pub status: RoleStatus,
    /// Advanced whenever the tracked identity changes or a refresh starts
    pub generation: Generation,
    in_flight: bool,
}

impl RoleState {
    const fn initial() -> Self {
        Self {
            identity: None,
            epoch: None,
            status: RoleStatus::Idle,
            generation: Generation::INITIAL,
            in_flight: false,
        }
    }

    /// Status as seen by a reader holding `identity`
    ///
    /// A status recorded for any other identity reads as pending, so a
    /// reader can never observe a previous identity's role.
    #[must_use]
    pub fn status_for(&self, identity: Option<&Identity>) -> RoleStatus {
        match identity {
            None => RoleStatus::Idle,
            Some(identity) if self.tracks(identity) => self.status,
            Some(_) => RoleStatus::Pending,
        }
    }

    /// Effective role for a reader holding `identity`
    #[must_use]
    pub fn role_for(&self, identity: Option<&Identity>) -> Role {
        self.status_for(identity).role()
    }

    /// Status as seen under the published `session`
    ///
    /// Only a status recorded for the same identity and the same session
    /// revision counts. A role resolved before a sign-out reads as pending
    /// after signing back in, even for the same account.
    #[must_use]
    pub fn status_in(&self, session: &SessionSnapshot) -> RoleStatus {
        match session.identity() {
            None => RoleStatus::Idle,
            Some(identity) if self.tracks_session(identity, session.revision) => self.status,
            Some(_) => RoleStatus::Pending,
        }
    }

    /// Effective role under the published `session`
    #[must_use]
    pub fn role_in(&self, session: &SessionSnapshot) -> Role {
        self.status_in(session).role()
    }

    /// Whether a lookup is currently running
    #[must_use]
    pub const fn in_flight(&self) -> bool {
        self.in_flight
    }

    fn tracks(&self, identity: &Identity) -> bool {
        self.identity
            .as_ref()
            .is_some_and(|key| key.as_str() == identity.id)
    }

    fn tracks_session(&self, identity: &Identity, epoch: Generation) -> bool {
        self.tracks(identity) && self.epoch == Some(epoch)
    }

    fn track(&mut self, identity: Option<IdentityKey>, epoch: Option<Generation>) {
        self.status = if identity.is_some() {
            RoleStatus::Pending
        } else {
            RoleStatus::Idle
        };
        self.identity = identity;
        self.epoch = epoch;
        self.generation = self.generation.next();
        self.in_flight = false;
    }
}

/// What `resolve_role` does after inspecting the state
enum Step {
    Done(Role),
    Wait(Generation),
    Start(Generation),
}

/// Single writer of the cached role
pub struct RoleResolver {
    lookup: Arc<dyn RoleLookup>,
    state: watch::Sender<RoleState>,
}

impl std::fmt::Debug for RoleResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoleResolver")
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl RoleResolver {
    /// Resolver tracking no identity
    pub fn new(lookup: Arc<dyn RoleLookup>) -> Self {
        let (state, _) = watch::channel(RoleState::initial());
        Self { lookup, state }
    }

    /// Receiver notified on every status change
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<RoleState> {
        self.state.subscribe()
    }

    /// Current published state
    #[must_use]
    pub fn snapshot(&self) -> RoleState {
        self.state.borrow().clone()
    }

    /// Effective role for `identity`; `Unknown` until resolved
    #[must_use]
    pub fn current_role(&self, identity: Option<&Identity>) -> Role {
        self.state.borrow().role_for(identity)
    }

    /// Track `identity`, dropping the cached role if its key differs
    ///
    /// Returns whether the tracked identity changed. Any lookup still running
    /// for the previous identity will be discarded when it finishes.
    pub fn invalidate(&self, identity: Option<&Identity>) -> bool {
        let key = identity.map(Identity::key);
        self.state.send_if_modified(|state| {
            if state.identity == key {
                return false;
            }
            debug!(
                from = ?state.identity,
                to = ?key,
                generation = %state.generation.next(),
                "Role cache invalidated"
            );
            state.track(key, None);
            true
        })
    }

    /// Track the identity of `session`, pinned to its revision
    ///
    /// Any transition the store publishes (sign-in, sign-out, restore) drops
    /// the cached role, including a sign-in as the account that was signed in
    /// before. Returns whether the tracked session changed.
    pub fn invalidate_session(&self, session: &SessionSnapshot) -> bool {
        let key = session.identity_key();
        let epoch = key.as_ref().map(|_| session.revision);
        self.state.send_if_modified(|state| {
            if state.identity == key && state.epoch == epoch {
                return false;
            }
            debug!(
                from = ?state.identity,
                to = ?key,
                revision = %session.revision,
                generation = %state.generation.next(),
                "Role cache invalidated for session transition"
            );
            state.track(key, epoch);
            true
        })
    }

    /// Role of `identity`, looked up at most once per identity key
    ///
    /// Concurrent callers share the in-flight lookup. Returns `Unknown` when
    /// the lookup fails or when the identity is superseded before it finishes.
    pub async fn resolve_role(&self, identity: &Identity) -> Role {
        self.resolve(identity, None).await
    }

    /// Role of `identity` signed in under session revision `epoch`
    ///
    /// Same as [`RoleResolver::resolve_role`], except that a role cached for
    /// an earlier session revision is dropped and looked up again.
    pub async fn resolve_in_session(&self, identity: &Identity, epoch: Generation) -> Role {
        self.resolve(identity, Some(epoch)).await
    }

    async fn resolve(&self, identity: &Identity, epoch: Option<Generation>) -> Role {
        let mut step = Step::Done(Role::Unknown);
        self.state.send_if_modified(|state| {
            let tracked = match epoch {
                Some(epoch) => state.tracks_session(identity, epoch),
                None => state.tracks(identity),
            };
            let changed = !tracked;
            if changed {
                state.track(Some(identity.key()), epoch);
            }
            match state.status {
                RoleStatus::Resolved(role) => {
                    step = Step::Done(role);
                    changed
                }
                RoleStatus::Failed => {
                    step = Step::Done(Role::Unknown);
                    changed
                }
                RoleStatus::Idle | RoleStatus::Pending if state.in_flight => {
                    step = Step::Wait(state.generation);
                    changed
                }
                RoleStatus::Idle | RoleStatus::Pending => {
                    state.in_flight = true;
                    step = Step::Start(state.generation);
                    true
                }
            }
        });

        match step {
            Step::Done(role) => role,
            Step::Wait(generation) => self.wait_for_lookup(generation).await,
            Step::Start(generation) => self.run_lookup(identity, generation).await,
        }
    }

    /// Look the role up again for the same identity
    pub async fn refresh(&self, identity: &Identity) -> Role {
        let mut epoch = None;
        self.state.send_modify(|state| {
            epoch = state.epoch.filter(|_| state.tracks(identity));
            state.track(Some(identity.key()), epoch);
        });
        self.resolve(identity, epoch).await
    }

    async fn wait_for_lookup(&self, generation: Generation) -> Role {
        let mut receiver = self.state.subscribe();
        let settled = receiver
            .wait_for(|state| state.generation != generation || !state.in_flight)
            .await
            .map(|state| {
                if state.generation == generation {
                    state.status.role()
                } else {
                    Role::Unknown
                }
            });
        settled.unwrap_or(Role::Unknown)
    }

    async fn run_lookup(&self, identity: &Identity, generation: Generation) -> Role {
        debug!(email = %mask_email(&identity.email), generation = %generation, "Resolving role");
        let mut guard = InFlightGuard {
            state: &self.state,
            generation,
            armed: true,
        };
        let outcome = stamped(generation, self.lookup.lookup_role(identity)).await;
        guard.armed = false;

        if let Err(e) = outcome.value() {
            warn!(
                email = %mask_email(&identity.email),
                error = %e,
                "Role resolution failed, falling back to least privilege"
            );
        }
        let role = outcome.value().as_ref().map_or(Role::Unknown, |role| *role);

        let committed = self.state.send_if_modified(|state| {
            outcome.commit_if_current(state.generation, |result| {
                state.status = result.map_or(RoleStatus::Failed, RoleStatus::Resolved);
                state.in_flight = false;
            })
        });

        if committed {
            debug!(email = %mask_email(&identity.email), role = %role, "Role resolved");
            role
        } else {
            debug!(
                generation = %generation,
                "Discarding role lookup for a superseded identity"
            );
            Role::Unknown
        }
    }
}

/// Releases waiters if a lookup future is dropped before it finishes
struct InFlightGuard<'a> {
    state: &'a watch::Sender<RoleState>,
    generation: Generation,
    armed: bool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            let generation = self.generation;
            self.state.send_if_modified(|state| {
                let abandoned = state.generation == generation && state.in_flight;
                if abandoned {
                    state.in_flight = false;
                }
                abandoned
            });
        }
    }
}
