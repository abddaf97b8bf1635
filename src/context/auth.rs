// ABOUTME: Authentication context grouping session, role and route-gate state
// ABOUTME: Gate decisions are computed from the currently published session and role snapshots
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use std::sync::Arc;

use crate::gate::{GateDecision, GateState, NavEntry, RouteGate};
use crate::models::Role;
use crate::navigator::Navigator;
use crate::notices::NoticeBoard;
use crate::roles::RoleResolver;
use crate::session::SessionStore;

/// Authentication context containing session and authorization state
///
/// # Dependencies
/// - `session`: single writer of the signed-in identity
/// - `roles`: single writer of the cached role
/// - `gate`: permitted-role route table
/// - `navigator`: current location and sign-in return path
/// - `notices`: toast-level notices
#[derive(Clone)]
pub struct AuthContext {
    session: Arc<SessionStore>,
    roles: Arc<RoleResolver>,
    gate: Arc<RouteGate>,
    navigator: Arc<Navigator>,
    notices: NoticeBoard,
}

impl AuthContext {
    /// Create new authentication context
    #[must_use]
    pub const fn new(
        session: Arc<SessionStore>,
        roles: Arc<RoleResolver>,
        gate: Arc<RouteGate>,
        navigator: Arc<Navigator>,
        notices: NoticeBoard,
    ) -> Self {
        Self {
            session,
            roles,
            gate,
            navigator,
            notices,
        }
    }

    /// Get the session store
    #[must_use]
    pub const fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Get the role resolver
    #[must_use]
    pub const fn roles(&self) -> &Arc<RoleResolver> {
        &self.roles
    }

    /// Get the route gate
    #[must_use]
    pub const fn gate(&self) -> &Arc<RouteGate> {
        &self.gate
    }

    /// Get the navigator
    #[must_use]
    pub const fn navigator(&self) -> &Arc<Navigator> {
        &self.navigator
    }

    /// Get the notice board
    #[must_use]
    pub const fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    /// Effective role of the signed-in identity; `Unknown` until resolved
    #[must_use]
    pub fn current_role(&self) -> Role {
        self.roles.snapshot().role_in(&self.session.snapshot())
    }

    /// Gate state for `path` right now
    #[must_use]
    pub fn evaluate(&self, path: &str) -> GateState {
        self.gate
            .evaluate(path, &self.session.snapshot(), &self.roles.snapshot())
    }

    /// Gate decision for `path` right now
    #[must_use]
    pub fn decide(&self, path: &str) -> GateDecision {
        self.gate
            .decide(path, &self.session.snapshot(), &self.roles.snapshot())
    }

    /// Dashboard menu right now
    #[must_use]
    pub fn navigation(&self) -> Vec<NavEntry> {
        self.gate
            .navigation(&self.session.snapshot(), &self.roles.snapshot())
    }
}
