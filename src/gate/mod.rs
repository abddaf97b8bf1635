// ABOUTME: Route gate deciding render, loading, redirect or deny for each navigation target
// ABOUTME: Combines session and role state with the permitted-role route table
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ContestHub Contributors

//! Route gate
//!
//! The gate is a pure function of the route table, the published session
//! snapshot and the published role state. It never reads a role that belongs
//! to another identity or to an earlier sign-in: [`RoleState::status_in`]
//! reports such a role as pending, which keeps the route in
//! [`GateState::Checking`].
//!
//! Protected content is only produced through [`RouteGate::mount`], which
//! calls the render closure exclusively in the `Authorized` state.

/// Permitted-role route table
pub mod routes;

use std::fmt;

use serde::Serialize;

use crate::constants::routes as paths;
use crate::roles::RoleState;
use crate::session::{SessionPhase, SessionSnapshot};

pub use routes::{normalize_path, Access, RouteRule, RouteTable};

/// Per-route gate state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateState {
    /// Identity or role not settled yet
    Checking,
    /// Content may render
    Authorized,
    /// Signed in, but the role is not permitted
    Forbidden,
    /// Nobody is signed in
    Unauthenticated,
}

impl fmt::Display for GateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Checking => "checking",
            Self::Authorized => "authorized",
            Self::Forbidden => "forbidden",
            Self::Unauthenticated => "unauthenticated",
        };
        f.write_str(label)
    }
}

/// Redirect to the sign-in view carrying the originally requested path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redirect {
    /// Sign-in view
    pub to: String,
    /// Path to return to after sign-in
    pub from: String,
}

impl Redirect {
    /// Redirect to sign-in from `from`
    pub fn to_sign_in(from: impl Into<String>) -> Self {
        Self {
            to: paths::SIGN_IN.to_owned(),
            from: from.into(),
        }
    }

    /// Full location, e.g. `/login?from=%2Fdashboard`
    #[must_use]
    pub fn location(&self) -> String {
        format!(
            "{}?{}={}",
            self.to,
            paths::RETURN_PARAM,
            urlencoding::encode(&self.from)
        )
    }
}

/// What the host should do with a navigation target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum GateDecision {
    /// Render the route
    Render,
    /// Show a neutral loading state
    Loading,
    /// Send the user to sign-in
    Redirect(Redirect),
    /// Show a non-navigable denial, offering `landing` instead
    Deny {
        /// Default landing page
        landing: String,
    },
}

impl From<GateDecision> for GateState {
    fn from(decision: GateDecision) -> Self {
        match decision {
            GateDecision::Render => Self::Authorized,
            GateDecision::Loading => Self::Checking,
            GateDecision::Redirect(_) => Self::Unauthenticated,
            GateDecision::Deny { .. } => Self::Forbidden,
        }
    }
}

/// Outcome of mounting a route
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mount<T> {
    /// Rendered content
    Content(T),
    /// Loading placeholder
    Loading,
    /// Redirect away
    Redirect(Redirect),
    /// Denied, with a landing page to offer
    Denied {
        /// Default landing page
        landing: String,
    },
}

impl<T> Mount<T> {
    /// Rendered content, if any
    pub fn content(self) -> Option<T> {
        match self {
            Self::Content(content) => Some(content),
            Self::Loading | Self::Redirect(_) | Self::Denied { .. } => None,
        }
    }
}

/// Dashboard menu entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavEntry {
    /// Menu label
    pub label: &'static str,
    /// Target path
    pub path: &'static str,
}

/// Route gate over a route table
#[derive(Debug, Clone, Default)]
pub struct RouteGate {
    table: RouteTable,
}

impl RouteGate {
    /// Gate over `table`
    #[must_use]
    pub const fn new(table: RouteTable) -> Self {
        Self { table }
    }

    /// Route table in use
    #[must_use]
    pub const fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Gate state for `path`
    #[must_use]
    pub fn evaluate(&self, path: &str, session: &SessionSnapshot, roles: &RoleState) -> GateState {
        let access = self.table.access_for(path);
        if !access.is_protected() {
            return GateState::Authorized;
        }

        match &session.phase {
            SessionPhase::Restoring => return GateState::Checking,
            SessionPhase::SignedOut => return GateState::Unauthenticated,
            SessionPhase::SignedIn(_) => {}
        }

        let status = roles.status_in(session);
        if !status.is_settled() {
            return GateState::Checking;
        }

        if access.permits(status.role()) {
            GateState::Authorized
        } else {
            GateState::Forbidden
        }
    }

    /// Decision for `path`; redirects carry `path` as the return target
    #[must_use]
    pub fn decide(&self, path: &str, session: &SessionSnapshot, roles: &RoleState) -> GateDecision {
        match self.evaluate(path, session, roles) {
            GateState::Checking => GateDecision::Loading,
            GateState::Authorized => GateDecision::Render,
            GateState::Unauthenticated => GateDecision::Redirect(Redirect::to_sign_in(path)),
            GateState::Forbidden => GateDecision::Deny {
                landing: paths::DASHBOARD.to_owned(),
            },
        }
    }

    /// Mount `path`, calling `render` only when the route is authorized
    pub fn mount<T, F>(
        &self,
        path: &str,
        session: &SessionSnapshot,
        roles: &RoleState,
        render: F,
    ) -> Mount<T>
    where
        F: FnOnce() -> T,
    {
        match self.decide(path, session, roles) {
            GateDecision::Render => Mount::Content(render()),
            GateDecision::Loading => Mount::Loading,
            GateDecision::Redirect(redirect) => Mount::Redirect(redirect),
            GateDecision::Deny { landing } => Mount::Denied { landing },
        }
    }

    /// Dashboard menu for the current session
    ///
    /// Role-restricted entries appear only once the role is resolved and
    /// permitted; entries open to any signed-in identity appear as soon as
    /// someone is signed in.
    #[must_use]
    pub fn navigation(&self, session: &SessionSnapshot, roles: &RoleState) -> Vec<NavEntry> {
        if session.identity().is_none() {
            return Vec::new();
        }
        let role = roles.role_in(session);

        self.table
            .rules()
            .iter()
            .filter_map(|rule| {
                let label = rule.menu?;
                let visible = match rule.access {
                    Access::Public | Access::Authenticated => true,
                    Access::Roles(set) => set.permits(role),
                };
                visible.then_some(NavEntry {
                    label,
                    path: rule.pattern,
                })
            })
            .collect()
    }
}
