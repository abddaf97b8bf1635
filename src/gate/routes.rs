// ABOUTME: Declarative permitted-role table mapping route patterns to access rules
// ABOUTME: Path matching with named parameters and trailing wildcards, first match wins
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ContestHub Contributors

use std::borrow::Cow;

use crate::constants::routes;
use crate::models::{Role, RoleSet};

/// Who may mount a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Anyone, signed in or not
    Public,
    /// Any signed-in identity, whatever its role
    Authenticated,
    /// Signed-in identities whose resolved role is in the set
    Roles(RoleSet),
}

impl Access {
    /// Whether a signed-in identity with `role` may mount the route
    #[must_use]
    pub const fn permits(self, role: Role) -> bool {
        match self {
            Self::Public | Self::Authenticated => true,
            Self::Roles(set) => set.permits(role),
        }
    }

    /// Whether the route needs a signed-in identity
    #[must_use]
    pub const fn is_protected(self) -> bool {
        !matches!(self, Self::Public)
    }

    /// Whether the decision depends on the resolved role
    #[must_use]
    pub const fn needs_role(self) -> bool {
        matches!(self, Self::Roles(_))
    }
}

/// One row of the route table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteRule {
    /// Path pattern; `:name` matches one segment, a trailing `*` matches the rest
    pub pattern: &'static str,
    /// Access rule
    pub access: Access,
    /// Dashboard menu label, when the route appears in the menu
    pub menu: Option<&'static str>,
}

impl RouteRule {
    const fn new(pattern: &'static str, access: Access) -> Self {
        Self {
            pattern,
            access,
            menu: None,
        }
    }

    const fn menu(pattern: &'static str, access: Access, label: &'static str) -> Self {
        Self {
            pattern,
            access,
            menu: Some(label),
        }
    }

    /// Whether `path` (already normalized) matches this rule
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        let mut pattern = segments(self.pattern);
        let mut candidate = segments(path);
        loop {
            match (pattern.next(), candidate.next()) {
                (Some("*"), _) => return true,
                (Some(expected), Some(actual)) => {
                    if !expected.starts_with(':') && expected != actual {
                        return false;
                    }
                }
                (None, None) => return true,
                _ => return false,
            }
        }
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

/// Canonical form of `path` for matching
///
/// Drops the query string and fragment, percent-decodes, resolves `.` and
/// `..` segments, collapses repeated and trailing slashes and folds case.
/// `/Dashboard/./Manage-Users/` and `/contests/../dashboard/manage-users`
/// both become `/dashboard/manage-users`.
#[must_use]
pub fn normalize_path(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    let decoded = urlencoding::decode(path).unwrap_or(Cow::Borrowed(path));
    let lowered = decoded.to_lowercase();

    let mut resolved: Vec<&str> = Vec::new();
    for segment in lowered.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                resolved.pop();
            }
            other => resolved.push(other),
        }
    }

    if resolved.is_empty() {
        routes::HOME.to_owned()
    } else {
        format!("/{}", resolved.join("/"))
    }
}

/// Route table consulted by the gate
#[derive(Debug, Clone)]
pub struct RouteTable {
    rules: Vec<RouteRule>,
}

impl RouteTable {
    /// Table from explicit rules, checked in order
    #[must_use]
    pub const fn new(rules: Vec<RouteRule>) -> Self {
        Self { rules }
    }

    /// Rule governing `path`, if any
    #[must_use]
    pub fn rule_for(&self, path: &str) -> Option<&RouteRule> {
        let path = normalize_path(path);
        self.rules.iter().find(|rule| rule.matches(&path))
    }

    /// Access for `path`; unlisted paths are public
    #[must_use]
    pub fn access_for(&self, path: &str) -> Access {
        self.rule_for(path).map_or(Access::Public, |rule| rule.access)
    }

    /// All rules in order
    #[must_use]
    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        use Access::{Authenticated, Public, Roles};

        Self::new(vec![
            RouteRule::new(routes::HOME, Public),
            RouteRule::new(routes::SIGN_IN, Public),
            RouteRule::new(routes::SIGN_UP, Public),
            RouteRule::new(routes::CONTESTS, Public),
            RouteRule::new(routes::LEADERBOARD, Public),
            RouteRule::new(routes::CONTEST_DETAIL, Authenticated),
            RouteRule::new(routes::CONTEST_REGISTER, Authenticated),
            RouteRule::new(routes::PAYMENT, Authenticated),
            RouteRule::new(routes::DASHBOARD, Authenticated),
            RouteRule::menu(routes::DASHBOARD_PROFILE, Authenticated, "My Profile"),
            RouteRule::menu(routes::MY_PARTICIPATED, Roles(RoleSet::USER), "My Participated Contests"),
            RouteRule::menu(routes::MY_WINNING, Roles(RoleSet::USER), "My Winning Contests"),
            RouteRule::menu(routes::ADD_CONTEST, Roles(RoleSet::CREATOR), "Add Contest"),
            RouteRule::menu(routes::MY_CREATED, Roles(RoleSet::CREATOR), "My Created Contests"),
            RouteRule::new(routes::EDIT_CONTEST, Roles(RoleSet::CREATOR)),
            RouteRule::new(routes::CONTEST_SUBMITTED, Roles(RoleSet::CREATOR)),
            RouteRule::menu(routes::MANAGE_USERS, Roles(RoleSet::ADMIN), "Manage Users"),
            RouteRule::menu(routes::MANAGE_CONTESTS, Roles(RoleSet::ADMIN), "Manage Contests"),
            RouteRule::new(routes::DASHBOARD_ANY, Authenticated),
        ])
    }
}
