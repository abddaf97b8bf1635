// ABOUTME: Server-assigned role tiers and role-set bitflags for route permission rules
// ABOUTME: Unknown is the least-privilege role and belongs to no role set
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ContestHub Contributors

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Privilege tier controlling route and action visibility
///
/// The client copy is a cache of a server-side fact. Anything the backend
/// sends that is not a known tier deserializes to [`Role::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Platform administrator
    Admin,
    /// Contest creator
    Creator,
    /// Regular participant
    User,
    /// Not resolved, or resolution failed
    #[default]
    #[serde(other)]
    Unknown,
}

impl Role {
    /// Parse a backend role string; unrecognized values map to `Unknown`
    #[must_use]
    pub fn from_str_lossy(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "admin" => Self::Admin,
            "creator" => Self::Creator,
            "user" => Self::User,
            _ => Self::Unknown,
        }
    }

    /// Lowercase wire name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Creator => "creator",
            Self::User => "user",
            Self::Unknown => "unknown",
        }
    }

    /// Role set containing only this role (empty for `Unknown`)
    #[must_use]
    pub const fn as_set(self) -> RoleSet {
        match self {
            Self::Admin => RoleSet::ADMIN,
            Self::Creator => RoleSet::CREATOR,
            Self::User => RoleSet::USER,
            Self::Unknown => RoleSet::empty(),
        }
    }

    /// Whether the role is known
    #[must_use]
    pub const fn is_known(self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

bitflags! {
    /// Set of roles permitted on a route or action
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct RoleSet: u8 {
        /// Administrators
        const ADMIN = 0b0001;
        /// Contest creators
        const CREATOR = 0b0010;
        /// Participants
        const USER = 0b0100;
        /// Every known role
        const ANY_KNOWN = Self::ADMIN.bits() | Self::CREATOR.bits() | Self::USER.bits();
    }
}

impl RoleSet {
    /// Whether `role` is a member; `Unknown` is never a member
    #[must_use]
    pub const fn permits(self, role: Role) -> bool {
        let member = role.as_set();
        !member.is_empty() && self.contains(member)
    }
}
