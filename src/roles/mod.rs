// ABOUTME: Role resolution for the signed-in identity
// ABOUTME: Maps identities to server-assigned roles, cached once per identity
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ContestHub Contributors

/// Cached, staleness-checked role lookup
pub mod resolver;

pub use resolver::{RoleLookup, RoleResolver, RoleState, RoleStatus};
