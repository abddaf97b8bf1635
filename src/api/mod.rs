// ABOUTME: Typed clients for the contest platform backend REST API
// ABOUTME: Users, contests, payments and submissions over the public and authorized clients
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ContestHub Contributors

//! Backend collaborators
//!
//! Thin typed wrappers; anything protected goes through
//! [`AuthorizedClient`](crate::http::AuthorizedClient) so that credential
//! rejection is handled in one place.

/// Public contest browsing and protected contest management
pub mod contests;
/// Payment intents and participation records
pub mod payments;
/// Task submissions and winners
pub mod submissions;
/// User directory and role lookup
pub mod users;

use serde::{Deserialize, Serialize};

pub use contests::{ContestQuery, ContestsApi};
pub use payments::PaymentsApi;
pub use submissions::SubmissionsApi;
pub use users::{UserRegistrar, UsersApi};

/// Acknowledgement of an insert
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertResult {
    /// Id of the new document; `None` when nothing was inserted
    #[serde(default)]
    pub inserted_id: Option<String>,
}

/// Acknowledgement of an update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    /// Documents matched by the filter
    #[serde(default)]
    pub matched_count: u64,
    /// Documents actually changed
    #[serde(default)]
    pub modified_count: u64,
}

/// Acknowledgement of a delete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    /// Documents removed
    #[serde(default)]
    pub deleted_count: u64,
}
