// ABOUTME: Contest platform records exchanged with the backend REST API
// ABOUTME: Contests, submissions, payments and user directory entries in camelCase wire format
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ContestHub Contributors

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::role::Role;

/// Moderation state of a contest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContestStatus {
    /// Waiting for admin approval
    #[default]
    Pending,
    /// Visible in the public catalogue
    Approved,
}

/// Declared winner of a contest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Winner {
    /// Winner display name
    pub name: String,
    /// Winner email
    pub email: String,
    /// Winner photo
    #[serde(default)]
    pub photo: Option<String>,
}

/// Contest as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contest {
    /// Backend document id
    #[serde(rename = "_id")]
    pub id: String,
    /// Contest name
    pub name: String,
    /// Banner image URL
    #[serde(default)]
    pub image: Option<String>,
    /// Long description
    #[serde(default)]
    pub description: String,
    /// Registration fee
    pub price: f64,
    /// Prize money or description
    #[serde(default)]
    pub prize: String,
    /// What participants must submit
    #[serde(default)]
    pub task_instruction: String,
    /// Category, e.g. "article writing"
    pub contest_type: String,
    /// Submission deadline
    pub deadline: DateTime<Utc>,
    /// Creator account email
    pub creator_email: String,
    /// Number of paid registrations
    #[serde(default)]
    pub participation_count: u32,
    /// Moderation state
    #[serde(default)]
    pub status: ContestStatus,
    /// Winner, once declared
    #[serde(default)]
    pub winner: Option<Winner>,
}

impl Contest {
    /// Whether registration is still open at `now`
    #[must_use]
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        self.status == ContestStatus::Approved && self.deadline > now && self.winner.is_none()
    }
}

/// Payload for creating or updating a contest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContest {
    /// Contest name
    pub name: String,
    /// Banner image URL
    pub image: Option<String>,
    /// Long description
    pub description: String,
    /// Registration fee
    pub price: f64,
    /// Prize money or description
    pub prize: String,
    /// What participants must submit
    pub task_instruction: String,
    /// Category
    pub contest_type: String,
    /// Submission deadline
    pub deadline: DateTime<Utc>,
}

/// Task submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    /// Backend document id
    #[serde(rename = "_id")]
    pub id: String,
    /// Contest the submission belongs to
    pub contest_id: String,
    /// Participant name
    pub participant_name: String,
    /// Participant email
    pub participant_email: String,
    /// Link to the submitted work
    pub task_link: String,
    /// Submission time
    pub submitted_at: DateTime<Utc>,
    /// Whether this submission was declared the winner
    #[serde(default)]
    pub is_winner: bool,
}

/// Payload for submitting a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubmission {
    /// Contest id
    pub contest_id: String,
    /// Link to the submitted work
    pub task_link: String,
}

/// Payment intent created by the backend on behalf of the payment gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    /// Client secret handed to the payment gateway SDK
    pub client_secret: String,
}

/// Completed payment, which registers the payer for the contest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    /// Contest paid for
    pub contest_id: String,
    /// Payer email
    pub email: String,
    /// Gateway transaction id
    pub transaction_id: String,
    /// Amount paid
    pub price: f64,
    /// Payment time
    pub paid_at: DateTime<Utc>,
}

/// User directory entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// Backend document id
    #[serde(rename = "_id")]
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    /// Account email
    pub email: String,
    /// Profile photo
    #[serde(default)]
    pub photo: Option<String>,
    /// Server-assigned role
    #[serde(default)]
    pub role: Role,
}

/// Payload registering a newly-seen identity in the user directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    /// Display name
    pub name: Option<String>,
    /// Account email
    pub email: String,
    /// Profile photo
    pub photo: Option<String>,
    /// Initial role, always `user` for self-registration
    pub role: Role,
}
