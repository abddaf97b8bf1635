// ABOUTME: Core data models shared by the session, role and API layers
// ABOUTME: Re-exports identity, role and contest platform record types

//! Core data models
//!
//! - [`identity`]: the signed-in identity and its bearer credential
//! - [`role`]: server-assigned privilege tiers and role sets for route rules
//! - [`contest`]: records exchanged with the contest platform backend

/// Identity and credential types
pub mod identity;
/// Roles and role sets
pub mod role;
/// Contest, submission, payment and user directory records
pub mod contest;

pub use contest::{
    Contest, ContestStatus, NewContest, NewSubmission, NewUser, PaymentIntent, PaymentRecord,
    Submission, UserRecord, Winner,
};
pub use identity::{Credential, Identity, IdentityKey};
pub use role::{Role, RoleSet};
