// ABOUTME: Contest catalogue client for public browsing and creator/admin management
// ABOUTME: Listing, search and popular contests are public; everything else is authorized
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ContestHub Contributors

use chrono::Utc;
use serde::Serialize;

use crate::constants::endpoints;
use crate::errors::{AppError, AppResult};
use crate::http::{endpoint, AuthorizedClient, PublicClient};
use crate::models::{Contest, ContestStatus, NewContest};

use super::{DeleteResult, InsertResult, UpdateResult};

/// Filters for the public contest list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContestQuery {
    /// Free-text search over name and category
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// Exact category
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contest_type: Option<String>,
}

impl ContestQuery {
    /// Query searching for `text`
    pub fn search(text: impl Into<String>) -> Self {
        Self {
            search: Some(text.into()),
            contest_type: None,
        }
    }
}

#[derive(Serialize)]
struct StatusChange {
    status: ContestStatus,
}

/// Contest endpoints
#[derive(Debug, Clone)]
pub struct ContestsApi {
    public: PublicClient,
    authorized: AuthorizedClient,
}

impl ContestsApi {
    /// Contests API over both clients
    #[must_use]
    pub const fn new(public: PublicClient, authorized: AuthorizedClient) -> Self {
        Self { public, authorized }
    }

    /// Approved contests matching `query`
    ///
    /// # Errors
    ///
    /// Transport, status or decoding failures
    pub async fn list(&self, query: &ContestQuery) -> AppResult<Vec<Contest>> {
        self.public
            .get_with_query(endpoints::CONTESTS, query)
            .await
    }

    /// Contests with the most participants
    ///
    /// # Errors
    ///
    /// Transport, status or decoding failures
    pub async fn popular(&self) -> AppResult<Vec<Contest>> {
        self.public.get(endpoints::CONTESTS_POPULAR).await
    }

    /// One contest
    ///
    /// # Errors
    ///
    /// `ResourceNotFound`, authorization or transport failures
    pub async fn get(&self, id: &str) -> AppResult<Contest> {
        self.authorized
            .get(&endpoint(endpoints::CONTESTS, &[id]))
            .await
    }

    /// Create a contest; it starts pending approval (creator only)
    ///
    /// # Errors
    ///
    /// `InvalidInput` for an invalid contest; authorization or transport failures
    pub async fn create(&self, contest: &NewContest) -> AppResult<InsertResult> {
        validate(contest)?;
        self.authorized.post(endpoints::CONTESTS, contest).await
    }

    /// Replace a contest's editable fields (creator only)
    ///
    /// # Errors
    ///
    /// `InvalidInput` for an invalid contest; authorization or transport failures
    pub async fn update(&self, id: &str, contest: &NewContest) -> AppResult<UpdateResult> {
        validate(contest)?;
        self.authorized
            .put(&endpoint(endpoints::CONTESTS, &[id]), contest)
            .await
    }

    /// Delete a contest (creator or admin)
    ///
    /// # Errors
    ///
    /// Authorization or transport failures
    pub async fn delete(&self, id: &str) -> AppResult<DeleteResult> {
        self.authorized
            .delete(&endpoint(endpoints::CONTESTS, &[id]))
            .await
    }

    /// Contests created by the signed-in creator
    ///
    /// # Errors
    ///
    /// Authorization or transport failures
    pub async fn mine(&self) -> AppResult<Vec<Contest>> {
        self.authorized.get(endpoints::CONTESTS_MINE).await
    }

    /// Approve a pending contest (admin only)
    ///
    /// # Errors
    ///
    /// Authorization or transport failures
    pub async fn approve(&self, id: &str) -> AppResult<UpdateResult> {
        self.authorized
            .patch(
                &endpoint(endpoints::CONTESTS, &[id, "approve"]),
                &StatusChange {
                    status: ContestStatus::Approved,
                },
            )
            .await
    }

    /// Every contest regardless of status (admin only)
    ///
    /// # Errors
    ///
    /// Authorization or transport failures
    pub async fn all(&self) -> AppResult<Vec<Contest>> {
        self.authorized.get(endpoints::CONTESTS_ALL).await
    }
}

fn validate(contest: &NewContest) -> AppResult<()> {
    if contest.name.trim().is_empty() {
        return Err(AppError::invalid_input("Contest name is required"));
    }
    if contest.contest_type.trim().is_empty() {
        return Err(AppError::invalid_input("Contest type is required"));
    }
    if !contest.price.is_finite() || contest.price < 0.0 {
        return Err(AppError::invalid_input("Contest price must be zero or more"));
    }
    if contest.deadline <= Utc::now() {
        return Err(AppError::invalid_input("Contest deadline must be in the future"));
    }
    Ok(())
}
