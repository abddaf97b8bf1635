// ABOUTME: Submission client for participants, creators declaring winners and winners' history
// ABOUTME: All submission endpoints require a credential
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ContestHub Contributors

use serde::Serialize;
use url::Url;

use crate::constants::endpoints;
use crate::errors::{AppError, AppResult};
use crate::http::{endpoint, AuthorizedClient};
use crate::models::{Contest, NewSubmission, Submission};

use super::{InsertResult, UpdateResult};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WinnerDeclaration<'a> {
    contest_id: &'a str,
}

/// Submission endpoints
#[derive(Debug, Clone)]
pub struct SubmissionsApi {
    client: AuthorizedClient,
}

impl SubmissionsApi {
    /// Submissions API over the authorized client
    #[must_use]
    pub const fn new(client: AuthorizedClient) -> Self {
        Self { client }
    }

    /// Submit a task link for a contest
    ///
    /// # Errors
    ///
    /// `InvalidInput` for a non-http(s) link; authorization or transport failures
    pub async fn submit(&self, submission: &NewSubmission) -> AppResult<InsertResult> {
        let link = Url::parse(submission.task_link.trim())
            .map_err(|e| AppError::invalid_input(format!("Task link is not a valid URL: {e}")))?;
        if !matches!(link.scheme(), "http" | "https") {
            return Err(AppError::invalid_input("Task link must be an http(s) URL"));
        }
        self.client.post(endpoints::SUBMISSIONS, submission).await
    }

    /// Submissions for one contest (its creator only)
    ///
    /// # Errors
    ///
    /// Authorization or transport failures
    pub async fn for_contest(&self, contest_id: &str) -> AppResult<Vec<Submission>> {
        self.client
            .get(&endpoint(endpoints::SUBMISSIONS_BY_CONTEST, &[contest_id]))
            .await
    }

    /// Declare a submission the winner of its contest (creator only)
    ///
    /// # Errors
    ///
    /// `InvalidInput` once the contest already has a winner; authorization or
    /// transport failures
    pub async fn declare_winner(
        &self,
        contest: &Contest,
        submission_id: &str,
    ) -> AppResult<UpdateResult> {
        if contest.winner.is_some() {
            return Err(AppError::invalid_input("A winner was already declared"));
        }
        self.client
            .patch(
                &endpoint(endpoints::SUBMISSIONS, &[submission_id, "winner"]),
                &WinnerDeclaration {
                    contest_id: &contest.id,
                },
            )
            .await
    }

    /// Contests the signed-in user has won
    ///
    /// # Errors
    ///
    /// Authorization or transport failures
    pub async fn winning(&self) -> AppResult<Vec<Contest>> {
        self.client.get(endpoints::SUBMISSIONS_WINNING).await
    }
}
