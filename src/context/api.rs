// ABOUTME: Backend API context grouping the typed REST clients
// ABOUTME: Every protected client shares one authorized request wrapper
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use crate::api::{ContestsApi, PaymentsApi, SubmissionsApi, UsersApi};

/// Typed backend clients
#[derive(Debug, Clone)]
pub struct ApiContext {
    users: UsersApi,
    contests: ContestsApi,
    payments: PaymentsApi,
    submissions: SubmissionsApi,
}

impl ApiContext {
    /// Create new API context
    #[must_use]
    pub const fn new(
        users: UsersApi,
        contests: ContestsApi,
        payments: PaymentsApi,
        submissions: SubmissionsApi,
    ) -> Self {
        Self {
            users,
            contests,
            payments,
            submissions,
        }
    }

    /// User directory
    #[must_use]
    pub const fn users(&self) -> &UsersApi {
        &self.users
    }

    /// Contest catalogue
    #[must_use]
    pub const fn contests(&self) -> &ContestsApi {
        &self.contests
    }

    /// Payments
    #[must_use]
    pub const fn payments(&self) -> &PaymentsApi {
        &self.payments
    }

    /// Submissions
    #[must_use]
    pub const fn submissions(&self) -> &SubmissionsApi {
        &self.submissions
    }
}
