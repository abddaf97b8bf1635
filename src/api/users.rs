// ABOUTME: User directory client: idempotent registration, role lookup and admin role changes
// ABOUTME: Registration is public; role lookup and user management require a credential
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ContestHub Contributors

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::endpoints;
use crate::errors::{AppError, AppResult};
use crate::http::{decode, endpoint, status_error, AuthorizedClient, PublicClient};
use crate::models::{Identity, NewUser, Role, UserRecord};
use crate::roles::RoleLookup;
use crate::session::{DirectoryRegistrar, Registration};

use super::{InsertResult, UpdateResult};

/// Registers identities in the user directory
#[derive(Debug, Clone)]
pub struct UserRegistrar {
    client: PublicClient,
}

impl UserRegistrar {
    /// Registrar over the public client
    #[must_use]
    pub const fn new(client: PublicClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DirectoryRegistrar for UserRegistrar {
    async fn register(&self, user: &NewUser) -> AppResult<Registration> {
        let response = self.client.post_raw(endpoints::USERS, user).await?;
        let status = response.status();
        if status == StatusCode::CONFLICT {
            return Ok(Registration::AlreadyExists);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        // The backend answers an existing email with a null insertedId
        let result: InsertResult = decode(response).await?;
        Ok(if result.inserted_id.is_some() {
            Registration::Created
        } else {
            Registration::AlreadyExists
        })
    }
}

#[derive(Deserialize)]
struct RoleResponse {
    #[serde(default)]
    role: Role,
}

#[derive(Serialize)]
struct RoleChange {
    role: Role,
}

/// Protected user directory operations
#[derive(Debug, Clone)]
pub struct UsersApi {
    client: AuthorizedClient,
}

impl UsersApi {
    /// Users API over the authorized client
    #[must_use]
    pub const fn new(client: AuthorizedClient) -> Self {
        Self { client }
    }

    /// Role the backend assigns to `email`
    ///
    /// # Errors
    ///
    /// Authorization failures as-is, anything else as `RoleResolutionFailed`
    pub async fn role_of(&self, email: &str) -> AppResult<Role> {
        let path = endpoint(endpoints::USER_ROLE, &[email]);
        let response: RoleResponse = self.client.get(&path).await.map_err(|e| {
            if e.is_authorization_failure() {
                e
            } else {
                AppError::role_resolution(format!("Role lookup failed: {}", e.message)).with_source(e)
            }
        })?;
        Ok(response.role)
    }

    /// Every user in the directory (admin only)
    ///
    /// # Errors
    ///
    /// Authorization, transport or decoding failures
    pub async fn list_users(&self) -> AppResult<Vec<UserRecord>> {
        self.client.get(endpoints::USERS).await
    }

    /// Change a user's role (admin only)
    ///
    /// # Errors
    ///
    /// `InvalidInput` for `Role::Unknown`; authorization or transport failures
    pub async fn update_role(&self, user_id: &str, role: Role) -> AppResult<UpdateResult> {
        if !role.is_known() {
            return Err(AppError::invalid_input("Cannot assign the unknown role"));
        }
        let path = endpoint(endpoints::USERS, &[user_id, "role"]);
        let result: UpdateResult = self.client.patch(&path, &RoleChange { role }).await?;
        debug!(user_id, role = %role, modified = result.modified_count, "User role updated");
        Ok(result)
    }
}

#[async_trait]
impl RoleLookup for UsersApi {
    async fn lookup_role(&self, identity: &Identity) -> AppResult<Role> {
        self.role_of(&identity.email).await
    }
}
