// ABOUTME: Session commands for contest-hub
// ABOUTME: Handles password and federated sign-in, sign-out and identity display
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ContestHub Contributors

use contest_hub::{constants::routes, context::ClientContext, errors::AppResult};
use tracing::info;

use crate::helpers::display::{display_identity, display_navigation};

/// Sign in with email and password
pub async fn login(context: &ClientContext, email: &str, password: &str) -> AppResult<()> {
    let target = context.sign_in(email, password).await?;
    info!(target = %target, "Sign-in complete");
    whoami(context).await;
    Ok(())
}

/// Sign in with the federated assertion supplied on the command line
pub async fn login_federated(context: &ClientContext) -> AppResult<()> {
    let target = context.sign_in_with_federated_provider().await?;
    info!(target = %target, "Federated sign-in complete");
    whoami(context).await;
    Ok(())
}

/// Sign out; signing out twice is fine
pub async fn logout(context: &ClientContext) {
    let was_signed_in = context.identity().is_some();
    context.sign_out().await;
    if was_signed_in {
        println!("Signed out.");
    } else {
        println!("Not signed in.");
    }
}

/// Show the signed-in identity, its role and the dashboard menu
pub async fn whoami(context: &ClientContext) {
    // Waiting on the dashboard settles the role lookup
    context.settle(routes::DASHBOARD).await;

    let Some(identity) = context.identity() else {
        println!("Not signed in.");
        return;
    };
    display_identity(&identity, context.auth().current_role());
    display_navigation(&context.navigation());
}
