// ABOUTME: ContestHub CLI - command-line front-end for the contest platform client
// ABOUTME: Handles sign-in, sign-out, route checks and contest browsing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ContestHub Contributors
//!
//! Usage:
//! ```bash
//! # Sign in with email and password
//! contest-hub login --email user@example.com --password yourpassword
//!
//! # Sign in with a Google ID token
//! contest-hub login-federated --id-token eyJ...
//!
//! # Show who is signed in, their role and dashboard menu
//! contest-hub whoami
//!
//! # Check what the route gate does with a path
//! contest-hub check /dashboard/manage-users
//!
//! # List every route with its access rule and decision
//! contest-hub routes
//!
//! # Browse contests
//! contest-hub contests list --search logo
//! contest-hub contests show 64f1c2
//!
//! # Sign out
//! contest-hub logout
//! ```

mod commands;
mod helpers;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use contest_hub::{
    config::ClientConfig,
    constants::firebase,
    context::ClientContext,
    logging::LoggingConfig,
    session::{FederatedAssertion, FederatedTokenSource, StaticAssertion},
};
use tracing::debug;

#[derive(Parser)]
#[command(
    name = "contest-hub",
    about = "ContestHub client",
    long_about = "Command-line front-end for the ContestHub contest platform: sign in, check route access and browse contests."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// Sign in with email and password
    Login {
        /// Account email
        #[arg(long)]
        email: String,

        /// Account password
        #[arg(long)]
        password: String,
    },

    /// Sign in with an ID token from a federated identity provider
    LoginFederated {
        /// ID token issued by the provider
        #[arg(long)]
        id_token: String,

        /// Provider id
        #[arg(long, default_value = firebase::GOOGLE_PROVIDER_ID)]
        provider: String,
    },

    /// Sign out and forget the persisted session
    Logout,

    /// Show the signed-in identity, role and dashboard menu
    Whoami,

    /// List every route with its access rule and current decision
    Routes,

    /// Show the gate decision for a path
    Check {
        /// Path, e.g. /dashboard/my-participated
        path: String,
    },

    /// Contest catalogue
    Contests {
        #[command(subcommand)]
        action: ContestsCommand,
    },
}

#[non_exhaustive]
#[derive(Subcommand)]
enum ContestsCommand {
    /// List approved contests
    List {
        /// Free-text search
        #[arg(long)]
        search: Option<String>,
    },

    /// Show one contest (requires sign-in)
    Show {
        /// Contest id
        id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    LoggingConfig::for_cli(cli.verbose).init()?;

    let config = ClientConfig::from_env()?;

    let federated = match &cli.command {
        Command::LoginFederated { id_token, provider } => {
            let assertion = FederatedAssertion {
                provider_id: provider.clone(),
                id_token: id_token.clone(),
            };
            Some(Arc::new(StaticAssertion::new(assertion)) as Arc<dyn FederatedTokenSource>)
        }
        _ => None,
    };

    let context = ClientContext::init_with_federated(&config, federated).await?;
    debug!(context = ?context, "Client context initialized");

    match cli.command {
        Command::Login { email, password } => {
            commands::session::login(&context, &email, &password).await?;
        }
        Command::LoginFederated { .. } => {
            commands::session::login_federated(&context).await?;
        }
        Command::Logout => commands::session::logout(&context).await,
        Command::Whoami => commands::session::whoami(&context).await,
        Command::Routes => commands::routes::list(&context).await,
        Command::Check { path } => commands::routes::check(&context, &path).await,
        Command::Contests { action } => match action {
            ContestsCommand::List { search } => {
                commands::contests::list(&context, search).await?;
            }
            ContestsCommand::Show { id } => {
                commands::contests::show(&context, &id).await?;
            }
        },
    }

    context.teardown();
    Ok(())
}
