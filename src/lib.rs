// ABOUTME: Main library entry point for the ContestHub client
// ABOUTME: Session store, role resolver, route gate and authorized requests for the contest platform
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ContestHub Contributors

// Crate-level attributes:
// - deny(unsafe_code): Zero-tolerance unsafe policy
#![deny(unsafe_code)]

//! # ContestHub Client
//!
//! Client-side session and authorization layer for the ContestHub contest
//! platform: who is signed in, which role the backend assigns them, and which
//! routes and actions that permits.
//!
//! ## Architecture
//!
//! - **Session**: single source of truth for the signed-in identity, with
//!   password and federated sign-in, sign-out and one-time restore
//! - **Roles**: one backend lookup per identity, cached, stale answers dropped
//! - **Gate**: declarative permitted-role route table producing render,
//!   loading, redirect or deny decisions
//! - **HTTP**: authorized request wrapper that signs out and redirects when
//!   the backend rejects the credential
//! - **API**: typed clients for users, contests, payments and submissions
//! - **Context**: an explicit [`context::ClientContext`] wiring everything
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use contest_hub::config::ClientConfig;
//! use contest_hub::context::ClientContext;
//! use contest_hub::errors::AppResult;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let config = ClientConfig::from_env()?;
//!     let context = ClientContext::init(&config).await?;
//!
//!     let decision = context.settle("/dashboard/manage-users").await;
//!     println!("{decision:?}");
//!     Ok(())
//! }
//! ```

// ── Public API ──────────────────────────────────────────────────────────
// These modules are used by the binary (src/bin/) and integration tests (tests/).

/// Typed backend REST clients
pub mod api;

/// Environment-based configuration
pub mod config;

/// Route, endpoint and environment variable constants
pub mod constants;

/// Explicit client context and its lifecycle
pub mod context;

/// Unified error handling
pub mod errors;

/// Route gate and permitted-role table
pub mod gate;

/// Backend HTTP transport and authorized request wrapper
pub mod http;

/// Structured logging setup
pub mod logging;

/// Domain models
pub mod models;

/// Current location and sign-in return path
pub mod navigator;

/// Toast-level user notices
pub mod notices;

/// PII redaction for log output
pub mod redaction;

/// Role resolution
pub mod roles;

/// Session store, identity provider and credential persistence
pub mod session;

/// Generation stamps for async fetch-then-commit
pub mod task;
