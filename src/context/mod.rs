// ABOUTME: Explicit, injectable client context replacing ambient session and role globals
// ABOUTME: Composes the auth context (session, roles, gate) with the backend API context
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Client contexts
//!
//! Session and role state are owned by an explicit [`ClientContext`] with a
//! defined lifecycle: [`ClientContext::init`] at startup, dropped (or
//! [`ClientContext::teardown`]) at shutdown. Nothing lives in globals.
//!
//! # Architecture
//!
//! - `AuthContext`: session store, role resolver, route gate, navigator, notices
//! - `ApiContext`: typed backend clients
//! - `ClientContext`: both, plus the task keeping roles in step with the session

pub mod api;
pub mod auth;
pub mod client;

pub use api::ApiContext;
pub use auth::AuthContext;
pub use client::{ClientContext, ClientContextBuilder};
