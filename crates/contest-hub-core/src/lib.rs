// ABOUTME: Core types and constants for the ContestHub contest platform client
// ABOUTME: Foundation crate with error handling, identity and role models, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ContestHub Contributors

#![deny(unsafe_code)]

//! # ContestHub Core
//!
//! Foundation crate providing shared types and constants for the ContestHub
//! client. It is intentionally free of I/O so that the session, role and
//! routing layers in the main crate can share one vocabulary.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError` and `ErrorCode`
//! - **models**: Identity, credential, role and contest platform data models
//! - **constants**: Route paths, backend endpoints and environment variable names

/// Unified error handling system with standard error codes
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Core data models (Identity, Role, Contest, Submission, etc.)
pub mod models;
