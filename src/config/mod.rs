// ABOUTME: Configuration management module for the ContestHub client
// ABOUTME: Loads backend, payment gateway and identity provider settings from the environment
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ContestHub Contributors
//! Configuration module for the ContestHub client
//!
//! Configuration is environment-only. Missing required values are a startup
//! failure (`ErrorCode::ConfigMissing`), never something recovered at runtime.

/// Environment-based client configuration
pub mod environment;

pub use environment::{
    BackendConfig, ClientConfig, Environment, FirebaseConfig, PaymentConfig,
};
