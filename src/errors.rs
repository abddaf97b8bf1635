// ABOUTME: Unified error handling re-exported from contest-hub-core
// ABOUTME: Provides AppError, ErrorCode and AppResult to every client module
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ContestHub Contributors

pub use contest_hub_core::errors::*;
