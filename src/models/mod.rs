// ABOUTME: Data models re-exported from contest-hub-core
// ABOUTME: Identity, credential, role and contest platform records
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ContestHub Contributors

pub use contest_hub_core::models::*;
