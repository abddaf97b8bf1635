// ABOUTME: Constants module re-exported from contest-hub-core
// ABOUTME: Route paths, endpoint paths, environment variable names and defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ContestHub Contributors

pub use contest_hub_core::constants::*;
