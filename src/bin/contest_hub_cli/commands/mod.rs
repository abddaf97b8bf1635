// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ContestHub Contributors
// ABOUTME: Re-exports command modules for contest-hub
// ABOUTME: Provides session, route check and contest browsing commands

pub mod contests;
pub mod routes;
pub mod session;
