// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ContestHub Contributors
// ABOUTME: Re-exports helper modules for contest-hub
// ABOUTME: Provides display formatting utilities

pub mod display;
