// ABOUTME: Generation stamps that let async results be checked for staleness before commit
// ABOUTME: Results started under a superseded generation are discarded instead of applied
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ContestHub Contributors

//! Staleness tokens for async fetch-then-commit flows
//!
//! Shared state that is filled in asynchronously carries a [`Generation`].
//! Whoever starts async work captures the generation current at that moment,
//! and the finished work is wrapped in a [`Stamped`] value. Before the value
//! is written back, [`Stamped::commit_if_current`] compares the stamp with the
//! live generation; anything started under an older generation is dropped.

use std::fmt;
use std::future::Future;

/// Monotonic counter identifying the current owner of a piece of shared state
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(u64);

impl Generation {
    /// The generation before anything happened
    pub const INITIAL: Self = Self(0);

    /// The generation after this one
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    /// Raw counter value
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}", self.0)
    }
}

/// Output of async work together with the generation it started under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stamped<T> {
    generation: Generation,
    value: T,
}

impl<T> Stamped<T> {
    /// Stamp a value
    pub const fn new(generation: Generation, value: T) -> Self {
        Self { generation, value }
    }

    /// Generation the work started under
    pub const fn generation(&self) -> Generation {
        self.generation
    }

    /// Borrow the value regardless of staleness
    pub const fn value(&self) -> &T {
        &self.value
    }

    /// Take the value regardless of staleness
    pub fn into_value(self) -> T {
        self.value
    }

    /// Whether the work still belongs to `live`
    pub fn is_current(&self, live: Generation) -> bool {
        self.generation == live
    }

    /// Apply `commit` only if the stamp matches `live`; returns whether it ran
    pub fn commit_if_current<F>(self, live: Generation, commit: F) -> bool
    where
        F: FnOnce(T),
    {
        if self.generation == live {
            commit(self.value);
            true
        } else {
            false
        }
    }
}

/// Run `work` and stamp its output with `generation`
pub async fn stamped<F>(generation: Generation, work: F) -> Stamped<F::Output>
where
    F: Future,
{
    Stamped::new(generation, work.await)
}
