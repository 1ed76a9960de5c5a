// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! Shared refresh gate for the credential providers.
//!
//! Every provider composes a [`RefreshGate`] with a source-specific reload
//! routine and guards both behind one `RwLock`:
//!
//! 1. Take the read guard; if [`RefreshGate::is_due`] is false, return the
//!    cached value (the common, cheap path with unlimited concurrent readers).
//! 2. Otherwise drop the read guard, take the write guard, and re-check
//!    `is_due`, since another task may have refreshed in the interim.
//! 3. Only if still due, run the reload routine while holding the write
//!    guard, then call [`RefreshGate::mark_reloaded`].
//!
//! Holding the write guard across the reload is what keeps at most one
//! reload in flight per provider and shields readers from redundant work
//! when a stale cache is hit by many tasks at once.

use std::time::{Duration, Instant};

/// Tracks when a provider last reloaded and how long a loaded value is
/// trusted.
///
/// The timestamp advances after every attempted reload, successful or not,
/// so a failing backend is consulted at most once per interval instead of
/// on every call.
pub struct RefreshGate {
    refresh_interval: Duration,
    last_loaded: Option<Instant>,
}

impl RefreshGate {
    /// Creates a gate that has never loaded; the first `is_due` is true.
    pub fn new(refresh_interval: Duration) -> Self {
        Self {
            refresh_interval,
            last_loaded: None,
        }
    }

    /// True when a reload is due: nothing was ever loaded, or more than the
    /// refresh interval has passed since the last attempt.
    pub fn is_due(&self) -> bool {
        match self.last_loaded {
            None => true,
            Some(loaded_at) => loaded_at.elapsed() > self.refresh_interval,
        }
    }

    /// Records that a reload attempt just completed.
    pub fn mark_reloaded(&mut self) {
        self.last_loaded = Some(Instant::now());
    }
}
