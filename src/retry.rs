// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use std::time::Duration;

use reqwest::StatusCode;

use crate::constants::{DEFAULT_MAX_RETRIES, DEFAULT_RETRY_BASE_DELAY};

/// Classification of a failed fetch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchError {
    /// No response at all (connect failure, timeout). Always retriable.
    Connect,
    /// A response with a non-OK status code.
    Status(StatusCode),
}

impl FetchError {
    pub fn is_retriable(&self) -> bool {
        match self {
            FetchError::Connect => true,
            FetchError::Status(status) => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
        }
    }
}

/// Bounded exponential backoff across fetch attempts.
///
/// The attempt count and base delay are the load-bearing contract; the
/// exact curve (`base << attempt`) is an implementation choice.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_retries: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Whether `attempt` (0-based) should be followed by another try.
    pub fn should_retry(&self, error: FetchError, attempt: u32) -> bool {
        error.is_retriable() && attempt < self.max_retries
    }

    /// How long to sleep before retrying after `attempt` failed.
    pub fn delay_before_next_retry(&self, _error: FetchError, attempt: u32) -> Duration {
        self.base_delay * (1u32 << attempt.min(16))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES, DEFAULT_RETRY_BASE_DELAY)
    }
}
