// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use std::env;
use std::time::Duration;

use crate::constants::{
    CONNECT_TIMEOUT, DEFAULT_MAX_RETRIES, DEFAULT_REFRESH_INTERVAL, DEFAULT_RETRY_BASE_DELAY,
    INSTANCE_METADATA_ENDPOINT, REQUEST_TIMEOUT, TASK_AUTHORIZATION_TOKEN_ENV_VAR,
    TASK_CREDENTIALS_FULL_URI_ENV_VAR, TASK_CREDENTIALS_RELATIVE_URI_ENV_VAR, TASK_ROLE_ENDPOINT,
};

/// Construction-time configuration shared by the metadata-backed providers.
///
/// There is no process-wide mutable default state; callers either take
/// [`ProviderConfig::default`] (fixed link-local endpoints) or
/// [`ProviderConfig::from_env`] (container task-role environment applied on
/// top) and hand the value to a provider constructor.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Base URL of the instance-metadata service.
    pub instance_metadata_endpoint: String,
    /// Base URL of the task-role credentials service.
    pub task_role_endpoint: String,
    /// Resource path appended to `task_role_endpoint`.
    pub task_role_resource_path: String,
    /// Bearer token sent in the `Authorization` header of task-role fetches.
    pub task_role_auth_token: Option<String>,
    pub refresh_interval: Duration,
    pub max_retries: u32,
    pub retry_base_delay: Duration,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            instance_metadata_endpoint: INSTANCE_METADATA_ENDPOINT.to_string(),
            task_role_endpoint: TASK_ROLE_ENDPOINT.to_string(),
            task_role_resource_path: String::new(),
            task_role_auth_token: None,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_base_delay: DEFAULT_RETRY_BASE_DELAY,
            connect_timeout: CONNECT_TIMEOUT,
            request_timeout: REQUEST_TIMEOUT,
        }
    }
}

impl ProviderConfig {
    /// Defaults with the container credentials environment applied.
    ///
    /// A full URI (`AWS_CONTAINER_CREDENTIALS_FULL_URI`) replaces the
    /// task-role endpoint outright; otherwise a relative URI
    /// (`AWS_CONTAINER_CREDENTIALS_RELATIVE_URI`) is resolved against the
    /// fixed task-role host. `AWS_CONTAINER_AUTHORIZATION_TOKEN` supplies
    /// the optional bearer token.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(full_uri) = non_empty_var(TASK_CREDENTIALS_FULL_URI_ENV_VAR) {
            config.task_role_endpoint = full_uri;
            config.task_role_resource_path = String::new();
        } else if let Some(relative_uri) = non_empty_var(TASK_CREDENTIALS_RELATIVE_URI_ENV_VAR) {
            config.task_role_resource_path = relative_uri;
        }

        config.task_role_auth_token = non_empty_var(TASK_AUTHORIZATION_TOKEN_ENV_VAR);
        config
    }
}

/// `Some(value)` only when the variable is set to a non-empty string.
pub(crate) fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.is_empty())
}
