// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use async_trait::async_trait;

use crate::configuration::non_empty_var;
use crate::constants::{ACCESS_KEY_ENV_VAR, SECRET_KEY_ENV_VAR, SESSION_TOKEN_ENV_VAR};
use crate::models::Credentials;
use crate::provider::ProvideCredentials;

/// Credentials taken directly from the process environment.
///
/// No caching is applied: environment reads are cheap and the variables are
/// effectively static for the process lifetime, so every call re-reads them.
/// Without an access key the provider contributes nothing.
#[derive(Debug, Default)]
pub struct EnvironmentProvider;

impl EnvironmentProvider {
    pub fn new() -> Self {
        Self
    }

    fn read_credentials(&self) -> Credentials {
        let Some(access_key) = non_empty_var(ACCESS_KEY_ENV_VAR) else {
            return Credentials::default();
        };

        tracing::debug!("found credentials in environment with access key id {access_key}");

        let secret_key = non_empty_var(SECRET_KEY_ENV_VAR).unwrap_or_default();
        let session_token = non_empty_var(SESSION_TOKEN_ENV_VAR).unwrap_or_default();

        Credentials::new(access_key, secret_key, session_token)
    }
}

#[async_trait]
impl ProvideCredentials for EnvironmentProvider {
    async fn get_credentials(&self) -> Credentials {
        self.read_credentials()
    }
}
