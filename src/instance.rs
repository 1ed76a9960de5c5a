// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::cache::RefreshGate;
use crate::configuration::ProviderConfig;
use crate::fetcher::{CredentialsDocumentSource, InstanceMetadataClient};
use crate::models::{Credentials, CredentialsDocument};
use crate::provider::ProvideCredentials;

struct InstanceState {
    gate: RefreshGate,
    credentials: Credentials,
}

/// Credentials of the instance role, fetched from the instance-metadata
/// service and refreshed at the fixed interval.
///
/// A failed or unparseable fetch leaves the previously cached value in
/// place; the gate timestamp still advances, so a failing service is
/// consulted once per interval rather than on every call.
pub struct InstanceProfileProvider {
    source: Arc<dyn CredentialsDocumentSource>,
    state: RwLock<InstanceState>,
}

impl InstanceProfileProvider {
    pub fn new(config: &ProviderConfig) -> Self {
        tracing::info!(
            "creating instance-profile provider with refresh interval {:?}",
            config.refresh_interval
        );
        Self::with_source(
            Arc::new(InstanceMetadataClient::new(config)),
            config.refresh_interval,
        )
    }

    /// Provider over an injected document source (tests, custom transports).
    pub fn with_source(
        source: Arc<dyn CredentialsDocumentSource>,
        refresh_interval: Duration,
    ) -> Self {
        Self {
            source,
            state: RwLock::new(InstanceState {
                gate: RefreshGate::new(refresh_interval),
                credentials: Credentials::default(),
            }),
        }
    }

    async fn refresh_if_stale(&self) {
        {
            let state = self.state.read().await;
            if !state.gate.is_due() {
                return;
            }
        }

        let mut state = self.state.write().await;
        // Double-check after acquiring the write guard; another task may
        // have reloaded while this one waited.
        if !state.gate.is_due() {
            return;
        }

        self.reload(&mut state).await;
    }

    #[tracing::instrument(skip(self, state))]
    async fn reload(&self, state: &mut InstanceState) {
        tracing::info!("credentials are stale, repulling from the instance metadata service");

        if let Some(body) = self.source.credentials_document().await {
            match CredentialsDocument::from_json(&body) {
                Ok(document) => {
                    tracing::debug!(
                        "pulled instance credentials with access key {}",
                        document.access_key_id
                    );
                    state.credentials = document.into();
                }
                Err(err) => {
                    tracing::warn!("failed to parse instance credentials document: {err}");
                }
            }
        }

        state.gate.mark_reloaded();
    }
}

#[async_trait]
impl ProvideCredentials for InstanceProfileProvider {
    async fn get_credentials(&self) -> Credentials {
        self.refresh_if_stale().await;
        self.state.read().await.credentials.clone()
    }
}
