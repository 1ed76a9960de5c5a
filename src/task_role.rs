// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! Task-role credentials with expiration-aware early refresh.
//!
//! Unlike the other providers this one tracks two staleness signals: the
//! fixed refresh interval and the credential's own expiration timestamp.
//! Either alone triggers a reload. The expiration check subtracts
//! [`EXPIRATION_GRACE_PERIOD`] so a credential is replaced shortly before
//! the service stops honoring it, and a missing or unparseable expiration
//! counts as expiring, so the provider then retries on every call until a
//! good document arrives.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::cache::RefreshGate;
use crate::configuration::ProviderConfig;
use crate::constants::EXPIRATION_GRACE_PERIOD;
use crate::fetcher::{CredentialsDocumentSource, TaskRoleClient};
use crate::models::{Credentials, CredentialsDocument};
use crate::provider::ProvideCredentials;

struct TaskState {
    gate: RefreshGate,
    credentials: Credentials,
    expiration: Option<DateTime<Utc>>,
}

impl TaskState {
    fn expires_soon(&self) -> bool {
        let grace = chrono::Duration::milliseconds(EXPIRATION_GRACE_PERIOD.as_millis() as i64);
        match self.expiration {
            Some(at) => at - Utc::now() < grace,
            None => true,
        }
    }
}

/// Credentials fetched from the task-level metadata endpoint, optionally
/// bearer-token protected.
pub struct TaskRoleProvider {
    source: Arc<dyn CredentialsDocumentSource>,
    state: RwLock<TaskState>,
}

impl TaskRoleProvider {
    pub fn new(config: &ProviderConfig) -> Self {
        tracing::info!(
            "creating task-role provider with refresh interval {:?}",
            config.refresh_interval
        );
        Self::with_source(Arc::new(TaskRoleClient::new(config)), config.refresh_interval)
    }

    /// Provider configured from the container credentials environment
    /// (relative/full URI and authorization token variables).
    pub fn from_env() -> Self {
        Self::new(&ProviderConfig::from_env())
    }

    /// Provider over an injected document source (tests, custom transports).
    pub fn with_source(
        source: Arc<dyn CredentialsDocumentSource>,
        refresh_interval: Duration,
    ) -> Self {
        Self {
            source,
            state: RwLock::new(TaskState {
                gate: RefreshGate::new(refresh_interval),
                credentials: Credentials::default(),
                expiration: None,
            }),
        }
    }

    async fn refresh_if_expired(&self) {
        {
            let state = self.state.read().await;
            if !state.gate.is_due() && !state.expires_soon() {
                return;
            }
        }

        let mut state = self.state.write().await;
        // Double-check both conditions after acquiring the write guard.
        if !state.gate.is_due() && !state.expires_soon() {
            return;
        }

        self.reload(&mut state).await;
    }

    #[tracing::instrument(skip(self, state))]
    async fn reload(&self, state: &mut TaskState) {
        tracing::info!("credentials have expired or will expire, repulling from the task-role service");

        if let Some(body) = self.source.credentials_document().await
            && !body.is_empty()
        {
            match CredentialsDocument::from_json(&body) {
                Ok(document) => {
                    tracing::debug!(
                        "pulled task credentials with access key {}",
                        document.access_key_id
                    );
                    state.expiration = document.parsed_expiration();
                    state.credentials = document.into();
                }
                Err(err) => {
                    tracing::warn!("failed to parse task credentials document: {err}");
                }
            }
        }

        state.gate.mark_reloaded();
    }
}

#[async_trait]
impl ProvideCredentials for TaskRoleProvider {
    async fn get_credentials(&self) -> Credentials {
        self.refresh_if_expired().await;
        self.state.read().await.credentials.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedSource {
        responses: Mutex<VecDeque<Option<String>>>,
        calls: AtomicUsize,
    }

    impl ScriptedSource {
        fn new(responses: Vec<Option<String>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CredentialsDocumentSource for ScriptedSource {
        async fn credentials_document(&self) -> Option<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses.lock().unwrap().pop_front().flatten()
        }
    }

    fn document_expiring_in(access_key: &str, from_now: chrono::Duration) -> Option<String> {
        let expiration = (Utc::now() + from_now).to_rfc3339();
        Some(format!(
            r#"{{"AccessKeyId":"{access_key}","SecretAccessKey":"s","Token":"t","Expiration":"{expiration}"}}"#
        ))
    }

    #[tokio::test]
    async fn test_fresh_credential_is_served_from_cache() {
        let source = Arc::new(ScriptedSource::new(vec![document_expiring_in(
            "AKIA1",
            chrono::Duration::hours(1),
        )]));
        let provider = TaskRoleProvider::with_source(source.clone(), Duration::from_secs(60));

        let first = provider.get_credentials().await;
        let second = provider.get_credentials().await;

        assert_eq!(source.calls(), 1);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_expiring_credential_is_refetched_before_the_interval() {
        // Expiration 3s out is inside the 5s grace period, so the second
        // call refetches even though the 60s interval has not elapsed.
        let source = Arc::new(ScriptedSource::new(vec![
            document_expiring_in("AKIA1", chrono::Duration::seconds(3)),
            document_expiring_in("AKIA2", chrono::Duration::hours(1)),
        ]));
        let provider = TaskRoleProvider::with_source(source.clone(), Duration::from_secs(60));

        assert_eq!(provider.get_credentials().await.access_key_id, "AKIA1");
        assert_eq!(provider.get_credentials().await.access_key_id, "AKIA2");
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_failed_reload_retains_previous_credentials() {
        let source = Arc::new(ScriptedSource::new(vec![
            document_expiring_in("AKIA1", chrono::Duration::seconds(3)),
            None,
        ]));
        let provider = TaskRoleProvider::with_source(source.clone(), Duration::from_secs(60));

        assert_eq!(provider.get_credentials().await.access_key_id, "AKIA1");
        // The refetch forced by the near expiration fails; the cached value
        // is not reset.
        assert_eq!(provider.get_credentials().await.access_key_id, "AKIA1");
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_empty_body_is_ignored() {
        let source = Arc::new(ScriptedSource::new(vec![
            document_expiring_in("AKIA1", chrono::Duration::seconds(3)),
            Some(String::new()),
        ]));
        let provider = TaskRoleProvider::with_source(source.clone(), Duration::from_secs(60));

        assert_eq!(provider.get_credentials().await.access_key_id, "AKIA1");
        assert_eq!(provider.get_credentials().await.access_key_id, "AKIA1");
    }

    #[tokio::test]
    async fn test_missing_expiration_keeps_retrying() {
        let source = Arc::new(ScriptedSource::new(vec![
            Some(r#"{"AccessKeyId":"AKIA1","SecretAccessKey":"s","Token":"t"}"#.to_string()),
            Some(r#"{"AccessKeyId":"AKIA1","SecretAccessKey":"s","Token":"t"}"#.to_string()),
        ]));
        let provider = TaskRoleProvider::with_source(source.clone(), Duration::from_secs(60));

        provider.get_credentials().await;
        provider.get_credentials().await;
        // No expiration in the document counts as expiring soon.
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_callers_trigger_a_single_reload() {
        let source = Arc::new(ScriptedSource::new(vec![document_expiring_in(
            "AKIA1",
            chrono::Duration::hours(1),
        )]));
        let provider = Arc::new(TaskRoleProvider::with_source(
            source.clone(),
            Duration::from_secs(60),
        ));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let provider = provider.clone();
            handles.push(tokio::spawn(async move { provider.get_credentials().await }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap().access_key_id, "AKIA1");
        }

        assert_eq!(source.calls(), 1);
    }
}
