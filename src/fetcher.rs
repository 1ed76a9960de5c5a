// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! Retrying HTTP access to the metadata services.
//!
//! [`ResourceFetcher`] performs one logical GET against a metadata resource,
//! looping over attempts under the [`RetryPolicy`]. The two thin clients on
//! top of it know the concrete resources: [`InstanceMetadataClient`] walks
//! the two-step security-credentials discovery (role listing, then the
//! role's own document) and derives the region from the availability zone;
//! [`TaskRoleClient`] fetches the task-level document with an optional
//! bearer token.
//!
//! Both clients implement [`CredentialsDocumentSource`], the seam the
//! providers consume so tests can inject a canned source.

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;

use crate::configuration::ProviderConfig;
use crate::constants::{
    AVAILABILITY_ZONE_RESOURCE, SECURITY_CREDENTIALS_RESOURCE, USER_AGENT,
};
use crate::retry::{FetchError, RetryPolicy};

/// A source of raw credential documents (the fetch boundary of a provider).
///
/// `None` means "no data this cycle"; retries are already exhausted below
/// this seam, the caller just keeps its previous value.
#[async_trait]
pub trait CredentialsDocumentSource: Send + Sync {
    async fn credentials_document(&self) -> Option<String>;
}

/// GET against a metadata-service resource with bounded retries.
pub struct ResourceFetcher {
    // None when the HTTP client could not be constructed; every fetch then
    // reports failure instead of the constructor raising.
    client: Option<reqwest::Client>,
    retry: RetryPolicy,
}

impl ResourceFetcher {
    pub fn new(config: &ProviderConfig) -> Self {
        // Credential material must never transit a proxy.
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .no_proxy()
            .build();

        let client = match client {
            Ok(client) => Some(client),
            Err(err) => {
                tracing::error!("failed to construct metadata http client: {err}");
                None
            }
        };

        Self {
            client,
            retry: RetryPolicy::new(config.max_retries, config.retry_base_delay),
        }
    }

    /// Fetches `endpoint` + `resource`, retrying per the policy.
    ///
    /// Returns the response body on `200 OK`, `None` once retries are
    /// exhausted or the failure is not retriable.
    pub async fn get_resource(
        &self,
        endpoint: &str,
        resource: &str,
        auth_token: Option<&str>,
    ) -> Option<String> {
        let Some(client) = &self.client else {
            tracing::error!("no http client available, cannot retrieve {resource}");
            return None;
        };

        let url = format!("{endpoint}{resource}");
        tracing::trace!("retrieving credentials from {url}");

        let mut attempt: u32 = 0;
        loop {
            let mut request = client.get(&url);
            if let Some(token) = auth_token {
                request = request.header(AUTHORIZATION, token);
            }

            let error = match request.send().await {
                Ok(response) if response.status() == StatusCode::OK => {
                    match response.text().await {
                        Ok(body) => return Some(body),
                        Err(err) => {
                            tracing::warn!("failed to read metadata response body: {err}");
                            FetchError::Connect
                        }
                    }
                }
                Ok(response) => {
                    tracing::warn!(
                        "request to retrieve credentials failed with status {}",
                        response.status()
                    );
                    FetchError::Status(response.status())
                }
                Err(err) => {
                    tracing::warn!("request to retrieve credentials failed: {err}");
                    FetchError::Connect
                }
            };

            if !self.retry.should_retry(error, attempt) {
                tracing::error!("cannot retrieve resource {resource}");
                return None;
            }

            let delay = self.retry.delay_before_next_retry(error, attempt);
            tracing::warn!("request failed, waiting {delay:?} before attempting again");
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

/// Client for the instance-metadata service.
pub struct InstanceMetadataClient {
    fetcher: ResourceFetcher,
    endpoint: String,
}

impl InstanceMetadataClient {
    pub fn new(config: &ProviderConfig) -> Self {
        Self {
            fetcher: ResourceFetcher::new(config),
            endpoint: config.instance_metadata_endpoint.clone(),
        }
    }

    async fn get_resource(&self, resource: &str) -> Option<String> {
        self.fetcher.get_resource(&self.endpoint, resource, None).await
    }

    /// Two-step fetch of the instance role's credentials document: the
    /// security-credentials listing names the current role, the role
    /// sub-resource carries the key material.
    pub async fn default_role_credentials(&self) -> Option<String> {
        let listing = self.get_resource(SECURITY_CREDENTIALS_RESOURCE).await?;
        let trimmed = listing.trim();
        tracing::debug!("security-credentials listing returned {trimmed:?}");

        let Some(role) = trimmed.lines().map(str::trim).find(|line| !line.is_empty()) else {
            tracing::warn!("security-credentials listing contained no role");
            return None;
        };

        self.get_resource(&format!("{SECURITY_CREDENTIALS_RESOURCE}/{role}"))
            .await
    }

    /// Region of the running instance, derived from its availability zone.
    pub async fn current_region(&self) -> Option<String> {
        let az = self.get_resource(AVAILABILITY_ZONE_RESOURCE).await?;
        let az = az.trim();
        if az.is_empty() {
            tracing::info!("unable to pull region from instance metadata service");
            return None;
        }

        let region = region_from_availability_zone(az);
        tracing::debug!("detected current region as {region}");
        Some(region)
    }
}

#[async_trait]
impl CredentialsDocumentSource for InstanceMetadataClient {
    async fn credentials_document(&self) -> Option<String> {
        self.default_role_credentials().await
    }
}

/// Client for the task-role credentials endpoint.
pub struct TaskRoleClient {
    fetcher: ResourceFetcher,
    endpoint: String,
    resource_path: String,
    auth_token: Option<String>,
}

impl TaskRoleClient {
    /// Endpoint, resource path, and token all come from the configuration
    /// (see [`ProviderConfig::from_env`] for the container environment).
    pub fn new(config: &ProviderConfig) -> Self {
        Self {
            fetcher: ResourceFetcher::new(config),
            endpoint: config.task_role_endpoint.clone(),
            resource_path: config.task_role_resource_path.clone(),
            auth_token: config.task_role_auth_token.clone(),
        }
    }
}

#[async_trait]
impl CredentialsDocumentSource for TaskRoleClient {
    async fn credentials_document(&self) -> Option<String> {
        self.fetcher
            .get_resource(&self.endpoint, &self.resource_path, self.auth_token.as_deref())
            .await
    }
}

/// Keeps leading characters through the first digit run and drops the
/// zone suffix: `us-east-1a` becomes `us-east-1`.
fn region_from_availability_zone(az: &str) -> String {
    let mut region = String::with_capacity(az.len());
    let mut digit_seen = false;

    for character in az.chars() {
        if digit_seen && !character.is_ascii_digit() {
            break;
        }
        if character.is_ascii_digit() {
            digit_seen = true;
        }
        region.push(character);
    }

    region
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_truncates_zone_letter() {
        assert_eq!(region_from_availability_zone("us-east-1a"), "us-east-1");
        assert_eq!(region_from_availability_zone("eu-west-2c"), "eu-west-2");
    }

    #[test]
    fn test_region_without_zone_suffix_is_unchanged() {
        assert_eq!(region_from_availability_zone("us-west-2"), "us-west-2");
    }

    #[test]
    fn test_region_keeps_digits_inside_the_run() {
        assert_eq!(region_from_availability_zone("ap-southeast-11b"), "ap-southeast-11");
    }

    #[test]
    fn test_region_without_digits_is_passed_through() {
        assert_eq!(region_from_availability_zone("localzone"), "localzone");
    }
}
