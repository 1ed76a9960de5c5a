// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! # credcache
//!
//! Resolution and caching of short-lived cloud access credentials.
//!
//! Signing code asks a provider for the current [`Credentials`]; the
//! provider answers from its cache and consults its source (process
//! environment, the on-disk profile file pair, the instance-metadata
//! service, or a task-role endpoint) only when a refresh is actually due.
//!
//! ## Architecture
//!
//! ```text
//! Signer -> ProvideCredentials -> provider cache (RwLock + RefreshGate)
//!                                      |
//!                                      +-> env vars        (environment)
//!                                      +-> ~/.aws files    (profile)
//!                                      +-> instance metadata service
//!                                      +-> task-role endpoint
//! ```
//!
//! Each provider pairs a [`cache::RefreshGate`] with a source-specific
//! reload routine behind one `RwLock`, using a double-checked refresh: a
//! read-guard staleness check serves the common path, and the reload runs
//! under the write guard only after the check is repeated there. The
//! task-role provider additionally refreshes early when the credential's
//! own expiration falls within the grace period.
//!
//! ## Modules
//!
//! - [`cache`]: the shared refresh gate and the double-checked pattern
//! - [`configuration`]: explicit provider configuration with env overlays
//! - [`constants`]: well-known variable names, endpoints, and intervals
//! - [`environment`]: credentials from process environment variables
//! - [`errors`]: collaborator error types (absorbed at the provider boundary)
//! - [`fetcher`]: retrying HTTP access to the metadata services
//! - [`instance`]: the instance-role provider
//! - [`models`]: the credentials value and metadata document types
//! - [`profile`]: the profile-file loader and provider
//! - [`provider`]: the uniform `get_credentials` interface
//! - [`retry`]: bounded retry policy and failure classification
//! - [`task_role`]: the expiration-aware task-role provider
//!
//! ## Failure behavior
//!
//! `get_credentials()` never fails: a source with nothing configured yields
//! empty credentials (a chain falls through), and fetch or parse failures
//! keep the previous cached value, retried at the pace of the refresh
//! interval.
//!
//! ## Security Considerations
//!
//! - Credential values are zeroized on drop and `Debug`-redacted
//! - Metadata fetches bypass any configured proxy
//! - No credential material is persisted to disk by this crate

pub mod cache;
pub mod configuration;
pub mod constants;
pub mod environment;
pub mod errors;
pub mod fetcher;
pub mod instance;
pub mod models;
pub mod profile;
pub mod provider;
pub mod retry;
pub mod task_role;

pub use configuration::ProviderConfig;
pub use environment::EnvironmentProvider;
pub use errors::CredsError;
pub use instance::InstanceProfileProvider;
pub use models::Credentials;
pub use profile::ProfileFileProvider;
pub use provider::ProvideCredentials;
pub use task_role::TaskRoleProvider;
