// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use std::time::Duration;

pub const ACCESS_KEY_ENV_VAR: &str = "AWS_ACCESS_KEY_ID";
pub const SECRET_KEY_ENV_VAR: &str = "AWS_SECRET_ACCESS_KEY";
pub const SESSION_TOKEN_ENV_VAR: &str = "AWS_SESSION_TOKEN";

pub const PROFILE_ENV_VAR: &str = "AWS_PROFILE";
pub const DEFAULT_PROFILE_ENV_VAR: &str = "AWS_DEFAULT_PROFILE";
pub const CREDENTIALS_FILE_ENV_VAR: &str = "AWS_SHARED_CREDENTIALS_FILE";
pub const DEFAULT_PROFILE: &str = "default";

/// Directory under the user's home that holds the profile file pair.
pub const PROFILE_DIRECTORY: &str = ".aws";
pub const CREDENTIALS_FILENAME: &str = "credentials";
pub const CONFIG_FILENAME: &str = "config";

pub const INSTANCE_METADATA_ENDPOINT: &str = "http://169.254.169.254";
pub const SECURITY_CREDENTIALS_RESOURCE: &str = "/latest/meta-data/iam/security-credentials";
pub const AVAILABILITY_ZONE_RESOURCE: &str = "/latest/meta-data/placement/availability-zone";

pub const TASK_ROLE_ENDPOINT: &str = "http://169.254.170.2";
pub const TASK_CREDENTIALS_RELATIVE_URI_ENV_VAR: &str = "AWS_CONTAINER_CREDENTIALS_RELATIVE_URI";
pub const TASK_CREDENTIALS_FULL_URI_ENV_VAR: &str = "AWS_CONTAINER_CREDENTIALS_FULL_URI";
pub const TASK_AUTHORIZATION_TOKEN_ENV_VAR: &str = "AWS_CONTAINER_AUTHORIZATION_TOKEN";

/// How long a cached value is trusted before the source is re-consulted.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(15 * 60);
/// Safety margin subtracted from a credential's real expiration; a task-role
/// credential inside this window is refreshed even if the interval has not
/// elapsed.
pub const EXPIRATION_GRACE_PERIOD: Duration = Duration::from_millis(5000);

// The metadata service throttles by delaying its response, so the request
// timeout is generous and retries are spaced in the order of seconds.
pub const DEFAULT_MAX_RETRIES: u32 = 4;
pub const DEFAULT_RETRY_BASE_DELAY: Duration = Duration::from_millis(1000);
pub const CONNECT_TIMEOUT: Duration = Duration::from_millis(1000);
pub const REQUEST_TIMEOUT: Duration = Duration::from_millis(5000);

pub const USER_AGENT: &str = concat!("credcache/", env!("CARGO_PKG_VERSION"));
