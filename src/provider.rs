// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use async_trait::async_trait;

use crate::models::Credentials;

/// The uniform interface every provider variant exposes to signing code.
///
/// The returned value may be [empty](Credentials::is_empty): "this source
/// has nothing configured" is not an error, it tells a caller-side provider
/// chain to fall through to the next source. Resolution never fails and
/// never panics; everything below this boundary is absorbed and logged.
#[async_trait]
pub trait ProvideCredentials: Send + Sync {
    async fn get_credentials(&self) -> Credentials;
}
