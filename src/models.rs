// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::ZeroizeOnDrop;

/// The access key / secret key / session token triple used to sign outbound
/// requests.
///
/// An empty `access_key_id` (the `Default` value) means "no credentials
/// available" and must never be used for signing; a provider chain treats it
/// as "fall through to the next source". `session_token` is empty for
/// long-lived key pairs.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize, ZeroizeOnDrop)]
pub struct Credentials {
    #[serde(rename = "AccessKeyId")]
    pub access_key_id: String,

    #[serde(rename = "SecretAccessKey")]
    pub secret_access_key: String,

    #[serde(rename = "Token")]
    pub session_token: String,
}

impl Credentials {
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: impl Into<String>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: session_token.into(),
        }
    }

    /// True when this value carries no usable key material.
    pub fn is_empty(&self) -> bool {
        self.access_key_id.is_empty()
    }
}

// Custom Debug implementation to prevent accidental logging of sensitive data
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &"[REDACTED]")
            .field("secret_access_key", &"[REDACTED]")
            .field("session_token", &"[REDACTED]")
            .finish()
    }
}

/// The JSON document served by the metadata endpoints (instance role
/// sub-resource and task-role endpoint).
///
/// `Token` is absent for instance roles without session credentials;
/// `Expiration` is an ISO-8601 timestamp only remote sources carry.
#[derive(Deserialize)]
pub struct CredentialsDocument {
    #[serde(rename = "AccessKeyId")]
    pub access_key_id: String,

    #[serde(rename = "SecretAccessKey")]
    pub secret_access_key: String,

    #[serde(rename = "Token", default)]
    pub session_token: String,

    #[serde(rename = "Expiration", default)]
    pub expiration: Option<String>,
}

impl CredentialsDocument {
    /// Parses a raw metadata response body.
    pub fn from_json(body: &str) -> Result<Self, crate::errors::CredsError> {
        Ok(serde_json::from_str(body)?)
    }

    /// The expiration timestamp, if the document carries one that parses as
    /// ISO-8601. An unparseable timestamp is reported and dropped; callers
    /// treat the credential as already expiring.
    pub fn parsed_expiration(&self) -> Option<DateTime<Utc>> {
        let raw = self.expiration.as_deref()?;
        match DateTime::parse_from_rfc3339(raw) {
            Ok(ts) => Some(ts.with_timezone(&Utc)),
            Err(err) => {
                tracing::warn!("unparseable credential expiration {:?}: {}", raw, err);
                None
            }
        }
    }
}

impl From<CredentialsDocument> for Credentials {
    fn from(doc: CredentialsDocument) -> Self {
        Self {
            access_key_id: doc.access_key_id,
            secret_access_key: doc.secret_access_key,
            session_token: doc.session_token,
        }
    }
}
