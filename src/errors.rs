// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

/// Errors raised by the collaborator layers (file IO, parsing, endpoint
/// configuration).
///
/// None of these cross the provider boundary: `get_credentials()` absorbs
/// them into "stale-but-retained" or empty results and logs the cause.
#[derive(thiserror::Error, Debug)]
pub enum CredsError {
    #[error("error reading profile file: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("error parsing profile file: {0}")]
    ProfileParse(#[from] ini::ParseError),
    #[error("error parsing credentials document: {0}")]
    DocumentParse(#[from] serde_json::Error),
}
