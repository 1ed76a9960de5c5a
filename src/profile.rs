// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! Credentials read from the on-disk profile file pair.
//!
//! Two files participate: the credentials file (`~/.aws/credentials`, or the
//! `AWS_SHARED_CREDENTIALS_FILE` override) and the config file
//! (`~/.aws/config`), whose section names may carry a `profile ` prefix.
//! The credentials file is authoritative; the config file is a pure
//! fallback, consulted only when the credentials file fails to load and
//! when the resolved profile is absent from the credentials map.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use ini::Ini;
use tokio::sync::RwLock;

use crate::cache::RefreshGate;
use crate::configuration::non_empty_var;
use crate::constants::{
    CONFIG_FILENAME, CREDENTIALS_FILENAME, CREDENTIALS_FILE_ENV_VAR, DEFAULT_PROFILE,
    DEFAULT_PROFILE_ENV_VAR, PROFILE_DIRECTORY, PROFILE_ENV_VAR,
};
use crate::errors::CredsError;
use crate::models::Credentials;
use crate::provider::ProvideCredentials;

const ACCESS_KEY_PROPERTY: &str = "aws_access_key_id";
const SECRET_KEY_PROPERTY: &str = "aws_secret_access_key";
const SESSION_TOKEN_PROPERTY: &str = "aws_session_token";
const REGION_PROPERTY: &str = "region";

/// One named section parsed out of a profile file.
#[derive(Clone)]
pub struct Profile {
    pub name: String,
    pub credentials: Credentials,
    pub region: Option<String>,
}

/// Path of the credentials file: the `AWS_SHARED_CREDENTIALS_FILE` override
/// if set, else `<home>/.aws/credentials`.
pub fn credentials_profile_filename() -> PathBuf {
    match non_empty_var(CREDENTIALS_FILE_ENV_VAR) {
        Some(path) => PathBuf::from(path),
        None => base_directory().join(PROFILE_DIRECTORY).join(CREDENTIALS_FILENAME),
    }
}

/// Path of the config file: `<home>/.aws/config`.
pub fn config_profile_filename() -> PathBuf {
    base_directory().join(PROFILE_DIRECTORY).join(CONFIG_FILENAME)
}

/// Directory holding the profile file pair.
pub fn profile_directory() -> Option<PathBuf> {
    credentials_profile_filename().parent().map(Path::to_path_buf)
}

/// Profile name to use: an explicit argument wins, then
/// `AWS_DEFAULT_PROFILE`, then `AWS_PROFILE`, then `"default"`.
pub fn resolve_profile_name(explicit: Option<&str>) -> String {
    if let Some(name) = explicit {
        return name.to_string();
    }
    non_empty_var(DEFAULT_PROFILE_ENV_VAR)
        .or_else(|| non_empty_var(PROFILE_ENV_VAR))
        .unwrap_or_else(|| DEFAULT_PROFILE.to_string())
}

// An unresolvable home directory degrades to a relative path whose load
// fails and is logged, the same as any other unreadable file.
fn base_directory() -> PathBuf {
    dirs::home_dir().unwrap_or_default()
}

/// Parses one INI-style profile file into a map of named profiles.
pub struct ProfileFileLoader {
    path: PathBuf,
    strip_profile_prefix: bool,
}

impl ProfileFileLoader {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            strip_profile_prefix: false,
        }
    }

    /// Loader for the config-file format, where sections other than
    /// `[default]` are written as `[profile <name>]`.
    pub fn with_profile_prefix(path: PathBuf) -> Self {
        Self {
            path,
            strip_profile_prefix: true,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> Result<HashMap<String, Profile>, CredsError> {
        let contents = tokio::fs::read_to_string(&self.path).await?;
        let document = Ini::load_from_str(&contents)?;

        let mut profiles = HashMap::new();
        for (section, properties) in document.iter() {
            let Some(section) = section else { continue };
            let name = if self.strip_profile_prefix {
                section.strip_prefix("profile ").unwrap_or(section)
            } else {
                section
            };
            let name = name.trim();
            if name.is_empty() {
                continue;
            }

            let credentials = Credentials::new(
                properties.get(ACCESS_KEY_PROPERTY).unwrap_or_default(),
                properties.get(SECRET_KEY_PROPERTY).unwrap_or_default(),
                properties.get(SESSION_TOKEN_PROPERTY).unwrap_or_default(),
            );
            let region = properties.get(REGION_PROPERTY).map(str::to_string);

            profiles.insert(
                name.to_string(),
                Profile {
                    name: name.to_string(),
                    credentials,
                    region,
                },
            );
        }

        tracing::debug!("loaded {} profiles from {}", profiles.len(), self.path.display());
        Ok(profiles)
    }
}

struct FileState {
    gate: RefreshGate,
    credentials_profiles: HashMap<String, Profile>,
    config_profiles: HashMap<String, Profile>,
}

/// Credentials for a named profile out of the credentials/config file pair,
/// re-read at the refresh interval.
pub struct ProfileFileProvider {
    profile_name: String,
    credentials_loader: ProfileFileLoader,
    config_loader: ProfileFileLoader,
    state: RwLock<FileState>,
}

impl ProfileFileProvider {
    /// Provider for the environment-resolved profile name at the default
    /// file locations.
    pub fn new(refresh_interval: Duration) -> Self {
        Self::with_profile_name(resolve_profile_name(None), refresh_interval)
    }

    /// Provider pinned to an explicit profile name.
    pub fn with_profile_name(profile_name: impl Into<String>, refresh_interval: Duration) -> Self {
        Self::with_files(
            profile_name,
            credentials_profile_filename(),
            config_profile_filename(),
            refresh_interval,
        )
    }

    /// Provider reading an explicit file pair; the config file is parsed
    /// with the `profile ` section prefix.
    pub fn with_files(
        profile_name: impl Into<String>,
        credentials_path: PathBuf,
        config_path: PathBuf,
        refresh_interval: Duration,
    ) -> Self {
        let profile_name = profile_name.into();
        let credentials_loader = ProfileFileLoader::new(credentials_path);
        let config_loader = ProfileFileLoader::with_profile_prefix(config_path);

        tracing::info!(
            "reading credentials from {} with fallback {} for profile {}",
            credentials_loader.path().display(),
            config_loader.path().display(),
            profile_name
        );

        Self {
            profile_name,
            credentials_loader,
            config_loader,
            state: RwLock::new(FileState {
                gate: RefreshGate::new(refresh_interval),
                credentials_profiles: HashMap::new(),
                config_profiles: HashMap::new(),
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
    async fn reload(&self, state: &mut FileState) {
        match self.credentials_loader.load().await {
            Ok(profiles) => state.credentials_profiles = profiles,
            Err(err) => {
                tracing::warn!(
                    "failed to load credentials file {}: {err}",
                    self.credentials_loader.path().display()
                );
                // Fall back to the config file; a failure there keeps the
                // previously parsed map as well.
                match self.config_loader.load().await {
                    Ok(profiles) => state.config_profiles = profiles,
                    Err(err) => tracing::warn!(
                        "failed to load config file {}: {err}",
                        self.config_loader.path().display()
                    ),
                }
            }
        }

        state.gate.mark_reloaded();
    }
}

#[async_trait]
impl ProvideCredentials for ProfileFileProvider {
    async fn get_credentials(&self) -> Credentials {
        self.refresh_if_stale().await;

        let state = self.state.read().await;
        if let Some(profile) = state.credentials_profiles.get(&self.profile_name) {
            return profile.credentials.clone();
        }
        if let Some(profile) = state.config_profiles.get(&self.profile_name) {
            return profile.credentials.clone();
        }
        Credentials::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[tokio::test]
    async fn test_loader_parses_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "credentials",
            "[default]\n\
             aws_access_key_id = AKIA1\n\
             aws_secret_access_key = secret1\n\
             \n\
             [session]\n\
             aws_access_key_id = AKIA2\n\
             aws_secret_access_key = secret2\n\
             aws_session_token = token2\n\
             region = eu-west-1\n",
        );

        let profiles = ProfileFileLoader::new(path).load().await.unwrap();
        assert_eq!(profiles.len(), 2);
        assert_eq!(
            profiles["default"].credentials,
            Credentials::new("AKIA1", "secret1", "")
        );
        assert_eq!(
            profiles["session"].credentials,
            Credentials::new("AKIA2", "secret2", "token2")
        );
        assert_eq!(profiles["session"].region.as_deref(), Some("eu-west-1"));
    }

    #[tokio::test]
    async fn test_loader_strips_profile_prefix_in_config_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "config",
            "[default]\n\
             region = us-east-1\n\
             \n\
             [profile other]\n\
             aws_access_key_id = AKIA3\n\
             aws_secret_access_key = secret3\n",
        );

        let profiles = ProfileFileLoader::with_profile_prefix(path).load().await.unwrap();
        assert!(profiles.contains_key("default"));
        assert!(profiles.contains_key("other"));
        assert_eq!(
            profiles["other"].credentials,
            Credentials::new("AKIA3", "secret3", "")
        );
    }

    #[tokio::test]
    async fn test_loader_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let loader = ProfileFileLoader::new(dir.path().join("missing"));
        assert!(loader.load().await.is_err());
    }

    #[tokio::test]
    async fn test_credentials_file_wins_over_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let credentials_path = write_file(
            &dir,
            "credentials",
            "[team]\naws_access_key_id = FROM_CREDS\naws_secret_access_key = s1\n",
        );
        let config_path = write_file(
            &dir,
            "config",
            "[profile team]\naws_access_key_id = FROM_CONFIG\naws_secret_access_key = s2\n",
        );

        let provider =
            ProfileFileProvider::with_files("team", credentials_path, config_path, Duration::ZERO);
        let creds = provider.get_credentials().await;
        assert_eq!(creds.access_key_id, "FROM_CREDS");
    }

    #[tokio::test]
    async fn test_config_file_is_used_when_credentials_file_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = write_file(
            &dir,
            "config",
            "[profile fallback]\naws_access_key_id = AKIA9\naws_secret_access_key = s9\n",
        );

        let provider = ProfileFileProvider::with_files(
            "fallback",
            dir.path().join("missing-credentials"),
            config_path,
            Duration::ZERO,
        );
        let creds = provider.get_credentials().await;
        assert_eq!(creds, Credentials::new("AKIA9", "s9", ""));
    }

    #[tokio::test]
    async fn test_unknown_profile_yields_empty_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let credentials_path = write_file(
            &dir,
            "credentials",
            "[default]\naws_access_key_id = AKIA1\naws_secret_access_key = s1\n",
        );

        let provider = ProfileFileProvider::with_files(
            "nonexistent",
            credentials_path,
            dir.path().join("missing-config"),
            Duration::ZERO,
        );
        assert!(provider.get_credentials().await.is_empty());
    }

    #[tokio::test]
    async fn test_failed_reload_retains_previous_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let credentials_path = write_file(
            &dir,
            "credentials",
            "[default]\naws_access_key_id = AKIA1\naws_secret_access_key = s1\n",
        );

        // Zero interval forces a reload on every call.
        let provider = ProfileFileProvider::with_files(
            "default",
            credentials_path.clone(),
            dir.path().join("missing-config"),
            Duration::ZERO,
        );
        assert_eq!(provider.get_credentials().await.access_key_id, "AKIA1");

        // The file disappears; the next reload fails on both files and the
        // previously parsed map keeps serving.
        std::fs::remove_file(&credentials_path).unwrap();
        assert_eq!(provider.get_credentials().await.access_key_id, "AKIA1");
    }

    #[test]
    fn test_explicit_profile_name_wins() {
        assert_eq!(resolve_profile_name(Some("pinned")), "pinned");
    }
}
