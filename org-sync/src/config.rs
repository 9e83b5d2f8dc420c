//! Client configuration loaded via OrthoConfig.

use std::path::{Path, PathBuf};
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Settings for the organization API client and cache mirror.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ORG_SYNC")]
pub struct OrgSyncSettings {
    /// Base URL of the backend API, without a trailing slash.
    pub api_base_url: Option<String>,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: Option<u64>,
    /// Bearer token attached to every request.
    pub access_token: Option<String>,
    /// Directory holding the file cache mirror. No file cache when unset.
    pub cache_dir: Option<PathBuf>,
}

impl OrgSyncSettings {
    /// Return the configured API base URL, falling back to the default.
    pub fn api_base_url(&self) -> &str {
        self.api_base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_API_BASE_URL)
    }

    /// Return the request timeout; zero falls back to the default.
    pub fn request_timeout(&self) -> Duration {
        let secs = self
            .request_timeout_secs
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }

    /// Return the access token when one is configured and non-blank.
    pub fn access_token(&self) -> Option<&str> {
        self.access_token
            .as_deref()
            .filter(|token| !token.trim().is_empty())
    }

    /// Return the file cache directory, if configured.
    pub fn cache_dir(&self) -> Option<&Path> {
        self.cache_dir.as_deref()
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for client configuration parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    fn load_from_empty_args() -> OrgSyncSettings {
        OrgSyncSettings::load_from_iter([OsString::from("org-snapshot")])
            .expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env([
            ("ORG_SYNC_API_BASE_URL", None::<String>),
            ("ORG_SYNC_REQUEST_TIMEOUT_SECS", None::<String>),
            ("ORG_SYNC_ACCESS_TOKEN", None::<String>),
            ("ORG_SYNC_CACHE_DIR", None::<String>),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.api_base_url(), DEFAULT_API_BASE_URL);
        assert_eq!(
            settings.request_timeout(),
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)
        );
        assert!(settings.access_token().is_none());
        assert!(settings.cache_dir().is_none());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            (
                "ORG_SYNC_API_BASE_URL",
                Some("https://portal.example.com/api".to_owned()),
            ),
            ("ORG_SYNC_REQUEST_TIMEOUT_SECS", Some("5".to_owned())),
            ("ORG_SYNC_ACCESS_TOKEN", Some("secret".to_owned())),
            ("ORG_SYNC_CACHE_DIR", Some("/tmp/org-sync".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.api_base_url(), "https://portal.example.com/api");
        assert_eq!(settings.request_timeout(), Duration::from_secs(5));
        assert_eq!(settings.access_token(), Some("secret"));
        assert_eq!(settings.cache_dir(), Some(Path::new("/tmp/org-sync")));
    }

    #[rstest]
    fn blank_values_fall_back() {
        let _guard = lock_env([
            ("ORG_SYNC_API_BASE_URL", Some("  ".to_owned())),
            ("ORG_SYNC_REQUEST_TIMEOUT_SECS", Some("0".to_owned())),
            ("ORG_SYNC_ACCESS_TOKEN", Some(" ".to_owned())),
            ("ORG_SYNC_CACHE_DIR", None::<String>),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.api_base_url(), DEFAULT_API_BASE_URL);
        assert_eq!(
            settings.request_timeout(),
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)
        );
        assert!(settings.access_token().is_none());
    }
}
