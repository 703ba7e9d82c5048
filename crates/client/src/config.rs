//! Client runtime configuration.
//!
//! Resolved once at process startup from the environment and then passed into the
//! [`ApiClient`](crate::ApiClient). Request paths never consult the environment themselves.

use crate::error::{ClientError, ClientResult};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_UPLOAD_TIMEOUT: Duration = Duration::from_secs(120);
pub const DEFAULT_DOWNLOAD_DIR: &str = "downloads";
pub const DEFAULT_QUEUE_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Which path layout the backend serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApiVersion {
    /// Paths hang directly off the base URL.
    #[default]
    Unversioned,
    /// Paths hang off `<base>/v1`.
    V1,
}

impl std::str::FromStr for ApiVersion {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(ApiVersion::Unversioned),
            "v1" | "1" => Ok(ApiVersion::V1),
            other => Err(ClientError::Config(format!(
                "HMS_API_VERSION must be 'none' or 'v1', got '{other}'"
            ))),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ClientConfig {
    base_url: String,
    api_version: ApiVersion,
    request_timeout: Duration,
    upload_timeout: Duration,
    session_file: Option<PathBuf>,
    download_dir: PathBuf,
    queue_poll_interval: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            api_version: ApiVersion::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            upload_timeout: DEFAULT_UPLOAD_TIMEOUT,
            session_file: None,
            download_dir: PathBuf::from(DEFAULT_DOWNLOAD_DIR),
            queue_poll_interval: DEFAULT_QUEUE_POLL_INTERVAL,
        }
    }
}

impl ClientConfig {
    /// Create a config for `base_url` with every other setting at its default.
    pub fn new(base_url: impl Into<String>) -> ClientResult<Self> {
        let base_url = base_url.into().trim().trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            return Err(ClientError::Config("base URL cannot be empty".into()));
        }
        Ok(Self {
            base_url,
            ..Self::default()
        })
    }

    /// Read the `HMS_*` variables. Call once at startup, after `dotenvy`.
    pub fn from_env() -> ClientResult<Self> {
        let var = |name: &str| std::env::var(name).ok();

        let mut cfg = Self::new(
            var("HMS_API_BASE_URL")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
        )?;
        cfg.api_version = api_version_from_env_value(var("HMS_API_VERSION"))?;
        cfg.request_timeout =
            secs_from_env_value("HMS_API_TIMEOUT_SECS", var("HMS_API_TIMEOUT_SECS"))?
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT);
        cfg.upload_timeout =
            secs_from_env_value("HMS_UPLOAD_TIMEOUT_SECS", var("HMS_UPLOAD_TIMEOUT_SECS"))?
                .unwrap_or(DEFAULT_UPLOAD_TIMEOUT);
        cfg.queue_poll_interval =
            secs_from_env_value("HMS_QUEUE_POLL_SECS", var("HMS_QUEUE_POLL_SECS"))?
                .unwrap_or(DEFAULT_QUEUE_POLL_INTERVAL);
        cfg.session_file = var("HMS_SESSION_FILE")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);
        if let Some(dir) = var("HMS_DOWNLOAD_DIR").filter(|v| !v.trim().is_empty()) {
            cfg.download_dir = PathBuf::from(dir);
        }
        Ok(cfg)
    }

    pub fn with_api_version(mut self, version: ApiVersion) -> Self {
        self.api_version = version;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_upload_timeout(mut self, timeout: Duration) -> Self {
        self.upload_timeout = timeout;
        self
    }

    pub fn with_session_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_file = Some(path.into());
        self
    }

    pub fn with_download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = dir.into();
        self
    }

    pub fn with_queue_poll_interval(mut self, interval: Duration) -> Self {
        self.queue_poll_interval = interval;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_version(&self) -> ApiVersion {
        self.api_version
    }

    /// Root that endpoint paths are appended to.
    pub fn api_root(&self) -> String {
        match self.api_version {
            ApiVersion::Unversioned => self.base_url.clone(),
            ApiVersion::V1 => format!("{}/v1", self.base_url),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn upload_timeout(&self) -> Duration {
        self.upload_timeout
    }

    pub fn session_file(&self) -> Option<&PathBuf> {
        self.session_file.as_ref()
    }

    pub fn download_dir(&self) -> &PathBuf {
        &self.download_dir
    }

    pub fn queue_poll_interval(&self) -> Duration {
        self.queue_poll_interval
    }
}

/// Parse the API version from an optional string value. Missing or blank means unversioned.
pub fn api_version_from_env_value(value: Option<String>) -> ClientResult<ApiVersion> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(|v| v.parse::<ApiVersion>())
        .transpose()
        .map(Option::unwrap_or_default)
}

/// Parse a whole number of seconds. Missing or blank yields `None`; zero is rejected.
pub fn secs_from_env_value(name: &str, value: Option<String>) -> ClientResult<Option<Duration>> {
    let Some(value) = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    match value.parse::<u64>() {
        Ok(0) | Err(_) => Err(ClientError::Config(format!(
            "{name} must be a positive number of seconds, got '{value}'"
        ))),
        Ok(secs) => Ok(Some(Duration::from_secs(secs))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_trailing_slash() {
        let cfg = ClientConfig::new("http://api.local/api/").unwrap();
        assert_eq!(cfg.base_url(), "http://api.local/api");
        assert_eq!(cfg.api_root(), "http://api.local/api");
        assert!(ClientConfig::new("  ").is_err());
    }

    #[test]
    fn test_v1_root() {
        let cfg = ClientConfig::new("http://api.local/api")
            .unwrap()
            .with_api_version(ApiVersion::V1);
        assert_eq!(cfg.api_root(), "http://api.local/api/v1");
    }

    #[test]
    fn test_api_version_from_env_value() {
        assert_eq!(api_version_from_env_value(None).unwrap(), ApiVersion::Unversioned);
        assert_eq!(
            api_version_from_env_value(Some("  ".into())).unwrap(),
            ApiVersion::Unversioned
        );
        assert_eq!(
            api_version_from_env_value(Some("V1".into())).unwrap(),
            ApiVersion::V1
        );
        assert!(api_version_from_env_value(Some("v7".into())).is_err());
    }

    #[test]
    fn test_secs_from_env_value() {
        assert_eq!(secs_from_env_value("X", None).unwrap(), None);
        assert_eq!(
            secs_from_env_value("X", Some("45".into())).unwrap(),
            Some(Duration::from_secs(45))
        );
        assert!(secs_from_env_value("X", Some("0".into())).is_err());
        assert!(secs_from_env_value("X", Some("soon".into())).is_err());
    }

    #[test]
    fn test_defaults() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.base_url(), DEFAULT_BASE_URL);
        assert_eq!(cfg.request_timeout(), Duration::from_secs(30));
        assert_eq!(cfg.upload_timeout(), Duration::from_secs(120));
        assert_eq!(cfg.queue_poll_interval(), Duration::from_secs(30));
        assert_eq!(cfg.download_dir(), &PathBuf::from("downloads"));
        assert!(cfg.session_file().is_none());
    }
}
