//! Client configuration (code > env > defaults).

use std::path::PathBuf;

use reqwest::Url;

use crate::error::PendelError;

/// Default API base URL, matching a locally running tracker backend.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Path prefix of the credential-issuance endpoints (login, register,
/// refresh). Requests under this prefix bypass the interceptor.
pub const AUTH_PATH_PREFIX: &str = "/auth/";

/// Configuration for a [`Client`](crate::client::Client).
///
/// # Example
/// ```no_run
/// use pendel::config::ClientConfig;
///
/// let config = ClientConfig::new("https://tracker.example.com");
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    base_url: String,
    credentials_dir: Option<PathBuf>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: trim_trailing_slash(base_url.into()),
            credentials_dir: None,
        }
    }

    /// Load from environment variables (`PENDEL_BASE_URL`,
    /// `PENDEL_CREDENTIALS_DIR`), reading `.env` if present.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        let base_url =
            std::env::var("PENDEL_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let credentials_dir = std::env::var("PENDEL_CREDENTIALS_DIR")
            .ok()
            .map(PathBuf::from);
        Self {
            base_url: trim_trailing_slash(base_url),
            credentials_dir,
        }
    }

    /// Override the directory used by the file-backed credential store.
    pub fn with_credentials_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.credentials_dir = Some(dir.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credentials_dir(&self) -> Option<&PathBuf> {
        self.credentials_dir.as_ref()
    }

    /// Resolve an absolute URL for an API path.
    pub fn endpoint(&self, path: &str) -> Result<Url, PendelError> {
        let joined = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        Url::parse(&joined)
            .map_err(|err| PendelError::Configuration(format!("invalid endpoint {joined}: {err}")))
    }

    /// Whether a URL addresses a credential-issuance endpoint.
    pub fn is_auth_endpoint(&self, url: &Url) -> bool {
        url.path().starts_with(AUTH_PATH_PREFIX)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

fn trim_trailing_slash(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}
