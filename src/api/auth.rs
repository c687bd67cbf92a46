//! Wire contract of the credential-issuance endpoints.
//!
//! These calls deliberately use a bare HTTP client: attaching a stale
//! bearer token to a refresh call, or intercepting a 401 from the login
//! endpoint itself, would be wrong. The request pipeline recognizes the
//! `/auth/` prefix and stays out of the way.

use serde::{Deserialize, Serialize};

use crate::auth::error::AuthError;
use crate::config::ClientConfig;

/// Application status codes carried in auth responses. The server signals
/// these in the payload, possibly under HTTP 200.
pub mod status {
    pub const SUCCESS: i32 = 0;
    pub const USERNAME_ALREADY_TAKEN: i32 = 1;
    pub const EMAIL_ALREADY_TAKEN: i32 = 2;
    pub const USER_NOT_FOUND: i32 = 3;
    pub const INVALID_CREDENTIALS: i32 = 4;
    pub const INVALID_REFRESH_TOKEN: i32 = 5;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierType {
    Username,
    Email,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub identifier: String,
    pub identifier_type: IdentifierType,
    pub password: String,
}

impl LoginRequest {
    pub fn with_username(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            identifier: username.into(),
            identifier_type: IdentifierType::Username,
            password: password.into(),
        }
    }

    pub fn with_email(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            identifier: email.into(),
            identifier_type: IdentifierType::Email,
            password: password.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

/// Response of the login and refresh endpoints. `status_code == 0` means
/// success and both tokens are present; any other code means failure and
/// the tokens are absent.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub status_code: i32,
    #[serde(default)]
    pub status_message: Option<String>,
}

impl AuthResponse {
    pub fn is_success(&self) -> bool {
        self.status_code == status::SUCCESS
    }

    pub fn message(&self) -> &str {
        self.status_message.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub status_code: i32,
    #[serde(default)]
    pub status_message: Option<String>,
}

impl RegisterResponse {
    pub fn message(&self) -> &str {
        self.status_message.as_deref().unwrap_or("")
    }
}

/// Raw round-trips against the `/auth/` endpoints.
#[derive(Debug, Clone)]
pub struct AuthApi {
    client: reqwest::Client,
    login_url: String,
    register_url: String,
    refresh_url: String,
}

impl AuthApi {
    pub fn new(client: reqwest::Client, config: &ClientConfig) -> Self {
        let base = config.base_url();
        Self {
            client,
            login_url: format!("{base}/auth/login"),
            register_url: format!("{base}/auth/register"),
            refresh_url: format!("{base}/auth/refresh"),
        }
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, AuthError> {
        self.post_json(&self.login_url, request).await
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<RegisterResponse, AuthError> {
        self.post_json(&self.register_url, request).await
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthResponse, AuthError> {
        self.post_json(&self.refresh_url, &RefreshRequest { refresh_token })
            .await
    }

    async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T, AuthError>
    where
        B: Serialize,
        T: serde::de::DeserializeOwned,
    {
        let resp = self.client.post(url).json(body).send().await?;
        if !resp.status().is_success() {
            return Err(AuthError::InvalidResponse(format!(
                "Auth request failed with status {}",
                resp.status()
            )));
        }
        Ok(resp.json().await?)
    }
}
