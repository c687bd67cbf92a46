//! Authenticated API client.

mod pipeline;

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::api::auth::{status, AuthApi, LoginRequest, RegisterRequest};
use crate::api::Identity;
use crate::auth::{
    AuthError, Credential, CredentialStore, FileCredentialStore, RefreshCoordinator, SessionState,
};
use crate::config::ClientConfig;
use crate::error::{PendelError, Result};

/// Outcome of a login attempt. Application-level rejections arrive in the
/// payload (possibly under HTTP 200) and are outcomes, not errors.
#[derive(Debug, Clone)]
pub enum LoginOutcome {
    /// Tokens saved; `identity` is `None` when the follow-up identity
    /// fetch failed (the session stays logged in, identity pending).
    Success { identity: Option<Identity> },
    UserNotFound,
    InvalidCredentials,
    Rejected { code: i32, message: String },
}

/// Outcome of a registration attempt.
#[derive(Debug, Clone)]
pub enum RegisterOutcome {
    Success,
    UsernameTaken,
    EmailTaken,
    Rejected { code: i32, message: String },
}

/// Client for the tracker API with transparent session handling.
///
/// Owns the credential store, the observable session state, and the
/// refresh coordinator; every request issued through it passes the
/// authenticated pipeline.
///
/// # Example
/// ```no_run
/// use pendel::prelude::*;
///
/// # async fn example() -> pendel::error::Result<()> {
/// let client = Client::new(ClientConfig::from_env());
/// client.init().await?;
/// match client.login(LoginRequest::with_username("mina", "secret")).await? {
///     LoginOutcome::Success { .. } => println!("logged in"),
///     other => println!("rejected: {other:?}"),
/// }
/// # Ok(())
/// # }
/// ```
pub struct Client {
    pub(crate) http: reqwest::Client,
    pub(crate) config: ClientConfig,
    pub(crate) store: Arc<dyn CredentialStore>,
    pub(crate) coordinator: Arc<RefreshCoordinator>,
    session: Arc<SessionState>,
    auth: AuthApi,
}

impl Client {
    /// Create a client with the default file-backed credential store.
    pub fn new(config: ClientConfig) -> Self {
        let store: Arc<dyn CredentialStore> = match config.credentials_dir() {
            Some(dir) => Arc::new(FileCredentialStore::new(dir)),
            None => Arc::new(FileCredentialStore::new_default()),
        };
        Self::with_store(config, store)
    }

    /// Create a client over a caller-supplied credential store.
    pub fn with_store(config: ClientConfig, store: Arc<dyn CredentialStore>) -> Self {
        let http = reqwest::Client::new();
        let session = Arc::new(SessionState::new());
        let auth = AuthApi::new(http.clone(), &config);
        let coordinator = Arc::new(RefreshCoordinator::new(
            auth.clone(),
            Arc::clone(&store),
            Arc::clone(&session),
        ));
        Self {
            http,
            config,
            store,
            coordinator,
            session,
            auth,
        }
    }

    /// Restore the session from storage on startup.
    ///
    /// A stored credential that cannot be resolved to an identity (fetch
    /// fails, or the record carries no user id) is treated as an expired
    /// leftover: both store and session are cleared and startup
    /// continues. The identity fetch runs through the normal pipeline, so
    /// a stale access token gets its one refresh attempt.
    pub async fn init(&self) -> Result<()> {
        let Some(credential) = self.store.load()? else {
            self.session.set_identity(None);
            return Ok(());
        };

        match credential.user_id {
            Some(user_id) => match self.fetch_identity(user_id).await {
                Ok(identity) => {
                    info!(user_id, "session restored from storage");
                    self.session.set_identity(Some(identity));
                    return Ok(());
                }
                Err(err) => warn!(error = %err, "stored session could not be restored"),
            },
            None => warn!("stored credential has no user id; discarding it"),
        }

        self.store.clear()?;
        self.session.set_identity(None);
        Ok(())
    }

    /// Authenticate against `/auth/login`.
    ///
    /// On success the token pair is saved and the identity is loaded into
    /// the session; a failed identity fetch is tolerated (tokens stay
    /// saved, identity stays unset).
    pub async fn login(&self, request: LoginRequest) -> Result<LoginOutcome> {
        let response = self.auth.login(&request).await?;
        match response.status_code {
            status::SUCCESS => {
                let (Some(token), Some(refresh_token)) = (response.token, response.refresh_token)
                else {
                    return Err(PendelError::Auth(AuthError::InvalidResponse(
                        "login response missing tokens".to_string(),
                    )));
                };
                self.store
                    .save(&Credential::new(token, refresh_token, response.user_id))?;

                let identity = match response.user_id {
                    Some(user_id) => match self.fetch_identity(user_id).await {
                        Ok(identity) => {
                            self.session.set_identity(Some(identity.clone()));
                            Some(identity)
                        }
                        Err(err) => {
                            warn!(error = %err, "identity fetch after login failed");
                            None
                        }
                    },
                    None => None,
                };
                Ok(LoginOutcome::Success { identity })
            }
            status::USER_NOT_FOUND => Ok(LoginOutcome::UserNotFound),
            status::INVALID_CREDENTIALS => Ok(LoginOutcome::InvalidCredentials),
            code => Ok(LoginOutcome::Rejected {
                code,
                message: response.message().to_string(),
            }),
        }
    }

    /// Register a new account against `/auth/register`.
    pub async fn register(&self, request: RegisterRequest) -> Result<RegisterOutcome> {
        let response = self.auth.register(&request).await?;
        match response.status_code {
            status::SUCCESS => Ok(RegisterOutcome::Success),
            status::USERNAME_ALREADY_TAKEN => Ok(RegisterOutcome::UsernameTaken),
            status::EMAIL_ALREADY_TAKEN => Ok(RegisterOutcome::EmailTaken),
            code => Ok(RegisterOutcome::Rejected {
                code,
                message: response.message().to_string(),
            }),
        }
    }

    /// Clear the stored credential and the session.
    pub fn logout(&self) -> Result<()> {
        self.store.clear()?;
        self.session.set_identity(None);
        Ok(())
    }

    /// Fetch the identity of a user through the authenticated pipeline.
    pub async fn fetch_identity(&self, user_id: i64) -> Result<Identity> {
        self.get_json(&format!("/api/v1/users/{user_id}")).await
    }

    /// Register the hook invoked once per failed refresh, after the
    /// session has been cleared (typically navigation to the login view).
    pub fn on_session_expired(&self, hook: impl Fn() + Send + Sync + 'static) {
        self.coordinator.set_expired_hook(hook);
    }

    // Session passthroughs.

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn current_identity(&self) -> Option<Identity> {
        self.session.current()
    }

    pub fn permissions(&self) -> HashSet<String> {
        self.session.permissions()
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.session.has_permission(permission)
    }

    pub fn has_any_permission(&self, permissions: &[&str]) -> bool {
        self.session.has_any_permission(permissions)
    }

    pub fn has_all_permissions(&self, permissions: &[&str]) -> bool {
        self.session.has_all_permissions(permissions)
    }

    /// Subscribe to identity changes (observed on the receiver's next poll).
    pub fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.session.subscribe()
    }

    pub fn session(&self) -> &Arc<SessionState> {
        &self.session
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }
}
