//! Single-flight session refresh.

use std::sync::{Arc, Mutex, RwLock};

use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::api::auth::AuthApi;
use crate::auth::credential::Credential;
use crate::auth::error::AuthError;
use crate::auth::session::SessionState;
use crate::auth::store::CredentialStore;

type RefreshOutcome = Result<Credential, AuthError>;
type ExpiredHook = Box<dyn Fn() + Send + Sync>;

/// One flight of the coordinator. Waiters attach while `Refreshing`; the
/// driver drains them when it settles and returns the state to `Idle`.
enum FlightState {
    Idle,
    Refreshing {
        waiters: Vec<oneshot::Sender<RefreshOutcome>>,
    },
}

/// Serializes concurrent refresh attempts into a single network call and
/// fans the outcome out to every caller.
///
/// Constructed once per [`Client`](crate::client::Client) and reusable
/// indefinitely: a failed flight returns the coordinator to `Idle`, so a
/// later login can refresh again.
///
/// The guarantees:
/// - At most one refresh round-trip is in flight at any instant. The
///   first caller in `Idle` becomes the initiator; everyone else attaches
///   as a waiter under the same lock, so two initiators cannot race past
///   each other.
/// - The round-trip runs on a spawned task. It is owned by no single
///   caller: cancelling a request that is waiting on it releases only
///   that waiter.
/// - On success the new token pair is saved before any waiter is woken,
///   so a replay never reads a stale credential.
/// - On failure the stored credential and the session are cleared and the
///   expired hook fires, exactly once per flight no matter how many
///   requests piled onto it.
pub struct RefreshCoordinator {
    api: AuthApi,
    store: Arc<dyn CredentialStore>,
    session: Arc<SessionState>,
    state: Mutex<FlightState>,
    expired_hook: RwLock<Option<ExpiredHook>>,
}

impl RefreshCoordinator {
    pub fn new(api: AuthApi, store: Arc<dyn CredentialStore>, session: Arc<SessionState>) -> Self {
        Self {
            api,
            store,
            session,
            state: Mutex::new(FlightState::Idle),
            expired_hook: RwLock::new(None),
        }
    }

    /// Register the hook invoked when a refresh fails and the session is
    /// cleared (the application typically navigates to its login view).
    pub fn set_expired_hook(&self, hook: impl Fn() + Send + Sync + 'static) {
        if let Ok(mut slot) = self.expired_hook.write() {
            *slot = Some(Box::new(hook));
        }
    }

    /// Obtain a fresh credential, joining the in-flight refresh if one
    /// exists.
    pub async fn refresh(self: &Arc<Self>) -> RefreshOutcome {
        let (tx, rx) = oneshot::channel();
        {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            match &mut *state {
                FlightState::Refreshing { waiters } => {
                    waiters.push(tx);
                    debug!(waiters = waiters.len(), "joined in-flight token refresh");
                }
                FlightState::Idle => {
                    // The initiator registers itself as a waiter and
                    // starts the driver inside the same critical section:
                    // no second initiator can slip in, and the driver
                    // cannot settle before this waiter is on the list.
                    *state = FlightState::Refreshing { waiters: vec![tx] };
                    debug!("starting token refresh");
                    let coordinator = Arc::clone(self);
                    tokio::spawn(async move { coordinator.drive().await });
                }
            }
        }
        match rx.await {
            Ok(outcome) => outcome,
            Err(_) => Err(AuthError::InvalidResponse(
                "refresh settled without an outcome".to_string(),
            )),
        }
    }

    async fn drive(self: Arc<Self>) {
        let outcome = self.perform_refresh().await;
        match &outcome {
            Ok(_) => info!("session token refresh succeeded"),
            Err(err) => {
                warn!(error = %err, "session token refresh failed");
                self.expire_session();
            }
        }

        let waiters = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            match std::mem::replace(&mut *state, FlightState::Idle) {
                FlightState::Refreshing { waiters } => waiters,
                FlightState::Idle => Vec::new(),
            }
        };
        debug!(waiters = waiters.len(), "settling token refresh");
        for waiter in waiters {
            // A dropped waiter (cancelled request) makes this a no-op.
            let _ = waiter.send(outcome.clone());
        }
    }

    async fn perform_refresh(&self) -> RefreshOutcome {
        let current = self.store.load()?;
        let refresh_token = current
            .as_ref()
            .map(|credential| credential.refresh_token.clone())
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::MissingRefreshToken)?;

        let response = self.api.refresh(&refresh_token).await?;
        if !response.is_success() {
            return Err(AuthError::RefreshRejected {
                code: response.status_code,
                message: response.message().to_string(),
            });
        }
        let (Some(token), Some(refresh_token)) = (response.token, response.refresh_token) else {
            return Err(AuthError::InvalidResponse(
                "refresh response missing tokens".to_string(),
            ));
        };

        let user_id = response
            .user_id
            .or_else(|| current.and_then(|credential| credential.user_id));
        let credential = Credential::new(token, refresh_token, user_id);
        self.store.save(&credential)?;
        Ok(credential)
    }

    fn expire_session(&self) {
        if let Err(err) = self.store.clear() {
            warn!(error = %err, "failed to clear stored credential");
        }
        self.session.set_identity(None);
        if let Ok(hook) = self.expired_hook.read() {
            if let Some(hook) = hook.as_ref() {
                hook();
            }
        }
    }
}
