//! Observable in-memory session state.

use std::collections::HashSet;

use tokio::sync::watch;

use crate::api::Identity;

/// In-memory, observable representation of who is logged in.
///
/// The identity lives in a [`watch`] channel: [`SessionState::subscribe`]
/// hands out receivers, and subscribers observe a change on their next
/// poll of the receiver. Notification is therefore asynchronous and never
/// re-entrant; `current()` always reflects the latest `set_identity`.
///
/// A set identity implies a credential was stored when it was set. The
/// converse does not hold: a credential may exist while the identity
/// fetch is still pending or has failed.
#[derive(Debug)]
pub struct SessionState {
    identity: watch::Sender<Option<Identity>>,
}

impl SessionState {
    pub fn new() -> Self {
        let (identity, _) = watch::channel(None);
        Self { identity }
    }

    /// Replace the cached identity and notify subscribers.
    pub fn set_identity(&self, identity: Option<Identity>) {
        self.identity.send_replace(identity);
    }

    pub fn current(&self) -> Option<Identity> {
        self.identity.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.borrow().is_some()
    }

    /// Permission set of the current identity; empty when logged out.
    pub fn permissions(&self) -> HashSet<String> {
        self.identity
            .borrow()
            .as_ref()
            .map(|identity| identity.permissions.clone())
            .unwrap_or_default()
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.identity
            .borrow()
            .as_ref()
            .is_some_and(|identity| identity.has_permission(permission))
    }

    pub fn has_any_permission(&self, permissions: &[&str]) -> bool {
        permissions.iter().any(|p| self.has_permission(p))
    }

    pub fn has_all_permissions(&self, permissions: &[&str]) -> bool {
        permissions.iter().all(|p| self.has_permission(p))
    }

    /// Subscribe to identity changes. The receiver observes the value
    /// current at subscription time plus every later replacement.
    pub fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.identity.subscribe()
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(id: i64, permissions: &[&str]) -> Identity {
        Identity {
            id,
            username: Some("mina".to_string()),
            email: None,
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
            created_at: None,
            updated_at: None,
            refresh_version: None,
        }
    }

    #[test]
    fn starts_logged_out() {
        let session = SessionState::new();
        assert!(!session.is_authenticated());
        assert!(session.current().is_none());
        assert!(session.permissions().is_empty());
    }

    #[test]
    fn permission_checks_follow_current_identity() {
        let session = SessionState::new();
        session.set_identity(Some(identity(7, &["USERS_READ", "TRIPS_READ"])));

        assert!(session.is_authenticated());
        assert!(session.has_permission("USERS_READ"));
        assert!(!session.has_permission("USERS_WRITE"));
        assert!(session.has_any_permission(&["USERS_WRITE", "TRIPS_READ"]));
        assert!(!session.has_any_permission(&["USERS_WRITE", "TRIPS_WRITE"]));
        assert!(session.has_all_permissions(&["USERS_READ", "TRIPS_READ"]));
        assert!(!session.has_all_permissions(&["USERS_READ", "USERS_WRITE"]));
    }

    #[test]
    fn permission_checks_are_empty_after_reset() {
        let session = SessionState::new();
        session.set_identity(Some(identity(7, &["USERS_READ"])));
        session.set_identity(None);

        assert!(!session.is_authenticated());
        assert!(!session.has_permission("USERS_READ"));
        assert!(!session.has_any_permission(&["USERS_READ"]));
        // Vacuous truth over the empty requirement list, logged out or not.
        assert!(session.has_all_permissions(&[]));
    }

    #[tokio::test]
    async fn subscribers_observe_identity_changes() {
        let session = SessionState::new();
        let mut receiver = session.subscribe();
        assert!(receiver.borrow().is_none());

        session.set_identity(Some(identity(7, &[])));
        receiver.changed().await.unwrap();
        assert_eq!(receiver.borrow().as_ref().map(|i| i.id), Some(7));

        session.set_identity(None);
        receiver.changed().await.unwrap();
        assert!(receiver.borrow().is_none());
    }
}
