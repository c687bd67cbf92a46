//! Session credential payload.

use serde::{Deserialize, Serialize};

/// Token pair held by a credential store.
///
/// Both tokens are opaque: validity is only ever determined by server
/// responses, never by inspecting the contents. The record is replaced
/// wholesale on refresh and deleted wholesale on logout, so a stored
/// access token is always paired with the refresh token issued alongside
/// it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: String,
    /// Server-side id of the account the tokens belong to, used to fetch
    /// the identity on startup.
    pub user_id: Option<i64>,
}

impl Credential {
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        user_id: Option<i64>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            user_id,
        }
    }
}
