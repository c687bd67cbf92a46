//! Convenience re-exports for common use.

pub use crate::api::{AuthResponse, IdentifierType, Identity, LoginRequest, RegisterRequest};
pub use crate::auth::{
    AuthError, Credential, CredentialStore, FileCredentialStore, SessionState,
};
pub use crate::client::{Client, LoginOutcome, RegisterOutcome};
pub use crate::config::ClientConfig;
pub use crate::error::{PendelError, Result};
