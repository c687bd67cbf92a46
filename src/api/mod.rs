//! Wire types and raw endpoint calls for the tracker API.

pub mod auth;
pub mod identity;

pub use auth::{
    AuthApi, AuthResponse, IdentifierType, LoginRequest, RegisterRequest, RegisterResponse,
};
pub use identity::Identity;
