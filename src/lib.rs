//! Pendel — client SDK for the public-transport tracker API.
//!
//! Provides an authenticated HTTP client with durable credential storage,
//! observable session state, and transparent recovery from token expiry:
//! a 401 from a protected endpoint triggers exactly one coordinated token
//! refresh (no matter how many requests are in flight) and the failed
//! request is replayed once with the fresh token.
//!
//! # Quick Start
//!
//! ```no_run
//! use pendel::prelude::*;
//!
//! # async fn example() -> pendel::error::Result<()> {
//! let client = Client::new(ClientConfig::from_env());
//! client.init().await?;
//!
//! if !client.is_authenticated() {
//!     client
//!         .login(LoginRequest::with_username("mina", "secret"))
//!         .await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod prelude;
