//! # API Module
//!
//! HTTP endpoints served by the short-lived local server that `spotwiz auth`
//! starts while waiting for Spotify's authorization redirect.
//!
//! ## Endpoints
//!
//! - [`callback`] - Receives the authorization code from Spotify's redirect and
//!   exchanges it, together with the PKCE verifier held in shared state, for an
//!   access token.
//! - [`health`] - Reports that the callback server is up, with the crate name and version.
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use axum::{Router, routing::get};
//! use spotwiz::api::{callback, health};
//!
//! let app = Router::new()
//!     .route("/callback", get(callback))
//!     .route("/health", get(health));
//! ```

mod callback;
mod health;

pub use callback::callback;
pub use health::health;
