//! Configuration management for spotwiz.
//!
//! This module handles loading and accessing configuration values from environment
//! variables and `.env` files. It provides a centralized way to manage application
//! configuration including Spotify API credentials, server settings, and the
//! default bounds of the playlist wizard.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (where applicable)

use std::{env, path::PathBuf, str::FromStr};

use crate::error::ConfigError;

pub const DEFAULT_MARKET: &str = "US";
pub const DEFAULT_MAX_DEPTH: usize = 2;
pub const DEFAULT_MAX_ARTISTS: usize = 3;
pub const DEFAULT_MAX_TRACKS: usize = 3;

/// Returns the platform-specific data directory of the application.
///
/// - Linux: `~/.local/share/spotwiz`
/// - macOS: `~/Library/Application Support/spotwiz`
/// - Windows: `%LOCALAPPDATA%/spotwiz`
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("spotwiz");
    path
}

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Creates the directory if it doesn't exist. A missing `.env` file is not an
/// error as long as the required variables are provided by the environment
/// itself; each accessor reports the first missing key when it is used.
///
/// # Errors
///
/// Returns [`ConfigError::Load`] if the directory cannot be created or the
/// `.env` file exists but cannot be parsed.
pub async fn load_env() -> Result<(), ConfigError> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| ConfigError::Load(e.to_string()))?;
    }

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| ConfigError::Load(e.to_string()))?;
    }
    Ok(())
}

fn require(key: &'static str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::Missing(key))
}

fn optional<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { key, value }),
        Err(_) => Ok(default),
    }
}

/// Address and port the local OAuth callback server binds to, e.g. `127.0.0.1:8888`.
pub fn server_addr() -> Result<String, ConfigError> {
    require("SERVER_ADDRESS")
}

/// Client ID obtained when registering the application with Spotify.
pub fn spotify_client_id() -> Result<String, ConfigError> {
    require("SPOTIFY_API_AUTH_CLIENT_ID")
}

/// Callback URL Spotify redirects to after authorization. Must match the
/// redirect URI registered in the Spotify application settings.
pub fn spotify_redirect_uri() -> Result<String, ConfigError> {
    require("SPOTIFY_API_REDIRECT_URI")
}

/// Space separated permission scopes requested during authorization.
pub fn spotify_scope() -> Result<String, ConfigError> {
    require("SPOTIFY_API_AUTH_SCOPE")
}

/// e.g. `https://accounts.spotify.com/authorize`
pub fn spotify_apiauth_url() -> Result<String, ConfigError> {
    require("SPOTIFY_API_AUTH_URL")
}

/// e.g. `https://api.spotify.com/v1`
pub fn spotify_apiurl() -> Result<String, ConfigError> {
    require("SPOTIFY_API_URL")
}

/// e.g. `https://accounts.spotify.com/api/token`
pub fn spotify_apitoken_url() -> Result<String, ConfigError> {
    require("SPOTIFY_API_TOKEN_URL")
}

/// ISO 3166-1 alpha-2 market used for top-track lookups. Defaults to `US`.
pub fn spotify_market() -> String {
    env::var("SPOTIFY_MARKET").unwrap_or_else(|_| DEFAULT_MARKET.to_string())
}

/// Default traversal depth of the playlist wizard.
pub fn wizard_max_depth() -> Result<usize, ConfigError> {
    optional("WIZARD_MAX_DEPTH", DEFAULT_MAX_DEPTH)
}

/// Default number of related artists chosen per level.
pub fn wizard_max_artists() -> Result<usize, ConfigError> {
    optional("WIZARD_MAX_ARTISTS", DEFAULT_MAX_ARTISTS)
}

/// Default number of top tracks taken per artist.
pub fn wizard_max_tracks() -> Result<usize, ConfigError> {
    optional("WIZARD_MAX_TRACKS", DEFAULT_MAX_TRACKS)
}
