//! Error types shared by the Spotify client, the explorer and the playlist
//! side actions.

use thiserror::Error;

/// Failures raised while talking to the Spotify Web API.
#[derive(Error, Debug)]
pub enum SpotifyError {
    /// Network, HTTP status or decoding failure from reqwest
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Rate limited for longer than we are willing to wait
    #[error("rate limited by Spotify for {0} seconds")]
    RateLimited(u64),

    /// No usable access token
    #[error("not authorized: {0}. Please run spotwiz auth")]
    Unauthorized(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Failures of a related-content exploration.
#[derive(Error, Debug)]
pub enum ExploreError {
    /// A relationship or top-tracks fetch failed; aborts the whole traversal
    #[error("upstream fetch failed: {0}")]
    Upstream(#[from] SpotifyError),

    /// The seed artist has no related artists at all
    #[error("no related artists found for {seed}")]
    NoRelatedArtists { seed: String },

    /// The seed artist has no identifier to look up relations with
    #[error("artist {0} has no identifier")]
    MissingIdentifier(String),

    /// The traversal was dropped while this part of it was still running
    #[error("exploration was cancelled")]
    Cancelled,
}

/// Failures of the playlist side action.
#[derive(Error, Debug)]
pub enum PlaylistError {
    #[error("no current user profile available")]
    NoCurrentUser,

    #[error("failed to create playlist {name}: {reason}")]
    PlaylistCreationFailed { name: String, reason: String },

    #[error(transparent)]
    Spotify(#[from] SpotifyError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },

    #[error("cannot load environment: {0}")]
    Load(String),
}
