//! # Spotify Integration Module
//!
//! This module provides the interface to the Spotify Web API used by spotwiz. It
//! serves as the integration layer between the playlist wizard and Spotify's
//! services, handling HTTP communication, authentication and rate limiting.
//!
//! ## Architecture
//!
//! ```text
//! Application Layer (CLI, Explorer, Management)
//!          ↓
//!     SpotifyApi trait
//!          ↓
//!     SpotifyClient
//!     ├── Authentication (OAuth 2.0 PKCE)
//!     ├── Artist Operations (Related, Search, Lookup)
//!     ├── Track Operations (Top Tracks, Audio Features)
//!     └── Playlist Operations (List, Create, Add Tracks)
//!          ↓
//! HTTP Layer (reqwest, JSON)
//! ```
//!
//! The [`SpotifyApi`] trait is the seam between the application and the network.
//! The explorer and the playlist manager only ever talk to the trait, which keeps
//! them testable against in-memory implementations.
//!
//! ## Batched Results
//!
//! Endpoints that can return more than one page are exposed as a [`BatchStream`]:
//! a stream yielding one `Vec<T>` per page. Consumers decide how many batches to
//! pull; dropping the stream stops any further requests.
//!
//! ## Rate Limiting
//!
//! A `429 Too Many Requests` response carrying a `Retry-After` of at most
//! [`MAX_RETRY_AFTER_SECS`] seconds is waited out and the request is reissued,
//! at most [`MAX_RATE_LIMIT_WAITS`] times per request. Longer delays, or a
//! request still limited after that, surface as [`SpotifyError::RateLimited`].
//! Any other failure is returned to the caller unchanged.
//!
//! ## API Coverage
//!
//! - `GET /artists/{id}` - Single artist lookup
//! - `GET /artists/{id}/related-artists` - Relationship graph edges
//! - `GET /artists/{id}/top-tracks` - Most popular tracks in a market
//! - `GET /artists/{id}/albums` - The artist's albums, paged
//! - `GET /albums/{id}/tracks` - Tracks of an album, paged
//! - `GET /playlists/{id}/tracks` - Tracks of a playlist, paged
//! - `GET /audio-features` - Audio features for up to 50 tracks
//! - `GET /search?type=artist` - Artist search
//! - `GET /me` - Current user profile
//! - `GET /me/playlists` - Current user's playlists, paged
//! - `POST /users/{user_id}/playlists` - Create a playlist
//! - `POST /playlists/{playlist_id}/tracks` - Add up to 100 tracks
//! - `POST /api/token` - Token exchange and refresh operations

pub mod albums;
pub mod artists;
pub mod auth;
pub mod playlist;
pub mod tracks;

use std::time::Duration;

use async_trait::async_trait;
use futures_util::{
    StreamExt,
    stream::{self, BoxStream},
};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::{sync::Mutex, time::sleep};

use crate::{
    config,
    error::SpotifyError,
    management::TokenManager,
    types::{
        Artist, AudioFeatures, CreatePlaylistRequest, CurrentUser, Page, Playlist,
        SimplifiedAlbum, Track,
    },
};

/// Upper bound on a `Retry-After` delay that is waited out transparently.
pub const MAX_RETRY_AFTER_SECS: u64 = 120;

/// How often one request waits out a `429` before giving up.
pub const MAX_RATE_LIMIT_WAITS: usize = 3;

/// Maximum number of track ids accepted by the audio features endpoint.
pub const AUDIO_FEATURES_BATCH_SIZE: usize = 50;

/// Maximum number of track URIs accepted per add-to-playlist request.
pub const PLAYLIST_ADD_BATCH_SIZE: usize = 100;

/// A stream of result batches, one per page returned by the service.
pub type BatchStream<'a, T> = BoxStream<'a, Result<Vec<T>, SpotifyError>>;

/// Operations spotwiz needs from the Spotify Web API.
#[async_trait]
pub trait SpotifyApi: Send + Sync {
    /// Artists Spotify considers related to `artist_id`.
    fn related_artists<'a>(&'a self, artist_id: &'a str) -> BatchStream<'a, Artist>;

    /// The artist's most popular tracks in `market`.
    fn top_tracks<'a>(&'a self, artist_id: &'a str, market: &'a str) -> BatchStream<'a, Track>;

    /// Albums released by `artist_id`, one batch per page.
    fn artist_albums<'a>(&'a self, artist_id: &'a str) -> BatchStream<'a, SimplifiedAlbum>;

    /// Tracks of `album_id` in album order, one batch per page. The tracks
    /// carry neither album nor popularity.
    fn album_tracks<'a>(&'a self, album_id: &'a str) -> BatchStream<'a, Track>;

    /// Tracks of `playlist_id` in playlist order, one batch per page.
    /// Unavailable entries are left out.
    fn playlist_tracks<'a>(&'a self, playlist_id: &'a str) -> BatchStream<'a, Track>;

    /// Audio features for at most [`AUDIO_FEATURES_BATCH_SIZE`] track ids.
    /// Entries are `None` for tracks Spotify has no features for.
    async fn audio_features(
        &self,
        track_ids: &[String],
    ) -> Result<Vec<Option<AudioFeatures>>, SpotifyError>;

    async fn artist(&self, artist_id: &str) -> Result<Artist, SpotifyError>;

    async fn search_artists(&self, query: &str, limit: u32) -> Result<Vec<Artist>, SpotifyError>;

    async fn current_user(&self) -> Result<CurrentUser, SpotifyError>;

    fn current_user_playlists(&self) -> BatchStream<'_, Playlist>;

    async fn create_playlist(
        &self,
        user_id: &str,
        request: &CreatePlaylistRequest,
    ) -> Result<Playlist, SpotifyError>;

    /// Adds at most [`PLAYLIST_ADD_BATCH_SIZE`] URIs and returns the new snapshot id.
    async fn add_tracks_to_playlist(
        &self,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<String, SpotifyError>;
}

/// [`SpotifyApi`] implementation backed by the Spotify Web API.
pub struct SpotifyClient {
    http: Client,
    base_url: String,
    tokens: Mutex<TokenManager>,
}

impl SpotifyClient {
    pub fn new(base_url: impl Into<String>, tokens: TokenManager) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tokens: Mutex::new(tokens),
        }
    }

    /// Builds a client from the configured API url and the cached token.
    ///
    /// # Errors
    ///
    /// Returns [`SpotifyError::Unauthorized`] when no token has been stored yet,
    /// or a configuration error when `SPOTIFY_API_URL` is missing.
    pub async fn from_config() -> Result<Self, SpotifyError> {
        let tokens = TokenManager::load()
            .await
            .map_err(SpotifyError::Unauthorized)?;
        Ok(Self::new(config::spotify_apiurl()?, tokens))
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn token(&self) -> String {
        self.tokens.lock().await.get_valid_token().await
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, SpotifyError> {
        self.send(|token| self.http.get(url).bearer_auth(token))
            .await?
            .json::<T>()
            .await
            .map_err(SpotifyError::from)
    }

    pub(crate) fn post(&self, url: &str) -> RequestBuilder {
        self.http.post(url)
    }

    /// Sends the request built by `build`, waiting out short rate limits.
    pub(crate) async fn send<F>(&self, build: F) -> Result<Response, SpotifyError>
    where
        F: Fn(&str) -> RequestBuilder,
    {
        let mut waits = 0;
        loop {
            let token = self.token().await;
            let response = build(&token).send().await?;

            match response.status() {
                StatusCode::TOO_MANY_REQUESTS => {
                    let retry_after = retry_after_secs(&response);
                    if retry_after > MAX_RETRY_AFTER_SECS || waits >= MAX_RATE_LIMIT_WAITS {
                        return Err(SpotifyError::RateLimited(retry_after));
                    }
                    waits += 1;
                    log::debug!(
                        "rate limited, retrying in {}s ({}/{})",
                        retry_after,
                        waits,
                        MAX_RATE_LIMIT_WAITS
                    );
                    sleep(Duration::from_secs(retry_after)).await;
                }
                StatusCode::UNAUTHORIZED => {
                    return Err(SpotifyError::Unauthorized(
                        "access token was rejected".to_string(),
                    ));
                }
                _ => return Ok(response.error_for_status()?),
            }
        }
    }

    /// Follows `next` links starting at `first`, yielding one batch per page.
    pub(crate) fn paged<'a, T>(&'a self, first: String) -> BatchStream<'a, T>
    where
        T: DeserializeOwned + Send + 'a,
    {
        stream::try_unfold(Some(first), move |next| async move {
            let Some(url) = next else {
                return Ok::<_, SpotifyError>(None);
            };
            let page: Page<T> = self.get(&url).await?;
            Ok(Some((page.items, page.next)))
        })
        .boxed()
    }
}

fn retry_after_secs(response: &Response) -> u64 {
    response
        .headers()
        .get("retry-after")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .unwrap_or(1)
}

#[async_trait]
impl SpotifyApi for SpotifyClient {
    fn related_artists<'a>(&'a self, artist_id: &'a str) -> BatchStream<'a, Artist> {
        artists::related_artists(self, artist_id)
    }

    fn top_tracks<'a>(&'a self, artist_id: &'a str, market: &'a str) -> BatchStream<'a, Track> {
        tracks::top_tracks(self, artist_id, market)
    }

    fn artist_albums<'a>(&'a self, artist_id: &'a str) -> BatchStream<'a, SimplifiedAlbum> {
        albums::artist_albums(self, artist_id)
    }

    fn album_tracks<'a>(&'a self, album_id: &'a str) -> BatchStream<'a, Track> {
        albums::album_tracks(self, album_id)
    }

    fn playlist_tracks<'a>(&'a self, playlist_id: &'a str) -> BatchStream<'a, Track> {
        playlist::playlist_tracks(self, playlist_id)
    }

    async fn audio_features(
        &self,
        track_ids: &[String],
    ) -> Result<Vec<Option<AudioFeatures>>, SpotifyError> {
        tracks::audio_features(self, track_ids).await
    }

    async fn artist(&self, artist_id: &str) -> Result<Artist, SpotifyError> {
        artists::artist(self, artist_id).await
    }

    async fn search_artists(&self, query: &str, limit: u32) -> Result<Vec<Artist>, SpotifyError> {
        artists::search_artists(self, query, limit).await
    }

    async fn current_user(&self) -> Result<CurrentUser, SpotifyError> {
        playlist::current_user(self).await
    }

    fn current_user_playlists(&self) -> BatchStream<'_, Playlist> {
        playlist::current_user_playlists(self)
    }

    async fn create_playlist(
        &self,
        user_id: &str,
        request: &CreatePlaylistRequest,
    ) -> Result<Playlist, SpotifyError> {
        playlist::create(self, user_id, request).await
    }

    async fn add_tracks_to_playlist(
        &self,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<String, SpotifyError> {
        playlist::add_tracks(self, playlist_id, uris).await
    }
}
