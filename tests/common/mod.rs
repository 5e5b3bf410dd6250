#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use futures_util::{StreamExt, stream};

use spotwiz::{
    error::SpotifyError,
    spotify::{BatchStream, SpotifyApi},
    types::{
        Artist, AudioFeatures, CreatePlaylistRequest, CurrentUser, Followers, Playlist,
        SimplifiedAlbum, SimplifiedArtist, Track,
    },
};

// Helper function to create a test artist
pub fn artist(id: &str, popularity: u32) -> Artist {
    Artist {
        id: Some(id.to_string()),
        uri: Some(format!("spotify:artist:{}", id)),
        name: format!("Artist {}", id),
        popularity: Some(popularity),
        followers: Some(Followers {
            total: Some(1_000),
        }),
        genres: Vec::new(),
    }
}

// Helper function to create a test track
pub fn track(id: &str, name: &str, popularity: u32) -> Track {
    Track {
        id: Some(id.to_string()),
        uri: Some(format!("spotify:track:{}", id)),
        name: name.to_string(),
        popularity: Some(popularity),
        duration_ms: Some(200_000),
        album: None,
        artists: vec![SimplifiedArtist {
            id: None,
            uri: None,
            name: "Someone".to_string(),
        }],
    }
}

pub fn features(id: &str, tempo: f64) -> AudioFeatures {
    AudioFeatures {
        id: id.to_string(),
        uri: format!("spotify:track:{}", id),
        tempo,
        ..Default::default()
    }
}

pub fn album(id: &str, name: &str) -> SimplifiedAlbum {
    SimplifiedAlbum {
        id: Some(id.to_string()),
        uri: Some(format!("spotify:album:{}", id)),
        name: name.to_string(),
        release_date: None,
    }
}

pub fn playlist(id: &str, name: &str) -> Playlist {
    Playlist {
        id: id.to_string(),
        uri: Some(format!("spotify:playlist:{}", id)),
        name: name.to_string(),
        description: None,
        public: Some(false),
        collaborative: false,
        snapshot_id: "snapshot".to_string(),
        owner: None,
    }
}

/// In-memory Spotify that records every call it receives.
#[derive(Default)]
pub struct MockSpotify {
    pub related: HashMap<String, Vec<Vec<Artist>>>,
    pub top: HashMap<String, Vec<Track>>,
    pub features: HashMap<String, AudioFeatures>,
    pub playlist_pages: Vec<Vec<Playlist>>,
    pub albums: HashMap<String, Vec<Vec<SimplifiedAlbum>>>,
    pub album_tracks: HashMap<String, Vec<Vec<Track>>>,
    pub playlist_tracks: HashMap<String, Vec<Vec<Track>>>,
    pub user: Option<CurrentUser>,
    pub fail_related: HashSet<String>,
    pub fail_features: bool,
    pub fail_create: bool,
    pub delay: Option<Duration>,

    pub fetches: AtomicUsize,
    pub related_batches: AtomicUsize,
    pub top_track_requests: Mutex<Vec<String>>,
    pub feature_batches: Mutex<Vec<usize>>,
    pub added_batches: Mutex<Vec<usize>>,
    pub created: Mutex<Vec<CreatePlaylistRequest>>,
}

impl MockSpotify {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_related(mut self, artist_id: &str, related: Vec<Artist>) -> Self {
        self.related.insert(artist_id.to_string(), vec![related]);
        self
    }

    pub fn with_related_batches(mut self, artist_id: &str, batches: Vec<Vec<Artist>>) -> Self {
        self.related.insert(artist_id.to_string(), batches);
        self
    }

    pub fn with_top(mut self, artist_id: &str, tracks: Vec<Track>) -> Self {
        self.top.insert(artist_id.to_string(), tracks);
        self
    }

    pub fn with_albums(mut self, artist_id: &str, pages: Vec<Vec<SimplifiedAlbum>>) -> Self {
        self.albums.insert(artist_id.to_string(), pages);
        self
    }

    pub fn with_album_tracks(mut self, album_id: &str, pages: Vec<Vec<Track>>) -> Self {
        self.album_tracks.insert(album_id.to_string(), pages);
        self
    }

    pub fn with_playlist_tracks(mut self, playlist_id: &str, pages: Vec<Vec<Track>>) -> Self {
        self.playlist_tracks.insert(playlist_id.to_string(), pages);
        self
    }

    pub fn with_features(mut self, features: Vec<AudioFeatures>) -> Self {
        self.features
            .extend(features.into_iter().map(|f| (f.id.clone(), f)));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn top_track_requests(&self) -> Vec<String> {
        self.top_track_requests.lock().unwrap().clone()
    }

    fn pages<'a, T: Clone + Send + 'a>(
        &'a self,
        pages: Option<&Vec<Vec<T>>>,
    ) -> BatchStream<'a, T> {
        let pages = pages.cloned().unwrap_or_default();
        stream::iter(pages)
            .then(move |page| async move {
                self.fetch().await;
                Ok::<_, SpotifyError>(page)
            })
            .boxed()
    }

    async fn fetch(&self) {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl SpotifyApi for MockSpotify {
    fn related_artists<'a>(&'a self, artist_id: &'a str) -> BatchStream<'a, Artist> {
        if self.fail_related.contains(artist_id) {
            return stream::once(async move {
                self.fetch().await;
                Err::<Vec<Artist>, _>(SpotifyError::RateLimited(3600))
            })
            .boxed();
        }

        let batches = self.related.get(artist_id).cloned().unwrap_or_default();
        stream::iter(batches)
            .then(move |batch| async move {
                self.fetch().await;
                self.related_batches.fetch_add(1, Ordering::SeqCst);
                Ok::<_, SpotifyError>(batch)
            })
            .boxed()
    }

    fn top_tracks<'a>(&'a self, artist_id: &'a str, _market: &'a str) -> BatchStream<'a, Track> {
        let tracks = self.top.get(artist_id).cloned().unwrap_or_default();
        stream::once(async move {
            self.top_track_requests
                .lock()
                .unwrap()
                .push(artist_id.to_string());
            self.fetch().await;
            Ok::<_, SpotifyError>(tracks)
        })
        .boxed()
    }

    fn artist_albums<'a>(&'a self, artist_id: &'a str) -> BatchStream<'a, SimplifiedAlbum> {
        self.pages(self.albums.get(artist_id))
    }

    fn album_tracks<'a>(&'a self, album_id: &'a str) -> BatchStream<'a, Track> {
        self.pages(self.album_tracks.get(album_id))
    }

    fn playlist_tracks<'a>(&'a self, playlist_id: &'a str) -> BatchStream<'a, Track> {
        self.pages(self.playlist_tracks.get(playlist_id))
    }

    async fn audio_features(
        &self,
        track_ids: &[String],
    ) -> Result<Vec<Option<AudioFeatures>>, SpotifyError> {
        self.feature_batches.lock().unwrap().push(track_ids.len());
        self.fetch().await;
        if self.fail_features {
            return Err(SpotifyError::RateLimited(3600));
        }
        Ok(track_ids
            .iter()
            .map(|id| self.features.get(id).cloned())
            .collect())
    }

    async fn artist(&self, artist_id: &str) -> Result<Artist, SpotifyError> {
        Ok(artist(artist_id, 50))
    }

    async fn search_artists(&self, query: &str, _limit: u32) -> Result<Vec<Artist>, SpotifyError> {
        Ok(vec![artist(query, 50)])
    }

    async fn current_user(&self) -> Result<CurrentUser, SpotifyError> {
        self.user
            .clone()
            .ok_or_else(|| SpotifyError::Unauthorized("no user".to_string()))
    }

    fn current_user_playlists(&self) -> BatchStream<'_, Playlist> {
        stream::iter(self.playlist_pages.clone().into_iter().map(Ok::<_, SpotifyError>)).boxed()
    }

    async fn create_playlist(
        &self,
        user_id: &str,
        request: &CreatePlaylistRequest,
    ) -> Result<Playlist, SpotifyError> {
        if self.fail_create {
            return Err(SpotifyError::RateLimited(3600));
        }
        self.created.lock().unwrap().push(request.clone());
        let mut created = playlist(&format!("{}-new", user_id), &request.name);
        created.description = Some(request.description.clone());
        Ok(created)
    }

    async fn add_tracks_to_playlist(
        &self,
        _playlist_id: &str,
        uris: &[String],
    ) -> Result<String, SpotifyError> {
        let mut batches = self.added_batches.lock().unwrap();
        batches.push(uris.len());
        Ok(format!("snapshot-{}", batches.len()))
    }
}
