use futures_util::TryStreamExt;

use crate::{
    error::{PlaylistError, SpotifyError},
    spotify::{PLAYLIST_ADD_BATCH_SIZE, SpotifyApi},
    types::{CreatePlaylistRequest, Playlist},
    utils,
};

pub const NEW_PLAYLIST_DESCRIPTION: &str = "Created by spotwiz";

fn name_ascending(a: &Playlist, b: &Playlist) -> std::cmp::Ordering {
    a.name.cmp(&b.name)
}

/// The current user's playlists, kept in name order.
pub struct PlaylistManager {
    playlists: Vec<Playlist>,
}

impl PlaylistManager {
    pub fn new(playlists: Vec<Playlist>) -> Self {
        let mut sorted = Vec::with_capacity(playlists.len());
        utils::append_sorted(&mut sorted, playlists, name_ascending);
        Self { playlists: sorted }
    }

    /// Fetches every page of the current user's playlists.
    pub async fn load(api: &dyn SpotifyApi) -> Result<Self, SpotifyError> {
        let mut playlists = Vec::new();
        let mut pages = api.current_user_playlists();
        while let Some(page) = pages.try_next().await? {
            utils::append_sorted(&mut playlists, page, name_ascending);
        }
        Ok(Self { playlists })
    }

    pub fn all(&self) -> &[Playlist] {
        &self.playlists
    }

    pub fn count(&self) -> usize {
        self.playlists.len()
    }

    /// Playlists whose name contains `term`, ignoring case. An empty term
    /// matches everything.
    pub fn filter(&self, term: &str) -> Vec<&Playlist> {
        let pattern = term.to_lowercase();
        self.playlists
            .iter()
            .filter(|p| pattern.is_empty() || p.name.to_lowercase().contains(&pattern))
            .collect()
    }

    pub fn find_exact(&self, name: &str) -> Option<&Playlist> {
        self.playlists.iter().find(|p| p.name == name)
    }

    /// A playlist named `term` may be created when the term is non-empty and
    /// no playlist carries exactly that name.
    pub fn may_create(&self, term: &str) -> bool {
        !term.is_empty() && self.find_exact(term).is_none()
    }

    /// Creates a private playlist for the current user and remembers it.
    pub async fn create(
        &mut self,
        api: &dyn SpotifyApi,
        name: &str,
    ) -> Result<Playlist, PlaylistError> {
        let user = match api.current_user().await {
            Ok(user) => user,
            Err(SpotifyError::Unauthorized(_)) => return Err(PlaylistError::NoCurrentUser),
            Err(e) => return Err(PlaylistError::Spotify(e)),
        };

        let request = CreatePlaylistRequest {
            name: name.to_string(),
            description: NEW_PLAYLIST_DESCRIPTION.to_string(),
            public: false,
            collaborative: false,
        };

        let playlist = api
            .create_playlist(&user.id, &request)
            .await
            .map_err(|e| PlaylistError::PlaylistCreationFailed {
                name: name.to_string(),
                reason: e.to_string(),
            })?;

        utils::insert_sorted(&mut self.playlists, playlist.clone(), name_ascending);
        Ok(playlist)
    }

    /// Returns the playlist named exactly `name`, creating it when missing.
    pub async fn find_or_create(
        &mut self,
        api: &dyn SpotifyApi,
        name: &str,
    ) -> Result<Playlist, PlaylistError> {
        if let Some(existing) = self.find_exact(name) {
            return Ok(existing.clone());
        }
        self.create(api, name).await
    }

    /// Adds `uris` in chunks of 100 and returns the last snapshot id, if any
    /// request was made.
    pub async fn add_tracks(
        api: &dyn SpotifyApi,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<Option<String>, SpotifyError> {
        let mut snapshot = None;
        for chunk in uris.chunks(PLAYLIST_ADD_BATCH_SIZE) {
            snapshot = Some(api.add_tracks_to_playlist(playlist_id, chunk).await?);
        }
        Ok(snapshot)
    }
}
