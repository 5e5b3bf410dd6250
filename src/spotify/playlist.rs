use futures_util::{StreamExt, TryStreamExt};

use crate::{
    error::SpotifyError,
    spotify::{BatchStream, PLAYLIST_ADD_BATCH_SIZE, SpotifyClient},
    types::{
        AddTrackToPlaylistRequest, AddTrackToPlaylistResponse, CreatePlaylistRequest, CurrentUser,
        Playlist, PlaylistItem, Track,
    },
};

/// Retrieves the profile of the user the access token belongs to.
///
/// # API Endpoint
///
/// `GET /me`
pub async fn current_user(client: &SpotifyClient) -> Result<CurrentUser, SpotifyError> {
    client.get::<CurrentUser>(&client.url("/me")).await
}

/// Streams the current user's playlists, one batch of up to 50 per page.
///
/// Pages are requested lazily by following the `next` link of each response.
pub fn current_user_playlists(client: &SpotifyClient) -> BatchStream<'_, Playlist> {
    client.paged(client.url("/me/playlists?limit=50"))
}

/// Streams the tracks of a playlist, up to 100 per page.
///
/// Entries whose track is no longer available come back as `null` and are
/// dropped from the batch.
///
/// # API Endpoint
///
/// `GET /playlists/{playlist_id}/tracks`
pub fn playlist_tracks<'a>(client: &'a SpotifyClient, playlist_id: &'a str) -> BatchStream<'a, Track> {
    let url = client.url(&format!(
        "/playlists/{playlist_id}/tracks?limit=100",
        playlist_id = playlist_id
    ));
    client
        .paged::<PlaylistItem>(url)
        .map_ok(|items| items.into_iter().filter_map(|item| item.track).collect())
        .boxed()
}

/// Creates a playlist owned by `user_id`.
///
/// # API Endpoint
///
/// `POST /users/{user_id}/playlists`
pub async fn create(
    client: &SpotifyClient,
    user_id: &str,
    request: &CreatePlaylistRequest,
) -> Result<Playlist, SpotifyError> {
    let url = client.url(&format!("/users/{user_id}/playlists", user_id = user_id));

    let response = client
        .send(|token| client.post(&url).bearer_auth(token).json(request))
        .await?;

    Ok(response.json::<Playlist>().await?)
}

/// Adds tracks to a playlist and returns the resulting snapshot id.
///
/// Spotify accepts at most 100 URIs per request; the caller chunks larger
/// lists.
///
/// # API Endpoint
///
/// `POST /playlists/{playlist_id}/tracks`
pub async fn add_tracks(
    client: &SpotifyClient,
    playlist_id: &str,
    uris: &[String],
) -> Result<String, SpotifyError> {
    debug_assert!(uris.len() <= PLAYLIST_ADD_BATCH_SIZE);

    let url = client.url(&format!(
        "/playlists/{playlist_id}/tracks",
        playlist_id = playlist_id
    ));
    let body = AddTrackToPlaylistRequest {
        uris: uris.to_vec(),
    };

    let response = client
        .send(|token| client.post(&url).bearer_auth(token).json(&body))
        .await?;

    let json = response.json::<AddTrackToPlaylistResponse>().await?;
    Ok(json.snapshot_id)
}
