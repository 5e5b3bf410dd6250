use crate::{
    spotify::{BatchStream, SpotifyClient},
    types::{SimplifiedAlbum, Track},
};

/// Streams the albums of an artist, 50 per page.
///
/// Only the `album` group is requested; singles, compilations and
/// appearances on other artists' records are left out.
///
/// # API Endpoint
///
/// `GET /artists/{id}/albums?include_groups=album`
pub fn artist_albums<'a>(client: &'a SpotifyClient, artist_id: &'a str) -> BatchStream<'a, SimplifiedAlbum> {
    client.paged(client.url(&format!(
        "/artists/{id}/albums?include_groups=album&limit=50",
        id = artist_id
    )))
}

/// Streams the tracks of an album, 50 per page.
///
/// # API Endpoint
///
/// `GET /albums/{id}/tracks`
pub fn album_tracks<'a>(client: &'a SpotifyClient, album_id: &'a str) -> BatchStream<'a, Track> {
    client.paged(client.url(&format!("/albums/{id}/tracks?limit=50", id = album_id)))
}
