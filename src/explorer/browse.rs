//! Track listings outside the related-artist walk: the tracks of a playlist
//! and the album tracks of an artist, both shown sorted by tempo.

use futures_util::TryStreamExt;

use crate::{
    error::SpotifyError,
    explorer::{features, filter},
    spotify::SpotifyApi,
    types::{EnrichedTrack, Track},
};

/// Every track of a playlist, in playlist order.
pub async fn playlist_tracks(api: &dyn SpotifyApi, playlist_id: &str) -> Result<Vec<Track>, SpotifyError> {
    let mut tracks = Vec::new();
    let mut pages = api.playlist_tracks(playlist_id);
    while let Some(page) = pages.try_next().await? {
        tracks.extend(page);
    }
    Ok(tracks)
}

/// Every track on every album of an artist, album by album.
///
/// Album endpoints return tracks without their album, so each track is
/// tagged with the album it was listed under.
pub async fn artist_tracks(api: &dyn SpotifyApi, artist_id: &str) -> Result<Vec<Track>, SpotifyError> {
    let mut albums = Vec::new();
    let mut pages = api.artist_albums(artist_id);
    while let Some(page) = pages.try_next().await? {
        albums.extend(page);
    }
    log::debug!("artist {} has {} albums", artist_id, albums.len());

    let mut tracks = Vec::new();
    for album in albums {
        let Some(album_id) = album.id.as_deref() else {
            log::debug!("skipping album {} without id", album.name);
            continue;
        };

        let mut pages = api.album_tracks(album_id);
        while let Some(page) = pages.try_next().await? {
            tracks.extend(page.into_iter().map(|mut track| {
                track.album.get_or_insert_with(|| album.clone());
                track
            }));
        }
    }

    Ok(tracks)
}

/// Enriches `tracks` and orders them by normalized tempo, slowest first.
pub async fn by_tempo(api: &dyn SpotifyApi, tracks: Vec<Track>) -> Vec<EnrichedTrack> {
    let mut enriched = features::enrich(api, tracks).await;
    filter::sort_by_tempo(&mut enriched);
    enriched
}
