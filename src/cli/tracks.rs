use tabled::Table;

use crate::{
    cli::{connect, spinner, wizard::print_enriched},
    error,
    explorer::browse,
    info,
    types::{AlbumTrackTableRow, EnrichedTrack},
    utils, warning,
};

pub async fn playlist_tracks(playlist_id: String) {
    let client = connect().await;

    let pb = spinner("Fetching playlist tracks...");
    let result = browse::playlist_tracks(&client, &playlist_id).await;
    pb.finish_and_clear();

    let tracks = match result {
        Ok(tracks) => tracks,
        Err(e) => error!("Failed to fetch tracks of playlist {}: {}", playlist_id, e),
    };
    if tracks.is_empty() {
        warning!("Playlist {} has no tracks", playlist_id);
        return;
    }

    let total = tracks.len();
    let pb = spinner("Fetching audio features...");
    let enriched = browse::by_tempo(&client, tracks).await;
    pb.finish_and_clear();

    report_missing(total, enriched.len());
    print_enriched(&enriched);
}

pub async fn artist_tracks(artist_id: String) {
    let client = connect().await;

    let pb = spinner("Fetching albums and their tracks...");
    let result = browse::artist_tracks(&client, &artist_id).await;
    pb.finish_and_clear();

    let tracks = match result {
        Ok(tracks) => tracks,
        Err(e) => error!("Failed to fetch tracks of artist {}: {}", artist_id, e),
    };
    if tracks.is_empty() {
        warning!("No album tracks found for artist {}", artist_id);
        return;
    }

    let total = tracks.len();
    let pb = spinner("Fetching audio features...");
    let enriched = browse::by_tempo(&client, tracks).await;
    pb.finish_and_clear();

    report_missing(total, enriched.len());
    if enriched.is_empty() {
        warning!("No tracks left after filtering.");
        return;
    }
    println!("{}", Table::new(enriched.iter().map(album_row)));
}

fn album_row(track: &EnrichedTrack) -> AlbumTrackTableRow {
    AlbumTrackTableRow {
        name: track.track.name.clone(),
        album: track
            .track
            .album
            .as_ref()
            .map(|a| a.name.clone())
            .unwrap_or_default(),
        tempo: utils::format_optional(Some(format!("{:.0}", track.features.tempo))),
    }
}

fn report_missing(total: usize, enriched: usize) {
    if enriched < total {
        info!("{} of {} tracks have no audio features and are not shown", total - enriched, total);
    }
}
