use std::{ops::RangeInclusive, sync::Arc};

use tabled::Table;
use tokio::sync::mpsc;

use crate::{
    cli::{connect, spinner},
    error,
    error::ExploreError,
    explorer::{ExploreOptions, Explorer, Progress, TrackFilter, filter},
    info,
    management::PlaylistManager,
    spotify::{SpotifyApi, SpotifyClient},
    success,
    types::{Artist, EnrichedTrack, Track, TrackTableRow},
    utils, warning,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Popularity,
    Tempo,
}

/// Everything the `wizard` command was asked to do.
#[derive(Debug, Clone)]
pub struct WizardRequest {
    pub artist_id: Option<String>,
    pub search: Option<String>,
    pub options: ExploreOptions,
    pub features: bool,
    pub filter: TrackFilter,
    pub sort: SortOrder,
    pub playlist: Option<String>,
}

pub async fn wizard(request: WizardRequest) {
    let client = Arc::new(connect().await);

    let seed = resolve_seed(client.as_ref(), &request).await;
    info!(
        "Exploring artists related to {} (depth {}, {} artists per level, {} tracks per artist)",
        seed.name,
        request.options.max_depth,
        request.options.max_artists_per_level,
        request.options.max_tracks_per_artist
    );

    let (sender, mut receiver) = mpsc::unbounded_channel();
    let explorer = Explorer::new(client.clone(), request.options.clone()).with_progress(sender);

    let pb = spinner("Exploring related artists...");
    let progress_pb = pb.clone();
    let printer = tokio::spawn(async move {
        let mut tracks = 0;
        while let Some(event) = receiver.recv().await {
            match event {
                Progress::ArtistVisited { level, artist } => {
                    progress_pb.println(format!("  {}. {}", level, artist.name));
                }
                Progress::TracksAdded { tracks: added, .. } => {
                    tracks += added.len();
                    progress_pb.set_message(format!("Collected {} tracks...", tracks));
                }
            }
        }
    });

    let outcome = tokio::select! {
        outcome = explorer.explore(&seed) => outcome,
        _ = tokio::signal::ctrl_c() => {
            pb.finish_and_clear();
            warning!("Exploration cancelled.");
            return;
        }
    };
    pb.finish_and_clear();
    drop(explorer);
    let _ = printer.await;

    let exploration = match outcome {
        Ok(exploration) => exploration,
        Err(ExploreError::NoRelatedArtists { seed }) => {
            warning!("Spotify knows no related artists for {}.", seed);
            return;
        }
        Err(e) => error!("Exploration failed: {}", e),
    };

    success!(
        "Visited {} artists and collected {} tracks",
        exploration.artists.len(),
        exploration.tracks.len()
    );

    let tracks = if request.features || request.filter.needs_features() {
        let explorer = Explorer::new(client.clone(), request.options.clone());
        let pb = spinner("Fetching audio features...");
        let mut enriched = explorer
            .enrich_filtered(exploration.tracks, &request.filter)
            .await;
        pb.finish_and_clear();

        if request.sort == SortOrder::Tempo {
            filter::sort_by_tempo(&mut enriched);
        }
        print_enriched(&enriched);
        enriched.into_iter().map(|e| e.track).collect()
    } else {
        let mut tracks = exploration.tracks;
        tracks.retain(|t| request.filter.matches(t, None));
        if request.sort == SortOrder::Tempo {
            warning!("Sorting by tempo needs --features; keeping popularity order.");
        }
        print_tracks(&tracks);
        tracks
    };

    if let Some(name) = &request.playlist {
        add_to_playlist(client.as_ref(), name, tracks).await;
    }
}

async fn resolve_seed(client: &SpotifyClient, request: &WizardRequest) -> Artist {
    if let Some(id) = &request.artist_id {
        return match client.artist(id).await {
            Ok(artist) => artist,
            Err(e) => error!("Failed to fetch artist {}: {}", id, e),
        };
    }

    let Some(query) = &request.search else {
        error!("Either an artist id or --search must be given");
    };

    match client.search_artists(query, 1).await {
        Ok(artists) => match artists.into_iter().next() {
            Some(artist) => artist,
            None => error!("No artist found for \"{}\"", query),
        },
        Err(e) => error!("Artist search failed: {}", e),
    }
}

async fn add_to_playlist(client: &SpotifyClient, name: &str, mut tracks: Vec<Track>) {
    utils::remove_probable_duplicates(&mut tracks);
    let uris = utils::track_uris(&tracks);
    if uris.is_empty() {
        warning!("Nothing to add to playlist {}", name);
        return;
    }

    let mut manager = match PlaylistManager::load(client).await {
        Ok(manager) => manager,
        Err(e) => error!("Failed to fetch playlists: {}", e),
    };

    let playlist = match manager.find_or_create(client, name).await {
        Ok(playlist) => playlist,
        Err(e) => error!("{}", e),
    };

    match PlaylistManager::add_tracks(client, &playlist.id, &uris).await {
        Ok(_) => success!("Added {} tracks to playlist {}", uris.len(), playlist.name),
        Err(e) => error!("Failed to add tracks to playlist {}: {}", playlist.name, e),
    }
}

fn track_row(track: &Track, tempo: Option<f64>) -> TrackTableRow {
    TrackTableRow {
        name: track.name.clone(),
        artist: track.first_artist_name().unwrap_or_default().to_string(),
        popularity: utils::format_optional(track.popularity),
        tempo: utils::format_optional(tempo.map(|t| format!("{:.0}", t))),
    }
}

fn print_tracks(tracks: &[Track]) {
    if tracks.is_empty() {
        warning!("No tracks left after filtering.");
        return;
    }
    println!("{}", Table::new(tracks.iter().map(|t| track_row(t, None))));
}

pub(crate) fn print_enriched(tracks: &[EnrichedTrack]) {
    if tracks.is_empty() {
        warning!("No tracks left after filtering.");
        return;
    }
    println!(
        "{}",
        Table::new(
            tracks
                .iter()
                .map(|t| track_row(&t.track, Some(t.features.tempo)))
        )
    );
}

/// Builds a range from optional bounds; a missing bound is left open.
pub fn optional_range<T: Copy>(min: Option<T>, max: Option<T>, lowest: T, highest: T) -> Option<RangeInclusive<T>> {
    match (min, max) {
        (None, None) => None,
        (min, max) => Some(min.unwrap_or(lowest)..=max.unwrap_or(highest)),
    }
}
