use std::collections::HashMap;

use crate::{
    spotify::{AUDIO_FEATURES_BATCH_SIZE, SpotifyApi},
    types::{AudioFeatures, EnrichedTrack, Track},
};

/// Fetches audio features for `track_ids` in batches of at most 50 ids.
///
/// A failed batch is logged and skipped; its tracks simply end up without
/// features. The map is keyed by track URI.
pub async fn fetch_audio_features(
    api: &dyn SpotifyApi,
    track_ids: &[String],
) -> HashMap<String, AudioFeatures> {
    let mut features = HashMap::with_capacity(track_ids.len());

    for chunk in track_ids.chunks(AUDIO_FEATURES_BATCH_SIZE) {
        match api.audio_features(chunk).await {
            Ok(batch) => {
                for feature in batch.into_iter().flatten() {
                    features.insert(feature.uri.clone(), feature);
                }
            }
            Err(e) => log::warn!(
                "audio features lookup failed for {} tracks: {}",
                chunk.len(),
                e
            ),
        }
    }

    features
}

/// Pairs every track with its audio features, keeping the input order.
///
/// Tracks without an id, a URI or features are dropped and logged.
pub async fn enrich(api: &dyn SpotifyApi, tracks: Vec<Track>) -> Vec<EnrichedTrack> {
    let ids: Vec<String> = tracks.iter().filter_map(|t| t.id.clone()).collect();
    let features = fetch_audio_features(api, &ids).await;

    tracks
        .into_iter()
        .filter_map(|track| {
            let (Some(_), Some(uri)) = (track.id.as_deref(), track.uri.as_deref()) else {
                log::debug!("skipping track {} without identifier", track.name);
                return None;
            };
            match features.get(uri).cloned() {
                Some(features) => Some(EnrichedTrack { track, features }),
                None => {
                    log::info!("no audio features for {} ({}), dropping it", track.name, uri);
                    None
                }
            }
        })
        .collect()
}
