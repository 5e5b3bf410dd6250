use futures_util::{StreamExt, stream};

use crate::{
    error::SpotifyError,
    spotify::{AUDIO_FEATURES_BATCH_SIZE, BatchStream, SpotifyClient},
    types::{AudioFeatures, AudioFeaturesResponse, TopTracksResponse, Track},
};

/// Retrieves the most popular tracks of an artist in the given market.
///
/// Like the related-artists endpoint this answers in a single response, so the
/// stream yields one batch.
///
/// # API Endpoint
///
/// `GET /artists/{id}/top-tracks?market={market}`
pub fn top_tracks<'a>(
    client: &'a SpotifyClient,
    artist_id: &'a str,
    market: &'a str,
) -> BatchStream<'a, Track> {
    stream::once(async move {
        let url = client.url(&format!(
            "/artists/{id}/top-tracks?market={market}",
            id = artist_id,
            market = market
        ));
        let json = client.get::<TopTracksResponse>(&url).await?;
        Ok::<_, SpotifyError>(json.tracks)
    })
    .boxed()
}

/// Retrieves audio features for a batch of tracks in a single API request.
///
/// # Batch Processing
///
/// - Accepts up to 50 track ids per request (Spotify API limit)
/// - Ids beyond the limit are ignored with a warning; callers are expected to chunk
/// - The response keeps the request order and contains `None` for every track
///   Spotify has no features for
///
/// # API Endpoint
///
/// `GET /audio-features?ids={ids}`
pub async fn audio_features(
    client: &SpotifyClient,
    track_ids: &[String],
) -> Result<Vec<Option<AudioFeatures>>, SpotifyError> {
    if track_ids.is_empty() {
        return Ok(Vec::new());
    }

    let track_ids = if track_ids.len() > AUDIO_FEATURES_BATCH_SIZE {
        log::warn!(
            "audio features requested for {} tracks, only the first {} are fetched",
            track_ids.len(),
            AUDIO_FEATURES_BATCH_SIZE
        );
        &track_ids[..AUDIO_FEATURES_BATCH_SIZE]
    } else {
        track_ids
    };

    let url = client.url(&format!("/audio-features?ids={ids}", ids = track_ids.join(",")));
    let json = client.get::<AudioFeaturesResponse>(&url).await?;
    Ok(json.audio_features)
}
