use futures_util::{StreamExt, stream};

use crate::{
    error::SpotifyError,
    spotify::{BatchStream, SpotifyClient},
    types::{Artist, RelatedArtistsResponse, SearchArtistsResponse},
};

/// Retrieves the artists Spotify considers related to `artist_id`.
///
/// The endpoint answers with the complete list in a single response, so the
/// returned stream yields exactly one batch. No request is sent until the
/// stream is polled.
///
/// # API Endpoint
///
/// `GET /artists/{id}/related-artists`
pub fn related_artists<'a>(client: &'a SpotifyClient, artist_id: &'a str) -> BatchStream<'a, Artist> {
    stream::once(async move {
        let url = client.url(&format!("/artists/{id}/related-artists", id = artist_id));
        let json = client.get::<RelatedArtistsResponse>(&url).await?;
        Ok::<_, SpotifyError>(json.artists)
    })
    .boxed()
}

/// Retrieves a single artist by id.
pub async fn artist(client: &SpotifyClient, artist_id: &str) -> Result<Artist, SpotifyError> {
    let url = client.url(&format!("/artists/{id}", id = artist_id));
    client.get::<Artist>(&url).await
}

/// Searches the catalog for artists matching `query`.
///
/// Results keep the relevance order Spotify returns them in. `limit` is
/// clamped to the 1-50 range the endpoint accepts.
///
/// # Example
///
/// ```
/// let artists = search_artists(&client, "radiohead", 10).await?;
/// for artist in artists {
///     println!("{} ({:?})", artist.name, artist.popularity);
/// }
/// ```
pub async fn search_artists(
    client: &SpotifyClient,
    query: &str,
    limit: u32,
) -> Result<Vec<Artist>, SpotifyError> {
    let url = client.url("/search");
    let limit = limit.clamp(1, 50).to_string();

    let response = client
        .send(|token| {
            client
                .http
                .get(&url)
                .query(&[("q", query), ("type", "artist"), ("limit", limit.as_str())])
                .bearer_auth(token)
        })
        .await?;

    let json = response.json::<SearchArtistsResponse>().await?;
    Ok(json.artists.items)
}
