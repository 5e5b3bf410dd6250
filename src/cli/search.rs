use tabled::Table;

use crate::{
    cli::{connect, spinner},
    error,
    explorer::order,
    spotify::SpotifyApi,
    types::{Artist, ArtistTableRow},
    utils, warning,
};

pub async fn search_artists(query: String, limit: u32) {
    let client = connect().await;

    let pb = spinner("Searching artists...");
    let result = client.search_artists(&query, limit).await;
    pb.finish_and_clear();

    let mut artists = match result {
        Ok(artists) => artists,
        Err(e) => error!("Artist search failed: {}", e),
    };

    if artists.is_empty() {
        warning!("No artists found for \"{}\"", query);
        return;
    }

    artists.sort_by(order::artist_popularity_descending);
    println!("{}", Table::new(artists.iter().map(artist_row)));
}

pub(crate) fn artist_row(artist: &Artist) -> ArtistTableRow {
    ArtistTableRow {
        name: artist.name.clone(),
        popularity: utils::format_optional(artist.popularity),
        followers: utils::format_optional(artist.follower_count()),
        id: artist.id.clone().unwrap_or_default(),
    }
}
