use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use axum::{
    Extension, Json, Router,
    extract::Query,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use futures_util::TryStreamExt;
use serde_json::json;
use spotwiz::{
    error::SpotifyError,
    management::TokenManager,
    spotify::{MAX_RATE_LIMIT_WAITS, SpotifyApi, SpotifyClient},
    types::Token,
};

fn fresh_token() -> TokenManager {
    TokenManager::new(Token {
        access_token: "access".to_string(),
        refresh_token: "refresh".to_string(),
        scope: "playlist-modify-private".to_string(),
        expires_in: 3600,
        obtained_at: chrono::Utc::now().timestamp() as u64,
    })
}

async fn serve(app: impl FnOnce(SocketAddr) -> Router) -> SpotifyClient {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = app(addr);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    SpotifyClient::new(format!("http://{}", addr), fresh_token())
}

async fn always_limited(Extension(hits): Extension<Arc<AtomicUsize>>) -> Response {
    hits.fetch_add(1, Ordering::SeqCst);
    (StatusCode::TOO_MANY_REQUESTS, [("retry-after", "0")], "").into_response()
}

async fn limited_once(Extension(hits): Extension<Arc<AtomicUsize>>) -> Response {
    if hits.fetch_add(1, Ordering::SeqCst) == 0 {
        return (StatusCode::TOO_MANY_REQUESTS, [("retry-after", "0")], "").into_response();
    }
    Json(json!({
        "id": "x",
        "uri": "spotify:artist:x",
        "name": "Patient",
        "popularity": 42,
        "followers": { "total": 7 },
        "genres": []
    }))
    .into_response()
}

async fn playlist_page(
    Extension(addr): Extension<SocketAddr>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<serde_json::Value> {
    let item = |id: &str| {
        json!({
            "track": {
                "id": id,
                "uri": format!("spotify:track:{}", id),
                "name": format!("Track {}", id),
                "artists": []
            }
        })
    };

    if query.contains_key("offset") {
        return Json(json!({ "items": [item("c")], "next": null, "total": 4 }));
    }
    Json(json!({
        "items": [item("a"), { "track": null }, item("b")],
        "next": format!("http://{}/playlists/p/tracks?offset=3&limit=100", addr),
        "total": 4
    }))
}

#[tokio::test]
async fn test_repeated_short_rate_limits_give_up() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    let client = serve(move |_| {
        Router::new()
            .route("/artists/{id}", get(always_limited))
            .layer(Extension(counter))
    })
    .await;

    let result = client.artist("x").await;

    assert!(matches!(result, Err(SpotifyError::RateLimited(0))));
    assert_eq!(hits.load(Ordering::SeqCst), MAX_RATE_LIMIT_WAITS + 1);
}

#[tokio::test]
async fn test_short_rate_limit_is_waited_out() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    let client = serve(move |_| {
        Router::new()
            .route("/artists/{id}", get(limited_once))
            .layer(Extension(counter))
    })
    .await;

    let artist = client.artist("x").await.unwrap();

    assert_eq!(artist.name, "Patient");
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_playlist_tracks_follow_next_and_skip_empty_items() {
    let client = serve(|addr| {
        Router::new()
            .route("/playlists/{id}/tracks", get(playlist_page))
            .layer(Extension(addr))
    })
    .await;

    let pages: Vec<Vec<_>> = client.playlist_tracks("p").try_collect().await.unwrap();

    let ids: Vec<Vec<&str>> = pages
        .iter()
        .map(|page| page.iter().filter_map(|t| t.id.as_deref()).collect())
        .collect();
    assert_eq!(ids, vec![vec!["a", "b"], vec!["c"]]);
}
