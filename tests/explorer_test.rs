mod common;

use std::{collections::HashSet, sync::Arc, time::Duration};

use common::{MockSpotify, artist, track};
use rand::Rng;
use spotwiz::{
    error::ExploreError,
    explorer::{ExploreOptions, Explorer, Progress, order},
    types::{Artist, Track},
    utils,
};
use tokio::sync::mpsc;

fn options(max_depth: usize, max_artists: usize, max_tracks: usize) -> ExploreOptions {
    ExploreOptions {
        max_depth,
        max_artists_per_level: max_artists,
        max_tracks_per_artist: max_tracks,
        market: "US".to_string(),
    }
}

fn ids(artists: &[Artist]) -> Vec<String> {
    artists.iter().filter_map(|a| a.id.clone()).collect()
}

// Two branches that share the neighbour "c".
fn diamond() -> MockSpotify {
    MockSpotify::new()
        .with_related("seed", vec![artist("a", 90), artist("b", 80)])
        .with_related("a", vec![artist("c", 70), artist("d", 60)])
        .with_related("b", vec![artist("c", 70), artist("e", 50)])
        .with_top("a", vec![track("a1", "A One", 40), track("a2", "A Two", 30)])
        .with_top("b", vec![track("b1", "B One", 45)])
        .with_top("c", vec![track("c1", "C One", 40)])
        .with_top("d", vec![track("d1", "D One", 10)])
        .with_top("e", vec![track("e1", "E One", 99)])
}

#[tokio::test]
async fn test_zero_depth_visits_only_the_seed() {
    let mock = Arc::new(diamond());
    let explorer = Explorer::new(mock.clone(), options(0, 3, 3));

    let exploration = explorer.explore(&artist("seed", 50)).await.unwrap();

    assert!(exploration.artists.is_empty());
    assert!(exploration.tracks.is_empty());
    assert_eq!(mock.fetch_count(), 0);
}

#[tokio::test]
async fn test_chooses_most_popular_related_artists() {
    let related = vec![
        artist("p50", 50),
        artist("p70", 70),
        artist("p90", 90),
        artist("p60", 60),
        artist("p80", 80),
    ];
    let mock = Arc::new(MockSpotify::new().with_related("seed", related));
    let explorer = Explorer::new(mock.clone(), options(1, 2, 3));

    let exploration = explorer.explore(&artist("seed", 50)).await.unwrap();

    assert_eq!(ids(&exploration.artists), vec!["p90", "p80"]);
    assert_eq!(mock.top_track_requests(), vec!["p90", "p80"]);
}

#[tokio::test]
async fn test_shared_neighbours_are_visited_once() {
    let mock = Arc::new(diamond());
    let explorer = Explorer::new(mock.clone(), options(2, 2, 3));

    let exploration = explorer.explore(&artist("seed", 50)).await.unwrap();

    let visited: HashSet<String> = ids(&exploration.artists).into_iter().collect();
    assert_eq!(exploration.artists.len(), 5);
    assert_eq!(
        visited,
        ["a", "b", "c", "d", "e"].iter().map(|s| s.to_string()).collect()
    );

    let mut requested = mock.top_track_requests();
    requested.sort();
    assert_eq!(requested, vec!["a", "b", "c", "d", "e"]);

    let track_ids: Vec<String> = exploration
        .tracks
        .iter()
        .filter_map(|t| t.id.clone())
        .collect();
    assert_eq!(track_ids, vec!["e1", "b1", "a1", "c1", "a2", "d1"]);
}

#[tokio::test]
async fn test_cycles_back_to_the_seed_are_cut() {
    let mock = Arc::new(
        MockSpotify::new()
            .with_related("seed", vec![artist("a", 90)])
            .with_related("a", vec![artist("seed", 95), artist("b", 10)])
            .with_related("b", vec![artist("a", 90)]),
    );
    let explorer = Explorer::new(mock.clone(), options(5, 2, 1));

    let exploration = explorer.explore(&artist("seed", 50)).await.unwrap();

    assert_eq!(ids(&exploration.artists), vec!["a", "b"]);
    assert!(!mock.top_track_requests().contains(&"seed".to_string()));
}

#[tokio::test]
async fn test_tracks_per_artist_are_truncated_by_popularity() {
    let mock = Arc::new(
        MockSpotify::new()
            .with_related("seed", vec![artist("a", 90)])
            .with_top(
                "a",
                vec![
                    track("t1", "Low", 10),
                    track("t2", "High", 90),
                    track("t3", "Mid", 50),
                    track("t4", "Also Mid", 50),
                ],
            ),
    );
    let explorer = Explorer::new(mock, options(1, 1, 3));

    let exploration = explorer.explore(&artist("seed", 50)).await.unwrap();

    let names: Vec<&str> = exploration.tracks.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["High", "Also Mid", "Mid"]);
}

#[tokio::test]
async fn test_stops_consuming_batches_once_enough_candidates() {
    let mock = Arc::new(MockSpotify::new().with_related_batches(
        "seed",
        vec![
            vec![artist("a", 10), artist("b", 20)],
            vec![artist("c", 90)],
            vec![artist("d", 95)],
        ],
    ));
    let explorer = Explorer::new(mock.clone(), options(1, 2, 1));

    let exploration = explorer.explore(&artist("seed", 50)).await.unwrap();

    assert_eq!(ids(&exploration.artists), vec!["b", "a"]);
    assert_eq!(
        mock.related_batches
            .load(std::sync::atomic::Ordering::SeqCst),
        1
    );
}

#[tokio::test]
async fn test_merges_batches_until_limit_is_reached() {
    let mock = Arc::new(MockSpotify::new().with_related_batches(
        "seed",
        vec![vec![artist("a", 10)], vec![artist("c", 90), artist("d", 5)]],
    ));
    let explorer = Explorer::new(mock, options(1, 2, 1));

    let exploration = explorer.explore(&artist("seed", 50)).await.unwrap();

    assert_eq!(ids(&exploration.artists), vec!["c", "a"]);
}

#[tokio::test]
async fn test_accumulator_stays_sorted_for_random_graphs() {
    let mut rng = rand::rng();

    for _ in 0..20 {
        let mut mock = MockSpotify::new();
        let level_one: Vec<Artist> = (0..4)
            .map(|i| artist(&format!("l1-{}", i), rng.random_range(0..=100)))
            .collect();
        mock = mock.with_related("seed", level_one.clone());

        for parent in &level_one {
            let parent_id = parent.id.clone().unwrap();
            let children: Vec<Artist> = (0..4)
                .map(|i| artist(&format!("l2-{}", rng.random_range(0..6) + i), rng.random_range(0..=100)))
                .collect();
            mock = mock.with_related(&parent_id, children);
        }

        for id in (0..4).map(|i| format!("l1-{}", i)).chain((0..10).map(|i| format!("l2-{}", i))) {
            let tracks = (0..5)
                .map(|t| {
                    track(
                        &format!("{}-{}", id, t),
                        &format!("Track {}", rng.random_range(0..3)),
                        rng.random_range(0..=100),
                    )
                })
                .collect();
            mock = mock.with_top(&id, tracks);
        }

        let explorer = Explorer::new(Arc::new(mock), options(2, 3, 3));
        let exploration = explorer.explore(&artist("seed", 50)).await.unwrap();

        assert!(utils::is_sorted_by(
            &exploration.tracks,
            order::track_popularity_descending
        ));

        let unique: HashSet<String> = ids(&exploration.artists).into_iter().collect();
        assert_eq!(unique.len(), exploration.artists.len());
    }
}

#[tokio::test]
async fn test_no_related_artists_is_reported() {
    let mock = Arc::new(MockSpotify::new());
    let explorer = Explorer::new(mock, options(2, 3, 3));

    let result = explorer.explore(&artist("lonely", 10)).await;

    assert!(matches!(
        result,
        Err(ExploreError::NoRelatedArtists { ref seed }) if seed == "Artist lonely"
    ));
}

#[tokio::test]
async fn test_seed_without_id_is_rejected() {
    let mock = Arc::new(diamond());
    let explorer = Explorer::new(mock.clone(), options(2, 3, 3));
    let seed = Artist {
        name: "Nobody".to_string(),
        ..Default::default()
    };

    let result = explorer.explore(&seed).await;

    assert!(matches!(result, Err(ExploreError::MissingIdentifier(_))));
    assert_eq!(mock.fetch_count(), 0);
}

#[tokio::test]
async fn test_related_artists_without_id_are_skipped() {
    let anonymous = Artist {
        name: "Anonymous".to_string(),
        popularity: Some(100),
        ..Default::default()
    };
    let mock = Arc::new(MockSpotify::new().with_related("seed", vec![anonymous, artist("a", 10)]));
    let explorer = Explorer::new(mock, options(1, 2, 1));

    let exploration = explorer.explore(&artist("seed", 50)).await.unwrap();

    assert_eq!(ids(&exploration.artists), vec!["a"]);
}

#[tokio::test]
async fn test_upstream_failure_aborts_the_traversal() {
    let mut mock = diamond();
    mock.fail_related.insert("b".to_string());
    let explorer = Explorer::new(Arc::new(mock), options(2, 2, 1));

    let result = explorer.explore(&artist("seed", 50)).await;

    assert!(matches!(result, Err(ExploreError::Upstream(_))));
}

#[tokio::test]
async fn test_progress_events_follow_the_traversal() {
    let mock = Arc::new(diamond());
    let (sender, mut receiver) = mpsc::unbounded_channel();
    let explorer = Explorer::new(mock, options(2, 2, 3)).with_progress(sender);

    let exploration = explorer.explore(&artist("seed", 50)).await.unwrap();
    drop(explorer);

    let mut visited = 0;
    let mut tracks = 0;
    while let Some(event) = receiver.recv().await {
        match event {
            Progress::ArtistVisited { .. } => visited += 1,
            Progress::TracksAdded { tracks: added, .. } => tracks += added.len(),
        }
    }

    assert_eq!(visited, exploration.artists.len());
    assert_eq!(tracks, exploration.tracks.len());
}

// `levels` generations below "seed", every artist with `width` children.
fn wide_tree(levels: usize, width: usize) -> MockSpotify {
    let mut mock = MockSpotify::new();
    let mut generation = vec!["seed".to_string()];

    for level in 0..levels {
        let mut next = Vec::new();
        for parent in &generation {
            let children: Vec<Artist> = (0..width)
                .map(|i| artist(&format!("{}-{}", parent, i), (90 - level * 10 - i) as u32))
                .collect();
            next.extend(children.iter().filter_map(|a| a.id.clone()));
            mock = mock.with_related(parent, children);
        }
        generation = next;
    }

    mock
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_cancelled_traversal_issues_no_further_fetches() {
    for run in 0..200u64 {
        let mock = Arc::new(wide_tree(4, 3).with_delay(Duration::from_millis(3)));
        let explorer = Explorer::new(mock.clone(), options(4, 3, 2));

        let handle = tokio::spawn(async move { explorer.explore(&artist("seed", 50)).await });
        tokio::time::sleep(Duration::from_micros((run % 40) * 500)).await;
        handle.abort();
        let _ = handle.await;

        let issued = mock.fetch_count();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(
            mock.fetch_count(),
            issued,
            "run {} issued fetches after cancellation",
            run
        );
    }
}

#[tokio::test]
async fn test_dropping_the_future_stops_a_deep_traversal() {
    let mock = Arc::new(wide_tree(3, 3).with_delay(Duration::from_millis(20)));
    let explorer = Explorer::new(mock.clone(), options(3, 3, 2));

    let result = tokio::time::timeout(
        Duration::from_millis(70),
        explorer.explore(&artist("seed", 50)),
    )
    .await;
    assert!(result.is_err());

    let issued = mock.fetch_count();
    assert!(issued > 0);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(mock.fetch_count(), issued);
}

#[tokio::test]
async fn test_tracks_without_identifier_are_skipped() {
    let anonymous = Track {
        id: None,
        uri: None,
        ..track("anon", "Anon", 99)
    };
    let mock = Arc::new(
        MockSpotify::new()
            .with_related("seed", vec![artist("a", 90)])
            .with_top("a", vec![anonymous, track("t", "T", 10)]),
    );
    let explorer = Explorer::new(mock, options(1, 1, 1));

    let exploration = explorer.explore(&artist("seed", 50)).await.unwrap();

    let names: Vec<&str> = exploration.tracks.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["T"]);
}

#[tokio::test]
async fn test_zero_artists_per_level_is_an_empty_result() {
    let mock = Arc::new(diamond());
    let explorer = Explorer::new(mock.clone(), options(2, 0, 3));

    let exploration = explorer.explore(&artist("seed", 50)).await.unwrap();

    assert!(exploration.artists.is_empty());
    assert!(exploration.tracks.is_empty());
    assert_eq!(mock.fetch_count(), 0);
}
