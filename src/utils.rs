use std::cmp::Ordering;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};

use crate::types::Track;

/// Absolute duration tolerance when comparing two tracks, in milliseconds.
const DURATION_ABSOLUTE_TOLERANCE_MS: f64 = 10_000.0;
/// Relative duration tolerance when comparing two tracks.
const DURATION_RELATIVE_TOLERANCE: f64 = 0.1;

pub fn generate_code_verifier() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(128)
        .map(char::from)
        .collect()
}

pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Index at which `element` can be inserted into the already sorted `items`
/// without breaking the order given by `compare`. Equal elements stay in
/// insertion order: the new one lands after them.
pub fn sorted_insertion_index<T, F>(items: &[T], element: &T, compare: F) -> usize
where
    F: Fn(&T, &T) -> Ordering,
{
    items.partition_point(|existing| compare(existing, element) != Ordering::Greater)
}

pub fn insert_sorted<T, F>(items: &mut Vec<T>, element: T, compare: F)
where
    F: Fn(&T, &T) -> Ordering,
{
    let index = sorted_insertion_index(items, &element, &compare);
    items.insert(index, element);
}

/// Inserts every element of `elements` into the sorted `items`.
pub fn append_sorted<T, I, F>(items: &mut Vec<T>, elements: I, compare: F)
where
    I: IntoIterator<Item = T>,
    F: Fn(&T, &T) -> Ordering,
{
    for element in elements {
        insert_sorted(items, element, &compare);
    }
}

pub fn is_sorted_by<T, F>(items: &[T], compare: F) -> bool
where
    F: Fn(&T, &T) -> Ordering,
{
    items
        .windows(2)
        .all(|pair| compare(&pair[0], &pair[1]) != Ordering::Greater)
}

/// `true` when `a` and `b` differ by no more than the larger of the absolute
/// tolerance and the relative tolerance scaled by the larger magnitude.
pub fn is_approximately_equal(a: f64, b: f64, absolute: f64, relative: f64) -> bool {
    if a == b {
        return true;
    }
    let scale = a.abs().max(b.abs());
    (a - b).abs() <= absolute.max(relative * scale)
}

/// Returns `true` if `a` is probably the same recording as `b`.
///
/// Equal URIs always match. Otherwise name and first artist must be equal and
/// the durations must lie within ten seconds or ten percent of each other.
/// Two tracks without a duration are considered equal in length.
pub fn is_probably_same_track(a: &Track, b: &Track) -> bool {
    if let (Some(uri), Some(other)) = (&a.uri, &b.uri) {
        if uri == other {
            return true;
        }
    }

    if a.name != b.name || a.first_artist_name() != b.first_artist_name() {
        return false;
    }

    match (a.duration_ms, b.duration_ms) {
        (Some(duration), Some(other)) => is_approximately_equal(
            duration as f64,
            other as f64,
            DURATION_ABSOLUTE_TOLERANCE_MS,
            DURATION_RELATIVE_TOLERANCE,
        ),
        (None, None) => true,
        _ => false,
    }
}

/// Drops every track that is probably the same as one earlier in the list,
/// keeping the order of the survivors.
pub fn remove_probable_duplicates(tracks: &mut Vec<Track>) {
    let mut kept: Vec<Track> = Vec::with_capacity(tracks.len());
    for track in tracks.drain(..) {
        if !kept.iter().any(|k| is_probably_same_track(k, &track)) {
            kept.push(track);
        }
    }
    *tracks = kept;
}

/// URIs of `tracks`, skipping tracks that have none.
pub fn track_uris(tracks: &[Track]) -> Vec<String> {
    tracks.iter().filter_map(|t| t.uri.clone()).collect()
}

pub fn format_optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}
