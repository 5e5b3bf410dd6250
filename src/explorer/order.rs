//! Composite ranking of artists and tracks.
//!
//! Both comparators rank by popularity first, highest first. Artists fall back
//! to follower count, again highest first, and both end on the name in
//! ascending order so equal scores still order deterministically. A missing
//! score ranks below every present one.

use std::cmp::Ordering;

use crate::types::{Artist, Track};

pub fn artist_popularity_descending(a: &Artist, b: &Artist) -> Ordering {
    b.popularity
        .cmp(&a.popularity)
        .then_with(|| b.follower_count().cmp(&a.follower_count()))
        .then_with(|| a.name.cmp(&b.name))
}

pub fn track_popularity_descending(a: &Track, b: &Track) -> Ordering {
    b.popularity
        .cmp(&a.popularity)
        .then_with(|| a.name.cmp(&b.name))
}
