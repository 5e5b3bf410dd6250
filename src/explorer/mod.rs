//! # Related Content Explorer
//!
//! Walks Spotify's related-artist graph outward from a seed artist and collects
//! the top tracks of every artist it reaches.
//!
//! ## Traversal
//!
//! ```text
//! visit(seed, 0)
//!   ├── related artists of seed, best `max_artists_per_level`
//!   │     ├── artist A (new)  → top tracks → accumulator
//!   │     │     ├── visit(A, 1)          ┐ joined before
//!   │     │     └── report A's tracks    ┘ visit(seed, 0) returns
//!   │     └── artist B (already visited) → skipped
//!   ...
//! ```
//!
//! - Depth is bounded by `max_depth`: a visit at `level >= max_depth` does nothing.
//! - Every visit picks at most `max_artists_per_level` related artists, ranked
//!   by [`order::artist_popularity_descending`].
//! - Every newly visited artist contributes at most `max_tracks_per_artist`
//!   tracks, ranked by [`order::track_popularity_descending`].
//!
//! ## Shared State
//!
//! The visited set and the result accumulator belong to one traversal and sit
//! behind a single mutex. The lock is only held for the test-and-insert of an
//! artist id and for the sorted merge of a batch of tracks, never across a
//! fetch. The seed itself is marked visited up front so that cycles back to it
//! are cut.
//!
//! ## Failure and Cancellation
//!
//! A failed relationship or top-tracks fetch aborts the whole traversal: the
//! failing visit returns the error, its task group is dropped, and dropping a
//! task group aborts every child still running. The result is all-or-nothing:
//! partial state is discarded, only [`Progress`] events sent before the
//! failure remain observable.
//!
//! Dropping the future returned by [`Explorer::explore`] cancels the
//! traversal's [`CancellationToken`] synchronously, before the task groups are
//! torn down. Every fetch and every spawn checks the token first, so a child
//! that is still being polled on another worker cannot start a new request
//! once the caller has seen the cancellation.

pub mod browse;
pub mod features;
pub mod filter;
pub mod order;

use std::{collections::HashSet, future::Future, sync::Arc};

use futures_util::{FutureExt, TryStreamExt, future::BoxFuture};
use tokio::{
    sync::{Mutex, mpsc::UnboundedSender},
    task::JoinSet,
};
use tokio_util::sync::CancellationToken;

use crate::{
    config,
    error::{ExploreError, SpotifyError},
    spotify::SpotifyApi,
    types::{Artist, EnrichedTrack, Track},
    utils,
};

pub use filter::TrackFilter;

/// Bounds of a traversal.
#[derive(Debug, Clone)]
pub struct ExploreOptions {
    pub max_depth: usize,
    pub max_artists_per_level: usize,
    pub max_tracks_per_artist: usize,
    pub market: String,
}

impl Default for ExploreOptions {
    fn default() -> Self {
        Self {
            max_depth: config::DEFAULT_MAX_DEPTH,
            max_artists_per_level: config::DEFAULT_MAX_ARTISTS,
            max_tracks_per_artist: config::DEFAULT_MAX_TRACKS,
            market: config::DEFAULT_MARKET.to_string(),
        }
    }
}

/// Incremental events emitted while a traversal runs.
#[derive(Debug, Clone)]
pub enum Progress {
    ArtistVisited { level: usize, artist: Artist },
    TracksAdded {
        level: usize,
        artist: Artist,
        tracks: Vec<Track>,
    },
}

/// Outcome of a completed traversal.
#[derive(Debug, Clone, Default)]
pub struct Exploration {
    /// Related artists in the order they were first visited; the seed is not included.
    pub artists: Vec<Artist>,
    /// Collected tracks, most popular first.
    pub tracks: Vec<Track>,
}

#[derive(Default)]
struct ExploreState {
    visited: HashSet<String>,
    artists: Vec<Artist>,
    tracks: Vec<Track>,
}

struct Traversal {
    api: Arc<dyn SpotifyApi>,
    options: ExploreOptions,
    state: Mutex<ExploreState>,
    progress: Option<UnboundedSender<Progress>>,
    cancel: CancellationToken,
}

pub struct Explorer {
    api: Arc<dyn SpotifyApi>,
    options: ExploreOptions,
    progress: Option<UnboundedSender<Progress>>,
}

impl Explorer {
    pub fn new(api: Arc<dyn SpotifyApi>, options: ExploreOptions) -> Self {
        Self {
            api,
            options,
            progress: None,
        }
    }

    /// Sends [`Progress`] events to `sender` while exploring. A closed
    /// receiver is ignored.
    pub fn with_progress(mut self, sender: UnboundedSender<Progress>) -> Self {
        self.progress = Some(sender);
        self
    }

    /// Explores the related-artist graph starting at `seed`.
    ///
    /// # Errors
    ///
    /// - [`ExploreError::MissingIdentifier`] if the seed has no id
    /// - [`ExploreError::Upstream`] if any relationship or top-tracks fetch fails
    /// - [`ExploreError::NoRelatedArtists`] if related artists were asked for
    ///   and none could be visited
    pub async fn explore(&self, seed: &Artist) -> Result<Exploration, ExploreError> {
        let seed_id = seed
            .id
            .clone()
            .ok_or_else(|| ExploreError::MissingIdentifier(seed.name.clone()))?;

        let mut state = ExploreState::default();
        state.visited.insert(seed_id);

        let cancel = CancellationToken::new();
        let _cancel_on_drop = cancel.clone().drop_guard();

        let traversal = Arc::new(Traversal {
            api: Arc::clone(&self.api),
            options: self.options.clone(),
            state: Mutex::new(state),
            progress: self.progress.clone(),
            cancel,
        });

        Arc::clone(&traversal).visit(seed.clone(), 0).await?;

        let state = std::mem::take(&mut *traversal.state.lock().await);
        log::info!(
            "explored {} related artists of {}, collected {} tracks",
            state.artists.len(),
            seed.name,
            state.tracks.len()
        );

        let wanted_related = self.options.max_depth > 0 && self.options.max_artists_per_level > 0;
        if wanted_related && state.artists.is_empty() {
            return Err(ExploreError::NoRelatedArtists {
                seed: seed.name.clone(),
            });
        }

        Ok(Exploration {
            artists: state.artists,
            tracks: state.tracks,
        })
    }

    /// Pairs `tracks` with their audio features, dropping tracks without any.
    pub async fn enrich(&self, tracks: Vec<Track>) -> Vec<EnrichedTrack> {
        features::enrich(self.api.as_ref(), tracks).await
    }

    /// Enriches `tracks` and keeps the ones `filter` accepts.
    pub async fn enrich_filtered(&self, tracks: Vec<Track>, filter: &TrackFilter) -> Vec<EnrichedTrack> {
        let mut enriched = self.enrich(tracks).await;
        filter::retain_enriched(&mut enriched, |track, features| {
            filter.matches(track, Some(features))
        });
        enriched
    }
}

impl Traversal {
    fn visit(self: Arc<Self>, artist: Artist, level: usize) -> BoxFuture<'static, Result<(), ExploreError>> {
        async move {
            if level >= self.options.max_depth {
                return Ok(());
            }
            let Some(artist_id) = artist.id.as_deref() else {
                log::debug!("skipping artist {} without id", artist.name);
                return Ok(());
            };

            let chosen = self.choose_related(artist_id).await?;
            let mut group = JoinSet::new();

            for related in chosen {
                let Some(related_id) = related.id.clone() else {
                    log::debug!("skipping related artist {} without id", related.name);
                    continue;
                };
                if !self.mark_visited(related_id.clone(), &related).await {
                    continue;
                }

                log::debug!("{}. {}", level, related.name);
                self.report(Progress::ArtistVisited {
                    level,
                    artist: related.clone(),
                });

                let tracks = self.top_tracks(&related_id).await?;
                self.merge_tracks(&tracks).await;

                self.ensure_active()?;
                group.spawn(Arc::clone(&self).visit(related.clone(), level + 1));

                let reporter = Arc::clone(&self);
                group.spawn(async move {
                    for track in &tracks {
                        log::debug!("{}. {} {}", level, related.name, track.name);
                    }
                    reporter.report(Progress::TracksAdded {
                        level,
                        artist: related,
                        tracks,
                    });
                    Ok(())
                });
            }

            while let Some(joined) = group.join_next().await {
                match joined {
                    Ok(result) => result?,
                    Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
                    Err(_) => {}
                }
            }

            Ok(())
        }
        .boxed()
    }

    /// Pulls related-artist batches until enough candidates are known and
    /// returns the best `max_artists_per_level` of them.
    async fn choose_related(&self, artist_id: &str) -> Result<Vec<Artist>, ExploreError> {
        let limit = self.options.max_artists_per_level;
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut candidates = Vec::new();
        let mut batches = self.api.related_artists(artist_id);
        while let Some(batch) = self.unless_cancelled(batches.try_next()).await? {
            utils::append_sorted(&mut candidates, batch, order::artist_popularity_descending);
            if candidates.len() >= limit {
                break;
            }
        }

        candidates.truncate(limit);
        Ok(candidates)
    }

    /// Best `max_tracks_per_artist` tracks of an artist. Tracks without an id
    /// or URI cannot be enriched or added to a playlist and are skipped.
    async fn top_tracks(&self, artist_id: &str) -> Result<Vec<Track>, ExploreError> {
        let limit = self.options.max_tracks_per_artist;
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut tracks = Vec::new();
        let mut batches = self.api.top_tracks(artist_id, &self.options.market);
        while let Some(batch) = self.unless_cancelled(batches.try_next()).await? {
            let identified = batch.into_iter().filter(|track| {
                let known = track.id.is_some() && track.uri.is_some();
                if !known {
                    log::debug!("skipping track {} of {} without identifier", track.name, artist_id);
                }
                known
            });
            utils::append_sorted(&mut tracks, identified, order::track_popularity_descending);
            if tracks.len() >= limit {
                break;
            }
        }

        tracks.truncate(limit);
        Ok(tracks)
    }

    fn ensure_active(&self) -> Result<(), ExploreError> {
        if self.cancel.is_cancelled() {
            return Err(ExploreError::Cancelled);
        }
        Ok(())
    }

    /// Polls `fetch` only while the traversal is alive. The token is checked
    /// before the first poll, so a cancelled traversal never issues a request.
    async fn unless_cancelled<F, T>(&self, fetch: F) -> Result<T, ExploreError>
    where
        F: Future<Output = Result<T, SpotifyError>>,
    {
        self.ensure_active()?;
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(ExploreError::Cancelled),
            result = fetch => result.map_err(ExploreError::from),
        }
    }

    /// Atomically records `artist_id` as visited. Returns `false` if it already was.
    async fn mark_visited(&self, artist_id: String, artist: &Artist) -> bool {
        let mut state = self.state.lock().await;
        if !state.visited.insert(artist_id) {
            return false;
        }
        state.artists.push(artist.clone());
        true
    }

    async fn merge_tracks(&self, tracks: &[Track]) {
        let mut state = self.state.lock().await;
        utils::append_sorted(
            &mut state.tracks,
            tracks.iter().cloned(),
            order::track_popularity_descending,
        );
    }

    fn report(&self, event: Progress) {
        if let Some(sender) = &self.progress {
            let _ = sender.send(event);
        }
    }
}
