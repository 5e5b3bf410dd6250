use std::ops::RangeInclusive;

use crate::types::{AudioFeatures, EnrichedTrack, Track};

const TEMPO_FLOOR: f64 = 70.0;
const TEMPO_CEILING: f64 = 140.0;

/// Folds a tempo into the `[70, 140)` BPM octave by doubling or halving it.
///
/// Tracks annotated at half or double time land on the same value, which makes
/// the result usable as a sort key.
pub fn normalized_tempo(tempo: f64) -> f64 {
    if !tempo.is_finite() || tempo <= 0.0 {
        return tempo;
    }
    let mut work = tempo;
    while work < TEMPO_FLOOR {
        work *= 2.0;
    }
    while work >= TEMPO_CEILING {
        work /= 2.0;
    }
    work
}

/// `true` if the tempo, or its double or half, falls inside `range`.
pub fn tempo_in_range(tempo: f64, range: &RangeInclusive<f64>) -> bool {
    [tempo, tempo * 2.0, tempo / 2.0]
        .iter()
        .any(|candidate| range.contains(candidate))
}

/// User supplied constraints on wizard results.
#[derive(Debug, Clone, Default)]
pub struct TrackFilter {
    pub popularity: Option<RangeInclusive<u32>>,
    pub bpm: Option<RangeInclusive<f64>>,
}

impl TrackFilter {
    /// A BPM constraint can only be checked with audio features at hand.
    pub fn needs_features(&self) -> bool {
        self.bpm.is_some()
    }

    pub fn matches(&self, track: &Track, features: Option<&AudioFeatures>) -> bool {
        if let Some(range) = &self.popularity {
            match track.popularity {
                Some(popularity) if range.contains(&popularity) => {}
                _ => return false,
            }
        }

        if let Some(range) = &self.bpm {
            match features {
                Some(f) if tempo_in_range(f.tempo, range) => {}
                _ => return false,
            }
        }

        true
    }
}

/// Keeps the enriched tracks `predicate` accepts, preserving their order.
pub fn retain_enriched<F>(tracks: &mut Vec<EnrichedTrack>, predicate: F)
where
    F: Fn(&Track, &AudioFeatures) -> bool,
{
    tracks.retain(|t| predicate(&t.track, &t.features));
}

/// Sorts by normalized tempo, slowest first. The sort is stable, so tracks of
/// equal tempo keep their popularity order.
pub fn sort_by_tempo(tracks: &mut [EnrichedTrack]) {
    tracks.sort_by(|a, b| {
        normalized_tempo(a.features.tempo).total_cmp(&normalized_tempo(b.features.tempo))
    });
}
