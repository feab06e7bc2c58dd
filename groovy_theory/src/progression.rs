// Progression generator.
//
// Two sources feed a progression:
// - a genre profile: one of its degree templates is picked at random and
//   grown to a target length by inserting auxiliary degrees (ii, IV, V, vi,
//   iii) at random positions, then each degree becomes a chord, with an
//   occasional upgrade to one of the genre's extended qualities;
// - a mood profile: delegated to `harmony::functional_progression`.
//
// Chords at locked indices are then restored from the previous progression,
// but only where the previous progression actually had a chord.
//
// The result feeds the substitution, spice and groove stages in pipeline.rs.

use crate::catalog::{Catalog, ComplexitySetting, GenreProfile, chance};
use crate::chord::{Chord, chord_from_degree};
use crate::error::{Result, TheoryError};
use crate::harmony::{MoodProfile, functional_progression};
use crate::pitch::{Key, Scale};
use rand::Rng;
use rand::seq::IndexedRandom;

/// Degrees inserted when a template is shorter than the target length.
pub const AUXILIARY_DEGREES: [&str; 5] = ["ii", "IV", "V", "vi", "iii"];

/// Where chords come from.
#[derive(Debug, Clone, Copy)]
pub enum ProgressionSource<'a> {
    Genre(&'a GenreProfile),
    Mood(&'a MoodProfile),
}

/// Everything `generate_progression` needs besides the catalog.
#[derive(Debug, Clone, Copy)]
pub struct ProgressionRequest<'a> {
    pub source: ProgressionSource<'a>,
    pub complexity: &'a ComplexitySetting,
    pub key: Key,
    /// The progression being replaced, read only for locked indices.
    pub previous: &'a [Chord],
    pub locked: &'a [usize],
}

/// Sample a length uniformly from the inclusive chord-count range.
fn target_length(setting: &ComplexitySetting, rng: &mut impl Rng) -> usize {
    let (a, b) = setting.chord_count;
    rng.random_range(a.min(b)..=a.max(b))
}

/// Grow `template` to a random length within the complexity range by
/// inserting auxiliary degrees at random positions. Templates already at or
/// past the target are returned unchanged.
pub fn build_degree_sequence(
    template: &[String],
    setting: &ComplexitySetting,
    rng: &mut impl Rng,
) -> Vec<String> {
    let mut degrees = template.to_vec();
    let target = target_length(setting, rng);
    while degrees.len() < target {
        let at = rng.random_range(0..=degrees.len());
        let degree = AUXILIARY_DEGREES[rng.random_range(0..AUXILIARY_DEGREES.len())];
        degrees.insert(at, degree.to_string());
    }
    degrees
}

fn genre_progression(
    profile: &GenreProfile,
    setting: &ComplexitySetting,
    key: Key,
    catalog: &Catalog,
    rng: &mut impl Rng,
) -> Result<Vec<Chord>> {
    let template = profile
        .progressions
        .choose(rng)
        .ok_or_else(|| TheoryError::UnknownCatalogEntry {
            kind: "progression template",
            name: profile.name.clone(),
        })?;
    let degrees = build_degree_sequence(template, setting, rng);

    let scale = if key.is_minor { Scale::Minor } else { profile.scale };
    let extensions = profile.extension_qualities();

    degrees
        .iter()
        .map(|degree| {
            let mut chord = chord_from_degree(key.root, degree, key.is_minor, scale)?;
            if setting.use_extensions && chance(rng, catalog.odds.extension) {
                if let Some(quality) = extensions.choose(rng) {
                    chord.quality = quality.clone();
                }
            }
            Ok(chord)
        })
        .collect()
}

/// Overwrite locked indices with the previous progression's chords.
///
/// An index is restored only when both the previous and the new progression
/// have a chord there.
pub fn restore_locked(mut chords: Vec<Chord>, previous: &[Chord], locked: &[usize]) -> Vec<Chord> {
    for &index in locked {
        if let (Some(old), Some(slot)) = (previous.get(index), chords.get_mut(index)) {
            *slot = old.clone();
        }
    }
    chords
}

/// Build a fresh progression from a genre template or a mood.
pub fn generate_progression(
    request: &ProgressionRequest<'_>,
    catalog: &Catalog,
    rng: &mut impl Rng,
) -> Result<Vec<Chord>> {
    let chords = match request.source {
        ProgressionSource::Genre(profile) => {
            genre_progression(profile, request.complexity, request.key, catalog, rng)?
        }
        ProgressionSource::Mood(mood) => {
            let length = target_length(request.complexity, rng);
            functional_progression(request.key, length, mood, &catalog.harmonic_functions, rng)?
        }
    };

    tracing::debug!(
        key = %request.key.name(),
        chords = chords.len(),
        locked = request.locked.len(),
        "generated progression"
    );
    Ok(restore_locked(chords, request.previous, request.locked))
}
