// Melody generation over a finished progression.
//
// Each chord gets `ceil(4 * melody_density) + 1` notes. A note is a chord
// tone 70% of the time, otherwise any note of the genre's melody scale
// built on the key root. Durations are drawn from the rhythm level,
// velocities cycle its dynamics, and octaves are 4 or 5.

use crate::catalog::{GenreProfile, RhythmPattern};
use crate::chord::{Chord, chord_pitch_classes};
use crate::pitch::{Key, PitchClass, scale_notes};
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

const CHORD_TONE_ODDS: f64 = 0.7;
const DEFAULT_DURATION: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MelodyNote {
    pub note: PitchClass,
    /// Length in beats.
    pub duration: f64,
    pub velocity: f64,
    pub chord_index: usize,
    pub octave: i32,
}

pub fn notes_per_chord(rhythm: &RhythmPattern) -> usize {
    (4.0 * rhythm.melody_density.max(0.0)).ceil() as usize + 1
}

pub fn generate_melody(
    progression: &[Chord],
    genre: &GenreProfile,
    rhythm: &RhythmPattern,
    key: Key,
    rng: &mut impl Rng,
) -> Vec<MelodyNote> {
    let scale = scale_notes(key.root, genre.melody_scale);
    let per_chord = notes_per_chord(rhythm);
    let mut melody = Vec::with_capacity(progression.len() * per_chord);

    for (chord_index, chord) in progression.iter().enumerate() {
        let tones = chord_pitch_classes(chord);
        for i in 0..per_chord {
            let pool = if rng.random_bool(CHORD_TONE_ODDS) { &tones } else { &scale };
            let note = pool.choose(rng).copied().unwrap_or(chord.root);
            let duration = rhythm.durations.choose(rng).copied().unwrap_or(DEFAULT_DURATION);
            melody.push(MelodyNote {
                note,
                duration,
                velocity: rhythm.velocity(i),
                chord_index,
                octave: rng.random_range(4..=5),
            });
        }
    }

    tracing::debug!(notes = melody.len(), "generated melody");
    melody
}
