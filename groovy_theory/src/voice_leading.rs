// Voice-leading optimizer.
//
// Places each chord's pitch classes in absolute octaves so that consecutive
// chords move as little as possible. With no previous voicing the chord is
// stacked from the base octave upward, four notes per octave. Otherwise every
// (start octave, inversion) pair in the [3, 5] octave window is enumerated and
// scored by
//
//   |mean(candidate) - mean(previous)| + 0.5 * sum(nearest previous distance)
//
// The lowest score wins; ties keep the first candidate in enumeration order
// (start octave ascending, then inversion ascending).
//
// Runs after the groove stage in the pipeline; the MIDI encoder and the
// melody generator read the resulting `voiced_notes`.

use crate::chord::{Chord, chord_pitch_classes};
use crate::pitch::{PitchClass, pitch_number};
use serde::{Deserialize, Serialize};

pub const MIN_OCTAVE: i32 = 3;
pub const MAX_OCTAVE: i32 = 5;
pub const DEFAULT_BASE_OCTAVE: i32 = 4;

/// A pitch class placed in a concrete octave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoicedNote {
    pub note: PitchClass,
    pub octave: i32,
    /// `(octave + 1) * 12 + note`.
    pub pitch: i32,
}

impl VoicedNote {
    pub fn new(note: PitchClass, octave: i32) -> Self {
        VoicedNote {
            note,
            octave,
            pitch: pitch_number(note, octave),
        }
    }
}

fn mean_pitch(notes: &[VoicedNote]) -> f64 {
    notes.iter().map(|n| n.pitch as f64).sum::<f64>() / notes.len() as f64
}

/// Rotate `notes` by `inversion`, raising the first `inversion` slots one
/// octave. Returns `None` if any note leaves the octave window.
fn candidate(notes: &[PitchClass], start_octave: i32, inversion: usize) -> Option<Vec<VoicedNote>> {
    let n = notes.len();
    (0..n)
        .map(|i| {
            let octave = start_octave + if i < inversion { 1 } else { 0 };
            (MIN_OCTAVE..=MAX_OCTAVE)
                .contains(&octave)
                .then(|| VoicedNote::new(notes[(i + inversion) % n], octave))
        })
        .collect()
}

fn voicing_cost(voicing: &[VoicedNote], previous: &[VoicedNote], previous_mean: f64) -> f64 {
    let center = (mean_pitch(voicing) - previous_mean).abs();
    let nearest: i32 = voicing
        .iter()
        .map(|v| {
            previous
                .iter()
                .map(|p| (v.pitch - p.pitch).abs())
                .min()
                .unwrap_or(0)
        })
        .sum();
    center + nearest as f64 * 0.5
}

/// Choose octave placements for `notes` that move least from `previous`.
pub fn find_best_voicing(
    notes: &[PitchClass],
    previous: Option<&[VoicedNote]>,
    base_octave: i32,
) -> Vec<VoicedNote> {
    let previous = match previous {
        Some(prev) if !prev.is_empty() => prev,
        _ => {
            return notes
                .iter()
                .enumerate()
                .map(|(i, &note)| VoicedNote::new(note, base_octave + (i / 4) as i32))
                .collect();
        }
    };
    if notes.is_empty() {
        return Vec::new();
    }

    let previous_mean = mean_pitch(previous);
    let mut best: Option<(f64, Vec<VoicedNote>)> = None;
    for start_octave in MIN_OCTAVE..=MAX_OCTAVE {
        for inversion in 0..notes.len() {
            let Some(voicing) = candidate(notes, start_octave, inversion) else {
                continue;
            };
            let cost = voicing_cost(&voicing, previous, previous_mean);
            if best.as_ref().is_none_or(|(best_cost, _)| cost < *best_cost) {
                best = Some((cost, voicing));
            }
        }
    }

    // Inversion 0 at the lowest octave always fits the window.
    best.map(|(_, voicing)| voicing).unwrap_or_default()
}

/// Voice every chord, seeding each step with the previous chord's voicing.
pub fn apply_voice_leading(progression: &[Chord]) -> Vec<Chord> {
    let mut previous: Option<Vec<VoicedNote>> = None;
    let voiced: Vec<Chord> = progression
        .iter()
        .map(|chord| {
            let voicing = find_best_voicing(
                &chord_pitch_classes(chord),
                previous.as_deref(),
                DEFAULT_BASE_OCTAVE,
            );
            previous = Some(voicing.clone());
            Chord {
                voiced_notes: Some(voicing),
                ..chord.clone()
            }
        })
        .collect();
    tracing::debug!(chords = voiced.len(), "applied voice leading");
    voiced
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chord::{ChordQuality, chord_from_degree};
    use crate::pitch::{Scale, note_index};

    fn pcs(names: &[&str]) -> Vec<PitchClass> {
        names.iter().map(|n| note_index(n).unwrap()).collect()
    }

    #[test]
    fn test_first_chord_stacks_from_base_octave() {
        let voicing = find_best_voicing(&pcs(&["C", "E", "G", "B", "D"]), None, 4);
        let octaves: Vec<i32> = voicing.iter().map(|v| v.octave).collect();
        assert_eq!(octaves, [4, 4, 4, 4, 5]);
        assert_eq!(voicing[0].pitch, 60);
        assert_eq!(voicing[4].pitch, 74);

        // An empty previous voicing behaves like none.
        assert_eq!(find_best_voicing(&pcs(&["C", "E", "G"]), Some(&[][..]), 4), voicing[..3]);
    }

    #[test]
    fn test_c_to_a_minor_stays_close() {
        let c_major = find_best_voicing(&pcs(&["C", "E", "G"]), None, 4);
        let a_minor = find_best_voicing(&pcs(&["A", "C", "E"]), Some(c_major.as_slice()), 4);

        assert_eq!(a_minor.len(), 3);
        // Keeps the shared C4 and E4 in place.
        let pitches: Vec<i32> = a_minor.iter().map(|v| v.pitch).collect();
        assert!(pitches.contains(&60) && pitches.contains(&64), "{pitches:?}");

        let c_mean = mean_pitch(&c_major);
        let chosen = (mean_pitch(&a_minor) - c_mean).abs();
        let worst = (MIN_OCTAVE..=MAX_OCTAVE)
            .flat_map(|o| (0..3).filter_map(move |inv| candidate(&pcs(&["A", "C", "E"]), o, inv)))
            .map(|v| (mean_pitch(&v) - c_mean).abs())
            .fold(0.0, f64::max);
        assert!(chosen < worst);
    }

    #[test]
    fn test_candidate_window() {
        let notes = pcs(&["C", "E", "G"]);
        assert!(candidate(&notes, 5, 0).is_some());
        assert!(candidate(&notes, 5, 1).is_none());
        let inv1 = candidate(&notes, 3, 1).unwrap();
        assert_eq!(inv1.iter().map(|v| v.note.name()).collect::<Vec<_>>(), ["E", "G", "C"]);
        assert_eq!(inv1.iter().map(|v| v.octave).collect::<Vec<_>>(), [4, 3, 3]);
    }

    #[test]
    fn test_ties_keep_first_candidate() {
        // Previous chord identical to the root-position C3 candidate: zero cost,
        // nothing later can beat it strictly.
        let prev = candidate(&pcs(&["C", "E", "G"]), 3, 0).unwrap();
        let chosen = find_best_voicing(&pcs(&["C", "E", "G"]), Some(prev.as_slice()), 4);
        assert_eq!(chosen, prev);
    }

    #[test]
    fn test_apply_voice_leading_window_and_counts() {
        let key = note_index("C").unwrap();
        let progression: Vec<Chord> = ["I", "vi", "IV", "V", "ii", "iii"]
            .iter()
            .map(|d| chord_from_degree(key, d, false, Scale::Major).unwrap())
            .map(|mut c| {
                if c.degree == "V" {
                    c.quality = ChordQuality::Dominant7;
                }
                c
            })
            .collect();

        let voiced = apply_voice_leading(&progression);
        assert_eq!(voiced.len(), progression.len());
        assert!(progression.iter().all(|c| c.voiced_notes.is_none()));

        for (chord, source) in voiced.iter().zip(&progression) {
            let notes = chord.voiced_notes.as_ref().unwrap();
            assert_eq!(notes.len(), chord_pitch_classes(source).len());
            assert!(notes.iter().all(|n| (MIN_OCTAVE..=MAX_OCTAVE).contains(&n.octave)));
        }
        // Chord 0 uses the stacked branch.
        assert_eq!(voiced[0].voiced_notes.as_ref().unwrap()[0].pitch, 60);
    }

    #[test]
    fn test_empty_chord_voices_to_nothing() {
        let prev = find_best_voicing(&pcs(&["C", "E", "G"]), None, 4);
        assert!(find_best_voicing(&[], Some(prev.as_slice()), 4).is_empty());
    }
}
