// Bass-line generation and analysis.
//
// `generate_bass_line` renders one of five styles per chord, all in the
// bass register (octave 2, one above for octave jumps):
//
//   root        1-4 root hits over the bar, more with higher variety
//   walking     root, two passing notes (chromatic or from the chord root's
//               major scale), then an approach tone into the next root
//   syncopated  a fixed off-beat duration pattern; slots may rest, sounding
//               slots play the root or a chord tone
//   octave      2-3 notes alternating octaves, sometimes the fifth
//   fifths      root/fifth patterns, alternating more with higher variety
//
// Velocities cycle through the rhythm level's dynamics by note index within
// the chord. "Next chord" wraps to the first chord at the end.
//
// `generate_rhythm_aware_bass_line` is the configurable agent variant: a
// per-style `BassAgentConfig` decides root emphasis, approach tones, octave
// jumps and fifths, and the groove pattern shapes velocities.

use crate::catalog::{RhythmPattern, chance};
use crate::chord::{Chord, chord_pitch_classes};
use crate::groove::GroovePattern;
use crate::pitch::{PitchClass, Scale, scale_notes};
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const BASS_OCTAVE: i32 = 2;

/// Beats per chord.
const BAR: f64 = 4.0;

/// Duration patterns (in beats) for the syncopated style; each sums to 4.
const SYNCOPATED_PATTERNS: [&[f64]; 3] = [
    &[1.5, 0.5, 1.0, 1.0],
    &[0.75, 0.75, 0.5, 1.0, 1.0],
    &[1.0, 0.5, 0.5, 1.5, 0.5],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BassStyle {
    Root,
    Walking,
    Syncopated,
    Octave,
    Fifths,
}

impl BassStyle {
    pub const ALL: [BassStyle; 5] = [
        BassStyle::Root,
        BassStyle::Walking,
        BassStyle::Syncopated,
        BassStyle::Octave,
        BassStyle::Fifths,
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BassNote {
    pub note: PitchClass,
    /// Length in beats.
    pub duration: f64,
    /// 0-1; always 0 for rests.
    pub velocity: f64,
    pub octave: i32,
    pub chord_index: usize,
    pub style: BassStyle,
    #[serde(default)]
    pub rest: bool,
}

/// Builds the notes of one chord, tracking the per-chord note index.
struct ChordBass<'a> {
    chord_index: usize,
    style: BassStyle,
    rhythm: &'a RhythmPattern,
    notes: Vec<BassNote>,
}

impl<'a> ChordBass<'a> {
    fn new(chord_index: usize, style: BassStyle, rhythm: &'a RhythmPattern) -> Self {
        ChordBass {
            chord_index,
            style,
            rhythm,
            notes: Vec::new(),
        }
    }

    fn push(&mut self, note: PitchClass, duration: f64, octave: i32) {
        let velocity = self.rhythm.velocity(self.notes.len());
        self.notes.push(BassNote {
            note,
            duration,
            velocity,
            octave,
            chord_index: self.chord_index,
            style: self.style,
            rest: false,
        });
    }

    fn rest(&mut self, note: PitchClass, duration: f64) {
        self.notes.push(BassNote {
            note,
            duration,
            velocity: 0.0,
            octave: BASS_OCTAVE,
            chord_index: self.chord_index,
            style: self.style,
            rest: true,
        });
    }
}

fn variety_factor(variety: f64) -> f64 {
    (variety / 100.0).clamp(0.0, 1.0)
}

/// Semitone above or below `target`, picked uniformly.
fn approach_tone(target: PitchClass, rng: &mut impl Rng) -> PitchClass {
    target.transpose(if rng.random_bool(0.5) { 1 } else { -1 })
}

fn walking_passing_tone(root: PitchClass, scale: &[PitchClass], v: f64, rng: &mut impl Rng) -> PitchClass {
    if chance(rng, 0.5 * v) {
        root.transpose(rng.random_range(1..=11))
    } else {
        scale.choose(rng).copied().unwrap_or(root)
    }
}

/// Render `progression` as a bass line in one style.
///
/// `variety` is a percentage (0-100).
pub fn generate_bass_line(
    progression: &[Chord],
    style: BassStyle,
    variety: f64,
    rhythm: &RhythmPattern,
    rng: &mut impl Rng,
) -> Vec<BassNote> {
    let v = variety_factor(variety);
    let mut line = Vec::new();

    for (chord_index, chord) in progression.iter().enumerate() {
        let root = chord.root;
        let fifth = root.transpose(7);
        let next_root = progression[(chord_index + 1) % progression.len()].root;
        let mut bass = ChordBass::new(chord_index, style, rhythm);

        match style {
            BassStyle::Root => {
                let count = (1 + (v * 3.0).floor() as usize).clamp(1, 4);
                for _ in 0..count {
                    bass.push(root, BAR / count as f64, BASS_OCTAVE);
                }
            }
            BassStyle::Walking => {
                let scale = scale_notes(root, Scale::Major);
                bass.push(root, 1.0, BASS_OCTAVE);
                for _ in 0..2 {
                    let note = walking_passing_tone(root, &scale, v, rng);
                    bass.push(note, 1.0, BASS_OCTAVE);
                }
                let last = if rng.random_bool(0.75) {
                    approach_tone(next_root, rng)
                } else {
                    fifth
                };
                bass.push(last, 1.0, BASS_OCTAVE);
            }
            BassStyle::Syncopated => {
                let pattern = SYNCOPATED_PATTERNS[rng.random_range(0..SYNCOPATED_PATTERNS.len())];
                let tones = chord_pitch_classes(chord);
                for &duration in pattern {
                    if chance(rng, 0.3 * (1.0 - v)) {
                        bass.rest(root, duration);
                        continue;
                    }
                    let note = if chance(rng, 0.5 * v) {
                        tones.choose(rng).copied().unwrap_or(root)
                    } else {
                        root
                    };
                    bass.push(note, duration, BASS_OCTAVE);
                }
            }
            BassStyle::Octave => {
                let count = (2 + (v * 2.0).floor() as usize).min(3);
                for i in 0..count {
                    let octave = if i % 2 == 0 { BASS_OCTAVE } else { BASS_OCTAVE + 1 };
                    let note = if chance(rng, 0.3 * v) { fifth } else { root };
                    bass.push(note, BAR / count as f64, octave);
                }
            }
            BassStyle::Fifths => {
                let pattern = if chance(rng, v) {
                    [root, fifth, root, fifth]
                } else {
                    [root, root, fifth, root]
                };
                for note in pattern {
                    bass.push(note, 1.0, BASS_OCTAVE);
                }
            }
        }
        line.extend(bass.notes);
    }

    tracing::debug!(?style, notes = line.len(), "generated bass line");
    line
}

// ---------------------------------------------------------------------------
// Rhythm-aware bass agent
// ---------------------------------------------------------------------------

/// Behaviour knobs for the rhythm-aware bass agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BassAgentConfig {
    /// Chance the downbeat plays the root (otherwise the fifth).
    pub root_emphasis: f64,
    /// Last note of each chord approaches the next root by a semitone.
    pub chromatic_approach: bool,
    pub octave_jumps: bool,
    pub fifth_approach: bool,
    /// Chance each non-downbeat note is shortened and accented.
    pub syncopation: f64,
}

pub fn default_bass_agents() -> BTreeMap<BassStyle, BassAgentConfig> {
    let agent = |root_emphasis, chromatic_approach, octave_jumps, fifth_approach, syncopation| BassAgentConfig {
        root_emphasis,
        chromatic_approach,
        octave_jumps,
        fifth_approach,
        syncopation,
    };
    BTreeMap::from([
        (BassStyle::Root, agent(0.95, false, false, false, 0.0)),
        (BassStyle::Walking, agent(0.9, true, false, true, 0.1)),
        (BassStyle::Syncopated, agent(0.85, false, false, true, 0.5)),
        (BassStyle::Octave, agent(0.9, false, true, false, 0.1)),
        (BassStyle::Fifths, agent(0.75, false, false, true, 0.0)),
    ])
}

/// Shorten and accent non-downbeat notes. The first note of each chord is
/// never touched; a hit scales duration by `[floor, 1)` and velocity by
/// `boost`, capped at 1.
pub(crate) fn syncopate(
    line: &[BassNote],
    amount: f64,
    floor: f64,
    boost: f64,
    rng: &mut impl Rng,
) -> Vec<BassNote> {
    line.iter()
        .enumerate()
        .map(|(i, note)| {
            let downbeat = i == 0 || line[i - 1].chord_index != note.chord_index;
            if downbeat || note.rest || !chance(rng, amount) {
                return note.clone();
            }
            BassNote {
                duration: note.duration * (floor + rng.random::<f64>() * (1.0 - floor)),
                velocity: (note.velocity * boost).min(1.0),
                ..note.clone()
            }
        })
        .collect()
}

/// Bass line driven by an agent config and a groove pattern.
pub fn generate_rhythm_aware_bass_line(
    progression: &[Chord],
    config: &BassAgentConfig,
    groove: &GroovePattern,
    rhythm: &RhythmPattern,
    variety: f64,
    rng: &mut impl Rng,
) -> Vec<BassNote> {
    let v = variety_factor(variety);
    let per_chord = (2 + (v * 4.0).floor() as usize).clamp(2, 6);
    let duration = BAR / per_chord as f64;
    let mut line = Vec::with_capacity(progression.len() * per_chord);

    for (chord_index, chord) in progression.iter().enumerate() {
        let root = chord.root;
        let fifth = root.transpose(7);
        let next_root = progression[(chord_index + 1) % progression.len()].root;

        for i in 0..per_chord {
            let downbeat = i == 0;
            let mut octave = BASS_OCTAVE;
            let (note, style) = if downbeat {
                if chance(rng, config.root_emphasis) {
                    (root, BassStyle::Root)
                } else {
                    (fifth, BassStyle::Fifths)
                }
            } else if i == per_chord - 1 && config.chromatic_approach {
                (approach_tone(next_root, rng), BassStyle::Walking)
            } else if config.octave_jumps && chance(rng, 0.3 * v) {
                octave += 1;
                (root, BassStyle::Octave)
            } else if config.fifth_approach && chance(rng, 0.4 * v) {
                (fifth, BassStyle::Fifths)
            } else {
                (root, BassStyle::Root)
            };

            let (intensity, accent) = if groove.beat_pattern.is_empty() {
                (0.0, false)
            } else {
                let position = i % groove.beat_pattern.len();
                (groove.beat_pattern[position], groove.accent_beats.contains(&position))
            };
            let mut velocity = rhythm.velocity(i);
            if downbeat {
                velocity = (velocity * 1.2).min(1.0);
            }
            if accent {
                velocity = (velocity * 1.1).min(1.0);
            }
            velocity *= if intensity > 0.0 { intensity } else { 0.7 };

            line.push(BassNote {
                note,
                duration,
                velocity: velocity.clamp(0.3, 1.0),
                octave,
                chord_index,
                style,
                rest: false,
            });
        }
    }

    if config.syncopation > 0.0 {
        return syncopate(&line, config.syncopation, 0.6, 1.15, rng);
    }
    line
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BassAnalysis {
    pub average_velocity: f64,
    /// Notes per distinct chord.
    pub rhythmic_density: f64,
    /// Highest minus lowest octave.
    pub octave_range: i32,
    /// Share of notes per style; every style is present.
    pub style_distribution: BTreeMap<BassStyle, f64>,
}

pub fn analyze_bass_line(line: &[BassNote]) -> BassAnalysis {
    let mut style_distribution: BTreeMap<BassStyle, f64> = BassStyle::ALL.iter().map(|&s| (s, 0.0)).collect();
    if line.is_empty() {
        return BassAnalysis {
            average_velocity: 0.0,
            rhythmic_density: 0.0,
            octave_range: 0,
            style_distribution,
        };
    }

    let count = line.len() as f64;
    let average_velocity = line.iter().map(|n| n.velocity).sum::<f64>() / count;
    let mut chords: Vec<usize> = line.iter().map(|n| n.chord_index).collect();
    chords.sort_unstable();
    chords.dedup();
    let rhythmic_density = count / chords.len() as f64;

    let (low, high) = line
        .iter()
        .fold((i32::MAX, i32::MIN), |(lo, hi), n| (lo.min(n.octave), hi.max(n.octave)));

    for note in line {
        *style_distribution.entry(note.style).or_insert(0.0) += 1.0;
    }
    for share in style_distribution.values_mut() {
        *share /= count;
    }

    BassAnalysis {
        average_velocity,
        rhythmic_density,
        octave_range: high - low,
        style_distribution,
    }
}
