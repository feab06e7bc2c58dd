// Groove templates and rhythmic timing.
//
// A groove pattern is a cyclic 16-slot intensity array (sixteenth notes over
// one 4/4 bar) plus accent slots and a swing amount. Applying a groove to a
// progression tags each chord with an intensity read at slot `4 * index`
// (one chord per beat around the cycle, boosted 1.2x on accents) and a swing
// offset on every odd chord.
//
// Also here: per-beat swing offsets in seconds, per-subdivision velocity
// masks, a small groove analysis, the genre → groove suggestion table, and the
// groove-driven bass line with its syncopation pass.

use crate::bass::{BASS_OCTAVE, BassNote, BassStyle, syncopate};
use crate::catalog::RhythmPattern;
use crate::chord::Chord;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GrooveTemplate {
    Straight,
    FourOnFloor,
    NeoSoulSwing,
    FunkSyncopation,
    Shuffle,
    HalfTime,
}

impl GrooveTemplate {
    pub const ALL: [GrooveTemplate; 6] = [
        GrooveTemplate::Straight,
        GrooveTemplate::FourOnFloor,
        GrooveTemplate::NeoSoulSwing,
        GrooveTemplate::FunkSyncopation,
        GrooveTemplate::Shuffle,
        GrooveTemplate::HalfTime,
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroovePattern {
    pub name: String,
    /// Intensity per sixteenth, 0-1.
    pub beat_pattern: Vec<f64>,
    /// 0 (straight) to 1 (full swing).
    pub swing_amount: f64,
    /// Slot indices into `beat_pattern`.
    pub accent_beats: Vec<usize>,
}

impl GroovePattern {
    fn new(name: &str, beat_pattern: [f64; 16], swing_amount: f64, accent_beats: &[usize]) -> Self {
        GroovePattern {
            name: name.to_string(),
            beat_pattern: beat_pattern.to_vec(),
            swing_amount,
            accent_beats: accent_beats.to_vec(),
        }
    }

    pub fn is_accent(&self, slot: usize) -> bool {
        self.accent_beats.contains(&slot)
    }
}

#[rustfmt::skip]
pub fn default_grooves() -> BTreeMap<GrooveTemplate, GroovePattern> {
    use GrooveTemplate::*;
    BTreeMap::from([
        (Straight, GroovePattern::new(
            "Straight",
            [1.0, 0.3, 0.5, 0.3, 0.8, 0.3, 0.5, 0.3, 1.0, 0.3, 0.5, 0.3, 0.8, 0.3, 0.5, 0.3],
            0.0,
            &[0, 8],
        )),
        (FourOnFloor, GroovePattern::new(
            "Four on the Floor",
            [1.0, 0.2, 0.4, 0.2, 1.0, 0.2, 0.4, 0.2, 1.0, 0.2, 0.4, 0.2, 1.0, 0.2, 0.4, 0.2],
            0.0,
            &[0, 4, 8, 12],
        )),
        (NeoSoulSwing, GroovePattern::new(
            "Neo-Soul Swing",
            [0.9, 0.2, 0.5, 0.6, 0.7, 0.3, 0.6, 0.4, 0.8, 0.2, 0.5, 0.6, 0.7, 0.3, 0.6, 0.5],
            0.6,
            &[0, 3, 10],
        )),
        (FunkSyncopation, GroovePattern::new(
            "Funk Syncopation",
            [1.0, 0.4, 0.7, 0.9, 0.3, 0.8, 0.5, 0.6, 0.9, 0.4, 0.8, 0.3, 0.7, 0.9, 0.4, 0.6],
            0.15,
            &[0, 3, 6, 10, 13],
        )),
        (Shuffle, GroovePattern::new(
            "Shuffle",
            [1.0, 0.0, 0.6, 0.8, 0.0, 0.6, 0.9, 0.0, 0.6, 0.8, 0.0, 0.6, 0.9, 0.0, 0.6, 0.7],
            0.66,
            &[0, 6, 12],
        )),
        (HalfTime, GroovePattern::new(
            "Half-Time",
            [1.0, 0.2, 0.3, 0.2, 0.5, 0.2, 0.3, 0.2, 0.9, 0.2, 0.3, 0.2, 0.5, 0.2, 0.3, 0.4],
            0.05,
            &[0, 8],
        )),
    ])
}

/// Tag each chord with groove intensity and swing offset.
///
/// An empty beat pattern leaves the progression unchanged.
pub fn apply_groove_to_progression(progression: &[Chord], groove: &GroovePattern) -> Vec<Chord> {
    if groove.beat_pattern.is_empty() {
        return progression.to_vec();
    }
    progression
        .iter()
        .enumerate()
        .map(|(i, chord)| {
            let slot = (4 * i) % groove.beat_pattern.len();
            let accent = if groove.is_accent(slot) { 1.2 } else { 1.0 };
            let swing = if i % 2 == 1 { groove.swing_amount } else { 0.0 };
            Chord {
                groove_intensity: Some(groove.beat_pattern[slot] * accent),
                swing_offset: Some(swing),
                ..chord.clone()
            }
        })
        .collect()
}

/// Swing delay in seconds for a beat; only odd beats move, by at most a
/// third of a beat.
pub fn calculate_swing_offset(beat_index: usize, swing_amount: f64, tempo: f64) -> f64 {
    if beat_index % 2 == 1 {
        (60.0 / tempo) * swing_amount * 0.33
    } else {
        0.0
    }
}

/// Velocity multiplier per subdivision of one chord, accents boosted 1.3x
/// and capped at 1.
pub fn generate_rhythmic_mask(groove: &GroovePattern, beats_per_chord: usize, subdivisions_per_beat: usize) -> Vec<f64> {
    if groove.beat_pattern.is_empty() {
        return Vec::new();
    }
    (0..beats_per_chord * subdivisions_per_beat)
        .map(|i| {
            let slot = i % groove.beat_pattern.len();
            let velocity = groove.beat_pattern[slot];
            if groove.is_accent(slot) {
                (velocity * 1.3).min(1.0)
            } else {
                velocity
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GrooveAnalysis {
    /// Distinct intensity values per slot.
    pub complexity: f64,
    /// Mean intensity.
    pub energy: f64,
    /// Share of accents that fall off the quarter-note grid.
    pub syncopation: f64,
}

pub fn analyze_groove(groove: &GroovePattern) -> GrooveAnalysis {
    let slots = groove.beat_pattern.len();
    let (complexity, energy) = if slots == 0 {
        (0.0, 0.0)
    } else {
        let unique: BTreeSet<u64> = groove.beat_pattern.iter().map(|v| v.to_bits()).collect();
        (
            unique.len() as f64 / slots as f64,
            groove.beat_pattern.iter().sum::<f64>() / slots as f64,
        )
    };
    let syncopation = if groove.accent_beats.is_empty() {
        0.0
    } else {
        let off_beat = groove.accent_beats.iter().filter(|&&b| b % 4 != 0).count();
        off_beat as f64 / groove.accent_beats.len() as f64
    };
    GrooveAnalysis {
        complexity,
        energy,
        syncopation,
    }
}

/// Default groove for a genre key; unknown genres get `Straight`.
pub fn suggest_groove_template(genre: &str) -> GrooveTemplate {
    match genre {
        "funk" => GrooveTemplate::FunkSyncopation,
        "soulful-rnb" | "chill-lofi" => GrooveTemplate::NeoSoulSwing,
        "energetic-edm" => GrooveTemplate::FourOnFloor,
        "jazz-fusion" | "reggae" | "blues" => GrooveTemplate::Shuffle,
        "dark-trap" | "cinematic" => GrooveTemplate::HalfTime,
        _ => GrooveTemplate::Straight,
    }
}

/// Groove-driven bass: an emphasized root on the downbeat, then 2-4 off-beat
/// notes (more with variety) choosing between fifth, octave jump and root,
/// with a chromatic approach into the next chord when variety is above 30%.
pub fn generate_groovy_bass_line(
    progression: &[Chord],
    groove: &GroovePattern,
    variety: f64,
    rhythm: &RhythmPattern,
    rng: &mut impl Rng,
) -> Vec<BassNote> {
    let v = (variety / 100.0).clamp(0.0, 1.0);
    let downbeat_velocity = if groove.accent_beats.first() == Some(&0) { 1.0 } else { 0.9 };
    let offbeats = 2 + (v * 2.0).floor() as usize;
    let mut line = Vec::new();

    for (chord_index, chord) in progression.iter().enumerate() {
        let root = chord.root;
        let fifth = root.transpose(7);
        line.push(BassNote {
            note: root,
            duration: 1.0,
            velocity: downbeat_velocity,
            octave: BASS_OCTAVE,
            chord_index,
            style: BassStyle::Root,
            rest: false,
        });

        for i in 1..=offbeats {
            let roll: f64 = rng.random();
            let mut octave = BASS_OCTAVE;
            let note = if i == offbeats && v > 0.3 {
                let next = progression[(chord_index + 1) % progression.len()].root;
                next.transpose(if rng.random_bool(0.5) { 1 } else { -1 })
            } else if roll < 0.3 * v {
                fifth
            } else if roll < 0.5 * v {
                octave += 1;
                root
            } else {
                root
            };

            let velocity = rhythm.velocity(i);
            let velocity = if groove.is_accent(i) { (velocity * 1.2).min(1.0) } else { velocity };
            let style = if octave > BASS_OCTAVE {
                BassStyle::Octave
            } else if note == fifth {
                BassStyle::Fifths
            } else {
                BassStyle::Root
            };

            line.push(BassNote {
                note,
                duration: 4.0 / (offbeats + 1) as f64,
                velocity,
                octave,
                chord_index,
                style,
                rest: false,
            });
        }
    }
    line
}

/// Randomly shorten and accent off-beat bass notes.
pub fn apply_syncopation(line: &[BassNote], amount: f64, rng: &mut impl Rng) -> Vec<BassNote> {
    if amount <= 0.0 {
        return line.to_vec();
    }
    syncopate(line, amount, 0.5, 1.1, rng)
}
