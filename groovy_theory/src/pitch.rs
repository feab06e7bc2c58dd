// Pitch-class arithmetic, note naming, keys and scale tables.
//
// Everything above this module works in pitch classes (0-11, C = 0) and only
// converts to names for display or at the user-input boundary. Two naming
// tables are supported: sharp-preferred (canonical, used for all output) and
// flat-preferred (accepted on input only).
//
// This module provides:
// - `PitchClass`, with all arithmetic performed mod 12
// - `note_index` / `transpose` over note names
// - `Key` parsing ("Am", "Bb", "F#m")
// - `Scale` definitions and `scale_notes`
// - Absolute pitch numbers, `(octave + 1) * 12 + pitch_class`
//
// Used by chord.rs for chord construction, voice_leading.rs for absolute
// pitches, and every generator that needs scale membership.

use crate::error::{Result, TheoryError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical sharp-preferred note names, indexed by pitch class.
pub const NOTES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Flat-preferred note names, indexed by pitch class.
pub const NOTE_DISPLAY: [&str; 12] = [
    "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B",
];

/// A pitch class in 0..12. Serialized as its canonical sharp name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct PitchClass(u8);

impl PitchClass {
    pub const C: PitchClass = PitchClass(0);

    /// Build a pitch class from any integer, reducing mod 12.
    pub fn new(value: i32) -> Self {
        PitchClass(value.rem_euclid(12) as u8)
    }

    pub fn index(self) -> u8 {
        self.0
    }

    /// Sharp-preferred name ("C#").
    pub fn name(self) -> &'static str {
        NOTES[self.0 as usize]
    }

    /// Flat-preferred name ("Db").
    pub fn flat_name(self) -> &'static str {
        NOTE_DISPLAY[self.0 as usize]
    }

    pub fn transpose(self, semitones: i32) -> Self {
        PitchClass::new(self.0 as i32 + semitones)
    }

    /// Upward distance in semitones from `other` to `self` (0..12).
    pub fn semitones_above(self, other: PitchClass) -> u8 {
        (self.0 + 12 - other.0) % 12
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<PitchClass> for String {
    fn from(pc: PitchClass) -> String {
        pc.name().to_string()
    }
}

impl TryFrom<String> for PitchClass {
    type Error = TheoryError;

    fn try_from(name: String) -> Result<Self> {
        note_index(&name)
    }
}

/// Resolve a note name through the sharp table, then the flat table.
pub fn note_index(name: &str) -> Result<PitchClass> {
    NOTES
        .iter()
        .position(|&n| n == name)
        .or_else(|| NOTE_DISPLAY.iter().position(|&n| n == name))
        .map(|i| PitchClass(i as u8))
        .ok_or_else(|| TheoryError::UnknownNote(name.to_string()))
}

/// `(root + interval) mod 12`.
pub fn transpose(root: PitchClass, interval: i32) -> PitchClass {
    root.transpose(interval)
}

/// Name-level transpose; the result re-resolves to the sharp table.
pub fn transpose_name(root: &str, interval: i32) -> Result<PitchClass> {
    Ok(note_index(root)?.transpose(interval))
}

/// Absolute pitch number for a pitch class in an octave (C4 = 60).
pub fn pitch_number(pc: PitchClass, octave: i32) -> i32 {
    (octave + 1) * 12 + pc.index() as i32
}

/// Inverse of `pitch_number`.
pub fn from_pitch_number(pitch: i32) -> (PitchClass, i32) {
    (PitchClass::new(pitch), pitch.div_euclid(12) - 1)
}

/// A key: tonic plus major/minor mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key {
    pub root: PitchClass,
    pub is_minor: bool,
}

impl Key {
    pub fn new(root: PitchClass, is_minor: bool) -> Self {
        Key { root, is_minor }
    }

    /// "Am", "C", "F#m".
    pub fn name(&self) -> String {
        if self.is_minor {
            format!("{}m", self.root.name())
        } else {
            self.root.name().to_string()
        }
    }
}

/// Parse a key string. A trailing `m` marks a minor key.
pub fn parse_key(key: &str) -> Result<Key> {
    let key = key.trim();
    match key.strip_suffix('m') {
        Some(root) => Ok(Key::new(note_index(root)?, true)),
        None => Ok(Key::new(note_index(key)?, false)),
    }
}

/// Named scales, each defined by semitone offsets from the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Scale {
    Major,
    Minor,
    HarmonicMinor,
    MelodicMinor,
    Dorian,
    Phrygian,
    Lydian,
    Mixolydian,
    Locrian,
    PentatonicMajor,
    PentatonicMinor,
    Blues,
}

impl Scale {
    pub const ALL: [Scale; 12] = [
        Scale::Major,
        Scale::Minor,
        Scale::HarmonicMinor,
        Scale::MelodicMinor,
        Scale::Dorian,
        Scale::Phrygian,
        Scale::Lydian,
        Scale::Mixolydian,
        Scale::Locrian,
        Scale::PentatonicMajor,
        Scale::PentatonicMinor,
        Scale::Blues,
    ];

    /// Semitone offsets from the root. Seven entries for the diatonic and
    /// modal scales, five for the pentatonics, six for blues.
    pub fn intervals(self) -> &'static [i32] {
        match self {
            Scale::Major => &[0, 2, 4, 5, 7, 9, 11],
            Scale::Minor => &[0, 2, 3, 5, 7, 8, 10],
            Scale::HarmonicMinor => &[0, 2, 3, 5, 7, 8, 11],
            Scale::MelodicMinor => &[0, 2, 3, 5, 7, 9, 11],
            Scale::Dorian => &[0, 2, 3, 5, 7, 9, 10],
            Scale::Phrygian => &[0, 1, 3, 5, 7, 8, 10],
            Scale::Lydian => &[0, 2, 4, 6, 7, 9, 11],
            Scale::Mixolydian => &[0, 2, 4, 5, 7, 9, 10],
            Scale::Locrian => &[0, 1, 3, 5, 6, 8, 10],
            Scale::PentatonicMajor => &[0, 2, 4, 7, 9],
            Scale::PentatonicMinor => &[0, 3, 5, 7, 10],
            Scale::Blues => &[0, 3, 5, 6, 7, 10],
        }
    }

    /// Offset of diatonic degree `index` (0-6). Scales with fewer than seven
    /// notes have no entry for the upper degrees; those borrow from the
    /// natural major or minor scale depending on the key mode.
    pub fn degree_offset(self, index: usize, is_minor: bool) -> i32 {
        match self.intervals().get(index) {
            Some(&offset) => offset,
            None => {
                let fallback = if is_minor { Scale::Minor } else { Scale::Major };
                fallback.intervals()[index % 7]
            }
        }
    }
}

/// Pitch classes of `scale` rooted at `root`, in scale order.
pub fn scale_notes(root: PitchClass, scale: Scale) -> Vec<PitchClass> {
    scale
        .intervals()
        .iter()
        .map(|&interval| transpose(root, interval))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_index_both_tables() {
        assert_eq!(note_index("C").unwrap().index(), 0);
        assert_eq!(note_index("F#").unwrap().index(), 6);
        assert_eq!(note_index("Gb").unwrap().index(), 6);
        assert_eq!(note_index("Bb").unwrap().index(), 10);
        assert!(matches!(note_index("H"), Err(TheoryError::UnknownNote(_))));
        assert!(matches!(note_index(""), Err(TheoryError::UnknownNote(_))));
    }

    #[test]
    fn test_pitch_closure() {
        for name in NOTES.iter().chain(NOTE_DISPLAY.iter()) {
            let base = note_index(name).unwrap().index() as i32;
            for k in -30..30 {
                let t = transpose_name(name, k).unwrap();
                assert_eq!(note_index(t.name()).unwrap().index() as i32, (base + k).rem_euclid(12));
            }
        }
    }

    #[test]
    fn test_enharmonic_names_agree() {
        for i in 0..12 {
            assert_eq!(note_index(NOTES[i]).unwrap(), note_index(NOTE_DISPLAY[i]).unwrap());
        }
    }

    #[test]
    fn test_transpose_resolves_to_sharp_names() {
        assert_eq!(transpose_name("Bb", 1).unwrap().name(), "B");
        assert_eq!(transpose_name("Eb", 0).unwrap().name(), "D#");
        assert_eq!(transpose_name("C", -1).unwrap().name(), "B");
    }

    #[test]
    fn test_parse_key() {
        assert_eq!(parse_key("Am").unwrap(), Key::new(PitchClass::new(9), true));
        assert_eq!(parse_key("Bb").unwrap(), Key::new(PitchClass::new(10), false));
        assert_eq!(parse_key("F#m").unwrap().name(), "F#m");
        assert!(parse_key("Xm").is_err());
    }

    #[test]
    fn test_scale_notes() {
        let names: Vec<&str> = scale_notes(PitchClass::new(2), Scale::Dorian)
            .iter()
            .map(|pc| pc.name())
            .collect();
        assert_eq!(names, ["D", "E", "F", "G", "A", "B", "C"]);
        assert_eq!(scale_notes(PitchClass::C, Scale::Blues).len(), 6);
    }

    #[test]
    fn test_degree_offset_short_scale_fallback() {
        assert_eq!(Scale::PentatonicMajor.degree_offset(4, false), 9);
        assert_eq!(Scale::PentatonicMajor.degree_offset(5, false), 9);
        assert_eq!(Scale::PentatonicMinor.degree_offset(6, true), 10);
    }

    #[test]
    fn test_pitch_numbers() {
        assert_eq!(pitch_number(PitchClass::C, 4), 60);
        assert_eq!(from_pitch_number(69), (PitchClass::new(9), 4));
        assert_eq!(from_pitch_number(pitch_number(PitchClass::new(11), 2)), (PitchClass::new(11), 2));
    }

    #[test]
    fn test_pitch_class_serializes_as_name() {
        let json = serde_json::to_string(&PitchClass::new(1)).unwrap();
        assert_eq!(json, "\"C#\"");
        let back: PitchClass = serde_json::from_str("\"Db\"").unwrap();
        assert_eq!(back.index(), 1);
        assert!(serde_json::from_str::<PitchClass>("\"Q\"").is_err());
    }
}
