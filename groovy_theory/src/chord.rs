// Chord qualities, scale-degree labels and chord construction.
//
// A `Chord` is the unit every pipeline stage passes along: a root pitch
// class, a quality, the scale-degree label it was built from, and optional
// annotations added by later stages (substitution flags, harmonic function,
// groove intensity, swing offset, voiced notes).
//
// Degree labels are roman numerals, upper case for major and lower case for
// minor/diminished, with an optional `b`/`#` accidental prefix for chromatic
// (borrowed) degrees. Natural degrees take their root from the key's scale;
// altered degrees take it from the major scale shifted by the accidental, and
// display with the numeral they were written with.
//
// Chord qualities deserialize from their string ids. An id outside the
// catalog is kept as `ChordQuality::Unrecognized` instead of failing, and
// `chord_intervals` maps it to a major triad with a warning.

use crate::error::{Result, TheoryError};
use crate::harmony::HarmonicFunction;
use crate::pitch::{PitchClass, Scale, transpose};
use crate::voice_leading::VoicedNote;
use serde::{Deserialize, Serialize};

/// Display numerals for the seven diatonic degrees.
pub const ROMAN_NUMERALS: [&str; 7] = ["I", "II", "III", "IV", "V", "VI", "VII"];

/// Intervals used whenever a quality has no catalog entry.
pub const MAJOR_TRIAD: [i32; 3] = [0, 4, 7];

/// Triad quality of each diatonic degree in a major key.
const MAJOR_KEY_QUALITIES: [ChordQuality; 7] = [
    ChordQuality::Major,
    ChordQuality::Minor,
    ChordQuality::Minor,
    ChordQuality::Major,
    ChordQuality::Major,
    ChordQuality::Minor,
    ChordQuality::Diminished,
];

/// Triad quality of each diatonic degree in a (natural) minor key.
const MINOR_KEY_QUALITIES: [ChordQuality; 7] = [
    ChordQuality::Minor,
    ChordQuality::Diminished,
    ChordQuality::Major,
    ChordQuality::Minor,
    ChordQuality::Minor,
    ChordQuality::Major,
    ChordQuality::Major,
];

/// Chord quality catalog, keyed by string id in serialized form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ChordQuality {
    Major,
    Minor,
    Diminished,
    Augmented,
    Major7,
    Minor7,
    Dominant7,
    Diminished7,
    HalfDim7,
    Sus2,
    Sus4,
    Add9,
    Minor9,
    Major9,
    /// An id with no catalog entry, preserved verbatim.
    Unrecognized(String),
}

impl ChordQuality {
    pub const ALL: [ChordQuality; 14] = [
        ChordQuality::Major,
        ChordQuality::Minor,
        ChordQuality::Diminished,
        ChordQuality::Augmented,
        ChordQuality::Major7,
        ChordQuality::Minor7,
        ChordQuality::Dominant7,
        ChordQuality::Diminished7,
        ChordQuality::HalfDim7,
        ChordQuality::Sus2,
        ChordQuality::Sus4,
        ChordQuality::Add9,
        ChordQuality::Minor9,
        ChordQuality::Major9,
    ];

    pub fn id(&self) -> &str {
        match self {
            ChordQuality::Major => "major",
            ChordQuality::Minor => "minor",
            ChordQuality::Diminished => "diminished",
            ChordQuality::Augmented => "augmented",
            ChordQuality::Major7 => "major7",
            ChordQuality::Minor7 => "minor7",
            ChordQuality::Dominant7 => "dominant7",
            ChordQuality::Diminished7 => "diminished7",
            ChordQuality::HalfDim7 => "halfDim7",
            ChordQuality::Sus2 => "sus2",
            ChordQuality::Sus4 => "sus4",
            ChordQuality::Add9 => "add9",
            ChordQuality::Minor9 => "minor9",
            ChordQuality::Major9 => "major9",
            ChordQuality::Unrecognized(id) => id,
        }
    }

    pub fn from_id(id: &str) -> Self {
        ChordQuality::ALL
            .iter()
            .find(|q| q.id() == id)
            .cloned()
            .unwrap_or_else(|| ChordQuality::Unrecognized(id.to_string()))
    }

    /// Semitone offsets from the root, or `None` for an unrecognized id.
    pub fn intervals(&self) -> Option<&'static [i32]> {
        let intervals: &'static [i32] = match self {
            ChordQuality::Major => &[0, 4, 7],
            ChordQuality::Minor => &[0, 3, 7],
            ChordQuality::Diminished => &[0, 3, 6],
            ChordQuality::Augmented => &[0, 4, 8],
            ChordQuality::Major7 => &[0, 4, 7, 11],
            ChordQuality::Minor7 => &[0, 3, 7, 10],
            ChordQuality::Dominant7 => &[0, 4, 7, 10],
            ChordQuality::Diminished7 => &[0, 3, 6, 9],
            ChordQuality::HalfDim7 => &[0, 3, 6, 10],
            ChordQuality::Sus2 => &[0, 2, 7],
            ChordQuality::Sus4 => &[0, 5, 7],
            ChordQuality::Add9 => &[0, 4, 7, 14],
            ChordQuality::Minor9 => &[0, 3, 7, 10, 14],
            ChordQuality::Major9 => &[0, 4, 7, 11, 14],
            ChordQuality::Unrecognized(_) => return None,
        };
        Some(intervals)
    }

    /// Suffix appended to the root name ("m7", "maj9", "" for major).
    pub fn symbol(&self) -> &str {
        match self {
            ChordQuality::Major => "",
            ChordQuality::Minor => "m",
            ChordQuality::Diminished => "dim",
            ChordQuality::Augmented => "aug",
            ChordQuality::Major7 => "maj7",
            ChordQuality::Minor7 => "m7",
            ChordQuality::Dominant7 => "7",
            ChordQuality::Diminished7 => "dim7",
            ChordQuality::HalfDim7 => "m7♭5",
            ChordQuality::Sus2 => "sus2",
            ChordQuality::Sus4 => "sus4",
            ChordQuality::Add9 => "add9",
            ChordQuality::Minor9 => "m9",
            ChordQuality::Major9 => "maj9",
            ChordQuality::Unrecognized(id) => id,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            ChordQuality::Major => "Major",
            ChordQuality::Minor => "Minor",
            ChordQuality::Diminished => "Diminished",
            ChordQuality::Augmented => "Augmented",
            ChordQuality::Major7 => "Major 7th",
            ChordQuality::Minor7 => "Minor 7th",
            ChordQuality::Dominant7 => "Dominant 7th",
            ChordQuality::Diminished7 => "Diminished 7th",
            ChordQuality::HalfDim7 => "Half-Dim 7th",
            ChordQuality::Sus2 => "Suspended 2nd",
            ChordQuality::Sus4 => "Suspended 4th",
            ChordQuality::Add9 => "Add 9",
            ChordQuality::Minor9 => "Minor 9th",
            ChordQuality::Major9 => "Major 9th",
            ChordQuality::Unrecognized(id) => id,
        }
    }

    /// True for qualities carrying a 7th, 9th, suspension or added tone.
    pub fn is_extension(&self) -> bool {
        !matches!(
            self,
            ChordQuality::Major
                | ChordQuality::Minor
                | ChordQuality::Diminished
                | ChordQuality::Augmented
                | ChordQuality::Unrecognized(_)
        )
    }

    /// The plain triad an extended quality reduces to. Triads (and
    /// unrecognized ids) map to themselves.
    pub fn base_triad(&self) -> ChordQuality {
        match self {
            ChordQuality::Major7
            | ChordQuality::Dominant7
            | ChordQuality::Major9
            | ChordQuality::Add9
            | ChordQuality::Sus2
            | ChordQuality::Sus4 => ChordQuality::Major,
            ChordQuality::Minor7 | ChordQuality::Minor9 => ChordQuality::Minor,
            ChordQuality::Diminished7 | ChordQuality::HalfDim7 => ChordQuality::Diminished,
            other => other.clone(),
        }
    }
}

impl From<String> for ChordQuality {
    fn from(id: String) -> Self {
        ChordQuality::from_id(&id)
    }
}

impl From<ChordQuality> for String {
    fn from(quality: ChordQuality) -> String {
        quality.id().to_string()
    }
}

/// Intervals for a quality, falling back to a major triad when the quality
/// has no catalog entry. The fallback keeps downstream stages total; it is
/// logged so that bad data is visible.
pub fn chord_intervals(quality: &ChordQuality) -> &'static [i32] {
    match quality.intervals() {
        Some(intervals) => intervals,
        None => {
            tracing::warn!(quality = quality.id(), "unrecognized chord quality, using major triad");
            &MAJOR_TRIAD
        }
    }
}

/// How a genre prefers chords to be spread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoicingStyle {
    /// Guide tones only (3rd and 7th).
    Shell,
    /// Root, fifth and an upper third spread over two octaves.
    Open,
}

/// A genre voicing attached to a chord for the playback layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoicingHint {
    pub style: VoicingStyle,
    pub intervals: Vec<i32>,
    pub name: String,
}

/// A parsed scale-degree label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Degree {
    /// -1 for flat, +1 for sharp, 0 for a diatonic degree.
    pub accidental: i32,
    /// Diatonic index 0-6 of the written numeral.
    pub index: usize,
    /// Upper-case numeral (major).
    pub upper: bool,
}

impl Degree {
    pub fn is_altered(&self) -> bool {
        self.accidental != 0
    }

    /// Semitone offset of this degree's root above the key tonic.
    pub fn semitones(&self, scale: Scale, is_minor: bool) -> i32 {
        if self.is_altered() {
            Scale::Major.intervals()[self.index] + self.accidental
        } else {
            scale.degree_offset(self.index, is_minor)
        }
    }

    /// Display numeral, keeping the accidental ("bVI", "IV").
    pub fn numeral(&self) -> String {
        let prefix = match self.accidental {
            -1 => "b",
            1 => "#",
            _ => "",
        };
        format!("{prefix}{}", ROMAN_NUMERALS[self.index])
    }
}

/// Parse `[b|#](I|II|...|VII|i|ii|...|vii)`. Mixed-case numerals are rejected.
pub fn parse_degree(label: &str) -> Result<Degree> {
    let invalid = || TheoryError::InvalidDegree(label.to_string());

    let (accidental, numeral) = if let Some(rest) = label.strip_prefix('b') {
        (-1, rest)
    } else if let Some(rest) = label.strip_prefix('#') {
        (1, rest)
    } else {
        (0, label)
    };

    let upper = numeral.to_uppercase();
    let index = ROMAN_NUMERALS
        .iter()
        .position(|&n| n == upper)
        .ok_or_else(invalid)?;

    let is_upper = numeral == upper;
    if !is_upper && numeral != upper.to_lowercase() {
        return Err(invalid());
    }

    Ok(Degree {
        accidental,
        index,
        upper: is_upper,
    })
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// A chord in a progression, plus annotations added by pipeline stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chord {
    pub root: PitchClass,
    #[serde(rename = "type")]
    pub quality: ChordQuality,
    /// Scale-degree label, e.g. "vi", "bVII", "V/V".
    pub degree: String,
    /// Display numeral.
    pub numeral: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voiced_notes: Option<Vec<VoicedNote>>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub secondary_dominant: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub borrowed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub borrowed_description: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub tritone_substitution: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub harmonic_function: Option<HarmonicFunction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groove_intensity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swing_offset: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voicing_hint: Option<VoicingHint>,
}

impl Chord {
    pub fn new(
        root: PitchClass,
        quality: ChordQuality,
        degree: impl Into<String>,
        numeral: impl Into<String>,
    ) -> Self {
        Chord {
            root,
            quality,
            degree: degree.into(),
            numeral: numeral.into(),
            voiced_notes: None,
            secondary_dominant: false,
            borrowed: false,
            borrowed_description: None,
            tritone_substitution: false,
            harmonic_function: None,
            groove_intensity: None,
            swing_offset: None,
            voicing_hint: None,
        }
    }

    /// Chord symbol, e.g. "Am7".
    pub fn name(&self) -> String {
        format!("{}{}", self.root.name(), self.quality.symbol())
    }

    /// True for V or v, the degrees the substitution stage treats as dominant.
    pub fn is_dominant_degree(&self) -> bool {
        self.degree == "V" || self.degree == "v"
    }
}

/// Pitch classes sounded by a chord, in interval order.
pub fn chord_pitch_classes(chord: &Chord) -> Vec<PitchClass> {
    chord_intervals(&chord.quality)
        .iter()
        .map(|&interval| transpose(chord.root, interval))
        .collect()
}

/// Build the chord on `degree` of the key rooted at `root`.
///
/// Upper-case numerals are always major. Lower-case diatonic numerals take
/// their quality from the key mode's triad table; lower-case altered
/// numerals are minor.
pub fn chord_from_degree(root: PitchClass, degree: &str, is_minor: bool, scale: Scale) -> Result<Chord> {
    let parsed = parse_degree(degree)?;
    let chord_root = transpose(root, parsed.semitones(scale, is_minor));

    let quality = if parsed.upper {
        ChordQuality::Major
    } else if parsed.is_altered() {
        ChordQuality::Minor
    } else if is_minor {
        MINOR_KEY_QUALITIES[parsed.index].clone()
    } else {
        MAJOR_KEY_QUALITIES[parsed.index].clone()
    };

    Ok(Chord::new(chord_root, quality, degree, parsed.numeral()))
}
