// Data-driven generation catalog.
//
// Every table the engine reads (genre profiles, moods, complexity and rhythm
// settings, groove templates, bass agents, the harmonic-function table,
// borrowed-chord tables, genre voicings, probability knobs and smart presets)
// lives in one `Catalog`, passed by reference into each pipeline call. The
// engine never mutates it and keeps no global copy.
//
// `Catalog::default()` carries the built-in tables. `Catalog::load` reads a
// JSON override; any field missing from the file keeps its built-in value.
//
// See also: harmony.rs (function table, moods), groove.rs (groove
// templates), bass.rs (bass agents), spice.rs (spice odds), pipeline.rs
// (presets → requests).

use crate::bass::{BassAgentConfig, BassStyle, default_bass_agents};
use crate::chord::{ChordQuality, VoicingStyle};
use crate::error::{Result, TheoryError};
use crate::groove::{GroovePattern, GrooveTemplate, default_grooves};
use crate::harmony::{HarmonicFunction, HarmonicFunctionTable, MoodProfile};
use crate::pitch::Scale;
use crate::spice::SpiceOdds;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

// ---------------------------------------------------------------------------
// Genre, complexity and rhythm settings
// ---------------------------------------------------------------------------

/// Read-only description of a genre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenreProfile {
    pub name: String,
    /// Scale used for major-key generation (minor keys always use `Minor`).
    pub scale: Scale,
    /// Degree-sequence templates, one picked per progression.
    pub progressions: Vec<Vec<String>>,
    /// Qualities the genre allows; its extended members are the pool for
    /// extension upgrades.
    pub chord_types: Vec<ChordQuality>,
    pub melody_scale: Scale,
    pub tempo: u32,
    #[serde(default)]
    pub voicing: Option<VoicingStyle>,
}

impl GenreProfile {
    /// Extended qualities (7th, 9th, sus, add) this genre allows.
    pub fn extension_qualities(&self) -> Vec<ChordQuality> {
        self.chord_types
            .iter()
            .filter(|q| q.is_extension())
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityLevel {
    Simple,
    Medium,
    Complex,
    Advanced,
}

impl ComplexityLevel {
    /// Modal interchange and advanced substitutions only run at these levels.
    pub fn allows_reharmonization(self) -> bool {
        matches!(self, ComplexityLevel::Complex | ComplexityLevel::Advanced)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComplexitySetting {
    /// Inclusive `[min, max]` chord count.
    pub chord_count: (usize, usize),
    pub use_extensions: bool,
    pub variations: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RhythmLevel {
    Soft,
    Moderate,
    Strong,
    Intense,
}

/// Velocity and duration vocabulary for a rhythm level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RhythmPattern {
    pub name: String,
    /// Note durations in beats.
    pub durations: Vec<f64>,
    /// Velocities in [0, 1], cycled by note index.
    pub dynamics: Vec<f64>,
    /// Melody notes per beat, roughly.
    pub melody_density: f64,
}

impl RhythmPattern {
    /// Velocity for the `index`-th note, cycling through `dynamics`.
    pub fn velocity(&self, index: usize) -> f64 {
        if self.dynamics.is_empty() {
            return 0.7;
        }
        self.dynamics[index % self.dynamics.len()]
    }
}

// ---------------------------------------------------------------------------
// Substitution tables and odds
// ---------------------------------------------------------------------------

/// A chord borrowed from the parallel mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BorrowedChord {
    pub symbol: String,
    /// Root offset above the key tonic, in semitones.
    pub root: i32,
    pub quality: ChordQuality,
    pub description: String,
}

impl BorrowedChord {
    fn new(symbol: &str, root: i32, quality: ChordQuality, description: &str) -> Self {
        BorrowedChord {
            symbol: symbol.to_string(),
            root,
            quality,
            description: description.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BorrowedChordTables {
    /// Used in major keys.
    pub major_from_minor: Vec<BorrowedChord>,
    /// Used in minor keys.
    pub minor_from_major: Vec<BorrowedChord>,
}

impl Default for BorrowedChordTables {
    fn default() -> Self {
        use ChordQuality::*;
        BorrowedChordTables {
            major_from_minor: vec![
                BorrowedChord::new("iv", 5, Minor, "Minor iv from parallel minor"),
                BorrowedChord::new("bVII", 10, Major, "Flat VII from parallel minor"),
                BorrowedChord::new("bVI", 8, Major, "Flat VI from parallel minor"),
                BorrowedChord::new("bIII", 3, Major, "Flat III from parallel minor"),
                BorrowedChord::new("viio7", 11, Diminished7, "Diminished 7 from harmonic minor"),
            ],
            minor_from_major: vec![
                BorrowedChord::new("IV", 5, Major, "Major IV from parallel major"),
                BorrowedChord::new("I", 0, Major, "Major I (Picardy third)"),
                BorrowedChord::new("ii", 2, Minor, "Minor ii from parallel major"),
            ],
        }
    }
}

/// Interval shape of a genre voicing for one quality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoicingShape {
    pub intervals: Vec<i32>,
    pub name: String,
}

fn shape(intervals: &[i32], name: &str) -> VoicingShape {
    VoicingShape {
        intervals: intervals.to_vec(),
        name: name.to_string(),
    }
}

/// Per-chord probabilities for every stochastic transformation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationOdds {
    /// Chance a freshly built chord takes a genre extension quality.
    pub extension: f64,
    /// Chance of inserting V/V ahead of a dominant.
    pub secondary_dominant: f64,
    /// Chance of swapping IV for borrowed iv (major keys).
    pub borrowed_iv: f64,
    /// Chance of replacing V7 with bII7.
    pub tritone_substitution: f64,
    /// Chance of replacing a chord with a modal-interchange borrow.
    pub modal_interchange: f64,
    /// Ordered cumulative thresholds for "spice it up": extension, tritone,
    /// modal borrow, suspension.
    pub spice_up_thresholds: [f64; 4],
    pub spice: SpiceOdds,
}

impl Default for GenerationOdds {
    fn default() -> Self {
        GenerationOdds {
            extension: 0.2,
            secondary_dominant: 0.4,
            borrowed_iv: 0.3,
            tritone_substitution: 0.25,
            modal_interchange: 0.3,
            spice_up_thresholds: [0.25, 0.5, 0.75, 1.0],
            spice: SpiceOdds::default(),
        }
    }
}

/// Bernoulli draw for a catalog probability, clamped to [0, 1] (NaN is 0).
pub fn chance(rng: &mut impl Rng, p: f64) -> bool {
    let p = if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) };
    rng.random_bool(p)
}

// ---------------------------------------------------------------------------
// Presets
// ---------------------------------------------------------------------------

/// A named bundle of generation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmartPreset {
    pub name: String,
    pub description: String,
    pub genre: String,
    pub key: String,
    pub complexity: ComplexityLevel,
    pub rhythm: RhythmLevel,
    pub swing: f64,
    pub use_voice_leading: bool,
    pub use_advanced_theory: bool,
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalog {
    pub genres: BTreeMap<String, GenreProfile>,
    pub moods: BTreeMap<String, MoodProfile>,
    pub complexity: BTreeMap<ComplexityLevel, ComplexitySetting>,
    pub rhythms: BTreeMap<RhythmLevel, RhythmPattern>,
    pub grooves: BTreeMap<GrooveTemplate, GroovePattern>,
    pub bass_agents: BTreeMap<BassStyle, BassAgentConfig>,
    pub harmonic_functions: HarmonicFunctionTable,
    pub borrowed_chords: BorrowedChordTables,
    pub shell_voicings: BTreeMap<ChordQuality, VoicingShape>,
    pub open_voicings: BTreeMap<ChordQuality, VoicingShape>,
    pub odds: GenerationOdds,
    pub presets: BTreeMap<String, SmartPreset>,
}

impl Default for Catalog {
    fn default() -> Self {
        Catalog {
            genres: default_genres(),
            moods: default_moods(),
            complexity: default_complexity(),
            rhythms: default_rhythms(),
            grooves: default_grooves(),
            bass_agents: default_bass_agents(),
            harmonic_functions: HarmonicFunctionTable::default_table(),
            borrowed_chords: BorrowedChordTables::default(),
            shell_voicings: default_shell_voicings(),
            open_voicings: default_open_voicings(),
            odds: GenerationOdds::default(),
            presets: default_presets(),
        }
    }
}

fn missing(kind: &'static str, name: impl ToString) -> TheoryError {
    TheoryError::UnknownCatalogEntry {
        kind,
        name: name.to_string(),
    }
}

impl Catalog {
    /// Load a catalog override from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    pub fn from_json(data: &str) -> Result<Self> {
        Ok(serde_json::from_str(data)?)
    }

    pub fn genre(&self, name: &str) -> Result<&GenreProfile> {
        self.genres.get(name).ok_or_else(|| missing("genre", name))
    }

    pub fn mood(&self, name: &str) -> Result<&MoodProfile> {
        self.moods.get(name).ok_or_else(|| missing("mood", name))
    }

    pub fn complexity(&self, level: ComplexityLevel) -> Result<&ComplexitySetting> {
        self.complexity
            .get(&level)
            .ok_or_else(|| missing("complexity", format!("{level:?}")))
    }

    pub fn rhythm(&self, level: RhythmLevel) -> Result<&RhythmPattern> {
        self.rhythms
            .get(&level)
            .ok_or_else(|| missing("rhythm", format!("{level:?}")))
    }

    pub fn groove(&self, template: GrooveTemplate) -> Result<&GroovePattern> {
        self.grooves
            .get(&template)
            .ok_or_else(|| missing("groove", format!("{template:?}")))
    }

    pub fn bass_agent(&self, style: BassStyle) -> Result<&BassAgentConfig> {
        self.bass_agents
            .get(&style)
            .ok_or_else(|| missing("bass agent", format!("{style:?}")))
    }

    pub fn preset(&self, name: &str) -> Result<&SmartPreset> {
        self.presets.get(name).ok_or_else(|| missing("preset", name))
    }
}

// ---------------------------------------------------------------------------
// Built-in tables
// ---------------------------------------------------------------------------

fn degrees(rows: &[&[&str]]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| row.iter().map(|d| d.to_string()).collect())
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn genre(
    name: &str,
    scale: Scale,
    progressions: &[&[&str]],
    chord_types: &[ChordQuality],
    melody_scale: Scale,
    tempo: u32,
    voicing: Option<VoicingStyle>,
) -> GenreProfile {
    GenreProfile {
        name: name.to_string(),
        scale,
        progressions: degrees(progressions),
        chord_types: chord_types.to_vec(),
        melody_scale,
        tempo,
        voicing,
    }
}

fn default_genres() -> BTreeMap<String, GenreProfile> {
    use ChordQuality::*;

    let genres = [
        (
            "happy-pop",
            genre(
                "Happy Upbeat Pop",
                Scale::Major,
                &[
                    &["I", "V", "vi", "IV"],
                    &["I", "IV", "V", "I"],
                    &["I", "vi", "IV", "V"],
                    &["I", "IV", "vi", "V"],
                    &["vi", "IV", "I", "V"],
                    &["I", "V", "IV", "IV"],
                    &["I", "ii", "IV", "V"],
                    &["IV", "V", "vi", "I"],
                ],
                &[Major, Minor, Sus2, Add9, Major7],
                Scale::PentatonicMajor,
                120,
                None,
            ),
        ),
        (
            "chill-lofi",
            genre(
                "Chill Lo-Fi",
                Scale::Minor,
                &[
                    &["ii", "V", "I", "vi"],
                    &["I", "vi", "ii", "V"],
                    &["vi", "ii", "V", "I"],
                    &["I", "IV", "vi", "V"],
                    &["I", "vi", "IV", "ii"],
                    &["ii", "iii", "vi", "IV"],
                    &["I", "iii", "vi", "IV"],
                ],
                &[Major7, Minor7, Dominant7, Minor9, Add9],
                Scale::PentatonicMinor,
                85,
                None,
            ),
        ),
        (
            "energetic-edm",
            genre(
                "Energetic EDM",
                Scale::Major,
                &[
                    &["I", "V", "vi", "IV"],
                    &["vi", "IV", "I", "V"],
                    &["I", "IV", "I", "V"],
                    &["vi", "IV", "V", "I"],
                    &["I", "I", "V", "V", "vi", "vi", "IV", "IV"],
                    &["vi", "vi", "IV", "V"],
                ],
                &[Major, Minor, Sus4, Sus2],
                Scale::Major,
                128,
                None,
            ),
        ),
        (
            "soulful-rnb",
            genre(
                "Soulful R&B",
                Scale::Minor,
                &[
                    &["i", "VII", "VI", "V"],
                    &["i", "iv", "VII", "III"],
                    &["VI", "VII", "i", "i"],
                    &["i", "VI", "III", "VII"],
                    &["ii", "V", "I", "vi"],
                    &["i", "IV", "III", "VII"],
                    &["VI", "VII", "i", "iv"],
                ],
                &[Minor7, Major7, Dominant7, Minor9, Major9, Add9],
                Scale::PentatonicMinor,
                90,
                None,
            ),
        ),
        (
            "jazz-fusion",
            genre(
                "Jazz Fusion",
                Scale::Dorian,
                &[
                    &["ii", "V", "I", "vi"],
                    &["I", "vi", "ii", "V"],
                    &["iii", "vi", "ii", "V"],
                    &["I", "IV", "iii", "vi", "ii", "V", "I"],
                    &["ii", "V", "I", "I"],
                    &["I", "vi", "ii", "V", "iii", "vi", "ii", "V"],
                    &["IV", "iii", "ii", "V"],
                ],
                &[Major7, Minor7, Dominant7, HalfDim7, Diminished7, Minor9, Major9],
                Scale::Dorian,
                110,
                Some(VoicingStyle::Shell),
            ),
        ),
        (
            "dark-trap",
            genre(
                "Dark Deep Trap",
                Scale::HarmonicMinor,
                &[
                    &["i", "VI", "III", "VII"],
                    &["i", "iv", "VI", "V"],
                    &["i", "VII", "VI", "VII"],
                    &["i", "v", "VI", "iv"],
                    &["i", "iv", "i", "V"],
                    &["i", "III", "VII", "iv"],
                ],
                &[Minor, Diminished, Minor7, HalfDim7, Augmented],
                Scale::HarmonicMinor,
                140,
                None,
            ),
        ),
        (
            "cinematic",
            genre(
                "Cinematic Epic",
                Scale::Minor,
                &[
                    &["i", "VI", "III", "VII"],
                    &["i", "iv", "V", "i"],
                    &["VI", "VII", "i", "V"],
                    &["i", "III", "VII", "VI"],
                    &["i", "iv", "VII", "i"],
                    &["VI", "III", "VII", "i"],
                    &["i", "V", "VI", "III"],
                ],
                &[Minor, Major, Sus4, Augmented, Minor7, Major7],
                Scale::Minor,
                100,
                Some(VoicingStyle::Open),
            ),
        ),
        (
            "indie-rock",
            genre(
                "Indie Rock",
                Scale::Major,
                &[
                    &["I", "iii", "IV", "V"],
                    &["I", "V", "vi", "iii", "IV"],
                    &["I", "IV", "ii", "V"],
                    &["vi", "IV", "I", "V"],
                    &["I", "vi", "iii", "V"],
                    &["IV", "I", "V", "vi"],
                    &["I", "V", "IV", "IV"],
                ],
                &[Major, Minor, Sus2, Add9, Major7],
                Scale::Major,
                115,
                Some(VoicingStyle::Open),
            ),
        ),
        (
            "reggae",
            genre(
                "Reggae",
                Scale::Major,
                &[
                    &["I", "IV", "I", "V"],
                    &["I", "V", "vi", "IV"],
                    &["I", "IV", "V", "IV"],
                    &["vi", "IV", "I", "V"],
                    &["I", "vi", "IV", "V"],
                    &["I", "ii", "IV", "V"],
                ],
                &[Major, Minor, Dominant7, Minor7, Sus2],
                Scale::PentatonicMajor,
                80,
                None,
            ),
        ),
        (
            "blues",
            genre(
                "Blues",
                Scale::Mixolydian,
                &[
                    &["I", "I", "I", "I", "IV", "IV", "I", "I", "V", "IV", "I", "V"],
                    &["I", "IV", "I", "V"],
                    &["i", "iv", "i", "V"],
                    &["I", "I", "IV", "I", "V", "I"],
                    &["I", "IV", "I", "I", "IV", "IV", "I", "V"],
                    &["I", "iv", "I", "V"],
                ],
                &[Dominant7, Minor7, Major, Minor, Diminished],
                Scale::Blues,
                90,
                None,
            ),
        ),
        (
            "country",
            genre(
                "Country",
                Scale::Major,
                &[
                    &["I", "IV", "V", "I"],
                    &["I", "V", "vi", "IV"],
                    &["I", "IV", "I", "V"],
                    &["I", "vi", "IV", "V"],
                    &["I", "ii", "V", "I"],
                    &["vi", "IV", "I", "V"],
                ],
                &[Major, Minor, Sus4, Add9, Dominant7],
                Scale::PentatonicMajor,
                110,
                None,
            ),
        ),
        (
            "funk",
            genre(
                "Funk",
                Scale::Mixolydian,
                &[
                    &["I", "IV", "I", "IV"],
                    &["i", "IV", "i", "IV"],
                    &["I", "I", "IV", "I"],
                    &["i", "VII", "i", "VII"],
                    &["I", "ii", "IV", "V"],
                    &["i", "iv", "VII", "III"],
                ],
                &[Dominant7, Minor7, Major, Minor9, Sus4],
                Scale::PentatonicMinor,
                105,
                None,
            ),
        ),
    ];

    genres
        .into_iter()
        .map(|(key, profile)| (key.to_string(), profile))
        .collect()
}

fn default_moods() -> BTreeMap<String, MoodProfile> {
    use ChordQuality::*;
    use HarmonicFunction::*;

    let mood = |scales: &[Scale], functions: &[HarmonicFunction], qualities: &[ChordQuality], range: (f64, f64)| {
        MoodProfile {
            scales: scales.to_vec(),
            functions: functions.to_vec(),
            qualities: qualities.to_vec(),
            tension_range: range,
        }
    };

    BTreeMap::from([
        (
            "happy".to_string(),
            mood(
                &[Scale::Major, Scale::Lydian, Scale::Mixolydian],
                &[Tonic, Subdominant, Dominant, Tonic],
                &[Major, Major7, Add9, Sus2, Minor, Minor7, Dominant7],
                (0.0, 0.75),
            ),
        ),
        (
            "sad".to_string(),
            mood(
                &[Scale::Minor, Scale::Dorian, Scale::Phrygian],
                &[Tonic, Subdominant, Tonic, Dominant],
                &[Minor, Minor7, Minor9, Major, Major7],
                (0.1, 0.6),
            ),
        ),
        (
            "chill".to_string(),
            mood(
                &[Scale::Dorian, Scale::Major, Scale::Mixolydian],
                &[Tonic, Subdominant, Tonic, Passing],
                &[Major7, Minor7, Minor9, Major9, Add9, Dominant7],
                (0.0, 0.65),
            ),
        ),
        (
            "epic".to_string(),
            mood(
                &[Scale::Minor, Scale::HarmonicMinor],
                &[Tonic, Subdominant, Dominant, Passing],
                &[Minor, Major, Sus4, Sus2, Augmented],
                (0.2, 0.9),
            ),
        ),
        (
            "mysterious".to_string(),
            mood(
                &[Scale::Phrygian, Scale::Locrian, Scale::HarmonicMinor],
                &[Tonic, Passing, Subdominant, Dominant],
                &[Diminished, HalfDim7, Minor, Diminished7, Augmented],
                (0.3, 1.0),
            ),
        ),
        (
            "tense".to_string(),
            mood(
                &[Scale::HarmonicMinor, Scale::Phrygian],
                &[Tonic, Dominant, Passing, Dominant],
                &[Diminished7, HalfDim7, Dominant7, Minor, Augmented],
                (0.5, 1.0),
            ),
        ),
    ])
}

fn default_complexity() -> BTreeMap<ComplexityLevel, ComplexitySetting> {
    let setting = |min, max, use_extensions, variations| ComplexitySetting {
        chord_count: (min, max),
        use_extensions,
        variations,
    };
    BTreeMap::from([
        (ComplexityLevel::Simple, setting(3, 4, false, 1)),
        (ComplexityLevel::Medium, setting(4, 5, true, 2)),
        (ComplexityLevel::Complex, setting(6, 8, true, 3)),
        (ComplexityLevel::Advanced, setting(8, 12, true, 4)),
    ])
}

fn default_rhythms() -> BTreeMap<RhythmLevel, RhythmPattern> {
    let rhythm = |name: &str, durations: &[f64], dynamics: &[f64], melody_density| RhythmPattern {
        name: name.to_string(),
        durations: durations.to_vec(),
        dynamics: dynamics.to_vec(),
        melody_density,
    };
    BTreeMap::from([
        (
            RhythmLevel::Soft,
            rhythm("Soft & Gentle", &[4.0, 2.0, 2.0], &[0.5, 0.4, 0.6], 0.3),
        ),
        (
            RhythmLevel::Moderate,
            rhythm("Moderate", &[2.0, 2.0, 1.0, 1.0], &[0.7, 0.5, 0.8, 0.6], 0.5),
        ),
        (
            RhythmLevel::Strong,
            rhythm("Strong & Punchy", &[1.0, 1.0, 1.0, 1.0], &[0.9, 0.7, 0.85, 0.75], 0.7),
        ),
        (
            RhythmLevel::Intense,
            rhythm(
                "Intense & Driving",
                &[0.5, 0.5, 1.0, 0.5, 0.5],
                &[1.0, 0.8, 0.95, 0.85, 0.9],
                0.9,
            ),
        ),
    ])
}

fn default_shell_voicings() -> BTreeMap<ChordQuality, VoicingShape> {
    BTreeMap::from([
        (ChordQuality::Major7, shape(&[4, 11], "Shell Maj7")),
        (ChordQuality::Minor7, shape(&[3, 10], "Shell m7")),
        (ChordQuality::Dominant7, shape(&[4, 10], "Shell 7")),
        (ChordQuality::HalfDim7, shape(&[3, 10], "Shell m7b5")),
    ])
}

fn default_open_voicings() -> BTreeMap<ChordQuality, VoicingShape> {
    BTreeMap::from([
        (ChordQuality::Major, shape(&[0, 7, 16], "Open Major")),
        (ChordQuality::Minor, shape(&[0, 7, 15], "Open Minor")),
        (ChordQuality::Major7, shape(&[0, 11, 16], "Open Maj7")),
        (ChordQuality::Minor7, shape(&[0, 10, 15], "Open m7")),
        (ChordQuality::Dominant7, shape(&[0, 10, 16], "Open 7")),
    ])
}

fn default_presets() -> BTreeMap<String, SmartPreset> {
    use ComplexityLevel::*;
    use RhythmLevel::*;

    #[allow(clippy::too_many_arguments)]
    fn preset(
        name: &str,
        description: &str,
        genre: &str,
        key: &str,
        complexity: ComplexityLevel,
        rhythm: RhythmLevel,
        swing: f64,
        use_voice_leading: bool,
        use_advanced_theory: bool,
    ) -> SmartPreset {
        SmartPreset {
            name: name.to_string(),
            description: description.to_string(),
            genre: genre.to_string(),
            key: key.to_string(),
            complexity,
            rhythm,
            swing,
            use_voice_leading,
            use_advanced_theory,
        }
    }

    let presets = [
        ("lofi-chill-sunday", preset("Lo-Fi Chill Sunday", "Relaxed jazzy vibes for lazy mornings", "chill-lofi", "Dm", Medium, Soft, 0.3, true, true)),
        ("cyberpunk-drive", preset("Cyberpunk Drive", "Dark synth energy for night drives", "dark-trap", "Em", Complex, Strong, 0.1, false, true)),
        ("summer-pop", preset("Summer Pop Hit", "Catchy and uplifting radio-ready vibes", "happy-pop", "G", Simple, Moderate, 0.0, false, false)),
        ("midnight-jazz", preset("Midnight Jazz", "Sophisticated harmonies for late nights", "jazz-fusion", "Fm", Advanced, Moderate, 0.4, true, true)),
        ("epic-cinema", preset("Epic Cinema", "Dramatic orchestral grandeur", "cinematic", "Am", Complex, Intense, 0.0, true, true)),
        ("soul-groove", preset("Soul Groove", "Smooth R&B with rich harmonies", "soulful-rnb", "Bm", Medium, Moderate, 0.25, true, true)),
        ("festival-drop", preset("Festival Drop", "High-energy EDM for the main stage", "energetic-edm", "C", Simple, Intense, 0.0, false, false)),
        ("indie-sunset", preset("Indie Sunset", "Dreamy guitar-driven atmosphere", "indie-rock", "D", Medium, Soft, 0.15, true, false)),
        ("island-vibes", preset("Island Vibes", "Laid-back reggae rhythms for sunny days", "reggae", "G", Simple, Moderate, 0.2, false, false)),
        ("delta-blues", preset("Delta Blues", "Soulful 12-bar blues progressions", "blues", "E", Medium, Moderate, 0.35, true, true)),
        ("nashville-nights", preset("Nashville Nights", "Classic country with heartfelt chords", "country", "G", Simple, Moderate, 0.1, false, false)),
        ("groovy-funk", preset("Groovy Funk", "Tight rhythms and syncopated grooves", "funk", "Am", Medium, Strong, 0.25, true, true)),
    ];

    presets
        .into_iter()
        .map(|(key, preset)| (key.to_string(), preset))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chord::parse_degree;
    use crate::pitch::parse_key;

    #[test]
    fn test_default_catalog_is_complete() {
        let catalog = Catalog::default();
        assert_eq!(catalog.genres.len(), 12);
        assert_eq!(catalog.grooves.len(), 6);
        assert_eq!(catalog.complexity.len(), 4);
        assert_eq!(catalog.rhythms.len(), 4);
        assert!(catalog.mood("happy").is_ok());
        assert!(matches!(
            catalog.genre("polka"),
            Err(TheoryError::UnknownCatalogEntry { kind: "genre", .. })
        ));
    }

    #[test]
    fn test_builtin_degrees_all_parse() {
        let catalog = Catalog::default();
        for profile in catalog.genres.values() {
            for row in &profile.progressions {
                for degree in row {
                    assert!(parse_degree(degree).is_ok(), "{degree} in {}", profile.name);
                }
            }
        }
        for entry in &catalog.harmonic_functions.entries {
            assert!(parse_degree(&entry.degree).is_ok());
        }
    }

    #[test]
    fn test_presets_reference_known_genres_and_keys() {
        let catalog = Catalog::default();
        for preset in catalog.presets.values() {
            assert!(catalog.genre(&preset.genre).is_ok(), "{}", preset.genre);
            assert!(parse_key(&preset.key).is_ok(), "{}", preset.key);
        }
    }

    #[test]
    fn test_extension_qualities() {
        let catalog = Catalog::default();
        let pop = catalog.genre("happy-pop").unwrap();
        assert_eq!(
            pop.extension_qualities(),
            vec![ChordQuality::Sus2, ChordQuality::Add9, ChordQuality::Major7]
        );
    }

    #[test]
    fn test_rhythm_velocity_cycles() {
        let catalog = Catalog::default();
        let soft = catalog.rhythm(RhythmLevel::Soft).unwrap();
        assert_eq!(soft.velocity(0), 0.5);
        assert_eq!(soft.velocity(4), 0.4);
    }

    #[test]
    fn test_partial_json_override_keeps_defaults() {
        let json = r#"{
            "odds": { "extension": 1.0 },
            "moods": {
                "calm": {
                    "scales": ["major"],
                    "functions": ["tonic"],
                    "qualities": ["major7"],
                    "tension_range": [0.0, 0.2]
                }
            }
        }"#;
        let catalog = Catalog::from_json(json).unwrap();
        assert_eq!(catalog.odds.extension, 1.0);
        assert_eq!(catalog.odds.secondary_dominant, 0.4);
        assert_eq!(catalog.moods.len(), 1);
        assert!(catalog.mood("calm").is_ok());
        assert_eq!(catalog.genres.len(), 12);
    }

    #[test]
    fn test_catalog_json_roundtrip() {
        let catalog = Catalog::default();
        let json = serde_json::to_string(&catalog).unwrap();
        let back = Catalog::from_json(&json).unwrap();
        assert_eq!(back.genres, catalog.genres);
        assert_eq!(back.borrowed_chords, catalog.borrowed_chords);
        assert_eq!(back.shell_voicings, catalog.shell_voicings);
        assert_eq!(
            back.presets.keys().collect::<Vec<_>>(),
            catalog.presets.keys().collect::<Vec<_>>()
        );
        assert_eq!(back.grooves.len(), catalog.grooves.len());
        assert_eq!(back.bass_agents.len(), catalog.bass_agents.len());
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let result = Catalog::load(Path::new("/nonexistent/catalog.json"));
        assert!(matches!(result, Err(TheoryError::Io(_))));
    }
}
