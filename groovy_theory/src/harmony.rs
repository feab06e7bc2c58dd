// Harmonic-function model and mood-driven functional progressions.
//
// Scale degrees are grouped into four functions (tonic, subdominant,
// dominant, passing), each entry carrying the chord qualities that suit it
// and a tension score in [0, 1]. A mood profile picks the scales it likes,
// a cyclic template of functions, the qualities it allows and the tension
// band it aims for.
//
// `functional_progression` tiles the mood's function template to the
// requested length and, per slot, draws an entry whose tension sits inside
// the mood's band (falling back to any entry of that function), then picks a
// quality from the overlap of the entry's and the mood's quality sets
// (falling back to the entry's own set).
//
// Used by progression.rs as the alternative to genre templates.

use crate::chord::{Chord, ChordQuality, chord_from_degree};
use crate::error::{Result, TheoryError};
use crate::pitch::{Key, Scale};
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

/// Tension reported for degrees absent from the function table.
pub const NEUTRAL_TENSION: f64 = 0.5;

/// The role a chord plays in a phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HarmonicFunction {
    Tonic,
    Subdominant,
    Dominant,
    Passing,
}

impl HarmonicFunction {
    pub const ALL: [HarmonicFunction; 4] = [
        HarmonicFunction::Tonic,
        HarmonicFunction::Subdominant,
        HarmonicFunction::Dominant,
        HarmonicFunction::Passing,
    ];
}

/// One scale degree's harmonic classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarmonicFunctionEntry {
    pub degree: String,
    pub function: HarmonicFunction,
    pub qualities: Vec<ChordQuality>,
    pub tension: f64,
}

impl HarmonicFunctionEntry {
    fn new(degree: &str, function: HarmonicFunction, qualities: &[ChordQuality], tension: f64) -> Self {
        HarmonicFunctionEntry {
            degree: degree.to_string(),
            function,
            qualities: qualities.to_vec(),
            tension,
        }
    }
}

/// Function table, ordered tonic, subdominant, dominant, passing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HarmonicFunctionTable {
    pub entries: Vec<HarmonicFunctionEntry>,
}

impl HarmonicFunctionTable {
    pub fn default_table() -> Self {
        use ChordQuality::*;
        use HarmonicFunction::*;

        HarmonicFunctionTable {
            entries: vec![
                HarmonicFunctionEntry::new("I", Tonic, &[Major, Major7, Add9, Major9, Sus2], 0.0),
                HarmonicFunctionEntry::new("vi", Tonic, &[Minor, Minor7, Minor9], 0.2),
                HarmonicFunctionEntry::new("iii", Tonic, &[Minor, Minor7], 0.3),
                HarmonicFunctionEntry::new("IV", Subdominant, &[Major, Major7, Add9, Major9, Sus2], 0.35),
                HarmonicFunctionEntry::new("ii", Subdominant, &[Minor, Minor7, Minor9], 0.4),
                HarmonicFunctionEntry::new("bVI", Subdominant, &[Major, Major7], 0.45),
                HarmonicFunctionEntry::new("iv", Subdominant, &[Minor, Minor7], 0.5),
                HarmonicFunctionEntry::new("bVII", Dominant, &[Major, Dominant7], 0.6),
                HarmonicFunctionEntry::new("V", Dominant, &[Major, Dominant7, Sus4], 0.75),
                HarmonicFunctionEntry::new("vii", Dominant, &[Diminished, HalfDim7, Diminished7], 0.9),
                HarmonicFunctionEntry::new("bIII", Passing, &[Major, Major7, Augmented], 0.5),
                HarmonicFunctionEntry::new("II", Passing, &[Major, Dominant7], 0.65),
                HarmonicFunctionEntry::new("bII", Passing, &[Major, Major7], 0.7),
                HarmonicFunctionEntry::new("#iv", Passing, &[HalfDim7, Diminished], 0.85),
            ],
        }
    }

    /// Entries of one function, in table order.
    pub fn entries_for(&self, function: HarmonicFunction) -> impl Iterator<Item = &HarmonicFunctionEntry> {
        self.entries.iter().filter(move |e| e.function == function)
    }

    /// First entry (in function-group order) labelled `degree`.
    pub fn lookup(&self, degree: &str) -> Option<&HarmonicFunctionEntry> {
        HarmonicFunction::ALL
            .iter()
            .find_map(|&f| self.entries_for(f).find(|e| e.degree == degree))
    }
}

impl Default for HarmonicFunctionTable {
    fn default() -> Self {
        HarmonicFunctionTable::default_table()
    }
}

/// How a mood shapes functional generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodProfile {
    /// Candidate scales; one is chosen per progression.
    pub scales: Vec<Scale>,
    /// Cyclic function template.
    pub functions: Vec<HarmonicFunction>,
    pub qualities: Vec<ChordQuality>,
    /// Inclusive `[min, max]` tension band.
    pub tension_range: (f64, f64),
}

impl MoodProfile {
    pub fn allows_tension(&self, tension: f64) -> bool {
        let (min, max) = self.tension_range;
        tension >= min && tension <= max
    }
}

/// Template used when a mood names no functions.
const DEFAULT_TEMPLATE: [HarmonicFunction; 4] = [
    HarmonicFunction::Tonic,
    HarmonicFunction::Subdominant,
    HarmonicFunction::Dominant,
    HarmonicFunction::Tonic,
];

/// Build `length` chords by walking the mood's function template.
///
/// Every returned chord carries its `harmonic_function`. Fails only if the
/// table has no entry at all for a function the template asks for, or if a
/// table degree label does not parse.
pub fn functional_progression(
    key: Key,
    length: usize,
    mood: &MoodProfile,
    table: &HarmonicFunctionTable,
    rng: &mut impl Rng,
) -> Result<Vec<Chord>> {
    let fallback_scale = if key.is_minor { Scale::Minor } else { Scale::Major };
    let scale = mood.scales.choose(rng).copied().unwrap_or(fallback_scale);
    let template: &[HarmonicFunction] = if mood.functions.is_empty() {
        &DEFAULT_TEMPLATE
    } else {
        &mood.functions
    };

    let mut chords = Vec::with_capacity(length);
    for slot in 0..length {
        let function = template[slot % template.len()];

        let all: Vec<&HarmonicFunctionEntry> = table.entries_for(function).collect();
        let in_range: Vec<&HarmonicFunctionEntry> = all
            .iter()
            .copied()
            .filter(|e| mood.allows_tension(e.tension))
            .collect();
        let pool = if in_range.is_empty() { &all } else { &in_range };
        let entry = *pool.choose(rng).ok_or_else(|| TheoryError::UnknownCatalogEntry {
            kind: "harmonic function entry",
            name: format!("{function:?}"),
        })?;

        let mut chord = chord_from_degree(key.root, &entry.degree, key.is_minor, scale)?;

        let shared: Vec<&ChordQuality> = entry
            .qualities
            .iter()
            .filter(|q| mood.qualities.contains(q))
            .collect();
        let quality = if shared.is_empty() {
            entry.qualities.choose(rng)
        } else {
            shared.choose(rng).copied()
        };
        if let Some(quality) = quality {
            chord.quality = quality.clone();
        }
        chord.harmonic_function = Some(function);
        chords.push(chord);
    }

    tracing::debug!(length, ?scale, "built functional progression");
    Ok(chords)
}

/// Tension of a chord's degree label, or `NEUTRAL_TENSION` when unlisted.
pub fn tension_of(chord: &Chord, table: &HarmonicFunctionTable) -> f64 {
    table
        .lookup(&chord.degree)
        .map(|e| e.tension)
        .unwrap_or(NEUTRAL_TENSION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::pitch::parse_key;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_functional_progression_happy() {
        let catalog = Catalog::default();
        let mood = catalog.mood("happy").unwrap();
        let table = &catalog.harmonic_functions;
        let key = parse_key("C").unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        let mut total = 0usize;
        let mut in_range = 0usize;
        for _ in 0..1000 {
            let chords = functional_progression(key, 4, mood, table, &mut rng).unwrap();
            assert_eq!(chords.len(), 4);
            for chord in &chords {
                let function = chord.harmonic_function.expect("function tag");
                assert!(HarmonicFunction::ALL.contains(&function));
                total += 1;
                if mood.allows_tension(tension_of(chord, table)) {
                    in_range += 1;
                }
            }
        }
        assert!(in_range as f64 / total as f64 >= 0.9, "{in_range}/{total} in range");
    }

    #[test]
    fn test_functional_progression_follows_template() {
        let catalog = Catalog::default();
        let mood = catalog.mood("happy").unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let chords =
            functional_progression(parse_key("G").unwrap(), 6, mood, &catalog.harmonic_functions, &mut rng).unwrap();
        let functions: Vec<HarmonicFunction> = chords.iter().filter_map(|c| c.harmonic_function).collect();
        let expected: Vec<HarmonicFunction> = (0..6).map(|i| mood.functions[i % mood.functions.len()]).collect();
        assert_eq!(functions, expected);
    }

    #[test]
    fn test_quality_intersection_and_fallback() {
        let table = HarmonicFunctionTable {
            entries: vec![HarmonicFunctionEntry::new(
                "I",
                HarmonicFunction::Tonic,
                &[ChordQuality::Major7, ChordQuality::Sus2],
                0.0,
            )],
        };
        let mut mood = MoodProfile {
            scales: vec![Scale::Major],
            functions: vec![HarmonicFunction::Tonic],
            qualities: vec![ChordQuality::Sus2],
            tension_range: (0.5, 1.0),
        };
        let key = parse_key("C").unwrap();
        let mut rng = StdRng::seed_from_u64(3);

        // Out-of-band tension still produces a chord via the fallback pool.
        let chords = functional_progression(key, 5, &mood, &table, &mut rng).unwrap();
        assert!(chords.iter().all(|c| c.quality == ChordQuality::Sus2));

        // Empty intersection falls back to the entry's own qualities.
        mood.qualities = vec![ChordQuality::Minor9];
        let chords = functional_progression(key, 20, &mood, &table, &mut rng).unwrap();
        assert!(
            chords
                .iter()
                .all(|c| c.quality == ChordQuality::Major7 || c.quality == ChordQuality::Sus2)
        );
    }

    #[test]
    fn test_missing_function_is_an_error() {
        let table = HarmonicFunctionTable { entries: Vec::new() };
        let mood = MoodProfile {
            scales: vec![],
            functions: vec![],
            qualities: vec![],
            tension_range: (0.0, 1.0),
        };
        let mut rng = StdRng::seed_from_u64(0);
        let result = functional_progression(parse_key("C").unwrap(), 2, &mood, &table, &mut rng);
        assert!(matches!(result, Err(TheoryError::UnknownCatalogEntry { .. })));
    }

    #[test]
    fn test_tension_of() {
        let table = HarmonicFunctionTable::default_table();
        let key = parse_key("C").unwrap();
        let v = chord_from_degree(key.root, "V", false, Scale::Major).unwrap();
        assert_eq!(tension_of(&v, &table), 0.75);
        let mut odd = v.clone();
        odd.degree = "V/V".to_string();
        assert_eq!(tension_of(&odd, &table), NEUTRAL_TENSION);
    }
}
