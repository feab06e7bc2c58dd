// Spice levels and the "spice it up" re-roll.
//
// A spice level gates which quality changes are legal:
//   mild   - extended qualities drop to their base triad
//   medium - major/minor may gain a 7th
//   hot    - maj7/m7 may become maj9/m9, major may become add9
//   fire   - major may become sus2/sus4
// Above mild, the strongest rule the level allows is tried first and the
// first one that fires wins, so a chord changes at most once per pass.
// Mild consumes no randomness and is idempotent.
//
// `spice_up_progression` is the one-roll-per-chord variant: a single uniform
// draw against four cumulative thresholds picks one of extension, tritone
// substitution, modal borrow or suspension for that chord.

use crate::catalog::{Catalog, chance};
use crate::chord::{Chord, ChordQuality};
use crate::pitch::Key;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpiceLevel {
    Mild,
    Medium,
    Hot,
    Fire,
}

/// Probabilities for the per-level quality upgrades.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpiceOdds {
    pub seventh: f64,
    pub ninth: f64,
    pub add9: f64,
    pub suspension: f64,
}

impl Default for SpiceOdds {
    fn default() -> Self {
        SpiceOdds {
            seventh: 0.5,
            ninth: 0.5,
            add9: 0.3,
            suspension: 0.3,
        }
    }
}

fn fire_upgrade(quality: &ChordQuality, odds: &SpiceOdds, rng: &mut impl Rng) -> Option<ChordQuality> {
    if *quality == ChordQuality::Major && chance(rng, odds.suspension) {
        return Some(if rng.random_bool(0.5) {
            ChordQuality::Sus2
        } else {
            ChordQuality::Sus4
        });
    }
    None
}

fn hot_upgrade(quality: &ChordQuality, odds: &SpiceOdds, rng: &mut impl Rng) -> Option<ChordQuality> {
    match quality {
        ChordQuality::Major7 if chance(rng, odds.ninth) => Some(ChordQuality::Major9),
        ChordQuality::Minor7 if chance(rng, odds.ninth) => Some(ChordQuality::Minor9),
        ChordQuality::Major if chance(rng, odds.add9) => Some(ChordQuality::Add9),
        _ => None,
    }
}

fn medium_upgrade(quality: &ChordQuality, odds: &SpiceOdds, rng: &mut impl Rng) -> Option<ChordQuality> {
    match quality {
        ChordQuality::Major if chance(rng, odds.seventh) => Some(ChordQuality::Major7),
        ChordQuality::Minor if chance(rng, odds.seventh) => Some(ChordQuality::Minor7),
        _ => None,
    }
}

/// Apply one spice level to a single chord.
pub fn apply_spice_to_chord(chord: &Chord, level: SpiceLevel, odds: &SpiceOdds, rng: &mut impl Rng) -> Chord {
    let mut spiced = chord.clone();
    if level == SpiceLevel::Mild {
        spiced.quality = chord.quality.base_triad();
        return spiced;
    }

    let mut upgrade = None;
    if level >= SpiceLevel::Fire {
        upgrade = fire_upgrade(&chord.quality, odds, rng);
    }
    if upgrade.is_none() && level >= SpiceLevel::Hot {
        upgrade = hot_upgrade(&chord.quality, odds, rng);
    }
    if upgrade.is_none() {
        upgrade = medium_upgrade(&chord.quality, odds, rng);
    }
    if let Some(quality) = upgrade {
        spiced.quality = quality;
    }
    spiced
}

pub fn apply_spice_to_progression(
    progression: &[Chord],
    level: SpiceLevel,
    odds: &SpiceOdds,
    rng: &mut impl Rng,
) -> Vec<Chord> {
    progression
        .iter()
        .map(|chord| apply_spice_to_chord(chord, level, odds, rng))
        .collect()
}

/// One random transformation family per chord.
pub fn spice_up_progression(progression: &[Chord], key: Key, catalog: &Catalog, rng: &mut impl Rng) -> Vec<Chord> {
    let [extension, tritone, modal, _] = catalog.odds.spice_up_thresholds;

    progression
        .iter()
        .map(|chord| {
            let mut spiced = chord.clone();
            let roll: f64 = rng.random();

            if roll < extension {
                match chord.quality {
                    ChordQuality::Major => {
                        spiced.quality = if rng.random_bool(0.5) {
                            ChordQuality::Major7
                        } else {
                            ChordQuality::Add9
                        };
                    }
                    ChordQuality::Minor => {
                        spiced.quality = if rng.random_bool(0.5) {
                            ChordQuality::Minor7
                        } else {
                            ChordQuality::Minor9
                        };
                    }
                    _ => {}
                }
            } else if roll < tritone {
                if chord.quality == ChordQuality::Dominant7 || chord.degree == "V" {
                    spiced.root = chord.root.transpose(6);
                    spiced.quality = ChordQuality::Dominant7;
                    spiced.degree = "bII7".to_string();
                    spiced.numeral = "bII7".to_string();
                    spiced.tritone_substitution = true;
                }
            } else if roll < modal {
                if !key.is_minor && chord.degree == "IV" {
                    spiced.quality = ChordQuality::Minor7;
                    spiced.degree = "iv7".to_string();
                    spiced.borrowed = true;
                } else if !key.is_minor && rng.random_bool(0.5) {
                    spiced.root = key.root.transpose(8);
                    spiced.quality = ChordQuality::Major7;
                    spiced.degree = "bVImaj7".to_string();
                    spiced.borrowed = true;
                }
            } else if matches!(chord.quality, ChordQuality::Major | ChordQuality::Minor) {
                spiced.quality = if rng.random_bool(0.5) {
                    ChordQuality::Sus4
                } else {
                    ChordQuality::Sus2
                };
            }
            spiced
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chord::chord_from_degree;
    use crate::pitch::{PitchClass, Scale, parse_key};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn chord(quality: ChordQuality) -> Chord {
        Chord::new(PitchClass::C, quality, "I", "I")
    }

    fn always() -> SpiceOdds {
        SpiceOdds {
            seventh: 1.0,
            ninth: 1.0,
            add9: 1.0,
            suspension: 1.0,
        }
    }

    #[test]
    fn test_mild_is_idempotent_and_downgrades() {
        let mut rng = StdRng::seed_from_u64(0);
        let odds = SpiceOdds::default();
        for q in ChordQuality::ALL.iter().cloned() {
            let once = apply_spice_to_chord(&chord(q), SpiceLevel::Mild, &odds, &mut rng);
            let twice = apply_spice_to_chord(&once, SpiceLevel::Mild, &odds, &mut rng);
            assert_eq!(once, twice);
            assert!(!once.quality.is_extension());
        }
        let mystery = chord(ChordQuality::Unrecognized("mystery".to_string()));
        assert_eq!(apply_spice_to_chord(&mystery, SpiceLevel::Mild, &odds, &mut rng), mystery);
    }

    #[test]
    fn test_levels_are_ordered() {
        assert!(SpiceLevel::Mild < SpiceLevel::Medium);
        assert!(SpiceLevel::Medium < SpiceLevel::Hot);
        assert!(SpiceLevel::Hot < SpiceLevel::Fire);
    }

    #[test]
    fn test_medium_adds_sevenths_only() {
        let mut rng = StdRng::seed_from_u64(1);
        let odds = always();
        let up = |q, rng: &mut StdRng| apply_spice_to_chord(&chord(q), SpiceLevel::Medium, &odds, rng).quality;
        assert_eq!(up(ChordQuality::Major, &mut rng), ChordQuality::Major7);
        assert_eq!(up(ChordQuality::Minor, &mut rng), ChordQuality::Minor7);
        assert_eq!(up(ChordQuality::Major7, &mut rng), ChordQuality::Major7);
        assert_eq!(up(ChordQuality::Diminished, &mut rng), ChordQuality::Diminished);
    }

    #[test]
    fn test_hot_and_fire_prefer_strongest_rule() {
        let mut rng = StdRng::seed_from_u64(2);
        let odds = always();
        let spice = |q, level, rng: &mut StdRng| apply_spice_to_chord(&chord(q), level, &odds, rng).quality;

        assert_eq!(spice(ChordQuality::Major7, SpiceLevel::Hot, &mut rng), ChordQuality::Major9);
        assert_eq!(spice(ChordQuality::Minor7, SpiceLevel::Hot, &mut rng), ChordQuality::Minor9);
        assert_eq!(spice(ChordQuality::Major, SpiceLevel::Hot, &mut rng), ChordQuality::Add9);
        // Minor has no hot rule and falls through to medium.
        assert_eq!(spice(ChordQuality::Minor, SpiceLevel::Hot, &mut rng), ChordQuality::Minor7);

        let fire = spice(ChordQuality::Major, SpiceLevel::Fire, &mut rng);
        assert!(fire == ChordQuality::Sus2 || fire == ChordQuality::Sus4);
        assert_eq!(spice(ChordQuality::Major7, SpiceLevel::Fire, &mut rng), ChordQuality::Major9);
    }

    #[test]
    fn test_zero_odds_leave_chords_alone() {
        let mut rng = StdRng::seed_from_u64(3);
        let odds = SpiceOdds {
            seventh: 0.0,
            ninth: 0.0,
            add9: 0.0,
            suspension: 0.0,
        };
        let chords: Vec<Chord> = ChordQuality::ALL.iter().cloned().map(chord).collect();
        assert_eq!(apply_spice_to_progression(&chords, SpiceLevel::Fire, &odds, &mut rng), chords);
    }

    fn spice_up_with(thresholds: [f64; 4], key: &str, degrees: &[&str]) -> (Vec<Chord>, Vec<Chord>) {
        let mut catalog = Catalog::default();
        catalog.odds.spice_up_thresholds = thresholds;
        let key = parse_key(key).unwrap();
        let scale = if key.is_minor { Scale::Minor } else { Scale::Major };
        let chords: Vec<Chord> = degrees
            .iter()
            .map(|d| chord_from_degree(key.root, d, key.is_minor, scale).unwrap())
            .collect();
        let mut rng = StdRng::seed_from_u64(4);
        let spiced = spice_up_progression(&chords, key, &catalog, &mut rng);
        (chords, spiced)
    }

    #[test]
    fn test_spice_up_extension_family() {
        let (_, spiced) = spice_up_with([1.0; 4], "C", &["I", "ii", "vii"]);
        assert!(matches!(spiced[0].quality, ChordQuality::Major7 | ChordQuality::Add9));
        assert!(matches!(spiced[1].quality, ChordQuality::Minor7 | ChordQuality::Minor9));
        assert_eq!(spiced[2].quality, ChordQuality::Diminished);
    }

    #[test]
    fn test_spice_up_tritone_family() {
        let (chords, spiced) = spice_up_with([0.0, 1.0, 1.0, 1.0], "C", &["I", "V"]);
        assert_eq!(spiced[0], chords[0]);
        assert_eq!(spiced[1].name(), "C#7");
        assert_eq!(spiced[1].degree, "bII7");
        assert!(spiced[1].tritone_substitution);
    }

    #[test]
    fn test_spice_up_modal_family() {
        let (_, spiced) = spice_up_with([0.0, 0.0, 1.0, 1.0], "C", &["IV"]);
        assert_eq!(spiced[0].name(), "Fm7");
        assert_eq!(spiced[0].degree, "iv7");
        assert!(spiced[0].borrowed);

        // Minor keys never borrow here.
        let (chords, spiced) = spice_up_with([0.0, 0.0, 1.0, 1.0], "Am", &["i", "iv", "v"]);
        assert_eq!(spiced, chords);
    }

    #[test]
    fn test_spice_up_suspension_family() {
        let (_, spiced) = spice_up_with([0.0, 0.0, 0.0, 1.0], "G", &["I", "vi", "vii"]);
        assert!(matches!(spiced[0].quality, ChordQuality::Sus2 | ChordQuality::Sus4));
        assert!(matches!(spiced[1].quality, ChordQuality::Sus2 | ChordQuality::Sus4));
        assert_eq!(spiced[2].quality, ChordQuality::Diminished);
    }
}
