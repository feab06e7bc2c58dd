// Reharmonization passes: advanced substitutions, modal interchange and
// genre voicing hints.
//
// `apply_advanced_substitutions` walks the progression once, left to right.
// For each chord at most one rule fires, checked in this order:
//   1. the next chord is V/v: keep this chord and insert V/V (a dominant 7th
//      a whole step above the key root) after it;
//   2. major key, chord is IV/iv: swap in borrowed minor iv;
//   3. chord is V/v with a dominant 7th: replace with bII7 (a dominant 7th a
//      semitone above the key root).
// Each rule rolls its own probability per chord.
//
// `apply_modal_interchange` replaces chords with entries from the
// parallel-mode borrow table. `apply_genre_voicing` attaches the genre's
// shell/open voicing shape when the quality has one.
//
// All passes return new vectors; the input progression is left untouched.

use crate::catalog::{Catalog, GenreProfile, chance};
use crate::chord::{Chord, ChordQuality, VoicingHint, VoicingStyle};
use crate::pitch::Key;
use rand::Rng;
use rand::seq::IndexedRandom;

fn secondary_dominant(key: Key) -> Chord {
    let mut chord = Chord::new(key.root.transpose(2), ChordQuality::Dominant7, "V/V", "V/V");
    chord.secondary_dominant = true;
    chord
}

fn tritone_substitute(key: Key) -> Chord {
    let mut chord = Chord::new(key.root.transpose(1), ChordQuality::Dominant7, "bII7", "bII7");
    chord.tritone_substitution = true;
    chord
}

/// Secondary dominants, borrowed iv and tritone substitutions.
pub fn apply_advanced_substitutions(
    progression: &[Chord],
    key: Key,
    catalog: &Catalog,
    rng: &mut impl Rng,
) -> Vec<Chord> {
    let odds = &catalog.odds;
    let mut result = Vec::with_capacity(progression.len() + 2);
    let mut applied = 0usize;

    for (i, chord) in progression.iter().enumerate() {
        let next_is_dominant = progression.get(i + 1).is_some_and(Chord::is_dominant_degree);

        if next_is_dominant && chance(rng, odds.secondary_dominant) {
            result.push(chord.clone());
            result.push(secondary_dominant(key));
            applied += 1;
            continue;
        }

        if !key.is_minor && (chord.degree == "IV" || chord.degree == "iv") && chance(rng, odds.borrowed_iv) {
            let mut borrowed = chord.clone();
            borrowed.quality = ChordQuality::Minor;
            borrowed.degree = "iv".to_string();
            borrowed.numeral = "iv".to_string();
            borrowed.borrowed = true;
            result.push(borrowed);
            applied += 1;
            continue;
        }

        if chord.is_dominant_degree()
            && chord.quality == ChordQuality::Dominant7
            && chance(rng, odds.tritone_substitution)
        {
            result.push(tritone_substitute(key));
            applied += 1;
            continue;
        }

        result.push(chord.clone());
    }

    tracing::debug!(applied, "advanced substitutions");
    result
}

/// Replace chords with borrowed chords from the parallel mode.
pub fn apply_modal_interchange(
    progression: &[Chord],
    key: Key,
    catalog: &Catalog,
    rng: &mut impl Rng,
) -> Vec<Chord> {
    let table = if key.is_minor {
        &catalog.borrowed_chords.minor_from_major
    } else {
        &catalog.borrowed_chords.major_from_minor
    };

    progression
        .iter()
        .map(|chord| {
            if !chance(rng, catalog.odds.modal_interchange) {
                return chord.clone();
            }
            match table.choose(rng) {
                Some(entry) => {
                    let mut borrowed = Chord::new(
                        key.root.transpose(entry.root),
                        entry.quality.clone(),
                        entry.symbol.as_str(),
                        entry.symbol.as_str(),
                    );
                    borrowed.borrowed = true;
                    borrowed.borrowed_description = Some(entry.description.clone());
                    borrowed
                }
                None => chord.clone(),
            }
        })
        .collect()
}

/// Attach the genre's voicing shape to every chord whose quality has one.
pub fn apply_genre_voicing(progression: &[Chord], genre: &GenreProfile, catalog: &Catalog) -> Vec<Chord> {
    let Some(style) = genre.voicing else {
        return progression.to_vec();
    };
    let shapes = match style {
        VoicingStyle::Shell => &catalog.shell_voicings,
        VoicingStyle::Open => &catalog.open_voicings,
    };

    progression
        .iter()
        .map(|chord| {
            let mut chord = chord.clone();
            if let Some(shape) = shapes.get(&chord.quality) {
                chord.voicing_hint = Some(VoicingHint {
                    style,
                    intervals: shape.intervals.clone(),
                    name: shape.name.clone(),
                });
            }
            chord
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chord::chord_from_degree;
    use crate::pitch::{Scale, parse_key};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn progression(key: &str, degrees: &[&str]) -> (Key, Vec<Chord>) {
        let key = parse_key(key).unwrap();
        let scale = if key.is_minor { Scale::Minor } else { Scale::Major };
        let chords = degrees
            .iter()
            .map(|d| chord_from_degree(key.root, d, key.is_minor, scale).unwrap())
            .collect();
        (key, chords)
    }

    fn catalog_with(f: impl FnOnce(&mut Catalog)) -> Catalog {
        let mut catalog = Catalog::default();
        f(&mut catalog);
        catalog
    }

    #[test]
    fn test_secondary_dominant_inserted_before_v() {
        let catalog = catalog_with(|c| {
            c.odds.secondary_dominant = 1.0;
            c.odds.borrowed_iv = 0.0;
            c.odds.tritone_substitution = 0.0;
        });
        let (key, chords) = progression("C", &["I", "IV", "V", "I"]);
        let mut rng = StdRng::seed_from_u64(0);
        let result = apply_advanced_substitutions(&chords, key, &catalog, &mut rng);

        let degrees: Vec<&str> = result.iter().map(|c| c.degree.as_str()).collect();
        assert_eq!(degrees, ["I", "IV", "V/V", "V", "I"]);
        let vv = &result[2];
        assert_eq!(vv.name(), "D7");
        assert!(vv.secondary_dominant);
        // Input untouched.
        assert_eq!(chords.len(), 4);
    }

    #[test]
    fn test_borrowed_iv_only_in_major_keys() {
        let catalog = catalog_with(|c| {
            c.odds.secondary_dominant = 0.0;
            c.odds.borrowed_iv = 1.0;
        });
        let mut rng = StdRng::seed_from_u64(1);

        let (key, chords) = progression("C", &["I", "IV"]);
        let result = apply_advanced_substitutions(&chords, key, &catalog, &mut rng);
        assert_eq!(result[1].name(), "Fm");
        assert_eq!(result[1].degree, "iv");
        assert!(result[1].borrowed);

        let (key, chords) = progression("Am", &["i", "iv"]);
        let result = apply_advanced_substitutions(&chords, key, &catalog, &mut rng);
        assert!(!result[1].borrowed);
    }

    #[test]
    fn test_tritone_substitution_needs_dominant_seventh() {
        let catalog = catalog_with(|c| {
            c.odds.secondary_dominant = 0.0;
            c.odds.tritone_substitution = 1.0;
        });
        let mut rng = StdRng::seed_from_u64(2);
        let (key, mut chords) = progression("C", &["I", "V"]);

        let plain = apply_advanced_substitutions(&chords, key, &catalog, &mut rng);
        assert_eq!(plain, chords);

        chords[1].quality = ChordQuality::Dominant7;
        let result = apply_advanced_substitutions(&chords, key, &catalog, &mut rng);
        assert_eq!(result[1].name(), "C#7");
        assert_eq!(result[1].numeral, "bII7");
        assert!(result[1].tritone_substitution);
    }

    #[test]
    fn test_first_match_wins() {
        // IV before V: the secondary dominant rule fires and the borrowed rule
        // is skipped for that same chord.
        let catalog = catalog_with(|c| {
            c.odds.secondary_dominant = 1.0;
            c.odds.borrowed_iv = 1.0;
        });
        let mut rng = StdRng::seed_from_u64(3);
        let (key, chords) = progression("C", &["IV", "V"]);
        let result = apply_advanced_substitutions(&chords, key, &catalog, &mut rng);
        assert_eq!(result[0], chords[0]);
        assert!(result[1].secondary_dominant);
    }

    #[test]
    fn test_modal_interchange_major_and_minor() {
        let catalog = catalog_with(|c| c.odds.modal_interchange = 1.0);
        let mut rng = StdRng::seed_from_u64(4);

        let (key, chords) = progression("C", &["I", "V", "vi", "IV"]);
        let result = apply_modal_interchange(&chords, key, &catalog, &mut rng);
        assert_eq!(result.len(), 4);
        for chord in &result {
            assert!(chord.borrowed);
            let entry = catalog
                .borrowed_chords
                .major_from_minor
                .iter()
                .find(|e| e.symbol == chord.degree)
                .unwrap();
            assert_eq!(chord.root, key.root.transpose(entry.root));
            assert_eq!(chord.borrowed_description.as_deref(), Some(entry.description.as_str()));
        }

        let (key, chords) = progression("Am", &["i", "iv"]);
        let result = apply_modal_interchange(&chords, key, &catalog, &mut rng);
        assert!(result.iter().all(|c| ["IV", "I", "ii"].contains(&c.degree.as_str())));
    }

    #[test]
    fn test_modal_interchange_zero_odds_is_identity() {
        let catalog = catalog_with(|c| c.odds.modal_interchange = 0.0);
        let mut rng = StdRng::seed_from_u64(5);
        let (key, chords) = progression("G", &["I", "ii", "V"]);
        assert_eq!(apply_modal_interchange(&chords, key, &catalog, &mut rng), chords);
    }

    #[test]
    fn test_genre_voicing_hints() {
        let catalog = Catalog::default();
        let (_, mut chords) = progression("C", &["ii", "V", "I"]);
        chords[0].quality = ChordQuality::Minor7;

        let jazz = apply_genre_voicing(&chords, catalog.genre("jazz-fusion").unwrap(), &catalog);
        let hint = jazz[0].voicing_hint.as_ref().unwrap();
        assert_eq!(hint.style, VoicingStyle::Shell);
        assert_eq!(hint.intervals, [3, 10]);
        // Plain triads have no shell shape.
        assert!(jazz[1].voicing_hint.is_none());

        let cinematic = apply_genre_voicing(&chords, catalog.genre("cinematic").unwrap(), &catalog);
        assert_eq!(cinematic[1].voicing_hint.as_ref().unwrap().intervals, [0, 7, 16]);

        let pop = apply_genre_voicing(&chords, catalog.genre("happy-pop").unwrap(), &catalog);
        assert!(pop.iter().all(|c| c.voicing_hint.is_none()));
    }
}
