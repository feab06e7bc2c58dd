// End-to-end generation.
//
// `generate` turns a `GenerationRequest` into a finished progression plus
// optional melody and bass, running the stages in a fixed order:
//
//   progression (genre template or mood)
//   → modal interchange      (flag + complex/advanced complexity)
//   → advanced substitutions (flag + complex/advanced complexity)
//   → spice level
//   → genre voicing hints
//   → groove
//   → voice leading
//   → melody, bass
//
// Each stage takes the previous stage's output by reference and returns a
// new vector. Locked chords are restored at the progression stage; later
// stages may still reharmonize them.

use crate::bass::{BassNote, BassStyle, generate_bass_line, generate_rhythm_aware_bass_line};
use crate::catalog::{Catalog, ComplexityLevel, RhythmLevel, SmartPreset};
use crate::chord::Chord;
use crate::error::Result;
use crate::groove::{
    GrooveTemplate, apply_groove_to_progression, apply_syncopation, generate_groovy_bass_line,
    suggest_groove_template,
};
use crate::melody::{MelodyNote, generate_melody};
use crate::pitch::{Key, parse_key};
use crate::progression::{ProgressionRequest, ProgressionSource, generate_progression};
use crate::spice::{SpiceLevel, apply_spice_to_progression};
use crate::substitution::{apply_advanced_substitutions, apply_genre_voicing, apply_modal_interchange};
use crate::voice_leading::apply_voice_leading;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Which bass generator to run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BassPart {
    /// One of the five fixed styles.
    Style(BassStyle),
    /// The rhythm-aware agent configured for a style.
    Agent(BassStyle),
    /// Groove-driven line, then syncopation by the given amount (0-1).
    Groove(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationRequest {
    pub genre: String,
    /// When set, chords come from the mood's functional engine instead of
    /// the genre templates.
    pub mood: Option<String>,
    pub key: String,
    pub complexity: ComplexityLevel,
    pub rhythm: RhythmLevel,
    pub spice: Option<SpiceLevel>,
    pub groove: Option<GrooveTemplate>,
    /// Overrides the groove's swing amount.
    pub swing: Option<f64>,
    pub bass: Option<BassPart>,
    /// Bass and melody variety, 0-100.
    pub variety: f64,
    pub use_voice_leading: bool,
    pub use_advanced_theory: bool,
    pub use_modal_interchange: bool,
    pub melody: bool,
    /// Indices to carry over from the previous progression.
    pub locked: Vec<usize>,
    /// Beats per minute; the genre's tempo when unset.
    pub tempo: Option<f64>,
}

impl Default for GenerationRequest {
    fn default() -> Self {
        GenerationRequest {
            genre: "happy-pop".to_string(),
            mood: None,
            key: "C".to_string(),
            complexity: ComplexityLevel::Medium,
            rhythm: RhythmLevel::Moderate,
            spice: None,
            groove: None,
            swing: None,
            bass: None,
            variety: 50.0,
            use_voice_leading: true,
            use_advanced_theory: false,
            use_modal_interchange: false,
            melody: true,
            locked: Vec::new(),
            tempo: None,
        }
    }
}

impl GenerationRequest {
    /// Expand a preset. The groove is the one suggested for the preset's
    /// genre, with the preset's swing when it has any.
    pub fn from_preset(preset: &SmartPreset) -> Self {
        GenerationRequest {
            genre: preset.genre.clone(),
            key: preset.key.clone(),
            complexity: preset.complexity,
            rhythm: preset.rhythm,
            groove: Some(suggest_groove_template(&preset.genre)),
            swing: (preset.swing > 0.0).then_some(preset.swing),
            use_voice_leading: preset.use_voice_leading,
            use_advanced_theory: preset.use_advanced_theory,
            use_modal_interchange: preset.use_advanced_theory,
            ..GenerationRequest::default()
        }
    }
}

/// Output of one generation call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Generation {
    pub key: Key,
    pub progression: Vec<Chord>,
    pub melody: Vec<MelodyNote>,
    pub bass: Vec<BassNote>,
    pub tempo: f64,
}

/// Run the full pipeline. `previous` is the progression being replaced and
/// is only read for `request.locked`.
pub fn generate(
    catalog: &Catalog,
    request: &GenerationRequest,
    previous: &[Chord],
    rng: &mut impl Rng,
) -> Result<Generation> {
    let key = parse_key(&request.key)?;
    let genre = catalog.genre(&request.genre)?;
    let complexity = catalog.complexity(request.complexity)?;
    let rhythm = catalog.rhythm(request.rhythm)?;
    let source = match &request.mood {
        Some(mood) => ProgressionSource::Mood(catalog.mood(mood)?),
        None => ProgressionSource::Genre(genre),
    };

    let mut progression = generate_progression(
        &ProgressionRequest {
            source,
            complexity,
            key,
            previous,
            locked: &request.locked,
        },
        catalog,
        rng,
    )?;

    if request.complexity.allows_reharmonization() {
        if request.use_modal_interchange {
            progression = apply_modal_interchange(&progression, key, catalog, rng);
        }
        if request.use_advanced_theory {
            progression = apply_advanced_substitutions(&progression, key, catalog, rng);
        }
    }

    if let Some(level) = request.spice {
        progression = apply_spice_to_progression(&progression, level, &catalog.odds.spice, rng);
    }
    progression = apply_genre_voicing(&progression, genre, catalog);

    let groove_template = request
        .groove
        .unwrap_or_else(|| suggest_groove_template(&request.genre));
    let mut groove = catalog.groove(groove_template)?.clone();
    if let Some(swing) = request.swing {
        groove.swing_amount = swing.clamp(0.0, 1.0);
    }
    if request.groove.is_some() {
        progression = apply_groove_to_progression(&progression, &groove);
    }

    if request.use_voice_leading {
        progression = apply_voice_leading(&progression);
    }

    let melody = if request.melody {
        generate_melody(&progression, genre, rhythm, key, rng)
    } else {
        Vec::new()
    };

    let bass = match request.bass {
        None => Vec::new(),
        Some(BassPart::Style(style)) => generate_bass_line(&progression, style, request.variety, rhythm, rng),
        Some(BassPart::Agent(style)) => {
            let config = catalog.bass_agent(style)?;
            generate_rhythm_aware_bass_line(&progression, config, &groove, rhythm, request.variety, rng)
        }
        Some(BassPart::Groove(syncopation)) => {
            let line = generate_groovy_bass_line(&progression, &groove, request.variety, rhythm, rng);
            apply_syncopation(&line, syncopation, rng)
        }
    };

    let tempo = request.tempo.unwrap_or(genre.tempo as f64);
    tracing::debug!(
        genre = %request.genre,
        key = %key.name(),
        chords = progression.len(),
        melody = melody.len(),
        bass = bass.len(),
        tempo,
        "generation complete"
    );

    Ok(Generation {
        key,
        progression,
        melody,
        bass,
        tempo,
    })
}
