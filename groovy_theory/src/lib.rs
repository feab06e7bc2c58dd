// Groovy Theory
//
// A generative music-theory engine: it builds chord progressions from genre
// templates or mood-driven harmonic functions, reharmonizes them, voices
// them with minimal movement, applies groove timing, derives melody and bass
// lines, and exports the result as a Standard MIDI File.
//
// Architecture:
// - pitch.rs: Pitch classes, note naming, keys, scales
// - chord.rs: Chord qualities, degree labels, the Chord record
// - harmony.rs: Harmonic functions, tension, mood-driven progressions
// - catalog.rs: Read-only configuration tables (genres, moods, complexity,
//   rhythms, grooves, voicings, odds, presets), JSON-loadable
// - progression.rs: Template-based progression generation + locked chords
// - substitution.rs: Secondary dominants, borrowed iv, tritone subs, modal
//   interchange, genre voicing hints
// - spice.rs: Spice levels and the one-roll "spice it up" pass
// - voice_leading.rs: Inversion/octave search minimizing voice movement
// - groove.rs: Groove templates, swing, rhythmic masks, groove bass
// - bass.rs: Styled bass lines, the rhythm-aware bass agent, analysis
// - melody.rs: Chord-tone/scale melody over a progression
// - midi.rs: SMF format-0 export and inspection
// - pipeline.rs: One-call generation running every stage in order
//
// Every stochastic function takes an explicit `rng`, so output is
// deterministic given a seed.

pub mod bass;
pub mod catalog;
pub mod chord;
pub mod error;
pub mod groove;
pub mod harmony;
pub mod melody;
pub mod midi;
pub mod pipeline;
pub mod pitch;
pub mod progression;
pub mod spice;
pub mod substitution;
pub mod voice_leading;

pub use error::{Result, TheoryError};
