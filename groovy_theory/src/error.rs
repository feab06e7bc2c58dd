// Error taxonomy for the theory engine.
//
// Lookup and parse failures raised deep in the pitch model (unknown note
// names, malformed degree labels) propagate unchanged up to the top-level
// generation call. The only locally-recovered case is an unrecognized chord
// quality, which falls back to a major triad in `chord::chord_intervals` and
// never surfaces here.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TheoryError {
    /// A note name found in neither the sharp nor the flat naming table.
    #[error("Unknown note name: {0:?}")]
    UnknownNote(String),

    /// A scale-degree label that does not parse as an (optionally altered)
    /// roman numeral.
    #[error("Invalid scale degree: {0:?}")]
    InvalidDegree(String),

    /// Raised by the MIDI encoder when there is nothing to export. Callers
    /// surface this to the user as "no progression".
    #[error("No progression to export")]
    EmptyProgression,

    #[error("Invalid tempo: {0} BPM")]
    InvalidTempo(f64),

    /// A named genre, mood, preset or template missing from the catalog.
    #[error("Unknown {kind}: {name:?}")]
    UnknownCatalogEntry { kind: &'static str, name: String },

    #[error("Catalog error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("MIDI parse error: {0}")]
    MidiParse(String),
}

pub type Result<T> = std::result::Result<T, TheoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            TheoryError::UnknownNote("H".to_string()).to_string(),
            "Unknown note name: \"H\""
        );
        assert_eq!(
            TheoryError::EmptyProgression.to_string(),
            "No progression to export"
        );
        let err = TheoryError::UnknownCatalogEntry {
            kind: "genre",
            name: "polka".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown genre: \"polka\"");
    }
}
