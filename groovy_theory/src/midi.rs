// MIDI export of chord progressions.
//
// Produces a Standard MIDI File, format 0: one track at 480 ticks per beat
// holding a tempo event, a 4/4 time signature, the track name, then each
// chord as a block of simultaneous note-ons followed one bar (4 beats) later
// by the matching note-offs. Chords sound back to back, so every chord after
// the first starts its note-ons one bar after the previous block of offs.
//
// Pitches come from the chord's voiced notes when voice leading has run,
// otherwise from the quality's intervals stacked on the root in octave 4.
//
// Uses the `midly` crate both to write the file and to read it back for
// `describe_midi`.

use crate::chord::{Chord, chord_intervals};
use crate::error::{Result, TheoryError};
use crate::pitch::{Key, pitch_number};
use midly::{
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
    num::{u4, u7, u15, u24, u28},
};
use serde::Serialize;

pub const TICKS_PER_BEAT: u16 = 480;
pub const BEATS_PER_CHORD: u32 = 4;
pub const TRACK_NAME: &str = "Chord Progression";

const TICKS_PER_CHORD: u32 = TICKS_PER_BEAT as u32 * BEATS_PER_CHORD;
const VELOCITY: u8 = 80;
const CHANNEL: u8 = 0;
const MAX_TEMPO_MICROS: u32 = 0x00FF_FFFF;

/// Octave used when a chord carries no voicing.
const UNVOICED_OCTAVE: i32 = 4;

/// Microseconds per beat for a tempo, rounded.
pub fn micros_per_beat(tempo: f64) -> Result<u32> {
    if !tempo.is_finite() || tempo <= 0.0 {
        return Err(TheoryError::InvalidTempo(tempo));
    }
    Ok((60_000_000.0 / tempo).round().min(MAX_TEMPO_MICROS as f64) as u32)
}

/// MIDI key numbers sounded by a chord.
pub fn chord_keys(chord: &Chord) -> Vec<u8> {
    let pitches: Vec<i32> = match chord.voiced_notes.as_deref() {
        Some(voiced) if !voiced.is_empty() => voiced.iter().map(|v| v.pitch).collect(),
        _ => chord_intervals(&chord.quality)
            .iter()
            .map(|&interval| pitch_number(chord.root.transpose(interval), UNVOICED_OCTAVE))
            .collect(),
    };
    pitches.into_iter().map(|p| p.clamp(0, 127) as u8).collect()
}

fn note_event(delta: u32, key: u8, on: bool) -> TrackEvent<'static> {
    let key = u7::new(key);
    let message = if on {
        MidiMessage::NoteOn {
            key,
            vel: u7::new(VELOCITY),
        }
    } else {
        MidiMessage::NoteOff { key, vel: u7::new(0) }
    };
    TrackEvent {
        delta: u28::new(delta),
        kind: TrackEventKind::Midi {
            channel: u4::new(CHANNEL),
            message,
        },
    }
}

fn meta_event(message: MetaMessage<'static>) -> TrackEvent<'static> {
    TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(message),
    }
}

/// Build the in-memory SMF for a progression.
pub fn progression_to_smf(progression: &[Chord], tempo: f64) -> Result<Smf<'static>> {
    if progression.is_empty() {
        return Err(TheoryError::EmptyProgression);
    }
    let tempo_micros = micros_per_beat(tempo)?;

    let mut track: Track<'static> = vec![
        meta_event(MetaMessage::Tempo(u24::new(tempo_micros))),
        meta_event(MetaMessage::TimeSignature(4, 2, 24, 8)),
        meta_event(MetaMessage::TrackName(TRACK_NAME.as_bytes())),
    ];

    for (chord_index, chord) in progression.iter().enumerate() {
        let keys = chord_keys(chord);
        for (i, &key) in keys.iter().enumerate() {
            let delta = if i == 0 && chord_index > 0 { TICKS_PER_CHORD } else { 0 };
            track.push(note_event(delta, key, true));
        }
        for (i, &key) in keys.iter().enumerate() {
            let delta = if i == 0 { TICKS_PER_CHORD } else { 0 };
            track.push(note_event(delta, key, false));
        }
    }
    track.push(meta_event(MetaMessage::EndOfTrack));

    Ok(Smf {
        header: Header::new(Format::SingleTrack, Timing::Metrical(u15::new(TICKS_PER_BEAT))),
        tracks: vec![track],
    })
}

/// Encode a progression as Standard MIDI File bytes.
pub fn export_to_midi(progression: &[Chord], tempo: f64) -> Result<Vec<u8>> {
    let smf = progression_to_smf(progression, tempo)?;
    let mut buf = Vec::new();
    smf.write_std(&mut buf)?;
    tracing::debug!(chords = progression.len(), bytes = buf.len(), "exported MIDI");
    Ok(buf)
}

/// Download name for an exported progression, e.g.
/// `chord_progression_Csharpm_happy_pop.mid`.
pub fn midi_file_name(key: &Key, genre: &str) -> String {
    let key_name = key.name().replace('#', "sharp").replace('b', "flat");
    format!("chord_progression_{}_{}.mid", key_name, genre.replace('-', "_"))
}

/// What a MIDI file contains, as read back by `midly`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MidiSummary {
    pub format: String,
    pub ticks_per_beat: Option<u16>,
    pub tracks: usize,
    pub tempo_bpm: Option<f64>,
    pub track_name: Option<String>,
    pub note_ons: usize,
    pub note_offs: usize,
    /// Tick of the last event in the longest track.
    pub length_ticks: u64,
}

/// Parse MIDI bytes and summarize their contents.
pub fn describe_midi(bytes: &[u8]) -> Result<MidiSummary> {
    let smf = Smf::parse(bytes).map_err(|e| TheoryError::MidiParse(e.to_string()))?;
    let ticks_per_beat = match smf.header.timing {
        Timing::Metrical(ticks) => Some(ticks.as_int()),
        Timing::Timecode(..) => None,
    };

    let mut summary = MidiSummary {
        format: format!("{:?}", smf.header.format),
        ticks_per_beat,
        tracks: smf.tracks.len(),
        tempo_bpm: None,
        track_name: None,
        note_ons: 0,
        note_offs: 0,
        length_ticks: 0,
    };

    for track in &smf.tracks {
        let mut tick = 0u64;
        for event in track {
            tick += event.delta.as_int() as u64;
            match &event.kind {
                TrackEventKind::Meta(MetaMessage::Tempo(micros)) if summary.tempo_bpm.is_none() => {
                    summary.tempo_bpm = Some(60_000_000.0 / micros.as_int() as f64);
                }
                TrackEventKind::Meta(MetaMessage::TrackName(name)) if summary.track_name.is_none() => {
                    summary.track_name = Some(String::from_utf8_lossy(name).into_owned());
                }
                TrackEventKind::Midi { message, .. } => match message {
                    MidiMessage::NoteOn { vel, .. } if vel.as_int() > 0 => summary.note_ons += 1,
                    MidiMessage::NoteOn { .. } | MidiMessage::NoteOff { .. } => summary.note_offs += 1,
                    _ => {}
                },
                _ => {}
            }
        }
        summary.length_ticks = summary.length_ticks.max(tick);
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chord::{ChordQuality, chord_from_degree};
    use crate::pitch::{PitchClass, Scale, parse_key};
    use crate::voice_leading::apply_voice_leading;

    fn c_major() -> Chord {
        Chord::new(PitchClass::C, ChordQuality::Major, "I", "I")
    }

    fn be_u32(bytes: &[u8]) -> u32 {
        u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    #[test]
    fn test_header_chunk_is_exact() {
        let bytes = export_to_midi(&[c_major()], 120.0).unwrap();
        assert_eq!(
            &bytes[..14],
            &[b'M', b'T', b'h', b'd', 0, 0, 0, 6, 0, 0, 0, 1, 0x01, 0xE0]
        );
        assert_eq!(&bytes[14..18], b"MTrk");
        assert_eq!(be_u32(&bytes[18..22]) as usize, bytes.len() - 22);
    }

    #[test]
    fn test_track_opens_with_tempo_time_signature_and_name() {
        let bytes = export_to_midi(&[c_major()], 120.0).unwrap();
        let track = &bytes[22..];
        // 500000 µs per beat at 120 BPM.
        assert_eq!(&track[..7], &[0x00, 0xFF, 0x51, 0x03, 0x07, 0xA1, 0x20]);
        assert_eq!(&track[7..15], &[0x00, 0xFF, 0x58, 0x04, 0x04, 0x02, 0x18, 0x08]);
        assert_eq!(&track[15..19], &[0x00, 0xFF, 0x03, TRACK_NAME.len() as u8]);
        assert_eq!(&track[19..19 + TRACK_NAME.len()], TRACK_NAME.as_bytes());
        assert_eq!(&track[track.len() - 4..], &[0x00, 0xFF, 0x2F, 0x00]);
        // First note-on is C4, at delta 0.
        let first = &track[19 + TRACK_NAME.len()..];
        assert_eq!(&first[..4], &[0x00, 0x90, 60, VELOCITY]);
    }

    #[test]
    fn test_empty_progression_fails() {
        assert!(matches!(export_to_midi(&[], 120.0), Err(TheoryError::EmptyProgression)));
    }

    #[test]
    fn test_invalid_tempo_fails() {
        for tempo in [0.0, -90.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                export_to_midi(&[c_major()], tempo),
                Err(TheoryError::InvalidTempo(_))
            ));
        }
    }

    #[test]
    fn test_micros_per_beat_rounds() {
        assert_eq!(micros_per_beat(120.0).unwrap(), 500_000);
        assert_eq!(micros_per_beat(90.0).unwrap(), 666_667);
        assert_eq!(micros_per_beat(0.001).unwrap(), MAX_TEMPO_MICROS);
    }

    #[test]
    fn test_note_blocks_and_timing() {
        let key = parse_key("C").unwrap();
        let chords: Vec<Chord> = ["I", "IV", "V", "I"]
            .iter()
            .map(|d| chord_from_degree(key.root, d, false, Scale::Major).unwrap())
            .collect();
        let smf = progression_to_smf(&chords, 100.0).unwrap();
        let track = &smf.tracks[0];
        // 3 meta + 4 chords × 6 note events + end of track.
        assert_eq!(track.len(), 3 + 24 + 1);

        let deltas: Vec<u32> = track[3..9].iter().map(|e| e.delta.as_int()).collect();
        assert_eq!(deltas, [0, 0, 0, TICKS_PER_CHORD, 0, 0]);
        assert_eq!(track[9].delta.as_int(), TICKS_PER_CHORD);

        let summary = describe_midi(&export_to_midi(&chords, 100.0).unwrap()).unwrap();
        assert_eq!(summary.format, "SingleTrack");
        assert_eq!(summary.ticks_per_beat, Some(TICKS_PER_BEAT));
        assert_eq!(summary.tracks, 1);
        assert_eq!(summary.note_ons, 12);
        assert_eq!(summary.note_offs, 12);
        assert_eq!(summary.track_name.as_deref(), Some(TRACK_NAME));
        assert!((summary.tempo_bpm.unwrap() - 100.0).abs() < 1e-3);
        // Each chord's offs land one bar after its ons, and the next chord's
        // ons one bar after that.
        assert_eq!(summary.length_ticks, 7 * TICKS_PER_CHORD as u64);
    }

    #[test]
    fn test_voiced_notes_take_precedence() {
        let key = parse_key("C").unwrap();
        let chords: Vec<Chord> = ["I", "vi"]
            .iter()
            .map(|d| chord_from_degree(key.root, d, false, Scale::Major).unwrap())
            .collect();
        let voiced = apply_voice_leading(&chords);
        let expected: Vec<u8> = voiced[1]
            .voiced_notes
            .as_ref()
            .unwrap()
            .iter()
            .map(|v| v.pitch as u8)
            .collect();
        assert_eq!(chord_keys(&voiced[1]), expected);
        // Unvoiced chords place every tone in octave 4.
        assert_eq!(chord_keys(&chords[1]), [69, 60, 64]);
    }

    #[test]
    fn test_unknown_quality_exports_major_triad() {
        let chord = Chord::new(PitchClass::new(2), ChordQuality::from_id("mystery"), "II", "II");
        assert_eq!(chord_keys(&chord), [62, 66, 69]);
    }

    #[test]
    fn test_describe_rejects_garbage() {
        assert!(matches!(describe_midi(b"not midi"), Err(TheoryError::MidiParse(_))));
    }

    #[test]
    fn test_midi_file_name() {
        assert_eq!(
            midi_file_name(&parse_key("C#m").unwrap(), "soulful-rnb"),
            "chord_progression_Csharpm_soulful_rnb.mid"
        );
        assert_eq!(midi_file_name(&parse_key("G").unwrap(), "funk"), "chord_progression_G_funk.mid");
    }
}
