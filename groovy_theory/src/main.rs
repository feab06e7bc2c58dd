// Groovy Theory CLI entry point.
//
// Generates a chord progression (plus melody and bass) and writes it to MIDI.
// The pipeline: progression → reharmonization → spice → groove → voice
// leading → melody/bass → MIDI output.
//
// Usage:
//   cargo run -p groovy_theory --bin generate -- [output.mid] [--genre NAME]
//     [--key KEY] [--mood NAME] [--complexity LEVEL] [--rhythm LEVEL]
//     [--spice LEVEL] [--groove TEMPLATE] [--bass STYLE] [--variety N]
//     [--tempo BPM] [--seed N] [--preset NAME] [--catalog PATH]
//
// Without an output path the file is named after the key and genre. Set
// RUST_LOG=groovy_theory=debug for per-stage logging.

use groovy_theory::bass::BassStyle;
use groovy_theory::catalog::{Catalog, ComplexityLevel, RhythmLevel};
use groovy_theory::groove::GrooveTemplate;
use groovy_theory::midi::{describe_midi, export_to_midi, midi_file_name};
use groovy_theory::pipeline::{BassPart, GenerationRequest, generate};
use groovy_theory::spice::SpiceLevel;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_CATALOG: &str = "data/catalog.json";

fn main() -> ExitCode {
    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = "groovy_theory=info".parse::<Directive>() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .init();

    let args: Vec<String> = std::env::args().collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> groovy_theory::Result<()> {
    let catalog_path: PathBuf = parse_flag(args, "--catalog").unwrap_or_else(|| PathBuf::from(DEFAULT_CATALOG));
    let catalog = load_catalog(&catalog_path);

    let mut request = match parse_flag::<String>(args, "--preset") {
        Some(name) => GenerationRequest::from_preset(catalog.preset(&name)?),
        None => GenerationRequest::default(),
    };
    if let Some(genre) = parse_flag(args, "--genre") {
        request.genre = genre;
    }
    if let Some(key) = parse_flag(args, "--key") {
        request.key = key;
    }
    if let Some(mood) = parse_flag(args, "--mood") {
        request.mood = Some(mood);
    }
    if let Some(level) = parse_enum::<ComplexityLevel>(args, "--complexity") {
        request.complexity = level;
    }
    if let Some(level) = parse_enum::<RhythmLevel>(args, "--rhythm") {
        request.rhythm = level;
    }
    if let Some(level) = parse_enum::<SpiceLevel>(args, "--spice") {
        request.spice = Some(level);
    }
    if let Some(template) = parse_enum::<GrooveTemplate>(args, "--groove") {
        request.groove = Some(template);
    }
    if let Some(style) = parse_enum::<BassStyle>(args, "--bass") {
        request.bass = Some(BassPart::Agent(style));
    }
    if let Some(variety) = parse_flag(args, "--variety") {
        request.variety = variety;
    }
    if let Some(tempo) = parse_flag(args, "--tempo") {
        request.tempo = Some(tempo);
    }
    if args.iter().any(|a| a == "--advanced") {
        request.use_advanced_theory = true;
        request.use_modal_interchange = true;
    }

    let seed: Option<u64> = parse_flag(args, "--seed");
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    };

    println!("=== Groovy Theory ===");
    println!("Genre: {}  Key: {}  Complexity: {:?}", request.genre, request.key, request.complexity);
    if let Some(s) = seed {
        println!("Seed: {s}");
    }

    let generation = generate(&catalog, &request, &[], &mut rng)?;

    println!();
    for (i, chord) in generation.progression.iter().enumerate() {
        let mut tags = Vec::new();
        if chord.secondary_dominant {
            tags.push("secondary dominant".to_string());
        }
        if chord.tritone_substitution {
            tags.push("tritone sub".to_string());
        }
        if let Some(description) = &chord.borrowed_description {
            tags.push(description.clone());
        } else if chord.borrowed {
            tags.push("borrowed".to_string());
        }
        if let Some(function) = chord.harmonic_function {
            tags.push(format!("{function:?}").to_lowercase());
        }
        let tags = if tags.is_empty() { String::new() } else { format!("  ({})", tags.join(", ")) };
        println!("  {:>2}. {:<8} {:<6}{}", i + 1, chord.name(), chord.numeral, tags);
    }
    println!();
    println!("Melody notes: {}", generation.melody.len());
    println!("Bass notes: {}", generation.bass.len());

    let bytes = export_to_midi(&generation.progression, generation.tempo)?;
    let output = args
        .get(1)
        .filter(|s| !s.starts_with("--"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(midi_file_name(&generation.key, &request.genre)));
    std::fs::write(&output, &bytes)?;

    let summary = describe_midi(&bytes)?;
    println!();
    println!("Wrote {} ({} bytes)", output.display(), bytes.len());
    println!(
        "  {} track(s), {} notes, {:.0} BPM, {} ticks",
        summary.tracks,
        summary.note_ons,
        summary.tempo_bpm.unwrap_or(generation.tempo),
        summary.length_ticks
    );
    Ok(())
}

/// Catalog override when present, defaults otherwise.
fn load_catalog(path: &Path) -> Catalog {
    if !path.exists() {
        tracing::info!("using built-in catalog");
        return Catalog::default();
    }
    match Catalog::load(path) {
        Ok(catalog) => {
            tracing::info!(path = %path.display(), "loaded catalog");
            catalog
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to load catalog, using defaults");
            Catalog::default()
        }
    }
}

fn parse_flag<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse().ok())
}

/// Parse a flag value by its serde name, e.g. `--groove funk-syncopation`.
fn parse_enum<T: DeserializeOwned>(args: &[String], flag: &str) -> Option<T> {
    let value: String = parse_flag(args, flag)?;
    match serde_json::from_value(serde_json::Value::String(value.clone())) {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            tracing::warn!(flag, value = %value, "unrecognized value, ignoring");
            None
        }
    }
}
