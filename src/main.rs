//! Noderack CLI — inspect and mutate a pattern document from the shell.
//!
//! Mutating commands rewrite the file in place through the engine, so every
//! edit goes through the same mutator/serializer path the UI would use.

use std::io;
use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};

use noderack::document::BlockKind;
use noderack::engine::PatternEngine;
use noderack::notation::{expand_notes, expand_steps};
use noderack::param::{lookup, StrParam};

#[derive(Parser)]
#[command(name = "noderack", version, about = "Pattern text ↔ node rack sync engine")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List blocks with their read-models.
    List { file: PathBuf },
    /// Set one numeric parameter on one block.
    Set {
        file: PathBuf,
        /// Block index (zero-based).
        block: usize,
        key: String,
        value: f64,
    },
    /// Remove one parameter call from one block.
    Remove {
        file: PathBuf,
        block: usize,
        key: String,
    },
    /// Replace a block's scale.
    Scale {
        file: PathBuf,
        block: usize,
        scale: String,
    },
    /// Toggle a block's bypass flag.
    Bypass { file: PathBuf, block: usize },
    /// Toggle exclusive solo on a block.
    Solo { file: PathBuf, block: usize },
    /// Set the document tempo.
    Tempo { file: PathBuf, bpm: u32 },
    /// Append a starter block of the given kind.
    Add {
        file: PathBuf,
        /// drums, bass, melody, chords, pad, vocal, fx or other.
        kind: String,
    },
    /// Print the serialized renderer text without touching the file.
    Render { file: PathBuf },
    /// Expand a mini-notation expression into a step grid, or into MIDI
    /// note events when a scale is given.
    Expand {
        expr: String,
        #[arg(long, default_value_t = 16)]
        slots: usize,
        /// Resolve melodic tokens against this scale (e.g. "C4:major").
        #[arg(long)]
        scale: Option<String>,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run() -> io::Result<()> {
    match Cli::parse().command {
        Command::List { file } => {
            let engine = load(&file)?;
            if let Some(bpm) = engine.bpm() {
                println!("tempo: {bpm} bpm");
            }
            for (idx, block) in engine.blocks().iter().enumerate() {
                let flags = match (block.bypassed, block.solo) {
                    (true, _) => " [bypassed]",
                    (_, true) => " [solo]",
                    _ => "",
                };
                println!("{idx}: {} ({}){flags}", block.name, block.kind);
                if !block.pattern.is_empty() {
                    println!("   pattern: \"{}\"", block.pattern);
                }
                if !block.sound_source.is_empty() {
                    println!("   source: {}", block.sound_source);
                }
                for r in &block.readings {
                    let def = lookup(r.key);
                    let neutral = def.map(|d| d.neutral).unwrap_or(0.0);
                    if r.dynamic {
                        println!("   {}: ~signal", r.key);
                    } else if r.value != neutral {
                        println!("   {}: {}", r.key, r.value);
                    }
                }
            }
            Ok(())
        }
        Command::Set { file, block, key, value } => {
            mutate(&file, |e, id| e.set_param(id, &key, value, Instant::now()), block)
        }
        Command::Remove { file, block, key } => {
            mutate(&file, |e, id| e.remove_param(id, &key, Instant::now()), block)
        }
        Command::Scale { file, block, scale } => mutate(
            &file,
            |e, id| e.set_string(id, StrParam::Scale, &scale, Instant::now()),
            block,
        ),
        Command::Bypass { file, block } => {
            mutate(&file, |e, id| e.toggle_bypass(id, Instant::now()), block)
        }
        Command::Solo { file, block } => {
            mutate(&file, |e, id| e.toggle_solo(id, Instant::now()), block)
        }
        Command::Tempo { file, bpm } => {
            let mut engine = load(&file)?;
            engine.set_tempo(bpm, Instant::now());
            std::fs::write(&file, engine.text())
        }
        Command::Add { file, kind } => {
            let mut engine = load(&file)?;
            engine.add_block(parse_kind(&kind), Instant::now());
            std::fs::write(&file, engine.text())
        }
        Command::Render { file } => {
            let engine = load(&file)?;
            print!("{}", engine.text());
            Ok(())
        }
        Command::Expand { expr, slots, scale } => {
            match scale {
                Some(scale) => {
                    for n in expand_notes(&expr, &scale, slots) {
                        println!("{:>3}  step {:>2}  len {}", n.midi, n.start_step, n.duration);
                    }
                }
                None => {
                    let steps = expand_steps(&expr, slots);
                    let grid: String =
                        steps.iter().map(|&on| if on { 'x' } else { '.' }).collect();
                    println!("{grid}");
                }
            }
            Ok(())
        }
    }
}

fn load(file: &PathBuf) -> io::Result<PatternEngine> {
    let text = std::fs::read_to_string(file)?;
    Ok(PatternEngine::new(&text))
}

fn mutate(
    file: &PathBuf,
    apply: impl FnOnce(&mut PatternEngine, noderack::document::BlockId) -> bool,
    block: usize,
) -> io::Result<()> {
    let mut engine = load(file)?;
    let Some(id) = engine.blocks().get(block).map(|b| b.id) else {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("no block at index {block}"),
        ));
    };
    if !apply(&mut engine, id) {
        eprintln!("no change (target may be signal-driven)");
        return Ok(());
    }
    std::fs::write(file, engine.text())
}

fn parse_kind(kind: &str) -> BlockKind {
    match kind {
        "bass" => BlockKind::Bass,
        "melody" => BlockKind::Melody,
        "chords" => BlockKind::Chords,
        "pad" => BlockKind::Pad,
        "vocal" => BlockKind::Vocal,
        "fx" => BlockKind::Fx,
        "other" => BlockKind::Other,
        _ => BlockKind::Drums,
    }
}
