//! The block model: one independently addressable pattern unit and its
//! parameter read-model, always re-derived from the block's own text.

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::param::{
    current_value, detect_pattern, detect_scale, detect_sound, detect_sound_source, detect_vowel,
    is_dynamic, PARAM_DEFS,
};

/// Stable block identity, assigned at first segmentation and carried forward
/// by list position on every re-segmentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub u64);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "block#{}", self.0)
    }
}

/// Canvas position. Owned by the UI, round-tripped through the engine,
/// never derived from text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeLayout {
    pub x: f64,
    pub y: f64,
}

impl NodeLayout {
    /// Default position for the n-th block on a 3-column grid.
    pub fn grid(index: usize) -> Self {
        const COLS: usize = 3;
        NodeLayout {
            x: (index % COLS) as f64 * 340.0 + 40.0,
            y: (index / COLS) as f64 * 360.0 + 40.0,
        }
    }
}

/// Coarse classification of what a block plays. A read-only UI hint,
/// re-derived from text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockKind {
    Drums,
    Bass,
    Melody,
    Chords,
    Pad,
    Vocal,
    Fx,
    Other,
}

impl BlockKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BlockKind::Drums => "drums",
            BlockKind::Bass => "bass",
            BlockKind::Melody => "melody",
            BlockKind::Chords => "chords",
            BlockKind::Pad => "pad",
            BlockKind::Vocal => "vocal",
            BlockKind::Fx => "fx",
            BlockKind::Other => "other",
        }
    }

    /// Melodic blocks default to a scale even when the text sets none.
    pub fn is_melodic(self) -> bool {
        !matches!(self, BlockKind::Drums | BlockKind::Fx | BlockKind::Other)
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

lazy_static! {
    static ref DRUM_HITS_RE: Regex = Regex::new(
        r#"(?i)\bs\s*\(\s*["'][^"']*\b(bd|cp|sd|hh|oh|ch|rim|tom|clap|clave|ride|crash)\b"#
    )
    .unwrap();
    static ref BANK_RE: Regex = Regex::new(r"\.bank\s*\(").unwrap();
    static ref NOTE_RE: Regex = Regex::new(r"note\s*\(").unwrap();
    static ref N_RE: Regex = Regex::new(r"\bn\s*\(").unwrap();
    static ref LOW_NOTE_RE: Regex = Regex::new(r"note\s*\(.*?[12]\b").unwrap();
    static ref HIGH_NOTE_RE: Regex = Regex::new(r"note\s*\(.*?[45]\b").unwrap();
    static ref CHORD_NOTE_RE: Regex = Regex::new(r"note\s*\(.*?\[.*?,.*?\]").unwrap();
    static ref BASS_WORD_RE: Regex = Regex::new(r"(?i)bass|sub|sine").unwrap();
    static ref FX_WORD_RE: Regex = Regex::new(r"(?i)crackle|rumble|noise|texture").unwrap();
}

/// Guess a block's role from its text. Ordered so the more specific tells
/// win over the generic ones.
pub fn detect_kind(code: &str) -> BlockKind {
    let lower = code.to_ascii_lowercase();
    if DRUM_HITS_RE.is_match(code) {
        return BlockKind::Drums;
    }
    if BANK_RE.is_match(code) && !NOTE_RE.is_match(code) {
        return BlockKind::Drums;
    }
    if LOW_NOTE_RE.is_match(code) && BASS_WORD_RE.is_match(code) {
        return BlockKind::Bass;
    }
    if lower.contains("bass") || lower.contains("sub") {
        return BlockKind::Bass;
    }
    if CHORD_NOTE_RE.is_match(code) {
        return BlockKind::Chords;
    }
    if lower.contains("chord") || lower.contains("rhodes") {
        return BlockKind::Chords;
    }
    if ["pad", "ambient", "drone", "haze"].iter().any(|&w| lower.contains(w)) {
        return BlockKind::Pad;
    }
    if ["vocal", "voice", "choir", "sing"].iter().any(|&w| lower.contains(w)) {
        return BlockKind::Vocal;
    }
    if FX_WORD_RE.is_match(code) {
        return BlockKind::Fx;
    }
    if HIGH_NOTE_RE.is_match(code) || NOTE_RE.is_match(code) || N_RE.is_match(code) {
        return BlockKind::Melody;
    }
    BlockKind::Other
}

/// One numeric parameter as the Sniffer last saw it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamReading {
    pub key: &'static str,
    pub value: f64,
    pub dynamic: bool,
}

/// One pattern block. `text` is always the clean form: it never contains the
/// bypass prefix and never contains serialization-time tags.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub id: BlockId,
    pub name: String,
    pub text: String,
    pub bypassed: bool,
    pub solo: bool,
    pub layout: NodeLayout,
    pub kind: BlockKind,
    pub sound: String,
    pub pattern: String,
    pub sound_source: String,
    pub scale: String,
    pub vowel: String,
    pub readings: Vec<ParamReading>,
}

impl Block {
    pub fn new(id: BlockId, name: String, text: String, index: usize) -> Self {
        let mut block = Block {
            id,
            name,
            text,
            bypassed: false,
            solo: false,
            layout: NodeLayout::grid(index),
            kind: BlockKind::Other,
            sound: String::new(),
            pattern: String::new(),
            sound_source: String::new(),
            scale: String::new(),
            vowel: String::new(),
            readings: Vec::new(),
        };
        block.refresh_read_model();
        block
    }

    /// Re-derive everything the Sniffer can see from the current text.
    /// Called after every mutation; the read-model is never written from
    /// UI intention.
    pub fn refresh_read_model(&mut self) {
        self.kind = detect_kind(&self.text);
        self.sound = detect_sound(&self.text);
        self.pattern = detect_pattern(&self.text);
        self.sound_source = detect_sound_source(&self.text);
        self.vowel = detect_vowel(&self.text);
        let detected = detect_scale(&self.text);
        self.scale = if detected.is_empty() && self.kind.is_melodic() {
            "C4:major".to_string()
        } else {
            detected
        };
        self.readings = PARAM_DEFS
            .iter()
            .map(|def| ParamReading {
                key: def.key,
                value: current_value(&self.text, def.key, def.neutral),
                dynamic: is_dynamic(&self.text, def.key),
            })
            .collect();
    }

    pub fn reading(&self, key: &str) -> Option<ParamReading> {
        self.readings.iter().copied().find(|r| r.key == key)
    }
}
