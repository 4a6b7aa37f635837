//! Forward direction: one document text → ordered block list.
//!
//! A single line scan finds block boundaries; everything else (names, flags,
//! read-models) is derived from each block's clean text afterwards. Identity
//! is positional: the n-th block of the new text inherits the id, layout and
//! flags of the n-th block of the previous list.

use lazy_static::lazy_static;
use regex::Regex;

use super::block::{Block, BlockId};
use crate::param::extract_bpm;

/// Per-line marker a bypassed block's lines carry in serialized text only.
/// Stored block text never contains it.
pub const BYPASS_PREFIX: &str = "// [muted] ";

lazy_static! {
    static ref BLOCK_START_RE: Regex = Regex::new(r"^\$[A-Za-z0-9_]*:").unwrap();
    // Serialization-time tags, stripped before text is stored. The injected
    // pair puts analyze first, so a hand-written .orbit() followed by an
    // injected .analyze() never matches the paired form and survives.
    static ref PAIRED_TAG_RE: Regex =
        Regex::new(r#"\.analyze\("ch-\d+"\)\.orbit\(\d+\)"#).unwrap();
    static ref ANALYZE_TAG_RE: Regex = Regex::new(r#"\.analyze\("ch-\d+"\)"#).unwrap();
    static ref NAME_BORDER_RE: Regex = Regex::new(r"[─—-]+").unwrap();
}

/// Result of segmenting one document.
#[derive(Debug, Clone, PartialEq)]
pub struct Segmentation {
    /// Lines before the first block, tempo directives excluded.
    pub preamble: String,
    pub bpm: Option<u32>,
    pub blocks: Vec<Block>,
}

fn is_block_start(trimmed: &str) -> bool {
    BLOCK_START_RE.is_match(trimmed)
        || trimmed
            .strip_prefix(BYPASS_PREFIX)
            .is_some_and(|rest| BLOCK_START_RE.is_match(rest))
}

/// Strip the routing/analysis tags the serializer layered on.
pub(crate) fn strip_injected_tags(text: &str) -> String {
    let text = PAIRED_TAG_RE.replace_all(text, "");
    ANALYZE_TAG_RE.replace_all(&text, "").into_owned()
}

struct RawBlock {
    name: String,
    text: String,
}

fn scan_blocks(code: &str) -> Vec<RawBlock> {
    let lines: Vec<&str> = code.split('\n').collect();
    let mut blocks: Vec<RawBlock> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_name = String::new();

    let flush = |blocks: &mut Vec<RawBlock>, current: &mut Vec<&str>, name: &mut String| {
        if !current.is_empty() {
            blocks.push(RawBlock {
                name: std::mem::take(name),
                text: current.join("\n"),
            });
            current.clear();
        }
    };

    let mut i = 0;
    while i < lines.len() {
        let trimmed = lines[i].trim();
        if is_block_start(trimmed) {
            flush(&mut blocks, &mut current, &mut current_name);
            let prev = if i > 0 { lines[i - 1].trim() } else { "" };
            current_name = if prev.starts_with("//") && !prev.starts_with("// [muted]") {
                let bare = prev.trim_start_matches('/').trim_start();
                NAME_BORDER_RE.replace_all(bare, "").trim().to_string()
            } else {
                String::new()
            };
            current.push(lines[i]);
        } else if !current.is_empty() {
            let next_starts = |j: usize| j < lines.len() && is_block_start(lines[j].trim());
            if trimmed.starts_with("//") && next_starts(i + 1) {
                // Comment naming the next block ends this one.
                flush(&mut blocks, &mut current, &mut current_name);
            } else if trimmed.is_empty() {
                let mut next = i + 1;
                while next < lines.len() && lines[next].trim().is_empty() {
                    next += 1;
                }
                let boundary = next >= lines.len()
                    || lines[next].trim().starts_with("//")
                    || is_block_start(lines[next].trim());
                if boundary {
                    flush(&mut blocks, &mut current, &mut current_name);
                } else {
                    current.push(lines[i]);
                }
            } else {
                current.push(lines[i]);
            }
        }
        i += 1;
    }
    flush(&mut blocks, &mut current, &mut current_name);
    blocks
}

fn scan_preamble(code: &str) -> String {
    let lines: Vec<&str> = code.split('\n').collect();
    let first_block = lines.iter().position(|l| is_block_start(l.trim()));
    let head = &lines[..first_block.unwrap_or(lines.len())];

    // The comment directly above the first block is its name, not preamble.
    let name_line = first_block
        .filter(|&bs| bs > 0 && lines[bs - 1].trim().starts_with("//"))
        .map(|bs| bs - 1);

    let kept: Vec<&str> = head
        .iter()
        .enumerate()
        .filter(|(i, line)| {
            let t = line.trim();
            Some(*i) != name_line && !t.starts_with("setcps") && !t.starts_with("setbpm")
        })
        .map(|(_, line)| *line)
        .collect();
    kept.join("\n").trim_end().to_string()
}

/// Segment a document, carrying identity forward positionally from
/// `previous`. `next_id` is the engine's id allocator; blocks beyond the
/// previous list get fresh ids.
pub fn segment(code: &str, previous: &[Block], next_id: &mut u64) -> Segmentation {
    let preamble = scan_preamble(code);
    let bpm = extract_bpm(code);

    let blocks = scan_blocks(code)
        .into_iter()
        .enumerate()
        .map(|(idx, raw)| {
            let was_bypassed = raw.text.trim_start().starts_with("// [muted]");
            let clean = strip_injected_tags(&raw.text.replace(BYPASS_PREFIX, ""));

            let existing = previous.get(idx);
            let id = existing.map(|b| b.id).unwrap_or_else(|| {
                let id = BlockId(*next_id);
                *next_id += 1;
                id
            });

            let mut block = Block::new(id, raw.name, clean, idx);
            if !block.name.is_empty() {
                // keep the comment name
            } else if !block.sound.is_empty() {
                block.name = block.sound.clone();
            } else {
                block.name = format!("Pattern {}", idx + 1);
            }
            match existing {
                Some(prev) => {
                    block.bypassed = prev.bypassed;
                    block.solo = prev.solo;
                    block.layout = prev.layout;
                }
                None => block.bypassed = was_bypassed,
            }
            block
        })
        .collect();

    Segmentation { preamble, bpm, blocks }
}
