//! Reverse direction: block list → one document text.
//!
//! Bypass wrapping, the tempo directive, the solo overlay and the per-block
//! routing/analysis tags are all layered on here, computed fresh from each
//! block's clean text every time. Nothing in this file mutates a block.

use lazy_static::lazy_static;
use regex::Regex;

use super::block::Block;
use super::segment::BYPASS_PREFIX;
use crate::param::inject_before_viz;

lazy_static! {
    static ref BLANK_RUN_RE: Regex = Regex::new(r"\n{3,}").unwrap();
    static ref ORBIT_RE: Regex = Regex::new(r"\.orbit\s*\(").unwrap();
}

/// Reassemble the full document. `preamble` and `bpm` come from the last
/// segmentation; tags and bypass prefixes exist only in the returned text.
pub fn serialize(preamble: &str, bpm: Option<u32>, blocks: &[Block]) -> String {
    let mut parts: Vec<String> = Vec::new();

    let preamble = preamble.trim_end();
    if !preamble.is_empty() {
        parts.push(preamble.to_string());
    }
    if let Some(bpm) = bpm {
        parts.push(format!("setcps({bpm}/60/4) // {bpm} bpm"));
    }
    if !parts.is_empty() {
        parts.push(String::new());
    }

    let any_solo = blocks.iter().any(|b| b.solo);

    for (idx, block) in blocks.iter().enumerate() {
        let tagged = inject_tags(&block.text, idx);

        // Solo is an overlay: while anything is soloed, everything else
        // renders bypassed without its stored flag changing.
        let silenced = block.bypassed || (any_solo && !block.solo);
        let body = if silenced {
            tagged
                .split('\n')
                .map(|l| {
                    if l.trim_start().starts_with("// [muted]") {
                        l.to_string()
                    } else {
                        format!("{BYPASS_PREFIX}{l}")
                    }
                })
                .collect::<Vec<_>>()
                .join("\n")
        } else {
            tagged
        };

        if block.name.is_empty() {
            parts.push(body);
        } else {
            parts.push(format!("// ── {} ──\n{body}", block.name));
        }
        parts.push(String::new());
    }

    let joined = parts.join("\n");
    let collapsed = BLANK_RUN_RE.replace_all(&joined, "\n\n");
    format!("{}\n", collapsed.trim_end())
}

/// Attach the monitoring tag (and an auto bus route when the block does not
/// route itself) for the renderer. Analyze comes first in the injected pair
/// so the segmenter can tell our orbit from a hand-written one.
fn inject_tags(text: &str, idx: usize) -> String {
    let tag = if ORBIT_RE.is_match(text) {
        format!(".analyze(\"ch-{idx}\")")
    } else {
        format!(".analyze(\"ch-{idx}\").orbit({})", idx + 1)
    };
    inject_before_viz(text, &tag)
}
