//! The Sniffer — reads parameter state out of hand-authored pattern text.
//!
//! Every function here is a pure, targeted partial parse: it answers one
//! question about one parameter and never fails, falling back to the caller's
//! default when the text does not contain what it is looking for.

use lazy_static::lazy_static;
use regex::Regex;

/// Signal generators whose presence as a call argument marks a parameter as
/// dynamic. Knobs refuse to touch these.
pub const DYNAMIC_SIGNALS: &str = "sine|cosine|perlin|saw|square|tri|rand|irand";

lazy_static! {
    static ref SCALE_RE: Regex = Regex::new(r#"\.scale\s*\(\s*["']([^"']+)["']"#).unwrap();
    static ref VOWEL_RE: Regex = Regex::new(r#"\.vowel\s*\(\s*["']([aeiou])["']"#).unwrap();
    static ref SOUND_RE: Regex = Regex::new(r#"\.?s(?:ound)?\s*\(\s*["']([^"']+)["']"#).unwrap();
    static ref BANK_RE: Regex = Regex::new(r#"\.bank\s*\(\s*["']([^"']+)["']"#).unwrap();
    static ref DRUM_PATTERN_RE: Regex = Regex::new(r#"\bs\s*\(\s*["']([^"']+)["']"#).unwrap();
    static ref NOTE_PATTERN_RE: Regex =
        Regex::new(r#"\b(?:note|n)\s*\(\s*["']([^"']+)["']"#).unwrap();
    static ref CHAINED_S_RE: Regex = Regex::new(r#"\)\.s\s*\(\s*["']([^"']+)["']"#).unwrap();
    static ref SYNTH_S_RE: Regex =
        Regex::new(r#"\bs\s*\(\s*["'](sine|sawtooth|square|triangle|supersaw)["']"#).unwrap();
    static ref GM_S_RE: Regex = Regex::new(r#"\.s\s*\(\s*["'](gm_[^"']+)["']"#).unwrap();
    static ref CPS_BPM_RE: Regex =
        Regex::new(r"setcps\s*\(\s*([0-9.]+)\s*/\s*60\s*/\s*4\s*\)").unwrap();
    static ref CPS_RAW_RE: Regex = Regex::new(r"setcps\s*\(\s*([0-9.]+)\s*\)").unwrap();
}

fn key_regex(key: &str, body: &str) -> Option<Regex> {
    Regex::new(&format!(r"\.{key}\s*\({body}")).ok()
}

/// True when the text contains any call for `key`, static or dynamic.
pub fn has_param(code: &str, key: &str) -> bool {
    key_regex(key, "").is_some_and(|re| re.is_match(code))
}

/// True when `key`'s argument starts with a signal generator.
pub fn is_dynamic(code: &str, key: &str) -> bool {
    key_regex(key, &format!(r"\s*(?:{DYNAMIC_SIGNALS})"))
        .is_some_and(|re| re.is_match(code))
}

/// Read the static literal for `key`, looking through an optional
/// `slider(current, lo, hi)` wrapper to its current-value argument.
/// Absent or dynamic calls yield `fallback`.
pub fn current_value(code: &str, key: &str, fallback: f64) -> f64 {
    key_regex(key, r"\s*(?:slider\s*\(\s*)?([0-9.]+)")
        .and_then(|re| re.captures(code))
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(fallback)
}

/// The quoted scale name, or empty when none is set.
pub fn detect_scale(code: &str) -> String {
    capture(&SCALE_RE, code)
}

pub fn detect_vowel(code: &str) -> String {
    capture(&VOWEL_RE, code)
}

/// First sample/sound token, stripped of any mini-notation the quote holds.
pub fn detect_sound(code: &str) -> String {
    if let Some(c) = SOUND_RE.captures(code) {
        let raw = &c[1];
        return raw
            .split(|ch: char| ch.is_whitespace() || "*[]".contains(ch))
            .next()
            .unwrap_or("")
            .to_string();
    }
    capture(&BANK_RE, code)
}

/// The primary pattern expression: a drum `s("...")` if it names drum
/// abbreviations, else the first `note(...)`/`n(...)` argument.
pub fn detect_pattern(code: &str) -> String {
    if let Some(c) = DRUM_PATTERN_RE.captures(code) {
        let pat = &c[1];
        let lower = pat.to_ascii_lowercase();
        if ["bd", "sd", "cp", "hh", "oh"].iter().any(|&k| lower.contains(k)) {
            return pat.to_string();
        }
    }
    capture(&NOTE_PATTERN_RE, code)
}

/// Where the block gets its timbre from: a chained `.s(...)`, a `.bank(...)`,
/// a bare synth waveform, or a General MIDI sound.
pub fn detect_sound_source(code: &str) -> String {
    for re in [&*CHAINED_S_RE, &*BANK_RE, &*SYNTH_S_RE, &*GM_S_RE] {
        if let Some(c) = re.captures(code) {
            return c[1].to_string();
        }
    }
    String::new()
}

/// Tempo from the document's `setcps` directive. The canonical form is
/// `setcps(bpm/60/4)`; a bare `setcps(x)` is cycles per second and converts
/// back at 4 beats per cycle. `None` when the document has no tempo.
pub fn extract_bpm(code: &str) -> Option<u32> {
    if let Some(c) = CPS_BPM_RE.captures(code) {
        let v: f64 = c[1].parse().ok()?;
        return Some(v.round() as u32);
    }
    let c = CPS_RAW_RE.captures(code)?;
    let v: f64 = c[1].parse().ok()?;
    Some((v * 60.0 * 4.0).round() as u32)
}

fn capture(re: &Regex, code: &str) -> String {
    re.captures(code).map(|c| c[1].to_string()).unwrap_or_default()
}
