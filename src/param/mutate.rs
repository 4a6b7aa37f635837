//! The Mutator — writes one parameter back into block text non-destructively.
//!
//! Each call rewrites the smallest possible span. Anything it cannot touch
//! safely it leaves alone; a no-op is signalled by returning the input
//! unchanged, which the caller can detect by equality.

use lazy_static::lazy_static;
use regex::Regex;

use super::defs::format_value;
use super::sniff::is_dynamic;

lazy_static! {
    static ref VIZ_RE: Regex =
        Regex::new(r"\.(scope|fscope|pianoroll|pitchwheel|punchcard)\s*\(").unwrap();
    static ref SCALE_CALL_RE: Regex = Regex::new(r#"\.scale\s*\(\s*["'][^"']*["']\s*\)"#).unwrap();
    static ref NOTE_CALL_RE: Regex =
        Regex::new(r#"((?:note|n)\s*\(\s*["'][^"']*["']\s*\))"#).unwrap();
    static ref VOWEL_CALL_RE: Regex = Regex::new(r#"\.vowel\s*\(\s*["'][^"']*["']\s*\)"#).unwrap();
    static ref BANK_CALL_RE: Regex = Regex::new(r#"\.bank\s*\(\s*["'][^"']*["']\s*\)"#).unwrap();
    static ref CHAINED_S_CALL_RE: Regex =
        Regex::new(r#"\)\.s\s*\(\s*["'][^"']*["']\s*\)"#).unwrap();
    static ref SYNTH_S_CALL_RE: Regex =
        Regex::new(r#"\bs\s*\(\s*["'](?:sine|sawtooth|square|triangle|supersaw|gm_[^"']+)["']\s*\)"#)
            .unwrap();
    static ref DRUM_S_CALL_RE: Regex = Regex::new(r#"\bs\s*\(\s*["'][^"']*["']\s*\)"#).unwrap();
    static ref NOTE_OR_N_CALL_RE: Regex =
        Regex::new(r#"\b(note|n)\s*\(\s*["'][^"']*["']\s*\)"#).unwrap();
}

/// A numeric parameter request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Edit {
    Set(f64),
    Remove,
}

/// String-valued parameters, each with its own replacement anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrParam {
    Scale,
    Vowel,
    Bank,
    SoundSource,
    DrumPattern,
    NotePattern,
}

/// Apply one numeric edit to a block's text.
///
/// Decision order, each arm short-circuiting:
/// 1. dynamic argument — refuse, return the text unchanged;
/// 2. `slider(...)` wrapper and a new value — rewrite only the wrapper's
///    current-value argument, bounds stay verbatim;
/// 3. static literal and a new value — replace the argument in place;
/// 4. removal — delete the whole call, leading whitespace included;
/// 5. otherwise a new value injects a fresh call (before any trailing
///    visualization calls, else on the last non-empty line).
pub fn mutate(code: &str, key: &str, edit: Edit) -> String {
    if is_dynamic(code, key) {
        return code.to_string();
    }

    match edit {
        Edit::Set(value) => {
            let num = format_value(key, value);
            for wrapper in [r"slider\s*\(\s*", ""] {
                // Value pattern must accept leading-dot literals (`.5`) or
                // the rewrite misses them and injects a duplicate call.
                let Ok(re) = Regex::new(&format!(
                    r"(\.{key}\s*\(\s*{wrapper})[0-9]*\.?[0-9]+"
                )) else {
                    continue;
                };
                if re.is_match(code) {
                    return re.replace(code, format!("${{1}}{num}")).into_owned();
                }
            }
            inject_before_viz(code, &format!(".{key}({num})"))
        }
        Edit::Remove => {
            // One level of nesting is enough to swallow a slider wrapper.
            match Regex::new(&format!(
                r"\s*\.{key}\s*\(\s*(?:slider\s*\([^)]*\)|[^()])*\)"
            )) {
                Ok(re) => re.replace(code, "").into_owned(),
                Err(_) => code.to_string(),
            }
        }
    }
}

/// Apply one string edit. Replacement is always in place; only vowel removes
/// (empty value) and only vowel/scale inject when absent.
pub fn mutate_str(code: &str, field: StrParam, value: &str) -> String {
    match field {
        StrParam::Scale => {
            if SCALE_CALL_RE.is_match(code) {
                return SCALE_CALL_RE
                    .replace(code, format!(".scale(\"{value}\")"))
                    .into_owned();
            }
            // A scale only makes sense attached to the pitch source.
            if NOTE_CALL_RE.is_match(code) {
                return NOTE_CALL_RE
                    .replace(code, format!("${{1}}.scale(\"{value}\")"))
                    .into_owned();
            }
            code.to_string()
        }
        StrParam::Vowel => {
            if value.is_empty() {
                return VOWEL_CALL_RE.replace(code, "").into_owned();
            }
            if VOWEL_CALL_RE.is_match(code) {
                return VOWEL_CALL_RE
                    .replace(code, format!(".vowel(\"{value}\")"))
                    .into_owned();
            }
            inject_before_viz(code, &format!(".vowel(\"{value}\")"))
        }
        StrParam::Bank => {
            if BANK_CALL_RE.is_match(code) {
                return BANK_CALL_RE
                    .replace(code, format!(".bank(\"{value}\")"))
                    .into_owned();
            }
            code.to_string()
        }
        StrParam::SoundSource => {
            if CHAINED_S_CALL_RE.is_match(code) {
                return CHAINED_S_CALL_RE
                    .replace(code, format!(").s(\"{value}\")"))
                    .into_owned();
            }
            if SYNTH_S_CALL_RE.is_match(code) {
                return SYNTH_S_CALL_RE
                    .replace(code, format!("s(\"{value}\")"))
                    .into_owned();
            }
            code.to_string()
        }
        StrParam::DrumPattern => {
            if DRUM_S_CALL_RE.is_match(code) {
                return DRUM_S_CALL_RE
                    .replace(code, format!("s(\"{value}\")"))
                    .into_owned();
            }
            code.to_string()
        }
        StrParam::NotePattern => {
            if NOTE_OR_N_CALL_RE.is_match(code) {
                return NOTE_OR_N_CALL_RE
                    .replace(code, format!("$1(\"{value}\")"))
                    .into_owned();
            }
            code.to_string()
        }
    }
}

/// Insert an effect segment ahead of the first visualization call, so added
/// parameters stay in the audible part of the chain. With no visualization
/// present it lands at the end of the last non-empty line.
pub fn inject_before_viz(code: &str, effect: &str) -> String {
    if let Some(m) = VIZ_RE.find(code) {
        let mut out = String::with_capacity(code.len() + effect.len());
        out.push_str(&code[..m.start()]);
        out.push_str(effect);
        out.push_str(&code[m.start()..]);
        return out;
    }
    let mut lines: Vec<String> = code.split('\n').map(str::to_string).collect();
    for line in lines.iter_mut().rev() {
        if !line.trim().is_empty() {
            line.push_str(effect);
            break;
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::sniff::{current_value, has_param};

    #[test]
    fn static_replace_is_minimal() {
        let code = "$: s(\"bd sd\").lpf(8000).room(0.3)";
        let out = mutate(code, "lpf", Edit::Set(4000.0));
        assert_eq!(out, "$: s(\"bd sd\").lpf(4000).room(0.3)");
    }

    #[test]
    fn dynamic_refuses_all_edits() {
        let code = "$: s(\"bd\").lpf(sine.range(200, 4000))";
        assert_eq!(mutate(code, "lpf", Edit::Set(500.0)), code);
        assert_eq!(mutate(code, "lpf", Edit::Remove), code);
    }

    #[test]
    fn leading_dot_literal_is_rewritten_in_place() {
        let code = "$: s(\"bd\").room(.5)";
        let out = mutate(code, "room", Edit::Set(0.4));
        assert_eq!(out, "$: s(\"bd\").room(0.40)");
        assert_eq!(out.matches(".room(").count(), 1);
        assert_eq!(current_value(&out, "room", 0.0), 0.4);

        let slid = "$: s(\"bd\").gain(slider(.8, 0, 2))";
        assert_eq!(
            mutate(slid, "gain", Edit::Set(1.0)),
            "$: s(\"bd\").gain(slider(1, 0, 2))"
        );
    }

    #[test]
    fn slider_rewrite_preserves_bounds() {
        let code = "$: s(\"bd\").gain(slider(0.8, 0, 2))";
        let out = mutate(code, "gain", Edit::Set(1.0));
        assert_eq!(out, "$: s(\"bd\").gain(slider(1, 0, 2))");
    }

    #[test]
    fn removal_deletes_whole_call() {
        let code = "$: s(\"bd\").lpf(8000).room(0.3)";
        let out = mutate(code, "lpf", Edit::Remove);
        assert_eq!(out, "$: s(\"bd\").room(0.3)");
        assert!(!has_param(&out, "lpf"));
        assert_eq!(current_value(&out, "lpf", 20000.0), 20000.0);
    }

    #[test]
    fn removal_swallows_slider_wrapper() {
        let code = "$: s(\"bd\").gain(slider(0.8, 0, 2)).room(0.3)";
        let out = mutate(code, "gain", Edit::Remove);
        assert_eq!(out, "$: s(\"bd\").room(0.3)");
    }

    #[test]
    fn injection_lands_before_visualization() {
        let code = "$: s(\"bd sd\").scope()";
        let out = mutate(code, "room", Edit::Set(0.4));
        assert_eq!(out, "$: s(\"bd sd\").room(0.40).scope()");
    }

    #[test]
    fn injection_appends_without_visualization() {
        let code = "$: s(\"bd sd\")\n  .gain(0.9)";
        let out = mutate(code, "room", Edit::Set(0.4));
        assert_eq!(out, "$: s(\"bd sd\")\n  .gain(0.9).room(0.40)");
    }

    #[test]
    fn remove_of_absent_parameter_is_a_no_op() {
        let code = "$: s(\"bd\")";
        assert_eq!(mutate(code, "room", Edit::Remove), code);
    }

    #[test]
    fn scale_replaces_or_injects_after_pitch_source() {
        let with = "$: note(\"0 2 4\").scale(\"C4:major\")";
        assert_eq!(
            mutate_str(with, StrParam::Scale, "A3:minor"),
            "$: note(\"0 2 4\").scale(\"A3:minor\")"
        );
        let without = "$: note(\"0 2 4\").gain(0.8)";
        assert_eq!(
            mutate_str(without, StrParam::Scale, "A3:minor"),
            "$: note(\"0 2 4\").scale(\"A3:minor\").gain(0.8)"
        );
    }

    #[test]
    fn empty_vowel_removes_the_call() {
        let code = "$: note(\"c3\").vowel(\"a\").gain(0.8)";
        assert_eq!(
            mutate_str(code, StrParam::Vowel, ""),
            "$: note(\"c3\").gain(0.8)"
        );
    }

    #[test]
    fn note_pattern_keeps_the_call_name() {
        let code = "$: n(\"0 2 4\").scale(\"C4:major\")";
        assert_eq!(
            mutate_str(code, StrParam::NotePattern, "0 3 5"),
            "$: n(\"0 3 5\").scale(\"C4:major\")"
        );
    }
}
