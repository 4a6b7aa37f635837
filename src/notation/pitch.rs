//! Pitch resolution for melodic previews — note names and scale degrees → MIDI.

use super::expand::expand_events;

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Interval sets for the scale modes the editor's presets use.
fn scale_intervals(mode: &str) -> &'static [i32] {
    match mode {
        "minor" => &[0, 2, 3, 5, 7, 8, 10],
        "harmonic minor" => &[0, 2, 3, 5, 7, 8, 11],
        "major pentatonic" => &[0, 2, 4, 7, 9],
        "minor pentatonic" => &[0, 3, 5, 7, 10],
        "blues" => &[0, 3, 5, 6, 7, 10],
        "dorian" => &[0, 2, 3, 5, 7, 9, 10],
        "phrygian" => &[0, 1, 3, 5, 7, 8, 10],
        "lydian" => &[0, 2, 4, 6, 7, 9, 11],
        "mixolydian" => &[0, 2, 4, 5, 7, 9, 10],
        "chromatic" => &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
        "whole tone" => &[0, 2, 4, 6, 8, 10],
        "diminished" => &[0, 2, 3, 5, 6, 8, 9, 11],
        _ => &[0, 2, 4, 5, 7, 9, 11], // major
    }
}

/// Parse a `"C4:major"` style scale string into root index, octave and mode.
fn parse_scale(scale: &str) -> (usize, i32, &str) {
    let fallback = (0, 4, "major");
    let Some(colon) = scale.find(':') else {
        return fallback;
    };
    let (head, mode) = (&scale[..colon], &scale[colon + 1..]);
    let digits_at = head.find(|c: char| c.is_ascii_digit());
    let Some(at) = digits_at else { return fallback };
    let (name, oct) = (&head[..at], &head[at..]);
    let Some(root) = NOTE_NAMES.iter().position(|n| n.eq_ignore_ascii_case(name)) else {
        return fallback;
    };
    let octave: i32 = oct.parse().unwrap_or(4);
    (root, octave, mode)
}

/// True when a pattern addresses scale degrees (`"0 2 4 7"`) rather than
/// note names (`"c3 e3 g3"`).
pub fn is_degree_pattern(pattern: &str) -> bool {
    let clean: String = pattern
        .chars()
        .filter(|c| !"<>[],~*.- \t".contains(*c))
        .collect();
    if clean.is_empty() {
        return false;
    }
    !clean.chars().any(|c| c.is_ascii_alphabetic()) && clean.chars().any(|c| c.is_ascii_digit())
}

/// Resolve a scale degree (may be negative or beyond one octave) to MIDI.
pub fn scale_degree_to_midi(degree: i32, scale: &str) -> i32 {
    let (root, octave, mode) = parse_scale(scale);
    let intervals = scale_intervals(mode);
    let len = intervals.len() as i32;
    let base = (octave + 1) * 12 + root as i32;
    let oct_shift = degree.div_euclid(len);
    let deg = degree.rem_euclid(len) as usize;
    base + oct_shift * 12 + intervals[deg]
}

/// Resolve a note-name token like `c3`, `fs2`, `bb1` to MIDI, or `None`.
pub fn note_name_to_midi(name: &str) -> Option<i32> {
    let mut chars = name.chars();
    let letter = chars.next()?.to_ascii_lowercase();
    let base = match letter {
        'c' => 0,
        'd' => 2,
        'e' => 4,
        'f' => 5,
        'g' => 7,
        'a' => 9,
        'b' => 11,
        _ => return None,
    };
    let rest: String = chars.collect();
    let (accidental, octave_str) = match rest.chars().next() {
        Some('s') | Some('#') => (1, &rest[1..]),
        Some('b') if rest.len() > 1 => (-1, &rest[1..]),
        _ => (0, rest.as_str()),
    };
    let octave: i32 = octave_str.parse().ok()?;
    let midi = (octave + 1) * 12 + base + accidental;
    (0..=127).contains(&midi).then_some(midi)
}

/// One resolved note for the piano-roll preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteEvent {
    pub midi: i32,
    pub start_step: usize,
    pub duration: usize,
}

/// Expand a melodic expression into MIDI note events. Degree patterns
/// resolve through `scale`; note-name patterns ignore it. Tokens that
/// resolve to nothing are dropped, keeping the preview best-effort.
pub fn expand_notes(expr: &str, scale: &str, total_slots: usize) -> Vec<NoteEvent> {
    let degrees = is_degree_pattern(expr);
    expand_events(expr, total_slots)
        .into_iter()
        .filter_map(|ev| {
            let midi = if degrees {
                ev.label
                    .parse::<i32>()
                    .ok()
                    .map(|d| scale_degree_to_midi(d, scale))
            } else {
                note_name_to_midi(&ev.label)
            }?;
            Some(NoteEvent {
                midi,
                start_step: ev.start_step,
                duration: ev.duration,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_names_resolve() {
        assert_eq!(note_name_to_midi("c4"), Some(60));
        assert_eq!(note_name_to_midi("a3"), Some(57));
        assert_eq!(note_name_to_midi("cs4"), Some(61));
        assert_eq!(note_name_to_midi("c#4"), Some(61));
        assert_eq!(note_name_to_midi("bb1"), Some(34));
        assert_eq!(note_name_to_midi("~"), None);
        assert_eq!(note_name_to_midi("x9"), None);
    }

    #[test]
    fn degrees_follow_the_scale() {
        assert_eq!(scale_degree_to_midi(0, "C4:major"), 60);
        assert_eq!(scale_degree_to_midi(2, "C4:major"), 64);
        assert_eq!(scale_degree_to_midi(7, "C4:major"), 72); // next octave
        assert_eq!(scale_degree_to_midi(-1, "C4:major"), 59);
        assert_eq!(scale_degree_to_midi(1, "A3:minor"), 59);
    }

    #[test]
    fn degree_detection() {
        assert!(is_degree_pattern("0 2 4 7"));
        assert!(is_degree_pattern("<0 2> [4 7]"));
        assert!(!is_degree_pattern("c3 e3 g3"));
        assert!(!is_degree_pattern("~ ~"));
    }

    #[test]
    fn melodic_preview_resolves_degrees_through_the_scale() {
        let notes = expand_notes("0 2 4", "C4:major", 8);
        assert_eq!(
            notes.iter().map(|n| n.midi).collect::<Vec<_>>(),
            vec![60, 64, 67]
        );
        assert_eq!(notes[0].start_step, 0);
        assert_eq!(notes[1].start_step, 3);
        assert_eq!(notes[2].duration, 3);

        let minor = expand_notes("0 2 4", "A3:minor", 8);
        assert_eq!(minor[0].midi, 57);
    }

    #[test]
    fn melodic_preview_resolves_note_names_and_drops_rests() {
        let notes = expand_notes("c3 ~ e3 g3", "C4:major", 8);
        assert_eq!(
            notes.iter().map(|n| n.midi).collect::<Vec<_>>(),
            vec![48, 52, 55]
        );
        assert_eq!(notes[1].start_step, 4);
    }

    #[test]
    fn unknown_scale_falls_back_to_major() {
        assert_eq!(scale_degree_to_midi(0, "garbage"), 60);
        assert_eq!(scale_degree_to_midi(4, "C4:nosuchmode"), 67);
    }
}
