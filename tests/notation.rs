//! Mini-notation expansion: partition exactness and graceful degradation.

use noderack::notation::{expand_events, expand_steps, split_layers};

#[test]
fn quarter_with_nested_group_lands_where_expected() {
    // "bd ~ [sd sd] ~" over 16: a hit at slot 0, rest at 4, the third
    // quarter subdivided at 8 and 10, rest at 12.
    let steps = expand_steps("bd ~ [sd sd] ~", 16);
    let hits: Vec<usize> = steps
        .iter()
        .enumerate()
        .filter(|(_, &on)| on)
        .map(|(i, _)| i)
        .collect();
    assert_eq!(hits, vec![0, 8, 10]);
}

#[test]
fn partition_has_no_gaps_or_overlaps_for_any_child_count() {
    for total in [4usize, 7, 12, 16, 32] {
        for n in 1..=(total + 5) {
            let mut covered = 0usize;
            for i in 0..n {
                let start = ((i as f64 * total as f64) / n as f64).round() as usize;
                let end = (((i + 1) as f64 * total as f64) / n as f64).round() as usize;
                let end = end.min(total);
                assert!(start <= end, "inverted span for {n} over {total}");
                covered += end - start;
            }
            assert_eq!(covered, total, "{n} children over {total} slots");
        }
    }
}

#[test]
fn repeat_spreads_hits_evenly() {
    let steps = expand_steps("hh*4", 16);
    let hits: Vec<usize> = steps
        .iter()
        .enumerate()
        .filter(|(_, &on)| on)
        .map(|(i, _)| i)
        .collect();
    assert_eq!(hits, vec![0, 4, 8, 12]);
}

#[test]
fn parallel_layers_merge() {
    let steps = expand_steps("bd ~ ~ ~, ~ ~ sd ~", 8);
    assert!(steps[0]);
    assert!(steps[4]);
    assert_eq!(split_layers("bd ~, [sd, cp] ~").len(), 2);
}

#[test]
fn alternation_takes_its_first_child_for_preview() {
    let steps = expand_steps("<bd sd> ~ ~ ~", 4);
    assert!(steps[0]);
    assert!(!steps[1]);
}

#[test]
fn events_carry_labels_and_full_span_durations() {
    let events = expand_events("c3 e3", 8);
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].label, "c3");
    assert_eq!(events[0].start_step, 0);
    assert_eq!(events[0].duration, 4);
    assert_eq!(events[1].start_step, 4);
}

#[test]
fn malformed_input_degrades_and_never_panics() {
    // Unbalanced, nonsense repeats, empty — all must come back well-formed.
    for expr in ["bd*x", "[[bd", "bd]]", "*3", "", "   ", "<", "bd*0"] {
        let steps = expand_steps(expr, 16);
        assert_eq!(steps.len(), 16, "wrong grid size for {expr:?}");
        let events = expand_events(expr, 16);
        for e in events {
            assert!(e.start_step < 16);
            assert!(e.start_step + e.duration <= 16);
        }
    }
}

#[test]
fn more_children_than_slots_still_partitions() {
    let steps = expand_steps("a b c d e f", 4);
    assert_eq!(steps.len(), 4);
    let events = expand_events("a b c d e f", 4);
    for e in &events {
        assert!(e.start_step + e.duration <= 4);
    }
}
