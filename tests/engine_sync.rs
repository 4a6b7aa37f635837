//! Controller behavior end to end: provenance classification, the two-speed
//! commit scheduler, and session persistence.

use std::time::{Duration, Instant};

use noderack::engine::{
    load_session, save_session, CommitClass, PatternEngine, Provenance,
};

const DOC: &str = "\
setcps(120/60/4) // 120 bpm

// ── Drums ──
$: s(\"bd ~ sd ~\").lpf(8000)

// ── Keys ──
$: note(\"0 2 4\").scale(\"C4:major\").room(0.3)
";

#[test]
fn internal_emissions_do_not_resegment_external_edits_do() {
    let mut engine = PatternEngine::new(DOC);
    let drums = engine.blocks()[0].id;
    let now = Instant::now();

    engine.set_param(drums, "lpf", 2000.0, now);
    let emitted = engine.text().to_string();

    // Our own text coming back around: Internal, block list untouched.
    let before: Vec<_> = engine.blocks().to_vec();
    assert_eq!(engine.sync_document(&emitted), Provenance::Internal);
    assert_eq!(engine.blocks(), &before[..]);

    // A manual edit: External, read-model re-derived from the text.
    let edited = emitted.replace("bd ~ sd ~", "bd bd sd ~");
    assert_eq!(engine.sync_document(&edited), Provenance::External);
    assert_eq!(engine.blocks()[0].pattern, "bd bd sd ~");
    assert_eq!(engine.blocks()[0].id, drums);
}

#[test]
fn two_identical_texts_only_match_once() {
    let mut engine = PatternEngine::new(DOC);
    let drums = engine.blocks()[0].id;
    engine.set_param(drums, "room", 0.4, Instant::now());
    let emitted = engine.text().to_string();

    assert_eq!(engine.sync_document(&emitted), Provenance::Internal);
    // Replaying the same text without a fresh emission is an external echo.
    assert_eq!(engine.sync_document(&emitted), Provenance::External);
}

#[test]
fn knob_commits_coalesce_while_bypass_jumps_the_queue() {
    let mut engine = PatternEngine::new(DOC);
    let drums = engine.blocks()[0].id;
    let t0 = Instant::now();

    // A burst of knob releases keeps pushing the debounced deadline out.
    engine.set_param(drums, "lpf", 6000.0, t0);
    engine.set_param(drums, "lpf", 4000.0, t0 + Duration::from_millis(200));
    assert_eq!(engine.take_due_commit(t0 + Duration::from_millis(400)), None);

    // Bypass is urgent: due after its short fixed delay, and the pending
    // debounced commit is folded into the same flush.
    engine.toggle_bypass(drums, t0 + Duration::from_millis(300));
    let (class, text) = engine
        .take_due_commit(t0 + Duration::from_millis(380))
        .expect("urgent commit due");
    assert_eq!(class, CommitClass::Urgent);
    assert!(text.contains("// [muted] $: s(\"bd ~ sd ~\").lpf(4000)"));
    assert_eq!(engine.take_due_commit(t0 + Duration::from_secs(5)), None);
}

#[test]
fn debounced_commit_fires_once_after_the_burst() {
    let mut engine = PatternEngine::new(DOC);
    let keys = engine.blocks()[1].id;
    let t0 = Instant::now();

    for (i, v) in [0.1, 0.2, 0.3].iter().enumerate() {
        engine.set_param(keys, "room", *v, t0 + Duration::from_millis(i as u64 * 100));
    }
    assert_eq!(engine.take_due_commit(t0 + Duration::from_millis(500)), None);
    let (class, text) = engine
        .take_due_commit(t0 + Duration::from_millis(600))
        .expect("debounced commit due");
    assert_eq!(class, CommitClass::Debounced);
    assert!(text.contains(".room(0.30)"));
    assert_eq!(engine.take_due_commit(t0 + Duration::from_secs(5)), None);
}

#[test]
fn preview_then_commit_matches_the_two_speed_split() {
    let mut engine = PatternEngine::new(DOC);
    let drums = engine.blocks()[0].id;
    let t0 = Instant::now();
    let text_before = engine.text().to_string();

    // Drag in flight: sixty previews, no emissions.
    for i in 0..60 {
        engine.preview_param(drums, "lpf", 8000.0 - i as f64 * 100.0);
    }
    assert_eq!(engine.text(), text_before);
    assert!(engine.next_commit_deadline().is_none());

    // Release commits once.
    engine.set_param(drums, "lpf", 2000.0, t0);
    assert!(engine.text().contains(".lpf(2000)"));
    assert!(engine.next_commit_deadline().is_some());
}

#[test]
fn session_round_trip_restores_layout_and_flags() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.yaml");

    let mut engine = PatternEngine::new(DOC);
    let drums = engine.blocks()[0].id;
    let now = Instant::now();
    engine.toggle_bypass(drums, now);
    engine.set_layout(drums, noderack::document::NodeLayout { x: 99.0, y: 7.0 });

    save_session(&path, &engine.capture_session()).unwrap();

    let mut restored = PatternEngine::new(DOC);
    assert!(!restored.blocks()[0].bypassed);
    let session = load_session(&path).unwrap();
    restored.apply_session(&session);
    assert!(restored.blocks()[0].bypassed);
    assert_eq!(restored.blocks()[0].layout.x, 99.0);
    assert!(!restored.blocks()[1].bypassed);
}

#[test]
fn renderer_text_carries_monitoring_handles() {
    let mut engine = PatternEngine::new(DOC);
    let drums = engine.blocks()[0].id;
    engine.set_param(drums, "gain", 0.9, Instant::now());
    let text = engine.text();
    assert!(text.contains(".analyze(\"ch-0\")"));
    assert!(text.contains(".analyze(\"ch-1\")"));
}
