//! Mini-notation expander — rhythm/pitch expressions → discrete timed events.
//!
//! Expands one pattern expression (groups, alternation, repeats, rests,
//! parallel layers) into a flat, slot-indexed preview. This feeds the visual
//! editor's step grids and mini piano rolls, not the audio renderer, so it is
//! deliberately best-effort: unrecognized syntax degrades instead of failing.

pub mod expand;
pub mod pitch;

pub use expand::{expand_events, expand_steps, split_layers, split_terms, TimedEvent};
pub use pitch::{expand_notes, is_degree_pattern, note_name_to_midi, scale_degree_to_midi, NoteEvent};
