//! Noderack — bidirectional sync between live-coding pattern text and a
//! structured node rack.
//!
//! The pattern text is the single source of truth. The engine segments it
//! into blocks, reads a parameter model out of each block with targeted
//! partial parses, applies knob edits as minimal textual rewrites, and
//! reassembles the document byte-stably everywhere an edit didn't touch.

pub mod document;
pub mod engine;
pub mod notation;
pub mod param;
