//! Parameter layer — the definitions table, the Sniffer and the Mutator.
//!
//! The block text is the source of truth; this module never builds an AST.
//! The Sniffer reads one parameter out of hand-authored text with targeted
//! regexes, and the Mutator writes one parameter back with the smallest
//! possible textual diff, leaving signal expressions, `slider(...)` wrappers,
//! comments and formatting untouched.

pub mod defs;
pub mod mutate;
pub mod sniff;

pub use defs::{format_value, lookup, ParamDef, PARAM_DEFS};
pub use mutate::{inject_before_viz, mutate, mutate_str, Edit, StrParam};
pub use sniff::{
    current_value, detect_pattern, detect_scale, detect_sound, detect_sound_source, detect_vowel,
    extract_bpm, has_param, is_dynamic,
};
