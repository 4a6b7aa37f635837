//! Document layer — block model, segmentation and serialization.
//!
//! A document is one flat text: optional preamble, an optional tempo
//! directive, then `$:` blocks. Segmentation turns the text into an ordered
//! block list with identities carried forward by position; serialization
//! rebuilds the text, layering bypass prefixes, the tempo directive and
//! per-block routing/analysis tags on top of each block's clean raw text.

pub mod block;
pub mod segment;
pub mod serialize;

pub use block::{detect_kind, Block, BlockId, BlockKind, NodeLayout, ParamReading};
pub use segment::{segment, Segmentation, BYPASS_PREFIX};
pub use serialize::serialize;
