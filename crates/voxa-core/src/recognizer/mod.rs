//! Pattern matching and fuzzy scoring of normalized utterances.

pub mod pattern;

pub use pattern::{Extraction, Pattern, best_match};
