//! Text utilities shared by the recognizer and the skills.

pub mod distance;
pub mod duration;
pub mod normalize;
pub mod numbers;

pub use distance::{custom_string_distance, levenshtein, name_distance, similarity};
pub use normalize::{normalize, strip_diacritics};
