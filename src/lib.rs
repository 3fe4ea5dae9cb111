//! # stylemin
//!
//! Parse, optimize and re-serialize a stylesheet in one call.

pub use css::{Stylesheet, parse_stylesheet, serialize_stylesheet};
pub use optimizer::{CompatibilityProfile, Config, Level2Options, MergeNonAdjacent, ProfileError, optimize};

/// Minify `input` under `config`.
pub fn minify(input: &str, config: &Config) -> String {
    let mut stylesheet = parse_stylesheet(input);
    optimize(&mut stylesheet, config);
    serialize_stylesheet(&stylesheet)
}
