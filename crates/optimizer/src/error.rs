//! Error types.
//!
//! Optimizing a document never fails: anything the optimizer does not
//! understand is left as it is. Errors only come from building the static
//! descriptor table and from parsing user-facing compatibility strings.

use thiserror::Error;

/// A defect in the static descriptor table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("shorthand `{shorthand}` lists component `{component}` which has no descriptor")]
    UnknownComponent {
        shorthand: &'static str,
        component: &'static str,
    },
    #[error("property `{0}` is described more than once")]
    DuplicateDescriptor(&'static str),
}

/// A compatibility string such as `"ie8,+units.rem"` could not be resolved.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("unknown compatibility preset `{0}`")]
    UnknownPreset(String),
    #[error("unknown compatibility flag `{0}`")]
    UnknownFlag(String),
    #[error("malformed compatibility toggle `{0}`, expected `+group.flag` or `-group.flag`")]
    MalformedToggle(String),
    #[error("invalid special selector pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}
