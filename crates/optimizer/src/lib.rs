//! # Optimizer
//!
//! Level-1 value minification and the level-2 structural passes:
//! declaration overriding, shorthand merging, rule merging, restructuring
//! and `@media` merging. Operates on the tree produced by the `css` crate.

pub mod error;
pub mod compat;
pub mod options;
pub mod validator;
pub mod registry;
pub mod context;
pub mod property;
pub mod break_up;
pub mod restore;
pub mod can_override;
pub mod override_properties;
pub mod merge_into_shorthands;
pub mod values;
pub mod optimize_properties;
pub mod reorder;
pub mod selectors;
pub mod merge_rules;
pub mod restructure;
pub mod media;
pub mod optimize;

pub use error::{ProfileError, RegistryError};
pub use compat::CompatibilityProfile;
pub use options::{Config, Level2Options, MergeNonAdjacent};
pub use registry::{Descriptor, DescriptorId, Registry};
pub use context::Context;
pub use property::Property;
pub use can_override::can_override;
pub use optimize_properties::optimize_properties;
pub use reorder::{Touch, can_reorder};
pub use optimize::{optimize, optimize_level, remove_empty};
