//! Optimization switches.

use crate::compat::CompatibilityProfile;

/// Which non-adjacent rule merges run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeNonAdjacent {
    Off,
    /// Rules repeating a selector list merge their bodies.
    Selector,
    /// Rules repeating a body merge their selector lists.
    Body,
    #[default]
    All,
}

impl MergeNonAdjacent {
    pub fn by_selector(self) -> bool {
        matches!(self, Self::Selector | Self::All)
    }

    pub fn by_body(self) -> bool {
        matches!(self, Self::Body | Self::All)
    }
}

/// Toggles for the structural optimization passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Level2Options {
    pub merge_adjacent_rules: bool,
    pub merge_into_shorthands: bool,
    pub merge_media: bool,
    pub merge_non_adjacent_rules: MergeNonAdjacent,
    /// Treat BEM-style class selectors of unrelated blocks as never
    /// overlapping. Heuristic; off by default.
    pub merge_semantically: bool,
    pub override_properties: bool,
    pub remove_duplicate_font_rules: bool,
    pub remove_duplicate_media_blocks: bool,
    pub remove_duplicate_rules: bool,
    pub remove_empty: bool,
    /// Hoist property subsets shared by several rules into new rules.
    pub restructure_rules: bool,
    /// Properties the property optimizer must leave alone.
    pub skip_properties: Vec<String>,
}

impl Default for Level2Options {
    fn default() -> Self {
        Self {
            merge_adjacent_rules: true,
            merge_into_shorthands: true,
            merge_media: true,
            merge_non_adjacent_rules: MergeNonAdjacent::All,
            merge_semantically: false,
            override_properties: true,
            remove_duplicate_font_rules: true,
            remove_duplicate_media_blocks: true,
            remove_duplicate_rules: true,
            remove_empty: true,
            restructure_rules: false,
            skip_properties: Vec::new(),
        }
    }
}

impl Level2Options {
    /// Every pass switched on, including the opt-in ones.
    pub fn all() -> Self {
        Self {
            merge_semantically: true,
            restructure_rules: true,
            ..Self::default()
        }
    }

    /// Every structural pass switched off; values are still minified.
    pub fn none() -> Self {
        Self {
            merge_adjacent_rules: false,
            merge_into_shorthands: false,
            merge_media: false,
            merge_non_adjacent_rules: MergeNonAdjacent::Off,
            merge_semantically: false,
            override_properties: false,
            remove_duplicate_font_rules: false,
            remove_duplicate_media_blocks: false,
            remove_duplicate_rules: false,
            remove_empty: false,
            restructure_rules: false,
            skip_properties: Vec::new(),
        }
    }

    pub fn skips(&self, property: &str) -> bool {
        self.skip_properties.iter().any(|p| p == property)
    }
}

/// Everything a run needs besides the tree itself.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub compatibility: CompatibilityProfile,
    pub level2: Level2Options,
}

impl Config {
    pub fn new(compatibility: CompatibilityProfile, level2: Level2Options) -> Self {
        Self {
            compatibility,
            level2,
        }
    }
}
