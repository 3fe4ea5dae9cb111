//! Compatibility profiles: which rewrites are safe for the targeted engines.
//!
//! A profile is resolved once per run and threaded read-only through every
//! pass. Presets follow the usual `*` (modern) / `ie11` ... `ie7` ladder and
//! can be adjusted with `+group.flag` / `-group.flag` toggles.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::ProfileError;

/// Selectors matching this pattern never take part in merges: vendor
/// prefixed pseudo selectors, shadow-DOM piercing combinators and the like.
const DEFAULT_SPECIAL_SELECTORS: &str = r"(\-moz\-|\-ms\-|\-o\-|\-webkit\-|:dir\([a-z-]*\)|:first($|[^a-z-])|:fullscreen|:left|:read-only|:read-write|:right|:placeholder|:host|::content|/deep/|::shadow|^,)";

static DEFAULT_SPECIAL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(DEFAULT_SPECIAL_SELECTORS).expect("built-in special selector pattern is valid")
});

const MERGEABLE_PSEUDO_CLASSES: &[&str] = &[
    ":active",
    ":after",
    ":before",
    ":checked",
    ":disabled",
    ":empty",
    ":enabled",
    ":first-child",
    ":first-letter",
    ":first-line",
    ":first-of-type",
    ":focus",
    ":hover",
    ":lang",
    ":last-child",
    ":last-of-type",
    ":link",
    ":not",
    ":nth-child",
    ":nth-last-child",
    ":nth-last-of-type",
    ":nth-of-type",
    ":only-child",
    ":only-of-type",
    ":root",
    ":target",
    ":visited",
];

const MERGEABLE_PSEUDO_ELEMENTS: &[&str] = &["::after", "::before", "::first-letter", "::first-line"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorFlags {
    /// `rgba()`/`hsla()` are understood.
    pub opacity: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyFlags {
    /// `background-clip` may be merged into `background`.
    pub background_clip_merging: bool,
    /// `background-origin` may be merged into `background`.
    pub background_origin_merging: bool,
    /// `background-size` may be merged into `background`.
    pub background_size_merging: bool,
    /// Colors may be rewritten into their shortest form.
    pub colors: bool,
    /// Longhands may be merged into shorthands.
    pub merging: bool,
    /// `0px` may be written as `0`.
    pub zero_units: bool,
}

#[derive(Debug, Clone)]
pub struct SelectorFlags {
    /// Maximum number of selectors a merged rule may carry.
    pub merge_limit: usize,
    /// Selectors carrying more than one pseudo selector may be merged.
    pub multiple_pseudo_merging: bool,
    pub mergeable_pseudo_classes: Vec<String>,
    pub mergeable_pseudo_elements: Vec<String>,
    /// Selectors matching this pattern are never merged.
    pub special: Regex,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitFlags {
    pub ch: bool,
    pub in_: bool,
    pub pc: bool,
    pub pt: bool,
    pub rem: bool,
    pub vh: bool,
    pub vm: bool,
    pub vmax: bool,
    pub vmin: bool,
}

impl UnitFlags {
    /// Whether a dimension with this unit is understood by the target.
    pub fn allows(&self, unit: &str) -> bool {
        match unit.to_ascii_lowercase().as_str() {
            "ch" => self.ch,
            "in" => self.in_,
            "pc" => self.pc,
            "pt" => self.pt,
            "rem" => self.rem,
            "vh" | "vw" => self.vh,
            "vm" => self.vm,
            "vmax" => self.vmax,
            "vmin" => self.vmin,
            "" | "%" | "px" | "em" | "ex" | "cm" | "mm" | "q" | "deg" | "rad" | "grad" | "turn"
            | "s" | "ms" | "hz" | "khz" | "dpi" | "dpcm" | "dppx" | "fr" => true,
            _ => false,
        }
    }
}

/// The resolved compatibility configuration.
#[derive(Debug, Clone)]
pub struct CompatibilityProfile {
    pub colors: ColorFlags,
    pub properties: PropertyFlags,
    pub selectors: SelectorFlags,
    pub units: UnitFlags,
}

impl Default for CompatibilityProfile {
    /// Modern engines.
    fn default() -> Self {
        Self {
            colors: ColorFlags { opacity: true },
            properties: PropertyFlags {
                background_clip_merging: true,
                background_origin_merging: true,
                background_size_merging: true,
                colors: true,
                merging: true,
                zero_units: true,
            },
            selectors: SelectorFlags {
                merge_limit: 8191,
                multiple_pseudo_merging: true,
                mergeable_pseudo_classes: to_strings(MERGEABLE_PSEUDO_CLASSES),
                mergeable_pseudo_elements: to_strings(MERGEABLE_PSEUDO_ELEMENTS),
                special: DEFAULT_SPECIAL_PATTERN.clone(),
            },
            units: UnitFlags {
                ch: true,
                in_: true,
                pc: true,
                pt: true,
                rem: true,
                vh: true,
                vm: true,
                vmax: true,
                vmin: true,
            },
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl CompatibilityProfile {
    pub fn ie11() -> Self {
        let mut profile = Self::default();
        profile.units.vmax = false;
        profile
    }

    pub fn ie10() -> Self {
        Self::ie11()
    }

    pub fn ie9() -> Self {
        Self::ie10()
    }

    pub fn ie8() -> Self {
        let mut profile = Self::ie9();
        profile.colors.opacity = false;
        profile.properties.background_clip_merging = false;
        profile.properties.background_origin_merging = false;
        profile.properties.background_size_merging = false;
        profile.selectors.mergeable_pseudo_classes = to_strings(&[
            ":after",
            ":before",
            ":first-child",
            ":first-letter",
            ":focus",
            ":hover",
            ":visited",
        ]);
        profile.selectors.mergeable_pseudo_elements = Vec::new();
        profile.units = UnitFlags {
            ch: false,
            in_: true,
            pc: true,
            pt: true,
            rem: false,
            vh: false,
            vm: false,
            vmax: false,
            vmin: false,
        };
        profile
    }

    pub fn ie7() -> Self {
        let mut profile = Self::ie8();
        profile.selectors.multiple_pseudo_merging = false;
        profile.selectors.mergeable_pseudo_classes =
            to_strings(&[":first-child", ":first-letter", ":hover", ":visited"]);
        profile
    }

    /// Look up a preset by name; `*` and the empty string mean modern engines.
    pub fn preset(name: &str) -> Result<Self, ProfileError> {
        match name.to_ascii_lowercase().as_str() {
            "" | "*" => Ok(Self::default()),
            "ie11" => Ok(Self::ie11()),
            "ie10" => Ok(Self::ie10()),
            "ie9" => Ok(Self::ie9()),
            "ie8" => Ok(Self::ie8()),
            "ie7" => Ok(Self::ie7()),
            _ => Err(ProfileError::UnknownPreset(name.to_string())),
        }
    }

    /// Replace the "never merge" selector pattern.
    pub fn with_special_selectors(mut self, pattern: &str) -> Result<Self, ProfileError> {
        self.selectors.special = Regex::new(pattern)?;
        Ok(self)
    }

    fn apply_toggle(&mut self, toggle: &str) -> Result<(), ProfileError> {
        let (value, path) = if let Some(rest) = toggle.strip_prefix('+') {
            (true, rest)
        } else if let Some(rest) = toggle.strip_prefix('-') {
            (false, rest)
        } else {
            return Err(ProfileError::MalformedToggle(toggle.to_string()));
        };
        let (group, flag) = path
            .split_once('.')
            .ok_or_else(|| ProfileError::MalformedToggle(toggle.to_string()))?;
        let slot = self
            .flag_mut(group, flag)
            .ok_or_else(|| ProfileError::UnknownFlag(path.to_string()))?;
        *slot = value;
        Ok(())
    }

    fn flag_mut(&mut self, group: &str, flag: &str) -> Option<&mut bool> {
        // Accept both `backgroundClipMerging` and `background_clip_merging`.
        let key = flag.replace(['_', '-'], "").to_ascii_lowercase();
        match (group, key.as_str()) {
            ("colors", "opacity") => Some(&mut self.colors.opacity),
            ("properties", "backgroundclipmerging") => Some(&mut self.properties.background_clip_merging),
            ("properties", "backgroundoriginmerging") => Some(&mut self.properties.background_origin_merging),
            ("properties", "backgroundsizemerging") => Some(&mut self.properties.background_size_merging),
            ("properties", "colors") => Some(&mut self.properties.colors),
            ("properties", "merging") => Some(&mut self.properties.merging),
            ("properties", "zerounits") => Some(&mut self.properties.zero_units),
            ("selectors", "multiplepseudomerging") => Some(&mut self.selectors.multiple_pseudo_merging),
            ("units", "ch") => Some(&mut self.units.ch),
            ("units", "in") => Some(&mut self.units.in_),
            ("units", "pc") => Some(&mut self.units.pc),
            ("units", "pt") => Some(&mut self.units.pt),
            ("units", "rem") => Some(&mut self.units.rem),
            ("units", "vh") => Some(&mut self.units.vh),
            ("units", "vm") => Some(&mut self.units.vm),
            ("units", "vmax") => Some(&mut self.units.vmax),
            ("units", "vmin") => Some(&mut self.units.vmin),
            _ => None,
        }
    }
}

impl FromStr for CompatibilityProfile {
    type Err = ProfileError;

    /// Parse `"ie8"`, `"*,-properties.merging"` or `"+units.rem"` style
    /// strings: an optional preset followed by comma-separated toggles.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .peekable();
        let mut profile = match parts.next_if(|p| !p.starts_with(['+', '-'])) {
            Some(preset) => Self::preset(preset)?,
            None => Self::default(),
        };
        for toggle in parts {
            profile.apply_toggle(toggle)?;
        }
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let modern: CompatibilityProfile = "*".parse().unwrap();
        assert!(modern.colors.opacity);
        assert!(modern.units.vmax);

        let ie8: CompatibilityProfile = "IE8".parse().unwrap();
        assert!(!ie8.colors.opacity);
        assert!(!ie8.units.rem);
        assert!(ie8.selectors.mergeable_pseudo_elements.is_empty());

        let ie7 = CompatibilityProfile::preset("ie7").unwrap();
        assert!(!ie7.selectors.multiple_pseudo_merging);
    }

    #[test]
    fn test_toggles() {
        let profile: CompatibilityProfile = "ie8,+units.rem,-properties.merging".parse().unwrap();
        assert!(profile.units.rem);
        assert!(!profile.properties.merging);

        let profile: CompatibilityProfile = "-properties.zeroUnits".parse().unwrap();
        assert!(!profile.properties.zero_units);
        assert!(profile.colors.opacity);
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            "ie6".parse::<CompatibilityProfile>(),
            Err(ProfileError::UnknownPreset(p)) if p == "ie6"
        ));
        assert!(matches!(
            "*,+units.furlong".parse::<CompatibilityProfile>(),
            Err(ProfileError::UnknownFlag(f)) if f == "units.furlong"
        ));
        assert!(matches!(
            "*,units.rem".parse::<CompatibilityProfile>(),
            Err(ProfileError::MalformedToggle(_))
        ));
        assert!(matches!(
            "*,+rem".parse::<CompatibilityProfile>(),
            Err(ProfileError::MalformedToggle(_))
        ));
        assert!(matches!(
            CompatibilityProfile::default().with_special_selectors("("),
            Err(ProfileError::InvalidPattern(_))
        ));
    }

    #[test]
    fn test_units() {
        let units = CompatibilityProfile::ie8().units;
        assert!(units.allows("px"));
        assert!(units.allows("PT"));
        assert!(!units.allows("rem"));
        assert!(!units.allows("vw"));
        assert!(!units.allows("furlong"));
    }

    #[test]
    fn test_default_special_pattern() {
        let special = &CompatibilityProfile::default().selectors.special;
        assert!(special.is_match("input::-webkit-input-placeholder"));
        assert!(special.is_match(":first"));
        assert!(special.is_match("a:read-only"));
        assert!(!special.is_match("li:first-child"));
        assert!(!special.is_match(".a:hover"));
    }
}
