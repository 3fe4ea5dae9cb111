//! Level-1 value minification.
//!
//! Runs on single declarations before the property optimizer so that equal
//! values compare equal: `#FF0000` and `red` both become `red`, `0px` and
//! `0` both become `0`.

use std::sync::LazyLock;

use css::{Declaration, Hack, shortest_color};
use regex::Regex;

use crate::context::Context;

static NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([+-]?)(\d*)(?:\.(\d*))?([a-zA-Z%]*)$").expect("number pattern is valid")
});

const LENGTH_UNITS: &[&str] = &[
    "px", "em", "ex", "ch", "rem", "vh", "vw", "vmin", "vmax", "cm", "mm", "q", "in", "pt", "pc",
];

/// Properties where `0` and `0px` mean different things.
const KEEP_ZERO_UNITS: &[&str] = &["flex", "-ms-flex", "-webkit-flex", "flex-basis", "-webkit-flex-basis"];

/// Shorthands and longhands whose values may carry a color.
const COLOR_PROPERTIES: &[&str] = &[
    "background",
    "border",
    "border-top",
    "border-right",
    "border-bottom",
    "border-left",
    "box-shadow",
    "color",
    "column-rule",
    "fill",
    "outline",
    "stroke",
    "text-decoration",
    "text-shadow",
];

fn carries_color(name: &str) -> bool {
    name.ends_with("-color") || COLOR_PROPERTIES.contains(&name)
}

/// Minify every value token of `declaration` in place.
pub fn minify_declaration(declaration: &mut Declaration, ctx: &Context) {
    let v = &ctx.validator;
    if declaration.name.starts_with("--")
        || declaration.hack != Hack::None
        || declaration.name.eq_ignore_ascii_case("filter")
        || declaration.name.eq_ignore_ascii_case("src")
        || declaration.value.iter().any(|t| v.is_variable(t))
    {
        return;
    }
    let compat = ctx.compat();
    let name = declaration.name.to_ascii_lowercase();
    let colors = compat.properties.colors && carries_color(&name);
    let zero_units = compat.properties.zero_units && !KEEP_ZERO_UNITS.contains(&name.as_str());

    for token in &mut declaration.value {
        if let Some(number) = minify_number(token) {
            *token = number;
        }
        if zero_units && v.is_zero(token) && has_length_unit(token) {
            *token = "0".to_string();
        }
        if colors
            && v.is_color(token)
            && let Some(color) = shortest_color(token)
        {
            *token = color;
        }
    }
}

fn has_length_unit(token: &str) -> bool {
    NUMBER
        .captures(token)
        .and_then(|c| c.get(4))
        .is_some_and(|unit| LENGTH_UNITS.iter().any(|u| u.eq_ignore_ascii_case(unit.as_str())))
}

/// `0.50px` → `.5px`, `1.0` → `1`, `-0` → `0`. `None` when the token is not
/// a plain number or is already minimal.
pub fn minify_number(token: &str) -> Option<String> {
    let captures = NUMBER.captures(token)?;
    let sign = captures.get(1).map_or("", |m| m.as_str());
    let integer = captures.get(2).map_or("", |m| m.as_str());
    let fraction = captures.get(3).map_or("", |m| m.as_str());
    let unit = captures.get(4).map_or("", |m| m.as_str());
    if integer.is_empty() && fraction.is_empty() {
        return None;
    }

    let integer = integer.trim_start_matches('0');
    let fraction = fraction.trim_end_matches('0');
    let minified = match (integer.is_empty(), fraction.is_empty()) {
        (true, true) => format!("0{unit}"),
        (true, false) => format!("{sign}.{fraction}{unit}"),
        (false, true) => format!("{sign}{integer}{unit}"),
        (false, false) => format!("{sign}{integer}.{fraction}{unit}"),
    };
    (minified != token).then_some(minified)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compat::CompatibilityProfile;
    use crate::options::Config;

    fn minify_with(config: &Config, name: &str, value: &[&str]) -> Vec<String> {
        let ctx = Context::new(config);
        let mut declaration = Declaration::new(name, value);
        minify_declaration(&mut declaration, &ctx);
        declaration.value
    }

    fn minify(name: &str, value: &[&str]) -> Vec<String> {
        minify_with(&Config::default(), name, value)
    }

    #[test]
    fn test_numbers() {
        assert_eq!(minify_number("0.50px").as_deref(), Some(".5px"));
        assert_eq!(minify_number("1.0").as_deref(), Some("1"));
        assert_eq!(minify_number("-0.0").as_deref(), Some("0"));
        assert_eq!(minify_number("-0.25em").as_deref(), Some("-.25em"));
        assert_eq!(minify_number("010%").as_deref(), Some("10%"));
        assert_eq!(minify_number("10px"), None);
        assert_eq!(minify_number("1e3"), None);
        assert_eq!(minify_number("px"), None);
        assert_eq!(minify_number("#000"), None);
    }

    #[test]
    fn test_zero_units() {
        assert_eq!(minify("margin", &["0px", "0.0em", "0%"]), vec!["0", "0", "0%"]);
        assert_eq!(minify("transition-delay", &["0s"]), vec!["0s"]);
        assert_eq!(minify("flex-basis", &["0px"]), vec!["0px"]);
    }

    #[test]
    fn test_zero_units_disabled() {
        let mut profile = CompatibilityProfile::default();
        profile.properties.zero_units = false;
        let config = Config::new(profile, Default::default());
        assert_eq!(minify_with(&config, "margin", &["0px"]), vec!["0px"]);
    }

    #[test]
    fn test_colors() {
        assert_eq!(minify("color", &["#FF0000"]), vec!["red"]);
        assert_eq!(minify("color", &["blue"]), vec!["#00f"]);
        assert_eq!(minify("border", &["1px", "solid", "#ffffff"]), vec!["1px", "solid", "#fff"]);
        assert_eq!(minify("font-family", &["white"]), vec!["white"]);
        assert_eq!(minify("color", &["rgba(0,0,0,.5)"]), vec!["rgba(0,0,0,.5)"]);
    }

    #[test]
    fn test_untouched_values() {
        assert_eq!(minify("--gap", &["0px"]), vec!["0px"]);
        assert_eq!(minify("margin", &["var(--a)", "0px"]), vec!["var(--a)", "0px"]);
        let config = Config::default();
        let ctx = Context::new(&config);
        let mut hacked = Declaration::new("width", &["0px"]);
        hacked.hack = Hack::Star;
        minify_declaration(&mut hacked, &ctx);
        assert_eq!(hacked.value, vec!["0px"]);
    }
}
