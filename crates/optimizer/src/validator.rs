//! Syntactic classification of value tokens.
//!
//! These are cheap shape checks, not a CSS validator: they answer "does this
//! token look like a color / length / style keyword" so shorthands can be
//! split and override decisions made without evaluating anything.

use std::sync::LazyLock;

use regex::Regex;

use crate::compat::CompatibilityProfile;

static NUMERIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?([a-zA-Z%]*)$")
        .expect("numeric token pattern is valid")
});

static VENDOR_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-(?:webkit|moz|ms|o)-").expect("vendor prefix pattern is valid")
});

const GLOBAL_KEYWORDS: &[&str] = &["inherit", "initial", "unset", "revert"];
const STYLE_KEYWORDS: &[&str] = &[
    "none", "hidden", "dotted", "dashed", "solid", "double", "groove", "ridge", "inset", "outset",
];
const WIDTH_KEYWORDS: &[&str] = &["thin", "medium", "thick"];
const ATTACHMENT_KEYWORDS: &[&str] = &["scroll", "fixed", "local"];
const BOX_KEYWORDS: &[&str] = &["border-box", "padding-box", "content-box"];
const REPEAT_KEYWORDS: &[&str] = &["repeat", "repeat-x", "repeat-y", "no-repeat", "space", "round"];
const POSITION_KEYWORDS: &[&str] = &["left", "right", "top", "bottom", "center"];
const SIZE_KEYWORDS: &[&str] = &["auto", "cover", "contain"];
const LIST_STYLE_POSITIONS: &[&str] = &["inside", "outside"];
const LIST_STYLE_TYPES: &[&str] = &[
    "armenian",
    "circle",
    "cjk-ideographic",
    "decimal",
    "decimal-leading-zero",
    "disc",
    "georgian",
    "hebrew",
    "hiragana",
    "hiragana-iroha",
    "katakana",
    "katakana-iroha",
    "lower-alpha",
    "lower-greek",
    "lower-latin",
    "lower-roman",
    "none",
    "square",
    "upper-alpha",
    "upper-latin",
    "upper-roman",
];
const IMAGE_FUNCTIONS: &[&str] = &[
    "linear-gradient",
    "radial-gradient",
    "repeating-linear-gradient",
    "repeating-radial-gradient",
    "conic-gradient",
    "image-set",
    "cross-fade",
    "element",
    "image",
];
const CALC_FUNCTIONS: &[&str] = &["calc", "min", "max", "clamp"];

fn in_list(list: &[&str], token: &str) -> bool {
    list.iter().any(|k| k.eq_ignore_ascii_case(token))
}

/// Shape checks bound to a compatibility profile.
#[derive(Clone, Copy)]
pub struct Validator<'a> {
    pub compat: &'a CompatibilityProfile,
}

impl<'a> Validator<'a> {
    pub fn new(compat: &'a CompatibilityProfile) -> Self {
        Self { compat }
    }

    pub fn is_global(&self, token: &str) -> bool {
        in_list(GLOBAL_KEYWORDS, token)
    }

    pub fn is_inherit(&self, token: &str) -> bool {
        token.eq_ignore_ascii_case("inherit")
    }

    pub fn is_variable(&self, token: &str) -> bool {
        token.to_ascii_lowercase().contains("var(")
    }

    /// `name(...)` tokens, including `url(...)`.
    pub fn is_function(&self, token: &str) -> bool {
        function_name(token).is_some()
    }

    pub fn is_url(&self, token: &str) -> bool {
        function_name(token).is_some_and(|n| n.eq_ignore_ascii_case("url"))
    }

    /// A number, optionally with a unit the target understands.
    pub fn is_unit(&self, token: &str) -> bool {
        NUMERIC
            .captures(token)
            .and_then(|c| c.get(1))
            .is_some_and(|unit| self.compat.units.allows(unit.as_str()))
    }

    pub fn is_zero(&self, token: &str) -> bool {
        NUMERIC.is_match(token)
            && token
                .trim_start_matches(['+', '-'])
                .chars()
                .take_while(|c| c.is_ascii_digit() || *c == '.')
                .all(|c| c == '0' || c == '.')
    }

    /// `calc()` and its relatives.
    pub fn is_calculation(&self, token: &str) -> bool {
        function_name(token)
            .map(unprefixed)
            .is_some_and(|n| in_list(CALC_FUNCTIONS, n))
    }

    pub fn is_hex_color(&self, token: &str) -> bool {
        token.strip_prefix('#').is_some_and(|hex| {
            matches!(hex.len(), 3 | 4 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit())
        })
    }

    pub fn is_named_color(&self, token: &str) -> bool {
        css::color::is_named_color(token)
            || token.eq_ignore_ascii_case("transparent")
            || token.eq_ignore_ascii_case("currentcolor")
    }

    /// `rgb()`, `rgba()`, `hsl()` or `hsla()`.
    pub fn is_color_function(&self, token: &str) -> bool {
        function_name(token).is_some_and(|n| {
            ["rgb", "rgba", "hsl", "hsla"]
                .iter()
                .any(|f| f.eq_ignore_ascii_case(n))
        })
    }

    /// A color function with an alpha channel.
    pub fn is_translucent_function(&self, token: &str) -> bool {
        function_name(token).is_some_and(|n| n.eq_ignore_ascii_case("rgba") || n.eq_ignore_ascii_case("hsla"))
    }

    pub fn is_color(&self, token: &str) -> bool {
        self.is_hex_color(token) || self.is_named_color(token) || self.is_color_function(token)
    }

    pub fn is_style_keyword(&self, token: &str) -> bool {
        in_list(STYLE_KEYWORDS, token)
    }

    pub fn is_width(&self, token: &str) -> bool {
        in_list(WIDTH_KEYWORDS, token) || self.is_unit(token) || self.is_calculation(token)
    }

    pub fn is_background_attachment(&self, token: &str) -> bool {
        in_list(ATTACHMENT_KEYWORDS, token)
    }

    /// `border-box`, `padding-box` or `content-box`; `text` is accepted as a
    /// clip box only.
    pub fn is_background_box(&self, token: &str) -> bool {
        in_list(BOX_KEYWORDS, token)
    }

    pub fn is_background_repeat(&self, token: &str) -> bool {
        in_list(REPEAT_KEYWORDS, token)
    }

    pub fn is_background_position(&self, token: &str) -> bool {
        in_list(POSITION_KEYWORDS, token) || self.is_unit(token) || self.is_calculation(token)
    }

    pub fn is_background_size(&self, token: &str) -> bool {
        in_list(SIZE_KEYWORDS, token) || self.is_unit(token) || self.is_calculation(token)
    }

    pub fn is_image(&self, token: &str) -> bool {
        token.eq_ignore_ascii_case("none")
            || self.is_url(token)
            || function_name(token)
                .map(unprefixed)
                .is_some_and(|n| in_list(IMAGE_FUNCTIONS, n))
    }

    pub fn is_list_style_type(&self, token: &str) -> bool {
        in_list(LIST_STYLE_TYPES, token)
    }

    pub fn is_list_style_position(&self, token: &str) -> bool {
        in_list(LIST_STYLE_POSITIONS, token)
    }

    /// Is `token` one of the given keywords (or a global keyword)?
    pub fn is_keyword(&self, keywords: &[&str], token: &str) -> bool {
        in_list(keywords, token) || self.is_global(token)
    }
}

/// The name of a function token, e.g. `rgba` for `rgba(0,0,0,.5)`.
pub fn function_name(token: &str) -> Option<&str> {
    let open = token.find('(')?;
    if open == 0 || !token.ends_with(')') {
        return None;
    }
    let name = &token[..open];
    name.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        .then_some(name)
}

/// The vendor prefix of a keyword or function name, e.g. `-webkit-`.
pub fn vendor_prefix(token: &str) -> Option<&str> {
    VENDOR_PREFIX.find(token).map(|m| m.as_str())
}

/// `name` with any vendor prefix removed.
pub fn unprefixed(name: &str) -> &str {
    match vendor_prefix(name) {
        Some(prefix) => &name[prefix.len()..],
        None => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with<F: FnOnce(Validator)>(compat: CompatibilityProfile, f: F) {
        f(Validator::new(&compat));
    }

    #[test]
    fn test_units() {
        with(CompatibilityProfile::default(), |v| {
            assert!(v.is_unit("0"));
            assert!(v.is_unit("-1.5px"));
            assert!(v.is_unit(".5em"));
            assert!(v.is_unit("50%"));
            assert!(v.is_unit("1e3"));
            assert!(v.is_unit("2rem"));
            assert!(!v.is_unit("px"));
            assert!(!v.is_unit("1furlong"));
            assert!(!v.is_unit("calc(1px)"));
        });
        with(CompatibilityProfile::ie8(), |v| assert!(!v.is_unit("2rem")));
    }

    #[test]
    fn test_zero() {
        with(CompatibilityProfile::default(), |v| {
            assert!(v.is_zero("0"));
            assert!(v.is_zero("0.0px"));
            assert!(v.is_zero("-0%"));
            assert!(!v.is_zero("0.01px"));
            assert!(!v.is_zero("10px"));
        });
    }

    #[test]
    fn test_colors() {
        with(CompatibilityProfile::default(), |v| {
            assert!(v.is_color("#abc"));
            assert!(v.is_color("#AABBCC"));
            assert!(v.is_color("Red"));
            assert!(v.is_color("transparent"));
            assert!(v.is_color("currentColor"));
            assert!(v.is_color("rgba(0,0,0,.5)"));
            assert!(v.is_translucent_function("hsla(0,0%,0%,.1)"));
            assert!(!v.is_color("#abcde"));
            assert!(!v.is_color("none"));
            assert!(!v.is_color("url(x)"));
        });
    }

    #[test]
    fn test_images_and_functions() {
        with(CompatibilityProfile::default(), |v| {
            assert!(v.is_image("none"));
            assert!(v.is_image("url(a.png)"));
            assert!(v.is_image("-webkit-linear-gradient(top,red,blue)"));
            assert!(!v.is_image("red"));
            assert!(v.is_calculation("-webkit-calc(1px + 2px)"));
            assert!(!v.is_function("(a)"));
        });
    }

    #[test]
    fn test_vendor_prefix() {
        assert_eq!(vendor_prefix("-webkit-box"), Some("-webkit-"));
        assert_eq!(vendor_prefix("-moz-linear-gradient(x)"), Some("-moz-"));
        assert_eq!(vendor_prefix("flex"), None);
        assert_eq!(unprefixed("-ms-flexbox"), "flexbox");
    }

    #[test]
    fn test_function_name() {
        assert_eq!(function_name("rgba(0,0,0,.5)"), Some("rgba"));
        assert_eq!(function_name("url(a b)"), Some("url"));
        assert_eq!(function_name("red"), None);
    }
}
