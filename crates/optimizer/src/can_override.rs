//! "May the later value replace the earlier one?"
//!
//! Each predicate ranks value syntaxes by how broadly they are understood.
//! A later value may replace an earlier one when every engine that
//! understood the earlier value also understands the later one; otherwise
//! the earlier value is a fallback and must stay.

use crate::context::Context;
use crate::property::Property;
use crate::registry::OverrideKind;
use crate::validator::{Validator, function_name, vendor_prefix};

const WIDTH_KEYWORDS: &[&str] = &["thin", "medium", "thick"];
const STYLE_KEYWORDS: &[&str] = &[
    "none", "hidden", "dotted", "dashed", "solid", "double", "groove", "ridge", "inset", "outset",
];
const TOKEN_KEYWORDS: &[&str] = &["auto", "left", "right", "top", "bottom", "center", "cover", "contain"];

/// Understood by everything the profile targets.
const UNIVERSAL: u8 = 3;
const TRANSLUCENT: u8 = 2;
const FUNCTION: u8 = 1;
const OPAQUE: u8 = 0;

/// May `right` replace `left` as the value of `name`?
pub fn can_override(ctx: &Context, name: &str, left: &[String], right: &[String]) -> bool {
    let kind = ctx
        .registry
        .get(name)
        .map(|d| d.can_override)
        .unwrap_or(OverrideKind::SameValue);
    can_override_with(ctx, kind, left, right)
}

pub fn can_override_with(ctx: &Context, kind: OverrideKind, left: &[String], right: &[String]) -> bool {
    if left == right {
        return true;
    }
    let v = &ctx.validator;
    let left_dynamic = left.iter().any(|t| v.is_variable(t));
    let right_dynamic = right.iter().any(|t| v.is_variable(t));
    if right_dynamic && !left_dynamic {
        return false;
    }
    if left_dynamic {
        return true;
    }
    if prefixes(left) != prefixes(right) {
        return false;
    }
    match kind {
        OverrideKind::SameValue => false,
        OverrideKind::Border => border(ctx, left, right),
        _ => tokens(v, kind, left, right),
    }
}

/// Vendor prefixes used by the value, sorted and deduplicated.
fn prefixes(value: &[String]) -> Vec<&str> {
    let mut found: Vec<&str> = value.iter().filter_map(|t| vendor_prefix(t)).collect();
    found.sort_unstable();
    found.dedup();
    found
}

fn tokens(v: &Validator, kind: OverrideKind, left: &[String], right: &[String]) -> bool {
    if left.len() == right.len() {
        return left.iter().zip(right).all(|(l, r)| token(v, kind, l, r));
    }
    right
        .iter()
        .all(|r| is_separator(r) || rank(v, kind, r) == UNIVERSAL)
}

fn is_separator(token: &str) -> bool {
    token == "," || token == "/"
}

fn token(v: &Validator, kind: OverrideKind, left: &str, right: &str) -> bool {
    if left == right {
        return true;
    }
    if is_separator(left) || is_separator(right) {
        return false;
    }
    let (l, r) = (rank(v, kind, left), rank(v, kind, right));
    if r == UNIVERSAL {
        return true;
    }
    match r {
        OPAQUE => false,
        FUNCTION => l <= FUNCTION && same_function(left, right),
        _ => l <= r,
    }
}

fn same_function(left: &str, right: &str) -> bool {
    matches!((function_name(left), function_name(right)), (Some(a), Some(b)) if a.eq_ignore_ascii_case(b))
}

fn rank(v: &Validator, kind: OverrideKind, token: &str) -> u8 {
    if v.is_global(token) {
        return UNIVERSAL;
    }
    let function_rank = || if v.is_function(token) { FUNCTION } else { OPAQUE };
    match kind {
        OverrideKind::SameValue | OverrideKind::Border => OPAQUE,
        OverrideKind::Unit => {
            if v.is_unit(token) {
                UNIVERSAL
            } else {
                function_rank()
            }
        }
        OverrideKind::UnitOrKeyword(keywords) => {
            if v.is_unit(token) || v.is_keyword(keywords, token) {
                UNIVERSAL
            } else {
                function_rank()
            }
        }
        OverrideKind::Tokens => {
            if v.is_unit(token) || v.is_keyword(TOKEN_KEYWORDS, token) {
                UNIVERSAL
            } else {
                function_rank()
            }
        }
        OverrideKind::Keyword(keywords) => {
            if v.is_keyword(keywords, token) {
                UNIVERSAL
            } else {
                OPAQUE
            }
        }
        OverrideKind::Color => color_rank(v, token),
        OverrideKind::Image => {
            if token.eq_ignore_ascii_case("none") || v.is_url(token) {
                UNIVERSAL
            } else {
                function_rank()
            }
        }
    }
}

fn color_rank(v: &Validator, token: &str) -> u8 {
    if v.is_hex_color(token) || v.is_named_color(token) {
        UNIVERSAL
    } else if v.is_color_function(token) {
        if v.is_translucent_function(token) && !v.compat.colors.opacity {
            FUNCTION
        } else {
            TRANSLUCENT
        }
    } else if v.is_function(token) {
        FUNCTION
    } else {
        OPAQUE
    }
}

/// Split both `border`-like values and compare slot by slot.
fn border(ctx: &Context, left: &[String], right: &[String]) -> bool {
    let split = |value: &[String]| {
        let declaration = css::Declaration {
            name: "border".to_string(),
            value: value.to_vec(),
            important: false,
            hack: css::Hack::None,
        };
        Property::wrap(&declaration, 0, ctx).components
    };
    let (left, right) = (split(left), split(right));
    if left.is_empty() || right.is_empty() {
        return false;
    }
    let kinds = [
        OverrideKind::UnitOrKeyword(WIDTH_KEYWORDS),
        OverrideKind::Keyword(STYLE_KEYWORDS),
        OverrideKind::Color,
    ];
    left.iter()
        .zip(&right)
        .zip(kinds)
        .all(|((l, r), kind)| can_override_with(ctx, kind, &l.value, &r.value))
}
