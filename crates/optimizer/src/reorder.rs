//! The can-reorder oracle.
//!
//! Every cross-rule pass moves declarations past other rules. A move is
//! safe when, for every pair of declarations it swaps, no element could end
//! up with a different value. [`can_reorder`] answers that conservatively
//! from property names, values, importance and selector structure.

use std::sync::LazyLock;

use css::{Declaration, Node, Rule, is_layer, parse_selector_list, serialize_value, specificity_of};
use regex::Regex;

use crate::selectors::{Overlap, subjects_overlap};
use crate::validator::{unprefixed, vendor_prefix};

static NAME_ROOT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-zA-Z]+").expect("name root pattern is valid"));

static FLEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"align-items|box-align|box-pack|flex|justify").expect("flex pattern is valid")
});

/// What one declaration touches, flattened out of its rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Touch {
    pub name: String,
    pub value: String,
    pub name_root: String,
    pub selectors: Vec<String>,
    pub important: bool,
}

impl Touch {
    pub fn new(declaration: &Declaration, selectors: &[String]) -> Self {
        let name = declaration.name.to_ascii_lowercase();
        Self {
            name_root: name_root(&name),
            name,
            value: serialize_value(&declaration.value),
            selectors: selectors.to_vec(),
            important: declaration.important,
        }
    }
}

/// The family a property belongs to, e.g. `border-top` for
/// `border-top-color` and `margin` for `margin-left`.
pub fn name_root(name: &str) -> String {
    if name == "list-style" {
        return name.to_string();
    }
    if name.contains("-radius") {
        return "border-radius".to_string();
    }
    if matches!(name, "border-collapse" | "border-spacing" | "border-image") {
        return name.to_string();
    }
    if let Some(rest) = name.strip_prefix("border-") {
        return match rest.split_once('-') {
            Some((side, _)) => format!("border-{side}"),
            None => "border".to_string(),
        };
    }
    if name.starts_with("text-") {
        return name.to_string();
    }
    NAME_ROOT
        .find(unprefixed(name))
        .map(|m| m.as_str().to_ascii_lowercase())
        .unwrap_or_else(|| name.to_string())
}

pub fn extract_rule(rule: &Rule) -> Vec<Touch> {
    rule.declarations
        .iter()
        .map(|d| Touch::new(d, &rule.selectors))
        .collect()
}

/// Everything a node could apply to elements. Keyframes, font faces and
/// statements apply nothing.
pub fn extract_node(node: &Node) -> Vec<Touch> {
    match node {
        Node::Rule(rule) => extract_rule(rule),
        Node::Block { prelude, children } if !is_keyframes(prelude) => {
            children.iter().flat_map(extract_node).collect()
        }
        _ => Vec::new(),
    }
}

pub fn extract_nodes(nodes: &[Node]) -> Vec<Touch> {
    nodes.iter().flat_map(extract_node).collect()
}

/// A node whose effect cannot be described by [`Touch`]es: rules carrying
/// nested blocks and unknown at-rules with a block. Nothing moves past it
/// and it never moves.
pub fn is_opaque(node: &Node) -> bool {
    match node {
        Node::Rule(rule) => !rule.nested.is_empty(),
        Node::Block { children, .. } => children.iter().any(is_opaque),
        Node::AtRule(text) => text.ends_with('}'),
        Node::AtRuleBlock { .. } | Node::Comment(_) => false,
    }
}

/// The node names a cascade layer. The first mention of a layer fixes its
/// order, so such a node must stay where it is.
pub fn declares_layer(node: &Node) -> bool {
    match node {
        Node::Block { prelude, children } => is_layer(prelude) || children.iter().any(declares_layer),
        Node::AtRule(text) => is_layer(text),
        Node::Rule(_) | Node::AtRuleBlock { .. } | Node::Comment(_) => false,
    }
}

/// May the node at `from` travel to `to`, in either direction, without any
/// element changing its styles?
pub fn can_move(nodes: &[Node], from: usize, to: usize, semantic: bool) -> bool {
    let between = if from < to {
        &nodes[from + 1..to]
    } else {
        &nodes[to + 1..from]
    };
    let moving = &nodes[from];
    if is_opaque(moving) || declares_layer(moving) || between.iter().any(is_opaque) {
        return false;
    }
    can_reorder(&extract_node(moving), &extract_nodes(between), semantic)
}

pub fn is_keyframes(prelude: &str) -> bool {
    prelude.to_ascii_lowercase().contains("keyframes")
}

/// May every declaration in `moving` swap places with every declaration in
/// `fixed`?
pub fn can_reorder(moving: &[Touch], fixed: &[Touch], semantic: bool) -> bool {
    moving
        .iter()
        .all(|m| fixed.iter().all(|f| can_reorder_single(m, f, semantic)))
}

fn is_side_border(name: &str) -> bool {
    matches!(name, "border-top" | "border-right" | "border-bottom" | "border-left")
}

fn is_style_border(name: &str) -> bool {
    matches!(name, "border-color" | "border-style" | "border-width")
}

/// `border-top-color` and `border-color` both set a color.
fn same_border_component(a: &str, b: &str) -> bool {
    let last = |name: &str| name.rsplit('-').next().map(str::to_string);
    last(a) == last(b)
}

/// The border declarations `a` and `b` set overlapping longhands in a way
/// that makes their order matter.
fn border_conflict(a: &Touch, b: &Touch) -> bool {
    a.name_root == "border"
        && b.name_root.starts_with("border")
        && b.name_root != "border-radius"
        && b.name_root != "border-collapse"
        && b.name_root != "border-spacing"
        && b.name_root != "border-image"
        && (a.name == "border"
            || a.name == b.name_root
            || (a.value != b.value && same_border_component(&a.name, &b.name)))
}

fn different_vendor_prefixes(a: &str, b: &str) -> bool {
    let (pa, pb) = (vendor_prefix(a), vendor_prefix(b));
    (pa.is_some() || pb.is_some()) && pa != pb
}

pub fn can_reorder_single(a: &Touch, b: &Touch, semantic: bool) -> bool {
    if (a.name == "font" && b.name == "line-height")
        || (b.name == "font" && a.name == "line-height")
    {
        return false;
    }
    if FLEX.is_match(&a.name) && FLEX.is_match(&b.name) {
        return false;
    }
    if unprefixed(&a.name) == unprefixed(&b.name)
        && vendor_prefix(&a.name).is_some() != vendor_prefix(&b.name).is_some()
    {
        return false;
    }
    if border_conflict(a, b) || border_conflict(b, a) {
        return false;
    }
    if a.name != b.name
        && ((is_side_border(&a.name) && is_style_border(&b.name))
            || (is_style_border(&a.name) && is_side_border(&b.name)))
    {
        return false;
    }
    if a.name_root != b.name_root {
        return true;
    }
    if a.name == b.name && (a.value == b.value || different_vendor_prefixes(&a.value, &b.value)) {
        return true;
    }
    if a.name != b.name && a.name != a.name_root && b.name != b.name_root {
        return true;
    }
    if a.name != b.name && a.value == b.value {
        return true;
    }
    if a.important != b.important {
        return true;
    }
    if different_specificities(&a.selectors, &b.selectors) {
        return true;
    }
    never_overlap(&a.selectors, &b.selectors, semantic)
}

fn different_specificities(a: &[String], b: &[String]) -> bool {
    a.iter().all(|left| {
        let left = specificity_of(left);
        b.iter().all(|right| specificity_of(right) != left)
    })
}

/// Can no element match a selector from `a` and one from `b` at once?
fn never_overlap(a: &[String], b: &[String], semantic: bool) -> bool {
    a.iter().all(|left| {
        let left = parse_selector_list(left);
        b.iter().all(|right| {
            let right = parse_selector_list(right);
            left.iter().all(|l| {
                right
                    .iter()
                    .all(|r| subjects_overlap(l, r, semantic) == Overlap::Never)
            }) && !left.is_empty()
                && !right.is_empty()
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(selector: &str, name: &str, value: &str) -> Touch {
        Touch::new(&Declaration::new(name, &[value]), &[selector.to_string()])
    }

    #[test]
    fn test_name_roots() {
        assert_eq!(name_root("margin-top"), "margin");
        assert_eq!(name_root("border-top-color"), "border-top");
        assert_eq!(name_root("border-color"), "border");
        assert_eq!(name_root("border-top-left-radius"), "border-radius");
        assert_eq!(name_root("-webkit-transition"), "transition");
        assert_eq!(name_root("text-align"), "text-align");
        assert_eq!(name_root("line-height"), "line");
    }

    #[test]
    fn test_unrelated_properties() {
        assert!(can_reorder_single(&touch("a", "color", "red"), &touch("a", "margin", "0"), false));
    }

    #[test]
    fn test_same_property_different_value() {
        assert!(!can_reorder_single(&touch(".a", "color", "red"), &touch(".b", "color", "blue"), false));
        assert!(can_reorder_single(&touch(".a", "color", "red"), &touch(".b", "color", "red"), false));
    }

    #[test]
    fn test_disjoint_subjects() {
        assert!(can_reorder_single(&touch("a", "color", "red"), &touch("div", "color", "blue"), false));
        assert!(can_reorder_single(&touch("#x", "color", "red"), &touch("#y", "color", "blue"), false));
        assert!(can_reorder_single(&touch("a::before", "color", "red"), &touch("a", "color", "blue"), false));
        assert!(!can_reorder_single(&touch("a.x", "color", "red"), &touch("a.y", "color", "blue"), false));
    }

    #[test]
    fn test_specificity_separates_hover() {
        assert!(can_reorder_single(&touch("a", "color", "red"), &touch("a:hover", "color", "blue"), false));
    }

    #[test]
    fn test_specificity_separates() {
        assert!(can_reorder_single(&touch(".a", "color", "red"), &touch("a", "color", "blue"), false));
        assert!(!can_reorder_single(&touch(".a", "color", "red"), &touch(".b", "color", "blue"), false));
    }

    #[test]
    fn test_importance_separates() {
        let mut a = touch(".a", "color", "red");
        a.important = true;
        assert!(can_reorder_single(&a, &touch(".b", "color", "blue"), false));
    }

    #[test]
    fn test_shorthand_and_longhand() {
        assert!(!can_reorder_single(&touch(".a", "margin", "0"), &touch(".b", "margin-top", "1px"), false));
        assert!(can_reorder_single(&touch(".a", "margin-left", "0"), &touch(".b", "margin-top", "1px"), false));
        assert!(!can_reorder_single(&touch(".a", "font", "12px a"), &touch(".b", "line-height", "2"), false));
    }

    #[test]
    fn test_border_families() {
        assert!(!can_reorder_single(
            &touch(".a", "border-color", "red"),
            &touch(".b", "border-top-color", "blue"),
            false
        ));
        assert!(!can_reorder_single(&touch(".a", "border", "0"), &touch(".b", "border-top-width", "1px"), false));
        assert!(!can_reorder_single(&touch(".a", "border-top", "0"), &touch(".b", "border-style", "solid"), false));
    }

    #[test]
    fn test_vendor_prefixed_pairs() {
        assert!(!can_reorder_single(
            &touch(".a", "-webkit-transition", "none"),
            &touch(".b", "transition", "all 1s"),
            false
        ));
        assert!(!can_reorder_single(&touch(".a", "flex-grow", "1"), &touch(".b", "flex", "1 0"), false));
    }

    #[test]
    fn test_semantic_mode() {
        let block = touch(".menu__item", "color", "red");
        let other = touch(".card__title", "color", "blue");
        let sibling = touch(".menu__link", "color", "blue");
        assert!(!can_reorder_single(&block, &other, false));
        assert!(can_reorder_single(&block, &other, true));
        assert!(!can_reorder_single(&block, &sibling, true));
    }

    #[test]
    fn test_opaque_and_layer_nodes() {
        let nodes = css::parse_stylesheet(
            "a{&:hover{top:0}}@media print{b{x:y;c{d:e}}}@unknown x{y}@layer base{}@media screen{@layer x{p{top:0}}}q{top:0}",
        )
        .nodes;
        let opaque: Vec<bool> = nodes.iter().map(is_opaque).collect();
        assert_eq!(opaque, vec![true, true, true, false, false, false]);
        let layers: Vec<bool> = nodes.iter().map(declares_layer).collect();
        assert_eq!(layers, vec![false, false, false, true, true, false]);
    }

    #[test]
    fn test_can_move_respects_opaque_nodes() {
        let nodes = css::parse_stylesheet(".a{color:red}.b{top:0}.x{&:hover{top:0}}.a{margin:0}").nodes;
        assert!(can_move(&nodes, 0, 2, false));
        assert!(!can_move(&nodes, 0, 3, false));
        assert!(!can_move(&nodes, 3, 0, false));
        assert!(!can_move(&nodes, 2, 0, false));
    }
}

