//! Selector-list helpers for the rule merging passes.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use css::{ComplexSelector, CompoundSelector};
use regex::Regex;

use crate::context::Context;

static PSEUDO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"::?[a-zA-Z-]+(?:\([^)]*\))?").expect("pseudo selector pattern is valid")
});

/// Pseudo-elements CSS 2 allows with a single colon.
const LEGACY_PSEUDO_ELEMENTS: &[&str] = &[":after", ":before", ":first-letter", ":first-line"];

/// Can two selectors both match one element?
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlap {
    Never,
    Maybe,
}

/// A sorted, duplicate-free copy of `selectors`. Two rules with equal keys
/// target the same elements.
pub fn selector_key(selectors: &[String]) -> Vec<String> {
    selectors
        .iter()
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// The union of two selector lists, sorted and without duplicates.
pub fn merge_selectors(a: &[String], b: &[String]) -> Vec<String> {
    a.iter()
        .chain(b)
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// May `selectors` be combined with other selectors into one rule?
/// Unknown or engine-specific selectors invalidate a whole list in older
/// engines, so they stay in a rule of their own.
pub fn is_mergeable(selectors: &[String], ctx: &Context) -> bool {
    let flags = &ctx.compat().selectors;
    if selectors.is_empty() || selectors.len() > flags.merge_limit {
        return false;
    }
    selectors.iter().all(|selector| {
        !selector.is_empty()
            && !flags.special.is_match(selector)
            && !selector.contains("/deep/")
            && pseudos_mergeable(selector, ctx)
    })
}

fn pseudos_mergeable(selector: &str, ctx: &Context) -> bool {
    let flags = &ctx.compat().selectors;
    let pseudos: Vec<_> = PSEUDO.find_iter(selector).collect();
    if pseudos.len() > 1 && !flags.multiple_pseudo_merging {
        return false;
    }
    pseudos.iter().all(|found| {
        let text = found.as_str();
        let name = text.split('(').next().unwrap_or(text).to_ascii_lowercase();
        if name.starts_with("::-") || name.starts_with(":-") {
            return false;
        }
        let element = name.starts_with("::") || LEGACY_PSEUDO_ELEMENTS.contains(&name.as_str());
        let allowed = if name.starts_with("::") {
            flags.mergeable_pseudo_elements.contains(&name)
        } else {
            flags.mergeable_pseudo_classes.contains(&name)
        };
        let dangling = selector[..found.start()]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_whitespace() || matches!(c, '>' | '+' | '~' | ','));
        allowed && !dangling && (!element || found.end() == selector.len())
    })
}

/// The BEM block of a class name: `menu` for `menu__item` and
/// `menu--active`.
pub fn bem_block(class: &str) -> &str {
    let element = class.find("__").unwrap_or(class.len());
    let modifier = class.find("--").unwrap_or(class.len());
    &class[..element.min(modifier)]
}

fn bem_blocks(compound: &CompoundSelector) -> BTreeSet<&str> {
    compound.classes().map(bem_block).collect()
}

/// Compare the subjects of two complex selectors. Only differences that
/// rule out a common element give [`Overlap::Never`].
pub fn subjects_overlap(a: &ComplexSelector, b: &ComplexSelector, semantic: bool) -> Overlap {
    let (Some(left), Some(right)) = (a.subject(), b.subject()) else {
        return Overlap::Maybe;
    };
    if let (Some(l), Some(r)) = (left.type_name(), right.type_name())
        && !l.eq_ignore_ascii_case(r)
    {
        return Overlap::Never;
    }
    let (left_ids, right_ids): (BTreeSet<_>, BTreeSet<_>) = (left.ids().collect(), right.ids().collect());
    if !left_ids.is_empty() && !right_ids.is_empty() && left_ids.is_disjoint(&right_ids) {
        return Overlap::Never;
    }
    if left.pseudo_element() != right.pseudo_element() {
        return Overlap::Never;
    }
    if semantic {
        let (l, r) = (bem_blocks(left), bem_blocks(right));
        if !l.is_empty() && !r.is_empty() && l.is_disjoint(&r) {
            return Overlap::Never;
        }
    }
    Overlap::Maybe
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compat::CompatibilityProfile;
    use crate::options::Config;
    use css::parse_selector_list;

    fn list(selectors: &[&str]) -> Vec<String> {
        selectors.iter().map(|s| s.to_string()).collect()
    }

    fn mergeable_with(config: &Config, selectors: &[&str]) -> bool {
        is_mergeable(&list(selectors), &Context::new(config))
    }

    fn mergeable(selectors: &[&str]) -> bool {
        mergeable_with(&Config::default(), selectors)
    }

    fn overlap(a: &str, b: &str, semantic: bool) -> Overlap {
        let a = &parse_selector_list(a)[0];
        let b = &parse_selector_list(b)[0];
        subjects_overlap(a, b, semantic)
    }

    #[test]
    fn test_plain_selectors_merge() {
        assert!(mergeable(&["a", ".b", "#c", "div > p", "ul li.item"]));
        assert!(mergeable(&["a:hover", "a::before", "li:nth-child(2n+1)", "a:not(.x)"]));
    }

    #[test]
    fn test_special_selectors_stay_alone() {
        assert!(!mergeable(&["a", "input::-webkit-input-placeholder"]));
        assert!(!mergeable(&["a:fullscreen"]));
        assert!(!mergeable(&[".a /deep/ .b"]));
        assert!(!mergeable(&["a:unknown-state"]));
        assert!(!mergeable(&[]));
    }

    #[test]
    fn test_pseudo_placement() {
        assert!(!mergeable(&["a::before:hover"]));
        assert!(!mergeable(&["div :hover"]));
        assert!(!mergeable(&["div>:first-child"]));
    }

    #[test]
    fn test_multiple_pseudos() {
        assert!(mergeable(&["a:hover:focus"]));
        let mut profile = CompatibilityProfile::default();
        profile.selectors.multiple_pseudo_merging = false;
        let config = Config::new(profile, Default::default());
        assert!(!mergeable_with(&config, &["a:hover:focus"]));
        assert!(mergeable_with(&config, &["a:hover"]));
    }

    #[test]
    fn test_merge_limit() {
        let mut profile = CompatibilityProfile::default();
        profile.selectors.merge_limit = 2;
        let config = Config::new(profile, Default::default());
        assert!(mergeable_with(&config, &["a", "b"]));
        assert!(!mergeable_with(&config, &["a", "b", "i"]));
    }

    #[test]
    fn test_selector_union() {
        assert_eq!(merge_selectors(&list(&["b", "a"]), &list(&["a", "c"])), list(&["a", "b", "c"]));
        assert_eq!(selector_key(&list(&["b", "a", "b"])), list(&["a", "b"]));
    }

    #[test]
    fn test_bem_block() {
        assert_eq!(bem_block("menu__item"), "menu");
        assert_eq!(bem_block("menu--active"), "menu");
        assert_eq!(bem_block("menu"), "menu");
    }

    #[test]
    fn test_subject_overlap() {
        assert_eq!(overlap("a", "div", false), Overlap::Never);
        assert_eq!(overlap("p a", "a", false), Overlap::Maybe);
        assert_eq!(overlap("#x", "#y", false), Overlap::Never);
        assert_eq!(overlap("#x.a", "#x", false), Overlap::Maybe);
        assert_eq!(overlap("a::after", "a::before", false), Overlap::Never);
        assert_eq!(overlap(".a", ".b", false), Overlap::Maybe);
        assert_eq!(overlap(".menu__item", ".card", true), Overlap::Never);
        assert_eq!(overlap(".menu__item", ".menu--active", true), Overlap::Maybe);
    }
}
