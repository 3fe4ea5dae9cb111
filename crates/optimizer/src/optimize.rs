//! The optimization driver: per-rule work first, then the structural passes
//! over each list of siblings until nothing changes.

use css::{Node, Stylesheet, serialize_nodes};
use log::{debug, warn};

use crate::context::Context;
use crate::media::{merge_media, remove_duplicate_font_faces, remove_duplicate_media};
use crate::merge_rules::{
    merge_adjacent, merge_non_adjacent_by_body, merge_non_adjacent_by_selector, remove_duplicate_rules,
};
use crate::optimize_properties::optimize_properties;
use crate::options::Config;
use crate::reorder::is_keyframes;
use crate::restructure::restructure;
use crate::values::minify_declaration;

const MAX_ROUNDS: usize = 10;

/// What one round of structural passes did.
#[derive(Debug, Default, Clone, Copy)]
struct Round {
    duplicates: usize,
    adjacent: usize,
    by_selector: usize,
    by_body: usize,
    restructured: usize,
    font_faces: usize,
    media_duplicates: usize,
    media_merged: usize,
}

/// Optimize a whole stylesheet in place.
pub fn optimize(stylesheet: &mut Stylesheet, config: &Config) {
    let ctx = Context::new(config);
    optimize_level(&mut stylesheet.nodes, &ctx);
    if ctx.options.remove_empty {
        remove_empty(&mut stylesheet.nodes);
    }
}

/// Optimize one list of sibling nodes and everything nested in it.
pub fn optimize_level(nodes: &mut Vec<Node>, ctx: &Context) {
    for node in nodes.iter_mut() {
        match node {
            // Declarations interleaved with nested rules keep their order.
            Node::Rule(rule) if !rule.nested.is_empty() => {
                for declaration in &mut rule.declarations {
                    minify_declaration(declaration, ctx);
                }
            }
            Node::Rule(rule) => rule.declarations = optimize_properties(&rule.declarations, ctx),
            Node::AtRuleBlock { declarations, .. } => *declarations = optimize_properties(declarations, ctx),
            Node::Block { prelude, children } if is_keyframes(prelude) => optimize_keyframes(children, ctx),
            Node::Block { children, .. } => optimize_level(children, ctx),
            Node::AtRule(_) | Node::Comment(_) => {}
        }
    }

    let options = ctx.options;
    for round in 0..MAX_ROUNDS {
        let before = serialize_nodes(nodes);
        let mut done = Round::default();
        if options.remove_duplicate_rules {
            done.duplicates = remove_duplicate_rules(nodes, ctx);
        }
        if options.merge_adjacent_rules {
            done.adjacent = merge_adjacent(nodes, ctx);
        }
        if options.merge_non_adjacent_rules.by_selector() {
            done.by_selector = merge_non_adjacent_by_selector(nodes, ctx);
        }
        if options.merge_non_adjacent_rules.by_body() {
            done.by_body = merge_non_adjacent_by_body(nodes, ctx);
        }
        if options.restructure_rules {
            done.restructured = restructure(nodes, ctx);
            if options.merge_adjacent_rules {
                done.adjacent += merge_adjacent(nodes, ctx);
            }
        }
        if options.remove_duplicate_font_rules {
            done.font_faces = remove_duplicate_font_faces(nodes);
        }
        if options.remove_duplicate_media_blocks {
            done.media_duplicates = remove_duplicate_media(nodes, ctx);
        }
        if options.merge_media {
            done.media_merged = merge_media(nodes, ctx);
        }
        if options.remove_empty {
            remove_empty(nodes);
        }
        debug!("round {}: {:?}", round + 1, done);
        if serialize_nodes(nodes) == before {
            return;
        }
    }
    warn!(
        "structural passes still changing after {} rounds; output may not be stable",
        MAX_ROUNDS
    );
}

/// Frames are optimized one by one; they are never merged or restructured.
fn optimize_keyframes(frames: &mut [Node], ctx: &Context) {
    for frame in frames {
        if let Node::Rule(rule) = frame {
            rule.declarations = optimize_properties(&rule.declarations, ctx);
        }
    }
}

/// Drop empty rules and blocks, innermost first.
pub fn remove_empty(nodes: &mut Vec<Node>) {
    for node in nodes.iter_mut() {
        if let Node::Block { children, .. } = node {
            remove_empty(children);
        }
    }
    nodes.retain(|node| !node.is_empty());
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use crate::options::{Level2Options, MergeNonAdjacent};
    use css::{parse_stylesheet, serialize_stylesheet};

    fn optimized_with(config: &Config, input: &str) -> String {
        let mut stylesheet = parse_stylesheet(input);
        optimize(&mut stylesheet, config);
        serialize_stylesheet(&stylesheet)
    }

    fn optimized(input: &str) -> String {
        optimized_with(&Config::default(), input)
    }

    #[test]
    fn test_duplicate_rule_across_unrelated_rule() {
        assert_eq!(
            optimized("a{color:red}div{color:blue}a{color:red}"),
            "div{color:#00f}a{color:red}"
        );
    }

    #[test]
    fn test_adjacent_media_blocks() {
        assert_eq!(
            optimized("@media screen{a{color:red}}@media screen{div{display:block}}"),
            "@media screen{a{color:red}div{display:block}}"
        );
    }

    #[test]
    fn test_empty_nodes_removed() {
        assert_eq!(optimized("a{}@media print{b{}}c{color:red}"), "c{color:red}");
    }

    #[test]
    fn test_keyframes_frames_stay_apart() {
        assert_eq!(
            optimized("@keyframes x{from{margin-top:0px}to{margin-top:0px}}"),
            "@keyframes x{from{margin-top:0}to{margin-top:0}}"
        );
    }

    #[test]
    fn test_nested_levels_are_optimized() {
        assert_eq!(
            optimized("@media print{a{color:red}a{margin:0}}"),
            "@media print{a{color:red;margin:0}}"
        );
    }

    #[test]
    fn test_non_adjacent_switched_off() {
        let mut level2 = Level2Options::default();
        level2.merge_non_adjacent_rules = MergeNonAdjacent::Off;
        level2.remove_duplicate_rules = false;
        let config = Config::new(Default::default(), level2);
        assert_eq!(
            optimized_with(&config, "a{color:red}div{margin:0}a{padding:0}"),
            "a{color:red}div{margin:0}a{padding:0}"
        );
        assert_eq!(
            optimized("a{color:red}div{margin:0}a{padding:0}"),
            "div{margin:0}a{color:red;padding:0}"
        );
    }

    #[test]
    fn test_restructuring_is_opt_in() {
        let input = ".one{color:red;display:block;margin:0}.two{color:red;display:block;padding:0}";
        assert_eq!(optimized(input), input);
        let config = Config::new(Default::default(), Level2Options::all());
        assert_eq!(
            optimized_with(&config, input),
            ".one,.two{color:red;display:block}.one{margin:0}.two{padding:0}"
        );
    }

    #[test]
    fn test_nested_rules_survive() {
        assert_eq!(optimized("a{&:hover{color:red}}"), "a{&:hover{color:red}}");
        assert_eq!(
            optimized("a{color:#ff0000;&:hover{color:blue}margin:0px}a{top:0}"),
            "a{color:red;&:hover{color:blue}margin:0}a{top:0}"
        );
    }

    #[test]
    fn test_empty_layer_keeps_its_place() {
        let input = "@layer base{}@layer theme{a{color:red}}@layer base{a{color:red}}";
        assert_eq!(optimized(input), input);
    }
}
