//! `@media` and `@font-face` passes over one list of sibling nodes.

use css::{Node, serialize_body};
use log::trace;

use crate::context::Context;
use crate::optimize::optimize_level;
use crate::reorder;

fn media_prelude(node: &Node) -> Option<&str> {
    match node {
        Node::Block { prelude, .. } if prelude.to_ascii_lowercase().starts_with("@media") => Some(prelude.as_str()),
        _ => None,
    }
}

fn children_mut(node: &mut Node) -> Option<&mut Vec<Node>> {
    match node {
        Node::Block { children, .. } => Some(children),
        _ => None,
    }
}

fn take_children(node: &mut Node) -> Vec<Node> {
    children_mut(node).map(std::mem::take).unwrap_or_default()
}

fn can_move(nodes: &[Node], from: usize, to: usize, ctx: &Context) -> bool {
    reorder::can_move(nodes, from, to, ctx.options.merge_semantically)
}

/// Fold `@media` blocks into the nearest earlier block with the same
/// prelude. The later block is hoisted when its rules may move up;
/// otherwise the earlier block is moved down. The merged body is optimized
/// again since new neighbours may merge.
pub fn merge_media(nodes: &mut Vec<Node>, ctx: &Context) -> usize {
    let mut merged = 0;
    let mut j = 1;
    while j < nodes.len() {
        let Some(prelude) = media_prelude(&nodes[j]) else {
            j += 1;
            continue;
        };
        let Some(i) = (0..j).rev().find(|&i| media_prelude(&nodes[i]) == Some(prelude)) else {
            j += 1;
            continue;
        };
        let target = if can_move(nodes, j, i, ctx) {
            let moved = take_children(&mut nodes[j]);
            nodes.remove(j);
            if let Some(children) = children_mut(&mut nodes[i]) {
                children.extend(moved);
            }
            i
        } else if can_move(nodes, i, j, ctx) {
            let mut moved = take_children(&mut nodes[i]);
            if let Some(children) = children_mut(&mut nodes[j]) {
                moved.append(children);
                *children = moved;
            }
            nodes.remove(i);
            j - 1
        } else {
            j += 1;
            continue;
        };
        trace!("merged @media blocks into position {}", target);
        if let Some(children) = children_mut(&mut nodes[target]) {
            optimize_level(children, ctx);
        }
        merged += 1;
        j = target + 1;
    }
    merged
}

/// Drop earlier `@media` blocks repeated verbatim later on.
pub fn remove_duplicate_media(nodes: &mut Vec<Node>, ctx: &Context) -> usize {
    let mut removed = 0;
    let mut j = 0;
    while j < nodes.len() {
        let mut i = j;
        while i > 0 {
            i -= 1;
            let duplicate = media_prelude(&nodes[i]).is_some() && nodes[i] == nodes[j];
            if duplicate && can_move(nodes, i, j, ctx) {
                nodes.remove(i);
                j -= 1;
                removed += 1;
            }
        }
        j += 1;
    }
    removed
}

fn font_face_body(node: &Node) -> Option<String> {
    match node {
        Node::AtRuleBlock { prelude, declarations } if prelude.eq_ignore_ascii_case("@font-face") => {
            Some(serialize_body(declarations))
        }
        _ => None,
    }
}

/// Drop later `@font-face` blocks repeating an earlier one.
pub fn remove_duplicate_font_faces(nodes: &mut Vec<Node>) -> usize {
    let mut seen: Vec<String> = Vec::new();
    let before = nodes.len();
    nodes.retain(|node| match font_face_body(node) {
        Some(body) if seen.contains(&body) => false,
        Some(body) => {
            seen.push(body);
            true
        }
        None => true,
    });
    before - nodes.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use crate::options::Config;
    use css::{parse_stylesheet, serialize_nodes};

    fn run(pass: fn(&mut Vec<Node>, &Context) -> usize, input: &str) -> String {
        let config = Config::default();
        let ctx = Context::new(&config);
        let mut nodes = parse_stylesheet(input).nodes;
        pass(&mut nodes, &ctx);
        serialize_nodes(&nodes)
    }

    #[test]
    fn test_adjacent_blocks_merge() {
        assert_eq!(
            run(merge_media, "@media screen{a{color:red}}@media screen{div{display:block}}"),
            "@media screen{a{color:red}div{display:block}}"
        );
    }

    #[test]
    fn test_later_block_hoisted() {
        assert_eq!(
            run(
                merge_media,
                "@media print{a{color:red}}.x{margin:0}@media print{div{display:block}}"
            ),
            "@media print{a{color:red}div{display:block}}.x{margin:0}"
        );
    }

    #[test]
    fn test_earlier_block_moved_down() {
        assert_eq!(
            run(
                merge_media,
                "@media print{.a{margin:0}}.b{color:red}@media print{.c{color:blue}}"
            ),
            ".b{color:red}@media print{.a{margin:0}.c{color:#00f}}"
        );
    }

    #[test]
    fn test_conflicting_blocks_stay_apart() {
        let input = "@media print{.a{color:red}}.b{color:blue}@media print{.c{color:green}}";
        assert_eq!(run(merge_media, input), input);
    }

    #[test]
    fn test_merged_body_is_optimized() {
        assert_eq!(
            run(merge_media, "@media print{a{color:red}}@media print{a{margin:0}}"),
            "@media print{a{color:red;margin:0}}"
        );
    }

    #[test]
    fn test_duplicate_media_blocks() {
        assert_eq!(
            run(remove_duplicate_media, "@media print{a{color:red}}div{margin:0}@media print{a{color:red}}"),
            "div{margin:0}@media print{a{color:red}}"
        );
    }

    #[test]
    fn test_duplicate_font_faces() {
        let mut nodes = parse_stylesheet(
            "@font-face{font-family:A;src:url(a.woff)}@font-face{font-family:A;src:url(a.woff)}",
        )
        .nodes;
        assert_eq!(remove_duplicate_font_faces(&mut nodes), 1);
        assert_eq!(serialize_nodes(&nodes), "@font-face{font-family:A;src:url(a.woff)}");
    }

    #[test]
    fn test_blocks_declaring_layers_stay_put() {
        let input = "@media print{@layer base{a{color:red}}}@layer theme{b{top:0}}@media print{@layer theme{a{color:blue}}}";
        assert_eq!(run(merge_media, input), input);
        let input = "@media print{@layer x{a{color:red}}}div{margin:0}@media print{@layer x{a{color:red}}}";
        assert_eq!(run(remove_duplicate_media, input), input);
    }

    #[test]
    fn test_nested_rules_block_media_moves() {
        let input = "@media print{a{color:red}}.x{&:hover{top:0}}@media print{b{top:0}}";
        assert_eq!(run(merge_media, input), input);
    }
}

