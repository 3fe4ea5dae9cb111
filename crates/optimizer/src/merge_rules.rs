//! Rule-level merges within one list of sibling nodes.
//!
//! Rules are compared by selector key (sorted, deduplicated selectors) and by
//! body (the serialized declaration list). Moving a rule past its siblings
//! is allowed only when [`reorder::can_move`] agrees.

use css::{Declaration, Node, Rule, serialize_body};
use log::trace;

use crate::context::Context;
use crate::optimize_properties::optimize_properties;
use crate::reorder;
use crate::selectors::{is_mergeable, merge_selectors, selector_key};

/// A non-empty rule whose whole body is declarations.
fn live_rule(node: &Node) -> Option<&Rule> {
    node.as_rule()
        .filter(|rule| !node.is_empty() && !rule.selectors.is_empty() && rule.nested.is_empty())
}

fn same_selectors(a: &Rule, b: &Rule) -> bool {
    selector_key(&a.selectors) == selector_key(&b.selectors)
}

fn same_body(a: &Rule, b: &Rule) -> bool {
    serialize_body(&a.declarations) == serialize_body(&b.declarations)
}

fn can_move(nodes: &[Node], from: usize, to: usize, ctx: &Context) -> bool {
    reorder::can_move(nodes, from, to, ctx.options.merge_semantically)
}

fn combined_body(first: &Rule, second: &Rule, ctx: &Context) -> Vec<Declaration> {
    let mut declarations = first.declarations.clone();
    declarations.extend(second.declarations.iter().cloned());
    optimize_properties(&declarations, ctx)
}

/// Drop earlier copies of a rule repeated verbatim later on.
pub fn remove_duplicate_rules(nodes: &mut Vec<Node>, ctx: &Context) -> usize {
    let mut removed = 0;
    let mut j = 0;
    while j < nodes.len() {
        let mut i = j;
        while i > 0 {
            i -= 1;
            let duplicate = match (live_rule(&nodes[i]), live_rule(&nodes[j])) {
                (Some(a), Some(b)) => same_selectors(a, b) && same_body(a, b),
                _ => false,
            };
            if duplicate && can_move(nodes, i, j, ctx) {
                trace!("dropping duplicate rule at {}", i);
                nodes.remove(i);
                j -= 1;
                removed += 1;
            }
        }
        j += 1;
    }
    removed
}

/// Merge neighbouring rules that share a selector list or a body.
pub fn merge_adjacent(nodes: &mut Vec<Node>, ctx: &Context) -> usize {
    let mut merged = 0;
    let mut at = 1;
    while at < nodes.len() {
        let (Some(previous), Some(current)) = (live_rule(&nodes[at - 1]), live_rule(&nodes[at])) else {
            at += 1;
            continue;
        };
        if same_selectors(previous, current) {
            let declarations = combined_body(previous, current, ctx);
            if let Some(rule) = nodes[at - 1].as_rule_mut() {
                rule.declarations = declarations;
            }
        } else if same_body(previous, current)
            && is_mergeable(&merge_selectors(&previous.selectors, &current.selectors), ctx)
        {
            let selectors = merge_selectors(&previous.selectors, &current.selectors);
            if let Some(rule) = nodes[at - 1].as_rule_mut() {
                rule.selectors = selectors;
            }
        } else {
            at += 1;
            continue;
        }
        trace!("merged adjacent rules at {}", at - 1);
        nodes.remove(at);
        merged += 1;
    }
    merged
}

/// Merge the body of a rule into the nearest earlier rule with the same
/// selectors, moving whichever side may travel.
pub fn merge_non_adjacent_by_selector(nodes: &mut Vec<Node>, ctx: &Context) -> usize {
    let mut merged = 0;
    let mut j = 1;
    while j < nodes.len() {
        let Some(current) = live_rule(&nodes[j]) else {
            j += 1;
            continue;
        };
        let earlier = (0..j)
            .rev()
            .find(|&i| live_rule(&nodes[i]).is_some_and(|rule| same_selectors(rule, current)));
        let Some(i) = earlier else {
            j += 1;
            continue;
        };
        let (Some(first), Some(second)) = (nodes[i].as_rule(), nodes[j].as_rule()) else {
            j += 1;
            continue;
        };
        if can_move(nodes, i, j, ctx) {
            let declarations = combined_body(first, second, ctx);
            if let Some(rule) = nodes[j].as_rule_mut() {
                rule.declarations = declarations;
            }
            trace!("moved rule at {} down into {}", i, j);
            nodes.remove(i);
            merged += 1;
        } else if can_move(nodes, j, i, ctx) {
            let declarations = combined_body(first, second, ctx);
            if let Some(rule) = nodes[i].as_rule_mut() {
                rule.declarations = declarations;
            }
            trace!("moved rule at {} up into {}", j, i);
            nodes.remove(j);
            merged += 1;
        } else {
            j += 1;
        }
    }
    merged
}

/// Union the selectors of rules repeating a body, moving whichever side
/// may travel.
pub fn merge_non_adjacent_by_body(nodes: &mut Vec<Node>, ctx: &Context) -> usize {
    let mut merged = 0;
    let mut j = 1;
    while j < nodes.len() {
        let Some(current) = live_rule(&nodes[j]) else {
            j += 1;
            continue;
        };
        let earlier = (0..j).rev().find(|&i| {
            live_rule(&nodes[i]).is_some_and(|rule| {
                same_body(rule, current)
                    && is_mergeable(&merge_selectors(&rule.selectors, &current.selectors), ctx)
            })
        });
        let Some(i) = earlier else {
            j += 1;
            continue;
        };
        let selectors = match (nodes[i].as_rule(), nodes[j].as_rule()) {
            (Some(first), Some(second)) => merge_selectors(&first.selectors, &second.selectors),
            _ => {
                j += 1;
                continue;
            }
        };
        if can_move(nodes, i, j, ctx) {
            if let Some(rule) = nodes[j].as_rule_mut() {
                rule.selectors = selectors;
            }
            nodes.remove(i);
            merged += 1;
        } else if can_move(nodes, j, i, ctx) {
            if let Some(rule) = nodes[i].as_rule_mut() {
                rule.selectors = selectors;
            }
            nodes.remove(j);
            merged += 1;
        } else {
            j += 1;
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use crate::options::Config;
    use css::{parse_stylesheet, serialize_nodes};

    type Pass = fn(&mut Vec<Node>, &Context) -> usize;

    fn run_with(config: &Config, pass: Pass, input: &str) -> String {
        let ctx = Context::new(config);
        let mut nodes = parse_stylesheet(input).nodes;
        pass(&mut nodes, &ctx);
        serialize_nodes(&nodes)
    }

    fn run(pass: Pass, input: &str) -> String {
        run_with(&Config::default(), pass, input)
    }

    #[test]
    fn test_remove_duplicate_rules() {
        assert_eq!(
            run(remove_duplicate_rules, "a{color:red}div{color:blue}a{color:red}"),
            "div{color:blue}a{color:red}"
        );
    }

    #[test]
    fn test_duplicate_kept_when_order_matters() {
        let input = ".a{color:red}.b{color:blue}.a{color:red}";
        assert_eq!(run(remove_duplicate_rules, input), input);
    }

    #[test]
    fn test_merge_adjacent_same_selectors() {
        assert_eq!(
            run(merge_adjacent, "a{color:red}a{margin:0}"),
            "a{color:red;margin:0}"
        );
        assert_eq!(run(merge_adjacent, "a{color:red}a{color:blue}"), "a{color:#00f}");
    }

    #[test]
    fn test_merge_adjacent_same_body() {
        assert_eq!(run(merge_adjacent, "b{color:red}a{color:red}"), "a,b{color:red}");
        let input = "a{color:red}input::-moz-placeholder{color:red}";
        assert_eq!(run(merge_adjacent, input), input);
    }

    #[test]
    fn test_merge_by_selector_moves_down() {
        assert_eq!(
            run(merge_non_adjacent_by_selector, "a{color:red}div{color:blue}a{margin:0}"),
            "div{color:blue}a{color:red;margin:0}"
        );
    }

    #[test]
    fn test_merge_by_selector_moves_up() {
        assert_eq!(
            run(merge_non_adjacent_by_selector, ".a{color:red}.b{color:blue}.a{margin:0}"),
            ".a{color:red;margin:0}.b{color:blue}"
        );
    }

    #[test]
    fn test_merge_by_selector_blocked() {
        let input = ".a{color:red}.b{color:blue}.a{color:green}";
        assert_eq!(run(merge_non_adjacent_by_selector, input), input);
    }

    #[test]
    fn test_merge_by_body() {
        assert_eq!(
            run(merge_non_adjacent_by_body, "a{color:red}div{margin:0}p{color:red}"),
            "div{margin:0}a,p{color:red}"
        );
        let input = ".a{color:red}.b{color:blue}.c{color:red}";
        assert_eq!(run(merge_non_adjacent_by_body, input), input);
    }

    #[test]
    fn test_nested_rules_are_never_moved_or_crossed() {
        let own = "a{color:red;&:hover{color:blue}}a{margin:0}";
        assert_eq!(run(merge_adjacent, own), own);
        let across = ".a{color:red}.x{&:hover{color:blue}}.a{margin:0}";
        assert_eq!(run(merge_non_adjacent_by_selector, across), across);
        let duplicate = "a{color:red}.x{&>b{top:0}}a{color:red}";
        assert_eq!(run(remove_duplicate_rules, duplicate), duplicate);
        let body = "a{color:red}.x{&>b{top:0}}p{color:red}";
        assert_eq!(run(merge_non_adjacent_by_body, body), body);
    }
}
