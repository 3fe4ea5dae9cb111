//! Hoisting declarations shared by several rules into a rule of their own.
//!
//! `a{color:red;margin:0}b{color:red;padding:0}` becomes
//! `a,b{color:red}a{margin:0}b{padding:0}` when that is shorter. The new
//! rule is inserted right before the first holder, so every moved
//! declaration travels up: past the earlier declarations of its own rule
//! and past every node between the first holder and its own rule.

use css::{Declaration, Node, Rule, serialize_declaration, serialize_rule};
use log::trace;

use crate::context::Context;
use crate::optimize_properties::optimize_properties;
use crate::reorder::{Touch, can_reorder, extract_nodes, is_opaque};
use crate::selectors::{is_mergeable, merge_selectors};

/// A set of declarations every one of `holders` carries.
#[derive(Debug)]
struct Candidate {
    declarations: Vec<Declaration>,
    holders: Vec<usize>,
    selectors: Vec<String>,
    gain: usize,
}

/// Move shared declarations while doing so saves bytes. Returns the number
/// of declarations hoisted.
pub fn restructure(nodes: &mut Vec<Node>, ctx: &Context) -> usize {
    let mut moved = 0;
    while let Some(candidate) = best_candidate(nodes, ctx) {
        trace!(
            "hoisting {} declaration(s) shared by `{}` (saves {})",
            candidate.declarations.len(),
            candidate.selectors.join(","),
            candidate.gain
        );
        moved += candidate.declarations.len();
        apply(nodes, candidate, ctx);
    }
    moved
}

fn holds_once(rule: &Rule, declaration: &Declaration) -> bool {
    rule.declarations.iter().filter(|&d| d == declaration).count() == 1
}

fn best_candidate(nodes: &[Node], ctx: &Context) -> Option<Candidate> {
    let mut shared: Vec<(&Declaration, Vec<usize>)> = Vec::new();
    for (at, node) in nodes.iter().enumerate() {
        let Some(rule) = node.as_rule() else { continue };
        if node.is_empty() || !rule.nested.is_empty() {
            continue;
        }
        for declaration in &rule.declarations {
            if !holds_once(rule, declaration) {
                continue;
            }
            match shared.iter_mut().find(|(d, _)| *d == declaration) {
                Some((_, holders)) => holders.push(at),
                None => shared.push((declaration, vec![at])),
            }
        }
    }

    let mut groups: Vec<(Vec<usize>, Vec<Declaration>)> = Vec::new();
    for (declaration, holders) in shared {
        if holders.len() < 2 {
            continue;
        }
        let holders = movable_holders(nodes, declaration, holders, ctx);
        if holders.len() < 2 {
            continue;
        }
        match groups.iter_mut().find(|(h, _)| *h == holders) {
            Some((_, declarations)) => declarations.push(declaration.clone()),
            None => groups.push((holders, vec![declaration.clone()])),
        }
    }

    groups
        .into_iter()
        .filter_map(|(holders, declarations)| {
            let selectors = holders
                .iter()
                .filter_map(|&at| nodes[at].as_rule())
                .fold(Vec::new(), |acc, rule| merge_selectors(&acc, &rule.selectors));
            if !is_mergeable(&selectors, ctx) {
                return None;
            }
            let gain = gain(nodes, &holders, &declarations, &selectors)?;
            Some(Candidate {
                declarations,
                holders,
                selectors,
                gain,
            })
        })
        .max_by_key(|candidate| candidate.gain)
}

/// Narrow `holders` to the rules whose copy of `declaration` may move up to
/// the first remaining holder.
fn movable_holders(nodes: &[Node], declaration: &Declaration, mut holders: Vec<usize>, ctx: &Context) -> Vec<usize> {
    while let Some(&first) = holders.first() {
        let kept: Vec<usize> = holders
            .iter()
            .copied()
            .filter(|&at| can_hoist(nodes, first, at, declaration, ctx))
            .collect();
        if kept.len() == holders.len() {
            break;
        }
        holders = kept;
    }
    holders
}

fn can_hoist(nodes: &[Node], insert: usize, at: usize, declaration: &Declaration, ctx: &Context) -> bool {
    let Some(rule) = nodes[at].as_rule() else {
        return false;
    };
    if nodes[insert..at].iter().any(is_opaque) {
        return false;
    }
    let Some(position) = rule.declarations.iter().position(|d| d == declaration) else {
        return false;
    };
    let semantic = ctx.options.merge_semantically;
    let moving = [Touch::new(declaration, &rule.selectors)];
    let earlier: Vec<Touch> = rule.declarations[..position]
        .iter()
        .map(|d| Touch::new(d, &rule.selectors))
        .collect();
    can_reorder(&moving, &earlier, semantic) && can_reorder(&moving, &extract_nodes(&nodes[insert..at]), semantic)
}

/// Bytes saved by hoisting, `None` when the move does not pay off.
fn gain(nodes: &[Node], holders: &[usize], declarations: &[Declaration], selectors: &[String]) -> Option<usize> {
    let body: usize = declarations.iter().map(|d| serialize_declaration(d).len() + 1).sum();
    let added = selectors.join(",").len() + 2 + body - 1;
    let removed: usize = holders
        .iter()
        .filter_map(|&at| nodes[at].as_rule())
        .map(|rule| {
            if rule.declarations.len() == declarations.len() {
                serialize_rule(rule).len()
            } else {
                body
            }
        })
        .sum();
    removed.checked_sub(added).filter(|&gain| gain > 0)
}

/// Removing declarations can expose new merges inside a holder, so what
/// is left behind is optimized again.
fn apply(nodes: &mut Vec<Node>, candidate: Candidate, ctx: &Context) {
    let insert = candidate.holders[0];
    for &at in candidate.holders.iter().rev() {
        if let Some(rule) = nodes[at].as_rule_mut() {
            rule.declarations.retain(|d| !candidate.declarations.contains(d));
            rule.declarations = optimize_properties(&rule.declarations, ctx);
        }
        if nodes[at].is_empty() {
            nodes.remove(at);
        }
    }
    nodes.insert(
        insert,
        Node::Rule(Rule {
            selectors: candidate.selectors,
            declarations: optimize_properties(&candidate.declarations, ctx),
            nested: Vec::new(),
        }),
    );
}
