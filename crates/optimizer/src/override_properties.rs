//! Cross-declaration compaction within one rule.
//!
//! Declarations are visited back to front. Every later declaration
//! (`right`) is compared with every earlier one (`left`):
//!
//! * same property: the later value shadows the earlier one;
//! * `right` shorthand covering `left`: `left` is shadowed;
//! * `right` a component of shorthand `left`: `right` is folded into `left`;
//! * two copies of one shorthand: shadowed when every component is.
//!
//! Nothing is touched unless the override predicates agree that no engine
//! could be relying on `left` as a fallback.

use log::trace;

use crate::can_override::can_override;
use crate::context::Context;
use crate::property::Property;
use crate::restore::{restore, verify};

pub fn override_properties(properties: &mut [Property], ctx: &Context) {
    for right_at in (1..properties.len()).rev() {
        for left_at in (0..right_at).rev() {
            if properties[right_at].unused {
                break;
            }
            if properties[left_at].unused {
                continue;
            }
            compact_pair(properties, left_at, right_at, ctx);
        }
    }
}

/// Drop earlier declarations repeated verbatim later on.
pub fn remove_duplicates(properties: &mut [Property]) {
    for right_at in (1..properties.len()).rev() {
        if properties[right_at].unused {
            continue;
        }
        for left_at in (0..right_at).rev() {
            let (head, tail) = properties.split_at_mut(right_at);
            let (left, right) = (&mut head[left_at], &tail[0]);
            if !left.unused
                && left.name == right.name
                && left.value == right.value
                && left.hack == right.hack
                && (right.important || !left.important)
            {
                trace!("dropping duplicate `{}`", left.name);
                left.unused = true;
            }
        }
    }
}

fn compact_pair(properties: &mut [Property], left_at: usize, right_at: usize, ctx: &Context) {
    let (left, right) = (&properties[left_at], &properties[right_at]);
    if left.hack != right.hack
        || ctx.options.skips(&left.name)
        || ctx.options.skips(&right.name)
        || !left.touches(right, ctx)
    {
        return;
    }

    if left.name == right.name {
        if left.is_analysed_shorthand() && right.is_analysed_shorthand() {
            same_shorthands(properties, left_at, right_at, ctx);
        } else {
            same_property(properties, left_at, right_at, ctx);
        }
    } else if right.is_analysed_shorthand() && ctx.registry.covers(&right.name, &left.name) {
        shadowed_by_shorthand(properties, left_at, right_at, ctx);
    } else if left.is_analysed_shorthand() && left.find_component(&right.name).is_some() {
        fold_into_shorthand(properties, left_at, right_at, ctx);
    }
}

/// `(name, value)` of every longhand set by `property`.
fn leaf_values(property: &Property) -> Vec<(&str, &[String])> {
    property
        .leaves()
        .into_iter()
        .map(|leaf| (leaf.name.as_str(), leaf.value.as_slice()))
        .collect()
}

/// May every longhand of `later` replace the same longhand of `earlier`?
fn leaves_overridable(ctx: &Context, earlier: &Property, later: &Property) -> bool {
    leaf_values(later).into_iter().all(|(name, value)| {
        let earlier_value = if earlier.components.is_empty() {
            earlier.value.as_slice()
        } else {
            match earlier.find_component(name) {
                Some(component) => component.value.as_slice(),
                None => return false,
            }
        };
        can_override(ctx, name, earlier_value, value)
    })
}

fn same_property(properties: &mut [Property], left_at: usize, right_at: usize, ctx: &Context) {
    let (left, right) = (&properties[left_at], &properties[right_at]);
    if left.important && !right.important {
        if can_override(ctx, &left.name, &right.value, &left.value) {
            trace!("`{}` loses to an earlier !important", right.name);
            properties[right_at].unused = true;
        }
        return;
    }
    if can_override(ctx, &left.name, &left.value, &right.value) {
        trace!("`{}` shadowed by a later declaration", left.name);
        properties[left_at].unused = true;
    }
}

fn same_shorthands(properties: &mut [Property], left_at: usize, right_at: usize, ctx: &Context) {
    let (left, right) = (&properties[left_at], &properties[right_at]);
    if !left.multiplex && right.multiplex {
        return;
    }
    if left.important && !right.important {
        if leaves_overridable(ctx, right, left) {
            trace!("`{}` loses to an earlier !important", right.name);
            properties[right_at].unused = true;
        }
        return;
    }
    if leaves_overridable(ctx, left, right) {
        trace!("`{}` shadowed component by component", left.name);
        properties[left_at].unused = true;
    }
}

fn shadowed_by_shorthand(properties: &mut [Property], left_at: usize, right_at: usize, ctx: &Context) {
    let (left, right) = (&properties[left_at], &properties[right_at]);
    if left.important && !right.important {
        return;
    }
    if left.multiplex && !right.multiplex {
        return;
    }
    if left.shorthand && !left.is_analysed_shorthand() && !left.dynamic {
        return;
    }
    let overridable = left
        .leaf_names(ctx)
        .into_iter()
        .all(|name| match (right.find_component(name), left.find_component(name)) {
            (Some(later), Some(earlier)) => can_override(ctx, name, &earlier.value, &later.value),
            (Some(later), None) => can_override(ctx, name, &left.value, &later.value),
            (None, _) => false,
        });
    if overridable {
        trace!("`{}` shadowed by `{}`", left.name, right.name);
        properties[left_at].unused = true;
    }
}

fn fold_into_shorthand(properties: &mut [Property], left_at: usize, right_at: usize, ctx: &Context) {
    let (left, right) = (&properties[left_at], &properties[right_at]);
    if right.dynamic || (right.shorthand && !right.is_analysed_shorthand()) {
        return;
    }
    if left.important && !right.important {
        let Some(component) = left.find_component(&right.name) else {
            return;
        };
        if leaves_overridable(ctx, right, component) {
            trace!("`{}` loses to an earlier !important `{}`", right.name, left.name);
            properties[right_at].unused = true;
        }
        return;
    }
    if right.important && !left.important {
        return;
    }
    if properties[left_at + 1..right_at]
        .iter()
        .any(|between| !between.unused && between.touches(right, ctx))
    {
        return;
    }
    if let Some(merged) = folded(left, right, ctx) {
        trace!("folding `{}` into `{}`", right.name, left.name);
        properties[left_at] = merged;
        properties[right_at].unused = true;
    }
}

/// `left` with `right` substituted for its component, if that is safe and
/// the shorthand can still express the result.
fn folded(left: &Property, right: &Property, ctx: &Context) -> Option<Property> {
    let compat = ctx.compat();
    let component = left.find_component(&right.name)?;
    let descriptor = ctx.registry.descriptor(right.descriptor?);

    if !left.multiplex && right.multiplex {
        return None;
    }
    if left.multiplex && !right.multiplex && !descriptor.multiplex_last_only {
        return None;
    }
    if left.multiplex && right.multiplex && layer_count(&component.value) != layer_count(&right.value) {
        return None;
    }

    for (name, value) in leaf_values(right) {
        let blocked = match name {
            "background-size" => !compat.properties.background_size_merging,
            "background-origin" => !compat.properties.background_origin_merging,
            "background-clip" => !compat.properties.background_clip_merging,
            _ => false,
        };
        if blocked {
            return None;
        }
        let leaf = ctx.registry.get(name)?;
        if leaf
            .non_mergeable_value
            .is_some_and(|sentinel| value.len() == 1 && value[0] == sentinel)
        {
            return None;
        }
        let earlier = component.find_component(name).unwrap_or(component);
        let inherits = |v: &[String]| v.iter().any(|t| ctx.validator.is_inherit(t));
        if (inherits(value) || inherits(&earlier.value)) && earlier.value != value {
            return None;
        }
    }
    if !leaves_overridable(ctx, component, right) {
        return None;
    }

    let mut merged = left.clone();
    let slot = merged.find_component_mut(&right.name)?;
    *slot = Property {
        important: left.important,
        hack: left.hack.clone(),
        position: left.position,
        ..right.clone()
    };
    retag(slot, left);
    let value = restore(&merged, ctx)?;
    if !verify(&merged, &value, ctx) {
        return None;
    }
    merged.multiplex = value.iter().any(|t| t == ",");
    merged.value = value;
    merged.dirty = true;
    Some(merged)
}

/// Nested components inherit the flags of the shorthand they now belong to.
fn retag(property: &mut Property, owner: &Property) {
    for component in &mut property.components {
        component.important = owner.important;
        component.hack = owner.hack.clone();
        component.position = owner.position;
        retag(component, owner);
    }
}

fn layer_count(value: &[String]) -> usize {
    value.iter().filter(|t| *t == ",").count() + 1
}
