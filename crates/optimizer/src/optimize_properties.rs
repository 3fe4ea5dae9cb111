//! The per-rule property optimizer.

use css::{Declaration, Hack, serialize_body};
use log::{trace, warn};

use crate::context::Context;
use crate::merge_into_shorthands::merge_into_shorthands;
use crate::override_properties::{override_properties, remove_duplicates};
use crate::property::{Property, unwrap_all, wrap_all};
use crate::registry::RestoreKind;
use crate::restore::{restore, verify};
use crate::values::minify_declaration;

/// A merge can expose a new override and the other way round; a handful of
/// rounds settles every body seen in practice.
const MAX_ROUNDS: usize = 4;

/// Minify values, drop shadowed declarations and merge longhands into
/// shorthands until the body stops changing.
pub fn optimize_properties(declarations: &[Declaration], ctx: &Context) -> Vec<Declaration> {
    let mut current: Vec<Declaration> = declarations.to_vec();
    for declaration in &mut current {
        minify_declaration(declaration, ctx);
    }

    let (optimized, rounds) = settle(current, MAX_ROUNDS, |body| optimize_round(body, ctx));
    match rounds {
        Some(rounds) => trace!("property optimizer settled after {} round(s)", rounds),
        None => warn!(
            "property optimizer still changing `{}` after {} rounds",
            serialize_body(&optimized),
            MAX_ROUNDS
        ),
    }
    optimized
}

/// Apply `step` until the value stops changing, at most `max_rounds` times.
/// The round count is `None` when the last round still changed the value.
fn settle<T: PartialEq>(mut current: T, max_rounds: usize, mut step: impl FnMut(&T) -> T) -> (T, Option<usize>) {
    for round in 0..max_rounds {
        let next = step(&current);
        if next == current {
            return (current, Some(round + 1));
        }
        current = next;
    }
    (current, None)
}

fn optimize_round(declarations: &[Declaration], ctx: &Context) -> Vec<Declaration> {
    let mut properties = wrap_all(declarations, ctx);
    remove_duplicates(&mut properties);
    if ctx.options.override_properties {
        override_properties(&mut properties, ctx);
    }
    if ctx.options.merge_into_shorthands {
        merge_into_shorthands(&mut properties, ctx);
        collapse_four_values(&mut properties, ctx);
    }
    let optimized = unwrap_all(&properties);
    if optimized != declarations {
        trace!(
            "`{}` -> `{}`",
            serialize_body(declarations),
            serialize_body(&optimized)
        );
    }
    optimized
}

/// `margin:1px 2px 1px 2px` → `margin:1px 2px`.
fn collapse_four_values(properties: &mut [Property], ctx: &Context) {
    for property in properties.iter_mut() {
        let four_values = property
            .descriptor
            .is_some_and(|id| ctx.registry.descriptor(id).restore == Some(RestoreKind::FourValues));
        if property.unused
            || !four_values
            || property.hack != Hack::None
            || property.multiplex
            || !property.is_analysed_shorthand()
        {
            continue;
        }
        if let Some(value) = restore(property, ctx)
            && value.len() < property.value.len()
            && verify(property, &value, ctx)
        {
            property.value = value;
            property.dirty = true;
        }
    }
}
