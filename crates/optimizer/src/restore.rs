//! Reassembling shorthand values from their components.
//!
//! The inverse of `break_up`: components equal to their defaults are
//! omitted and the shortest equivalent form is picked. Restoring fails
//! (`None`) when the components cannot be expressed by the shorthand, e.g. a
//! `border` whose sides differ.

use crate::context::Context;
use crate::property::Property;
use crate::registry::RestoreKind;

pub fn restore(property: &Property, ctx: &Context) -> Option<Vec<String>> {
    let descriptor = ctx.registry.descriptor(property.descriptor?);
    let kind = descriptor.restore?;
    if property.components.is_empty() {
        return None;
    }

    let leaves = property.leaves();
    if let Some(first) = leaves.first().map(|leaf| &leaf.value)
        && first.len() == 1
        && ctx.validator.is_global(&first[0])
        && leaves.iter().all(|leaf| &leaf.value == first)
    {
        return Some(first.clone());
    }
    if leaves
        .iter()
        .any(|leaf| leaf.value.iter().any(|t| ctx.validator.is_global(t)))
    {
        return None;
    }

    match kind {
        RestoreKind::FourValues => four_values(&property.components, ctx),
        RestoreKind::BorderRadius => border_radius(&property.components),
        RestoreKind::Background => background(&property.components, ctx),
        RestoreKind::WithoutDefaults => without_defaults(property, ctx),
    }
}

/// The opposite side: top ↔ bottom, right ↔ left.
fn partner(index: usize) -> usize {
    (index + 2) % 4
}

/// Component values with irrelevant ones replaced by their partner's value,
/// or by their default when the partner is irrelevant too.
fn relevant_values(components: &[Property], ctx: &Context) -> Vec<Vec<String>> {
    components
        .iter()
        .enumerate()
        .map(|(i, component)| {
            if !component.irrelevant {
                return component.value.clone();
            }
            let other = &components[partner(i)];
            if !other.irrelevant {
                other.value.clone()
            } else {
                component
                    .descriptor
                    .map(|id| ctx.registry.descriptor(id).default_tokens())
                    .unwrap_or_else(|| component.value.clone())
            }
        })
        .collect()
}

/// Pick the shortest of the 1, 2, 3 and 4 value forms.
pub fn collapse_four<T: PartialEq + Clone>(values: &[T]) -> Vec<T> {
    let [top, right, bottom, left] = values else {
        return values.to_vec();
    };
    if right != left {
        vec![top.clone(), right.clone(), bottom.clone(), left.clone()]
    } else if top != bottom {
        vec![top.clone(), right.clone(), bottom.clone()]
    } else if top != right {
        vec![top.clone(), right.clone()]
    } else {
        vec![top.clone()]
    }
}

fn four_values(components: &[Property], ctx: &Context) -> Option<Vec<String>> {
    if components.len() != 4 {
        return None;
    }
    let values = relevant_values(components, ctx);
    if values.iter().any(|v| v.len() != 1) {
        return None;
    }
    Some(collapse_four(&values).into_iter().flatten().collect())
}

fn border_radius(components: &[Property]) -> Option<Vec<String>> {
    if components.len() != 4 {
        return None;
    }
    let mut horizontal = Vec::with_capacity(4);
    let mut vertical = Vec::with_capacity(4);
    for component in components {
        match component.value.as_slice() {
            [h] => {
                horizontal.push(h.clone());
                vertical.push(h.clone());
            }
            [h, v] => {
                horizontal.push(h.clone());
                vertical.push(v.clone());
            }
            _ => return None,
        }
    }
    let mut value = collapse_four(&horizontal);
    if vertical != horizontal {
        value.push("/".to_string());
        value.extend(collapse_four(&vertical));
    }
    Some(value)
}

fn layers(value: &[String]) -> Vec<Vec<String>> {
    value.split(|t| t == ",").map(<[String]>::to_vec).collect()
}

fn background(components: &[Property], ctx: &Context) -> Option<Vec<String>> {
    let find = |name: &str| components.iter().find(|c| c.name == name);
    let image = layers(&find("background-image")?.value);
    let count = image.len();
    let per_layer = |name: &str| -> Option<Vec<Vec<String>>> {
        let split = layers(&find(name)?.value);
        (split.len() == count).then_some(split)
    };
    let position = per_layer("background-position")?;
    let size = per_layer("background-size")?;
    let repeat = per_layer("background-repeat")?;
    let attachment = per_layer("background-attachment")?;
    let origin = per_layer("background-origin")?;
    let clip = per_layer("background-clip")?;
    let color = &find("background-color")?.value;

    let default = |name: &str| {
        ctx.registry
            .get(name)
            .map(|d| d.default_tokens())
            .unwrap_or_default()
    };
    let (default_position, default_size) = (default("background-position"), default("background-size"));
    let (default_origin, default_clip) = (default("background-origin"), default("background-clip"));

    let mut value = Vec::new();
    for i in 0..count {
        let mut layer = Vec::new();
        if image[i] != default("background-image") {
            layer.extend(image[i].iter().cloned());
        }
        if size[i] != default_size {
            layer.extend(position[i].iter().cloned());
            layer.push("/".to_string());
            layer.extend(size[i].iter().cloned());
        } else if position[i] != default_position {
            layer.extend(position[i].iter().cloned());
        }
        if repeat[i] != default("background-repeat") {
            layer.extend(repeat[i].iter().cloned());
        }
        if attachment[i] != default("background-attachment") {
            layer.extend(attachment[i].iter().cloned());
        }
        if origin[i] != default_origin || clip[i] != default_clip {
            layer.extend(origin[i].iter().cloned());
            if clip[i] != origin[i] {
                layer.extend(clip[i].iter().cloned());
            }
        }
        if i == count - 1 && *color != default("background-color") {
            layer.extend(color.iter().cloned());
        }
        if layer.is_empty() {
            layer = default_position.clone();
        }
        if i > 0 {
            value.push(",".to_string());
        }
        value.extend(layer);
    }
    Some(value)
}

/// Non-default components in canonical order. Nested shorthands must
/// collapse to a single token.
fn without_defaults(property: &Property, ctx: &Context) -> Option<Vec<String>> {
    let mut value = Vec::new();
    for component in &property.components {
        let tokens = if component.is_analysed_shorthand() {
            let restored = restore(component, ctx)?;
            if restored.len() != 1 {
                return None;
            }
            restored
        } else {
            component.value.clone()
        };
        let is_default = component
            .descriptor
            .is_some_and(|id| ctx.registry.descriptor(id).default_tokens() == tokens);
        if !is_default {
            value.extend(tokens);
        }
    }
    if value.is_empty() {
        let descriptor = ctx.registry.descriptor(property.descriptor?);
        return Some(descriptor.shortest_tokens());
    }
    Some(value)
}

/// Re-splitting `value` must give back the components of `property`.
/// Irrelevant components may come back with any value.
pub fn verify(property: &Property, value: &[String], ctx: &Context) -> bool {
    let reparsed = Property::wrap(
        &css::Declaration {
            name: property.name.clone(),
            value: value.to_vec(),
            important: property.important,
            hack: property.hack.clone(),
        },
        property.position,
        ctx,
    );
    if !reparsed.is_analysed_shorthand() {
        return false;
    }
    let (expected, actual) = (property.leaves(), reparsed.leaves());
    expected.len() == actual.len()
        && expected
            .iter()
            .zip(&actual)
            .all(|(e, a)| e.name == a.name && (e.irrelevant || e.value == a.value))
}
