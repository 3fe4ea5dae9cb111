//! Replacing a full set of longhands with their shorthand.

use css::{Hack, serialize_declaration};
use log::trace;

use crate::context::Context;
use crate::property::Property;
use crate::registry::{Descriptor, RestoreKind};
use crate::restore::{restore, verify};

/// Merge order: four-value groups before the shorthands built on top of
/// them, so twelve `border-*-*` longhands end up as a single `border`.
fn merge_rank(descriptor: &Descriptor, ctx: &Context) -> u8 {
    let nested = descriptor
        .components
        .iter()
        .any(|&id| ctx.registry.descriptor(id).is_shorthand());
    match descriptor.restore {
        _ if nested => 2,
        Some(RestoreKind::FourValues | RestoreKind::BorderRadius) => 0,
        _ => 1,
    }
}

pub fn merge_into_shorthands(properties: &mut Vec<Property>, ctx: &Context) {
    if !ctx.compat().properties.merging {
        return;
    }
    let mut shorthands: Vec<&Descriptor> = ctx.registry.shorthands().collect();
    shorthands.sort_by_key(|d| (merge_rank(d, ctx), d.id));
    for descriptor in shorthands {
        if let Some(at) = merge(properties, descriptor, ctx) {
            trace!("merged components into `{}` at {}", descriptor.name, at);
        }
    }
}

/// Merge the last live occurrence of every component of `descriptor`.
/// Returns the index of the new shorthand.
fn merge(properties: &mut Vec<Property>, descriptor: &Descriptor, ctx: &Context) -> Option<usize> {
    let mut candidates = Vec::with_capacity(descriptor.components.len());
    for &id in &descriptor.components {
        let name = ctx.registry.descriptor(id).name;
        candidates.push(properties.iter().rposition(|p| !p.unused && p.name == name)?);
    }
    let parts: Vec<&Property> = candidates.iter().map(|&at| &properties[at]).collect();
    let important = parts[0].important;
    let compat = ctx.compat();
    for part in &parts {
        let blocked = match part.name.as_str() {
            "background-size" => !compat.properties.background_size_merging,
            "background-origin" => !compat.properties.background_origin_merging,
            "background-clip" => !compat.properties.background_clip_merging,
            _ => false,
        };
        let sentinel = part
            .descriptor
            .and_then(|id| ctx.registry.descriptor(id).non_mergeable_value)
            .is_some_and(|value| part.value.len() == 1 && part.value[0] == value);
        if blocked
            || sentinel
            || part.important != important
            || part.hack != Hack::None
            || part.dynamic
            || part.multiplex
            || (part.shorthand && !part.is_analysed_shorthand())
            || ctx.options.skips(&part.name)
        {
            return None;
        }
    }

    let first = *candidates.iter().min()?;
    let last = *candidates.iter().max()?;
    let leaves: Vec<&str> = descriptor
        .leaves
        .iter()
        .map(|&id| ctx.registry.descriptor(id).name)
        .collect();
    let interleaved = (first..=last).any(|at| {
        let p = &properties[at];
        !candidates.contains(&at) && !p.unused && p.leaf_names(ctx).iter().any(|name| leaves.contains(name))
    });
    if interleaved {
        return None;
    }

    let (shorthand, extras) = assemble(descriptor, &parts, properties[last].position, ctx)?;
    let before: usize = parts.iter().map(|p| serialize_declaration(&p.to_declaration()).len()).sum();
    let after: usize = std::iter::once(&shorthand)
        .chain(&extras)
        .map(|p| serialize_declaration(&p.to_declaration()).len())
        .sum();
    if after >= before {
        return None;
    }

    for &at in &candidates {
        properties[at].unused = true;
    }
    properties[last] = shorthand;
    properties.splice(last + 1..last + 1, extras);
    Some(last)
}

/// Build the shorthand plus any explicit `inherit` longhands that must
/// follow it.
fn assemble(
    descriptor: &Descriptor,
    parts: &[&Property],
    position: usize,
    ctx: &Context,
) -> Option<(Property, Vec<Property>)> {
    let template = Property {
        name: descriptor.name.to_string(),
        value: Vec::new(),
        important: parts[0].important,
        hack: Hack::None,
        components: parts.iter().map(|&p| p.clone()).collect(),
        unused: false,
        dirty: true,
        multiplex: false,
        shorthand: true,
        irrelevant: false,
        dynamic: false,
        position,
        descriptor: Some(descriptor.id),
    };
    let inherits = |p: &Property| p.leaves().iter().all(|leaf| leaf.is_inherit());
    let inheriting: Vec<usize> = (0..parts.len()).filter(|&i| inherits(parts[i])).collect();

    if inheriting.len() == parts.len() {
        return Some((
            Property {
                value: vec!["inherit".to_string()],
                ..template
            },
            Vec::new(),
        ));
    }

    let finish = |mut shorthand: Property| -> Option<(Property, Vec<Property>)> {
        let value = restore(&shorthand, ctx)?;
        if !verify(&shorthand, &value, ctx) {
            return None;
        }
        shorthand.value = value;
        let extras = inheriting
            .iter()
            .map(|&i| Property {
                position,
                ..parts[i].clone()
            })
            .collect();
        Some((shorthand, extras))
    };

    if inheriting.is_empty() {
        return finish(template);
    }

    // The inheriting components are overridden right after the shorthand, so
    // they may take whatever value restores shortest.
    let mut with_defaults = template.clone();
    for &i in &inheriting {
        let component = &mut with_defaults.components[i];
        let default = ctx.registry.descriptor(component.descriptor?).default_tokens();
        *component = Property::component_of(&template, &component.name, default, ctx)?;
    }
    let mut candidates = vec![finish(with_defaults.clone())];
    if descriptor.restore == Some(RestoreKind::FourValues) {
        let mut with_partners = with_defaults;
        for &i in &inheriting {
            with_partners.components[i].irrelevant = true;
        }
        candidates.push(finish(with_partners));
    }
    candidates
        .into_iter()
        .flatten()
        .min_by_key(|(shorthand, extras)| {
            std::iter::once(shorthand)
                .chain(extras)
                .map(|p| serialize_declaration(&p.to_declaration()).len())
                .sum::<usize>()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compat::CompatibilityProfile;
    use crate::options::Config;
    use crate::property::{unwrap_all, wrap_all};
    use css::{parse_declaration_list, serialize_body};

    fn merge_with(config: &Config, body: &str) -> String {
        let ctx = Context::new(config);
        let mut properties = wrap_all(&parse_declaration_list(body), &ctx);
        merge_into_shorthands(&mut properties, &ctx);
        serialize_body(&unwrap_all(&properties))
    }

    fn merged(body: &str) -> String {
        merge_with(&Config::default(), body)
    }

    #[test]
    fn test_margin_longhands() {
        assert_eq!(
            merged("margin-top:10px;margin-right:5px;margin-bottom:3px;margin-left:2px"),
            "margin:10px 5px 3px 2px"
        );
        assert_eq!(
            merged("padding-top:1px;padding-right:1px;padding-bottom:1px;padding-left:1px"),
            "padding:1px"
        );
    }

    #[test]
    fn test_incomplete_set_is_left_alone() {
        assert_eq!(
            merged("margin-top:1px;margin-right:1px;margin-bottom:1px"),
            "margin-top:1px;margin-right:1px;margin-bottom:1px"
        );
    }

    #[test]
    fn test_mixed_importance_is_left_alone() {
        let body = "margin-top:1px!important;margin-right:1px;margin-bottom:1px;margin-left:1px";
        assert_eq!(merged(body), body);
    }

    #[test]
    fn test_shorthand_lands_at_last_component() {
        assert_eq!(
            merged("margin-top:1px;color:red;margin-right:1px;margin-bottom:1px;margin-left:1px"),
            "color:red;margin:1px"
        );
    }

    #[test]
    fn test_interleaved_related_property_blocks() {
        let body = "margin-top:1px;margin-right:1px;margin:2px!important;margin-bottom:1px;margin-left:1px";
        assert_eq!(merged(body), body);
    }

    #[test]
    fn test_nested_border() {
        let body = [
            "border-top-width:1px",
            "border-right-width:1px",
            "border-bottom-width:1px",
            "border-left-width:1px",
            "border-top-style:solid",
            "border-right-style:solid",
            "border-bottom-style:solid",
            "border-left-style:solid",
            "border-top-color:red",
            "border-right-color:red",
            "border-bottom-color:red",
            "border-left-color:red",
        ]
        .join(";");
        assert_eq!(merged(&body), "border:1px solid red");
    }

    #[test]
    fn test_border_side() {
        assert_eq!(
            merged("border-top-width:1px;border-top-style:solid;border-top-color:red"),
            "border-top:1px solid red"
        );
    }

    #[test]
    fn test_all_inherit() {
        assert_eq!(
            merged("margin-top:inherit;margin-right:inherit;margin-bottom:inherit;margin-left:inherit"),
            "margin:inherit"
        );
    }

    #[test]
    fn test_partial_inherit_uses_partner_values() {
        assert_eq!(
            merged("margin-top:inherit;margin-right:1px;margin-bottom:2px;margin-left:1px"),
            "margin:2px 1px;margin-top:inherit"
        );
    }

    #[test]
    fn test_merging_disabled_by_profile() {
        let mut profile = CompatibilityProfile::default();
        profile.properties.merging = false;
        let config = Config::new(profile, Default::default());
        let body = "margin-top:1px;margin-right:1px;margin-bottom:1px;margin-left:1px";
        assert_eq!(merge_with(&config, body), body);
    }

    #[test]
    fn test_list_style() {
        assert_eq!(
            merged("list-style-type:square;list-style-position:inside;list-style-image:none"),
            "list-style:square inside"
        );
    }
}
