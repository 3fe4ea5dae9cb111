//! Splitting shorthand values into their components.
//!
//! Every splitter either classifies the whole value or gives up; a value
//! it gives up on is left as it is by the callers.

use crate::context::Context;
use crate::property::Property;
use crate::registry::{BreakUpKind, Descriptor};

/// Components of `property` in canonical order, or `None` when the value
/// cannot be classified.
pub fn break_up(property: &Property, ctx: &Context) -> Option<Vec<Property>> {
    let descriptor = ctx.registry.descriptor(property.descriptor?);
    let kind = descriptor.break_up?;
    if property.dynamic {
        return None;
    }

    let values = if property.value.len() == 1 && ctx.validator.is_global(&property.value[0]) {
        vec![property.value.clone(); descriptor.components.len()]
    } else {
        match kind {
            BreakUpKind::FourValues => four_values(&property.value)?,
            BreakUpKind::BorderRadius => border_radius(&property.value)?,
            BreakUpKind::Background => background(&property.value, ctx)?,
            BreakUpKind::Border => border(&property.value, descriptor, ctx)?,
            BreakUpKind::ListStyle => list_style(&property.value, ctx)?,
        }
    };

    descriptor
        .components
        .iter()
        .zip(values)
        .map(|(&id, value)| Property::component_of(property, ctx.registry.descriptor(id).name, value, ctx))
        .collect()
}

fn is_separator(token: &str) -> bool {
    token == "," || token == "/"
}

/// `a` → `a a a a`, `a b` → `a b a b`, `a b c` → `a b c b`.
pub fn four_values(tokens: &[String]) -> Option<Vec<Vec<String>>> {
    if tokens.is_empty() || tokens.len() > 4 || tokens.iter().any(|t| is_separator(t)) {
        return None;
    }
    let top = tokens[0].clone();
    let right = tokens.get(1).cloned().unwrap_or_else(|| top.clone());
    let bottom = tokens.get(2).cloned().unwrap_or_else(|| top.clone());
    let left = tokens.get(3).cloned().unwrap_or_else(|| right.clone());
    Some(vec![vec![top], vec![right], vec![bottom], vec![left]])
}

/// Horizontal radii, then optionally `/` and vertical radii. A corner with a
/// distinct vertical radius gets a two-token value.
fn border_radius(tokens: &[String]) -> Option<Vec<Vec<String>>> {
    let (horizontal, vertical) = match tokens.iter().position(|t| t == "/") {
        Some(slash) => (&tokens[..slash], Some(&tokens[slash + 1..])),
        None => (tokens, None),
    };
    let horizontal = four_values(horizontal)?;
    let Some(vertical) = vertical else {
        return Some(horizontal);
    };
    let vertical = four_values(vertical)?;
    Some(
        horizontal
            .into_iter()
            .zip(vertical)
            .map(|(mut h, v)| {
                if h != v {
                    h.extend(v);
                }
                h
            })
            .collect(),
    )
}

#[derive(Default)]
struct Layer {
    image: Option<String>,
    position: Vec<String>,
    size: Vec<String>,
    repeat: Vec<String>,
    attachment: Option<String>,
    boxes: Vec<String>,
    color: Option<String>,
}

fn background_layer(tokens: &[String], ctx: &Context) -> Option<Layer> {
    let v = &ctx.validator;
    let mut layer = Layer::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];
        if token == "/" {
            if layer.position.is_empty() || !layer.size.is_empty() {
                return None;
            }
            i += 1;
            while i < tokens.len() && layer.size.len() < 2 && v.is_background_size(&tokens[i]) {
                layer.size.push(tokens[i].clone());
                i += 1;
            }
            if layer.size.is_empty() {
                return None;
            }
            continue;
        }
        if layer.image.is_none() && v.is_image(token) {
            layer.image = Some(token.clone());
        } else if layer.attachment.is_none() && v.is_background_attachment(token) {
            layer.attachment = Some(token.clone());
        } else if layer.boxes.len() < 2 && v.is_background_box(token) {
            layer.boxes.push(token.clone());
        } else if layer.repeat.is_empty() && v.is_background_repeat(token) {
            layer.repeat.push(token.clone());
            if tokens.get(i + 1).is_some_and(|next| v.is_background_repeat(next)) {
                i += 1;
                layer.repeat.push(tokens[i].clone());
            }
        } else if layer.position.is_empty() && v.is_background_position(token) {
            while i < tokens.len() && layer.position.len() < 4 && v.is_background_position(&tokens[i]) {
                layer.position.push(tokens[i].clone());
                i += 1;
            }
            continue;
        } else if layer.color.is_none() && v.is_color(token) {
            layer.color = Some(token.clone());
        } else {
            return None;
        }
        i += 1;
    }
    Some(layer)
}

/// `background`: comma-separated layers, each classified token by token.
/// Only the last layer may carry a color.
fn background(tokens: &[String], ctx: &Context) -> Option<Vec<Vec<String>>> {
    let groups: Vec<&[String]> = tokens.split(|t| t == ",").collect();
    if groups.iter().any(|g| g.is_empty()) {
        return None;
    }
    let layers = groups
        .iter()
        .map(|group| background_layer(group, ctx))
        .collect::<Option<Vec<_>>>()?;
    let last = layers.len() - 1;
    if layers[..last].iter().any(|layer| layer.color.is_some()) {
        return None;
    }

    let default = |name: &str| -> Vec<String> {
        ctx.registry
            .get(name)
            .map(Descriptor::default_tokens)
            .unwrap_or_default()
    };
    let join = |parts: Vec<Vec<String>>| -> Vec<String> {
        let mut joined = Vec::new();
        for (i, part) in parts.into_iter().enumerate() {
            if i > 0 {
                joined.push(",".to_string());
            }
            joined.extend(part);
        }
        joined
    };
    let per_layer = |name: &str, pick: &dyn Fn(&Layer) -> Option<Vec<String>>| -> Vec<String> {
        join(layers.iter().map(|l| pick(l).unwrap_or_else(|| default(name))).collect())
    };
    let non_empty = |values: &Vec<String>| (!values.is_empty()).then(|| values.clone());

    Some(vec![
        per_layer("background-image", &|l| l.image.clone().map(|i| vec![i])),
        per_layer("background-position", &|l| non_empty(&l.position)),
        per_layer("background-size", &|l| non_empty(&l.size)),
        per_layer("background-repeat", &|l| non_empty(&l.repeat)),
        per_layer("background-attachment", &|l| l.attachment.clone().map(|a| vec![a])),
        per_layer("background-origin", &|l| l.boxes.first().map(|b| vec![b.clone()])),
        per_layer("background-clip", &|l| l.boxes.last().map(|b| vec![b.clone()])),
        layers[last]
            .color
            .clone()
            .map(|c| vec![c])
            .unwrap_or_else(|| default("background-color")),
    ])
}

/// `border`, `border-<side>` and `outline`: any order, one token per slot.
/// A token fitting no slot is taken as the color.
fn border(tokens: &[String], descriptor: &Descriptor, ctx: &Context) -> Option<Vec<Vec<String>>> {
    let v = &ctx.validator;
    if tokens.len() > 3 || tokens.iter().any(|t| is_separator(t)) {
        return None;
    }
    let (mut width, mut style, mut color) = (None, None, None);
    let mut leftovers = Vec::new();
    for token in tokens {
        if width.is_none() && v.is_width(token) {
            width = Some(token.clone());
        } else if style.is_none() && v.is_style_keyword(token) {
            style = Some(token.clone());
        } else if color.is_none() && v.is_color(token) {
            color = Some(token.clone());
        } else {
            leftovers.push(token.clone());
        }
    }
    match leftovers.len() {
        0 => {}
        1 if color.is_none() => color = leftovers.pop(),
        _ => return None,
    }

    descriptor
        .components
        .iter()
        .map(|&id| {
            let component = ctx.registry.descriptor(id);
            let slot = if component.name.ends_with("-width") {
                &width
            } else if component.name.ends_with("-style") {
                &style
            } else {
                &color
            };
            Some(
                slot.as_ref()
                    .map(|value| vec![value.clone()])
                    .unwrap_or_else(|| component.default_tokens()),
            )
        })
        .collect()
}

/// `list-style`: type, position and image, in component order.
fn list_style(tokens: &[String], ctx: &Context) -> Option<Vec<Vec<String>>> {
    let v = &ctx.validator;
    if tokens.len() > 3 {
        return None;
    }
    let (mut kind, mut position, mut image) = (None, None, None);
    for token in tokens {
        if position.is_none() && v.is_list_style_position(token) {
            position = Some(token.clone());
        } else if kind.is_none() && v.is_list_style_type(token) {
            kind = Some(token.clone());
        } else if image.is_none() && v.is_image(token) {
            image = Some(token.clone());
        } else {
            return None;
        }
    }
    let or_default = |slot: Option<String>, name: &str| {
        slot.map(|value| vec![value]).unwrap_or_else(|| {
            ctx.registry
                .get(name)
                .map(Descriptor::default_tokens)
                .unwrap_or_default()
        })
    };
    Some(vec![
        or_default(kind, "list-style-type"),
        or_default(position, "list-style-position"),
        or_default(image, "list-style-image"),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Config;
    use css::Declaration;

    fn components(name: &str, value: &[&str]) -> Option<Vec<(String, Vec<String>)>> {
        let config = Config::default();
        let ctx = Context::new(&config);
        let property = Property::wrap(&Declaration::new(name, value), 0, &ctx);
        break_up(&property, &ctx).map(|cs| cs.into_iter().map(|c| (c.name, c.value)).collect())
    }

    fn values(name: &str, value: &[&str]) -> Vec<String> {
        components(name, value)
            .unwrap()
            .into_iter()
            .map(|(_, v)| v.join(" "))
            .collect()
    }

    #[test]
    fn test_four_values_expansion() {
        assert_eq!(values("margin", &["1px"]), vec!["1px", "1px", "1px", "1px"]);
        assert_eq!(values("margin", &["1px", "2px"]), vec!["1px", "2px", "1px", "2px"]);
        assert_eq!(values("margin", &["1px", "2px", "3px"]), vec!["1px", "2px", "3px", "2px"]);
        assert_eq!(
            values("padding", &["1px", "2px", "3px", "4px"]),
            vec!["1px", "2px", "3px", "4px"]
        );
    }

    #[test]
    fn test_four_values_malformed() {
        assert!(components("margin", &["1px", "2px", "3px", "4px", "5px"]).is_none());
        assert!(components("margin", &["1px", ",", "2px"]).is_none());
    }

    #[test]
    fn test_inherit_fills_every_component() {
        assert_eq!(values("margin", &["inherit"]), vec!["inherit"; 4]);
        assert_eq!(values("border", &["inherit"]), vec!["inherit"; 3]);
    }

    #[test]
    fn test_border_radius_with_vertical_radii() {
        assert_eq!(
            values("border-radius", &["1px", "2px", "/", "3px"]),
            vec!["1px 3px", "2px 3px", "1px 3px", "2px 3px"]
        );
        assert_eq!(values("border-radius", &["1px", "/", "1px"]), vec!["1px"; 4]);
    }

    #[test]
    fn test_border_any_order() {
        assert_eq!(values("border", &["red", "1px", "solid"]), vec!["1px", "solid", "red"]);
        assert_eq!(values("border", &["solid"]), vec!["medium", "solid", "currentcolor"]);
        assert_eq!(values("outline", &["invert", "thin"]), vec!["invert", "none", "thin"]);
    }

    #[test]
    fn test_border_rejects_two_unknowns() {
        assert!(components("border", &["foo", "bar"]).is_none());
        assert!(components("border", &["1px", "2px", "solid", "red"]).is_none());
    }

    #[test]
    fn test_background_single_layer() {
        assert_eq!(
            values("background", &["url(a.png)", "no-repeat", "center", "/", "cover", "fixed", "red"]),
            vec!["url(a.png)", "center", "cover", "no-repeat", "fixed", "padding-box", "border-box", "red"]
        );
        assert_eq!(
            values("background", &["0"]),
            vec!["none", "0", "auto", "repeat", "scroll", "padding-box", "border-box", "transparent"]
        );
    }

    #[test]
    fn test_background_boxes() {
        let one = values("background", &["content-box"]);
        assert_eq!(one[5], "content-box");
        assert_eq!(one[6], "content-box");
        let two = values("background", &["padding-box", "content-box"]);
        assert_eq!(two[5], "padding-box");
        assert_eq!(two[6], "content-box");
    }

    #[test]
    fn test_background_layers() {
        let vs = values("background", &["url(a)", ",", "url(b)", "red"]);
        assert_eq!(vs[0], "url(a) , url(b)");
        assert_eq!(vs[1], "0 0 , 0 0");
        assert_eq!(vs[7], "red");
        assert!(components("background", &["url(a)", "red", ",", "url(b)"]).is_none());
    }

    #[test]
    fn test_background_rejects_size_without_position() {
        assert!(components("background", &["/", "cover"]).is_none());
        assert!(components("background", &["url(a)", "bogus"]).is_none());
    }

    #[test]
    fn test_list_style() {
        assert_eq!(
            values("list-style", &["square", "inside"]),
            vec!["square", "inside", "none"]
        );
        assert_eq!(
            values("list-style", &["url(x.png)"]),
            vec!["__hack", "outside", "url(x.png)"]
        );
        assert!(components("list-style", &["bogus"]).is_none());
    }
}
