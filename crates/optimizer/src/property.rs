//! Declarations as the property optimizer sees them.
//!
//! A [`Property`] is a declaration plus bookkeeping: whether a later pass
//! has marked it dead, whether its value was regenerated, and, for
//! shorthands, the component declarations its value expands to.

use css::{Declaration, Hack};

use crate::break_up::break_up;
use crate::context::Context;
use crate::registry::DescriptorId;

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub value: Vec<String>,
    pub important: bool,
    pub hack: Hack,
    /// Components in canonical order; empty for longhands and for shorthands
    /// whose value could not be split.
    pub components: Vec<Property>,
    /// Dead; dropped when unwrapping.
    pub unused: bool,
    /// `value` was regenerated from `components`.
    pub dirty: bool,
    /// The value holds comma-separated layers.
    pub multiplex: bool,
    pub shorthand: bool,
    /// A component whose value does not matter for the output; see
    /// `restore::four_values`.
    pub irrelevant: bool,
    /// The value references a custom property and cannot be analysed.
    pub dynamic: bool,
    /// Index of the source declaration inside its rule.
    pub position: usize,
    pub descriptor: Option<DescriptorId>,
}

impl Property {
    /// Wrap a declaration, splitting shorthand values into components.
    pub fn wrap(declaration: &Declaration, position: usize, ctx: &Context) -> Self {
        let mut property = Self::bare(
            &declaration.name,
            declaration.value.clone(),
            declaration.important,
            declaration.hack.clone(),
            position,
            ctx,
        );
        property.populate_components(ctx);
        property
    }

    /// A component of `parent` named `name`, split further when it is itself a
    /// shorthand. `None` when that split fails.
    pub fn component_of(parent: &Property, name: &str, value: Vec<String>, ctx: &Context) -> Option<Self> {
        let mut component = Self::bare(
            name,
            value,
            parent.important,
            parent.hack.clone(),
            parent.position,
            ctx,
        );
        if component.shorthand {
            component.components = break_up(&component, ctx)?;
        }
        Some(component)
    }

    fn bare(name: &str, value: Vec<String>, important: bool, hack: Hack, position: usize, ctx: &Context) -> Self {
        let descriptor = ctx.registry.id(name);
        let shorthand = descriptor.is_some_and(|id| ctx.registry.descriptor(id).is_shorthand());
        Self {
            name: name.to_string(),
            multiplex: value.iter().any(|t| t == ","),
            dynamic: value.iter().any(|t| ctx.validator.is_variable(t)),
            value,
            important,
            hack,
            components: Vec::new(),
            unused: false,
            dirty: false,
            shorthand,
            irrelevant: false,
            position,
            descriptor,
        }
    }

    fn populate_components(&mut self, ctx: &Context) {
        if self.shorthand && !self.dynamic {
            self.components = break_up(self, ctx).unwrap_or_default();
        }
    }

    /// A shorthand whose components are known.
    pub fn is_analysed_shorthand(&self) -> bool {
        self.shorthand && !self.components.is_empty()
    }

    /// Depth-first search for a (possibly nested) component.
    pub fn find_component(&self, name: &str) -> Option<&Property> {
        self.components.iter().find_map(|component| {
            if component.name == name {
                Some(component)
            } else {
                component.find_component(name)
            }
        })
    }

    pub fn find_component_mut(&mut self, name: &str) -> Option<&mut Property> {
        for component in &mut self.components {
            if component.name == name {
                return Some(component);
            }
            if let Some(found) = component.find_component_mut(name) {
                return Some(found);
            }
        }
        None
    }

    /// The longhand components, flattened; just `self` for a longhand.
    pub fn leaves(&self) -> Vec<&Property> {
        if self.components.is_empty() {
            return vec![self];
        }
        self.components.iter().flat_map(Property::leaves).collect()
    }

    /// Names of every longhand this property sets.
    pub fn leaf_names(&self, ctx: &Context) -> Vec<&str> {
        match self.descriptor {
            Some(id) => ctx
                .registry
                .descriptor(id)
                .leaves
                .iter()
                .map(|&leaf| ctx.registry.descriptor(leaf).name)
                .collect(),
            None => vec![self.name.as_str()],
        }
    }

    /// Do the two properties set any longhand in common?
    pub fn touches(&self, other: &Property, ctx: &Context) -> bool {
        let theirs = other.leaf_names(ctx);
        self.leaf_names(ctx).iter().any(|name| theirs.contains(name))
    }

    pub fn is_inherit(&self) -> bool {
        self.value.len() == 1 && self.value[0].eq_ignore_ascii_case("inherit")
    }

    /// Replace the value of every component, recursively.
    pub fn set_all_components(&mut self, value: &[String]) {
        for component in &mut self.components {
            component.value = value.to_vec();
            component.set_all_components(value);
        }
    }

    pub fn to_declaration(&self) -> Declaration {
        Declaration {
            name: self.name.clone(),
            value: self.value.clone(),
            important: self.important,
            hack: self.hack.clone(),
        }
    }
}

pub fn wrap_all(declarations: &[Declaration], ctx: &Context) -> Vec<Property> {
    declarations
        .iter()
        .enumerate()
        .map(|(position, declaration)| Property::wrap(declaration, position, ctx))
        .collect()
}

/// Back to declarations, dropping unused properties.
pub fn unwrap_all(properties: &[Property]) -> Vec<Declaration> {
    properties
        .iter()
        .filter(|p| !p.unused)
        .map(Property::to_declaration)
        .collect()
}
