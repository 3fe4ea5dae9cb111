//! The property descriptor registry.
//!
//! One immutable table describes every property the optimizer knows how to
//! compact: which longhands a shorthand stands for, the defaults those
//! longhands fall back to, and the strategies used to override, split and
//! reassemble values. Descriptors live in an arena and refer to each other
//! by index; the table is validated once when it is built.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::error::RegistryError;

/// Index of a descriptor inside the registry arena.
pub type DescriptorId = usize;

/// How to decide whether a later value may replace an earlier one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideKind {
    /// Only an identical value.
    SameValue,
    /// Numbers with units, then same-named functions.
    Unit,
    /// Like `Unit`, plus the listed keywords.
    UnitOrKeyword(&'static [&'static str]),
    /// The listed keywords.
    Keyword(&'static [&'static str]),
    Color,
    Image,
    /// A whole `border`-like value, compared per slot.
    Border,
    /// Space-separated `Unit`-or-position/size-keyword tokens, pairwise.
    Tokens,
}

/// How a shorthand value is split into its components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakUpKind {
    FourValues,
    BorderRadius,
    Background,
    /// Order-independent width/style/color scan (`border`, `outline`, ...).
    Border,
    ListStyle,
}

/// How components are put back together into a shorthand value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreKind {
    FourValues,
    BorderRadius,
    Background,
    /// Emit the non-default components in order.
    WithoutDefaults,
}

/// Static input describing one property.
#[derive(Debug, Clone, Copy)]
pub struct DescriptorSpec {
    pub name: &'static str,
    pub components: &'static [&'static str],
    pub can_override: OverrideKind,
    pub break_up: Option<BreakUpKind>,
    pub restore: Option<RestoreKind>,
    pub default_value: &'static str,
    pub shortest_value: Option<&'static str>,
    /// In a multi-layer shorthand, only the last layer carries this component.
    pub multiplex_last_only: bool,
    /// A value which must never be merged into the parent shorthand.
    pub non_mergeable_value: Option<&'static str>,
}

impl DescriptorSpec {
    pub const fn longhand(name: &'static str, can_override: OverrideKind, default_value: &'static str) -> Self {
        Self {
            name,
            components: &[],
            can_override,
            break_up: None,
            restore: None,
            default_value,
            shortest_value: None,
            multiplex_last_only: false,
            non_mergeable_value: None,
        }
    }

    pub const fn shorthand(
        name: &'static str,
        components: &'static [&'static str],
        codec: (BreakUpKind, RestoreKind),
        default_value: &'static str,
    ) -> Self {
        Self {
            name,
            components,
            can_override: OverrideKind::SameValue,
            break_up: Some(codec.0),
            restore: Some(codec.1),
            default_value,
            shortest_value: None,
            multiplex_last_only: false,
            non_mergeable_value: None,
        }
    }

    pub const fn shortest(mut self, value: &'static str) -> Self {
        self.shortest_value = Some(value);
        self
    }

    pub const fn overriding(mut self, kind: OverrideKind) -> Self {
        self.can_override = kind;
        self
    }

    pub const fn last_layer_only(mut self) -> Self {
        self.multiplex_last_only = true;
        self
    }

    pub const fn non_mergeable(mut self, value: &'static str) -> Self {
        self.non_mergeable_value = Some(value);
        self
    }
}

/// A validated descriptor.
#[derive(Debug, Clone)]
pub struct Descriptor {
    pub id: DescriptorId,
    pub name: &'static str,
    /// Direct components, in canonical order. Empty for longhands.
    pub components: Vec<DescriptorId>,
    /// Shorthands listing this property as a direct component.
    pub component_of: Vec<DescriptorId>,
    /// Every longhand this property sets; just itself for a longhand.
    pub leaves: Vec<DescriptorId>,
    pub can_override: OverrideKind,
    pub break_up: Option<BreakUpKind>,
    pub restore: Option<RestoreKind>,
    pub default_value: &'static str,
    pub shortest_value: &'static str,
    pub multiplex_last_only: bool,
    pub non_mergeable_value: Option<&'static str>,
}

impl Descriptor {
    pub fn is_shorthand(&self) -> bool {
        !self.components.is_empty()
    }

    /// The default value as value tokens.
    pub fn default_tokens(&self) -> Vec<String> {
        self.default_value.split(' ').map(str::to_string).collect()
    }

    pub fn shortest_tokens(&self) -> Vec<String> {
        self.shortest_value.split(' ').map(str::to_string).collect()
    }
}

/// The descriptor arena plus a by-name index.
#[derive(Debug)]
pub struct Registry {
    descriptors: Vec<Descriptor>,
    index: HashMap<&'static str, DescriptorId>,
}

static GLOBAL: LazyLock<Registry> = LazyLock::new(|| {
    // The table is static data; a broken reference is a bug, not input.
    Registry::build(DESCRIPTORS).expect("built-in property descriptor table is consistent")
});

impl Registry {
    /// Validate `specs` and build the arena.
    pub fn build(specs: &[DescriptorSpec]) -> Result<Self, RegistryError> {
        let mut index = HashMap::with_capacity(specs.len());
        for (id, spec) in specs.iter().enumerate() {
            if index.insert(spec.name, id).is_some() {
                return Err(RegistryError::DuplicateDescriptor(spec.name));
            }
        }

        let mut descriptors = Vec::with_capacity(specs.len());
        for (id, spec) in specs.iter().enumerate() {
            let components = spec
                .components
                .iter()
                .map(|&component| {
                    index
                        .get(component)
                        .copied()
                        .ok_or(RegistryError::UnknownComponent {
                            shorthand: spec.name,
                            component,
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;
            descriptors.push(Descriptor {
                id,
                name: spec.name,
                components,
                component_of: Vec::new(),
                leaves: Vec::new(),
                can_override: spec.can_override,
                break_up: spec.break_up,
                restore: spec.restore,
                default_value: spec.default_value,
                shortest_value: spec.shortest_value.unwrap_or(spec.default_value),
                multiplex_last_only: spec.multiplex_last_only,
                non_mergeable_value: spec.non_mergeable_value,
            });
        }

        for id in 0..descriptors.len() {
            for component in descriptors[id].components.clone() {
                descriptors[component].component_of.push(id);
            }
        }
        for id in 0..descriptors.len() {
            let mut leaves = Vec::new();
            collect_leaves(&descriptors, id, &mut leaves, 0);
            descriptors[id].leaves = leaves;
        }

        Ok(Self { descriptors, index })
    }

    /// The process-wide registry built from the built-in table.
    pub fn global() -> &'static Registry {
        &GLOBAL
    }

    pub fn id(&self, name: &str) -> Option<DescriptorId> {
        self.index.get(name).copied()
    }

    pub fn get(&self, name: &str) -> Option<&Descriptor> {
        self.id(name).map(|id| &self.descriptors[id])
    }

    pub fn descriptor(&self, id: DescriptorId) -> &Descriptor {
        &self.descriptors[id]
    }

    pub fn is_shorthand(&self, name: &str) -> bool {
        self.get(name).is_some_and(Descriptor::is_shorthand)
    }

    /// Longhand names set by `name`.
    pub fn leaf_names(&self, name: &str) -> Vec<&'static str> {
        self.get(name)
            .map(|d| d.leaves.iter().map(|&l| self.descriptors[l].name).collect())
            .unwrap_or_default()
    }

    /// Does `outer` set every longhand `inner` sets?
    pub fn covers(&self, outer: &str, inner: &str) -> bool {
        match (self.get(outer), self.get(inner)) {
            (Some(outer), Some(inner)) => {
                outer.id != inner.id && inner.leaves.iter().all(|l| outer.leaves.contains(l))
            }
            _ => false,
        }
    }

    pub fn shorthands(&self) -> impl Iterator<Item = &Descriptor> {
        self.descriptors.iter().filter(|d| d.is_shorthand())
    }
}

fn collect_leaves(descriptors: &[Descriptor], id: DescriptorId, out: &mut Vec<DescriptorId>, depth: usize) {
    let descriptor = &descriptors[id];
    if descriptor.components.is_empty() || depth > 8 {
        out.push(id);
        return;
    }
    for &component in &descriptor.components {
        collect_leaves(descriptors, component, out, depth + 1);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Built-in table
// ─────────────────────────────────────────────────────────────────────────────

use BreakUpKind as B;
use OverrideKind as O;
use RestoreKind as R;

const FOUR: (BreakUpKind, RestoreKind) = (B::FourValues, R::FourValues);
const BORDERISH: (BreakUpKind, RestoreKind) = (B::Border, R::WithoutDefaults);

const STYLES: &[&str] = &[
    "none", "hidden", "dotted", "dashed", "solid", "double", "groove", "ridge", "inset", "outset",
];
const WIDTHS: &[&str] = &["thin", "medium", "thick"];
const AUTO: &[&str] = &["auto"];
const NONE: &[&str] = &["none"];
const NORMAL: &[&str] = &["normal"];

/// Every property the optimizer understands. Order is irrelevant.
pub const DESCRIPTORS: &[DescriptorSpec] = &[
    // background
    DescriptorSpec::shorthand(
        "background",
        &[
            "background-image",
            "background-position",
            "background-size",
            "background-repeat",
            "background-attachment",
            "background-origin",
            "background-clip",
            "background-color",
        ],
        (B::Background, R::Background),
        "0 0",
    ),
    DescriptorSpec::longhand("background-attachment", O::Keyword(&["scroll", "fixed"]), "scroll"),
    DescriptorSpec::longhand("background-clip", O::Keyword(&["border-box", "padding-box", "content-box"]), "border-box"),
    DescriptorSpec::longhand("background-color", O::Color, "transparent")
        .last_layer_only()
        .non_mergeable("none"),
    DescriptorSpec::longhand("background-image", O::Image, "none"),
    DescriptorSpec::longhand("background-origin", O::Keyword(&["border-box", "padding-box", "content-box"]), "padding-box"),
    DescriptorSpec::longhand("background-position", O::Tokens, "0 0"),
    DescriptorSpec::longhand(
        "background-repeat",
        O::Keyword(&["repeat", "repeat-x", "repeat-y", "no-repeat"]),
        "repeat",
    ),
    DescriptorSpec::longhand("background-size", O::Tokens, "auto"),
    // border
    DescriptorSpec::shorthand("border", &["border-width", "border-style", "border-color"], BORDERISH, "none")
        .overriding(O::Border),
    DescriptorSpec::shorthand(
        "border-color",
        &["border-top-color", "border-right-color", "border-bottom-color", "border-left-color"],
        FOUR,
        "currentcolor",
    ),
    DescriptorSpec::shorthand(
        "border-style",
        &["border-top-style", "border-right-style", "border-bottom-style", "border-left-style"],
        FOUR,
        "none",
    ),
    DescriptorSpec::shorthand(
        "border-width",
        &["border-top-width", "border-right-width", "border-bottom-width", "border-left-width"],
        FOUR,
        "medium",
    )
    .shortest("0"),
    DescriptorSpec::shorthand(
        "border-top",
        &["border-top-width", "border-top-style", "border-top-color"],
        BORDERISH,
        "none",
    )
    .overriding(O::Border),
    DescriptorSpec::shorthand(
        "border-right",
        &["border-right-width", "border-right-style", "border-right-color"],
        BORDERISH,
        "none",
    )
    .overriding(O::Border),
    DescriptorSpec::shorthand(
        "border-bottom",
        &["border-bottom-width", "border-bottom-style", "border-bottom-color"],
        BORDERISH,
        "none",
    )
    .overriding(O::Border),
    DescriptorSpec::shorthand(
        "border-left",
        &["border-left-width", "border-left-style", "border-left-color"],
        BORDERISH,
        "none",
    )
    .overriding(O::Border),
    DescriptorSpec::longhand("border-top-color", O::Color, "currentcolor"),
    DescriptorSpec::longhand("border-right-color", O::Color, "currentcolor"),
    DescriptorSpec::longhand("border-bottom-color", O::Color, "currentcolor"),
    DescriptorSpec::longhand("border-left-color", O::Color, "currentcolor"),
    DescriptorSpec::longhand("border-top-style", O::Keyword(STYLES), "none"),
    DescriptorSpec::longhand("border-right-style", O::Keyword(STYLES), "none"),
    DescriptorSpec::longhand("border-bottom-style", O::Keyword(STYLES), "none"),
    DescriptorSpec::longhand("border-left-style", O::Keyword(STYLES), "none"),
    DescriptorSpec::longhand("border-top-width", O::UnitOrKeyword(WIDTHS), "medium").shortest("0"),
    DescriptorSpec::longhand("border-right-width", O::UnitOrKeyword(WIDTHS), "medium").shortest("0"),
    DescriptorSpec::longhand("border-bottom-width", O::UnitOrKeyword(WIDTHS), "medium").shortest("0"),
    DescriptorSpec::longhand("border-left-width", O::UnitOrKeyword(WIDTHS), "medium").shortest("0"),
    DescriptorSpec::shorthand(
        "border-radius",
        &[
            "border-top-left-radius",
            "border-top-right-radius",
            "border-bottom-right-radius",
            "border-bottom-left-radius",
        ],
        (B::BorderRadius, R::BorderRadius),
        "0",
    ),
    DescriptorSpec::longhand("border-top-left-radius", O::Tokens, "0"),
    DescriptorSpec::longhand("border-top-right-radius", O::Tokens, "0"),
    DescriptorSpec::longhand("border-bottom-right-radius", O::Tokens, "0"),
    DescriptorSpec::longhand("border-bottom-left-radius", O::Tokens, "0"),
    // list-style
    DescriptorSpec::shorthand(
        "list-style",
        &["list-style-type", "list-style-position", "list-style-image"],
        (B::ListStyle, R::WithoutDefaults),
        "outside",
    ),
    // The initial type depends on the element; the placeholder never
    // compares equal to a real value.
    DescriptorSpec::longhand(
        "list-style-type",
        O::Keyword(&["disc", "circle", "square", "decimal", "none", "lower-roman", "upper-roman", "lower-alpha", "upper-alpha"]),
        "__hack",
    ),
    DescriptorSpec::longhand("list-style-position", O::Keyword(&["inside", "outside"]), "outside"),
    DescriptorSpec::longhand("list-style-image", O::Image, "none"),
    // box model
    DescriptorSpec::shorthand("margin", &["margin-top", "margin-right", "margin-bottom", "margin-left"], FOUR, "0"),
    DescriptorSpec::longhand("margin-top", O::UnitOrKeyword(AUTO), "0"),
    DescriptorSpec::longhand("margin-right", O::UnitOrKeyword(AUTO), "0"),
    DescriptorSpec::longhand("margin-bottom", O::UnitOrKeyword(AUTO), "0"),
    DescriptorSpec::longhand("margin-left", O::UnitOrKeyword(AUTO), "0"),
    DescriptorSpec::shorthand(
        "padding",
        &["padding-top", "padding-right", "padding-bottom", "padding-left"],
        FOUR,
        "0",
    ),
    DescriptorSpec::longhand("padding-top", O::Unit, "0"),
    DescriptorSpec::longhand("padding-right", O::Unit, "0"),
    DescriptorSpec::longhand("padding-bottom", O::Unit, "0"),
    DescriptorSpec::longhand("padding-left", O::Unit, "0"),
    // outline
    DescriptorSpec::shorthand("outline", &["outline-color", "outline-style", "outline-width"], BORDERISH, "0")
        .overriding(O::Border),
    DescriptorSpec::longhand("outline-color", O::Color, "invert"),
    DescriptorSpec::longhand("outline-style", O::Keyword(STYLES), "none"),
    DescriptorSpec::longhand("outline-width", O::UnitOrKeyword(WIDTHS), "medium").shortest("0"),
    // plain longhands with override rules
    DescriptorSpec::longhand("bottom", O::UnitOrKeyword(AUTO), "auto"),
    DescriptorSpec::longhand("clear", O::Keyword(&["left", "right", "both", "none"]), "none"),
    DescriptorSpec::longhand("color", O::Color, "transparent"),
    DescriptorSpec::longhand(
        "cursor",
        O::Keyword(&["auto", "crosshair", "default", "help", "move", "pointer", "progress", "text", "wait"]),
        "auto",
    ),
    DescriptorSpec::longhand(
        "display",
        O::Keyword(&["block", "inline", "inline-block", "list-item", "none", "table", "table-cell", "table-row"]),
        "inline",
    ),
    DescriptorSpec::longhand("float", O::Keyword(&["left", "right", "none"]), "none"),
    DescriptorSpec::longhand(
        "font-size",
        O::UnitOrKeyword(&[
            "xx-small", "x-small", "small", "medium", "large", "x-large", "xx-large", "larger", "smaller",
        ]),
        "medium",
    ),
    DescriptorSpec::longhand("font-style", O::Keyword(&["normal", "italic", "oblique"]), "normal"),
    DescriptorSpec::longhand(
        "font-weight",
        O::UnitOrKeyword(&["normal", "bold", "bolder", "lighter"]),
        "normal",
    ),
    DescriptorSpec::longhand("height", O::UnitOrKeyword(AUTO), "auto"),
    DescriptorSpec::longhand("left", O::UnitOrKeyword(AUTO), "auto"),
    DescriptorSpec::longhand("letter-spacing", O::UnitOrKeyword(NORMAL), "normal"),
    DescriptorSpec::longhand("line-height", O::UnitOrKeyword(NORMAL), "normal"),
    DescriptorSpec::longhand("max-height", O::UnitOrKeyword(NONE), "none"),
    DescriptorSpec::longhand("max-width", O::UnitOrKeyword(NONE), "none"),
    DescriptorSpec::longhand("min-height", O::Unit, "0"),
    DescriptorSpec::longhand("min-width", O::Unit, "0"),
    DescriptorSpec::longhand("opacity", O::Unit, "1"),
    DescriptorSpec::longhand("overflow", O::Keyword(&["visible", "hidden", "scroll", "auto"]), "visible"),
    DescriptorSpec::longhand("position", O::Keyword(&["static", "relative", "absolute", "fixed"]), "static"),
    DescriptorSpec::longhand("right", O::UnitOrKeyword(AUTO), "auto"),
    DescriptorSpec::longhand("text-align", O::Keyword(&["left", "right", "center", "justify"]), "left"),
    DescriptorSpec::longhand(
        "text-decoration",
        O::Keyword(&["none", "underline", "overline", "line-through"]),
        "none",
    ),
    DescriptorSpec::longhand("text-indent", O::Unit, "0"),
    DescriptorSpec::longhand("top", O::UnitOrKeyword(AUTO), "auto"),
    DescriptorSpec::longhand(
        "vertical-align",
        O::UnitOrKeyword(&["baseline", "sub", "super", "text-top", "text-bottom", "middle", "top", "bottom"]),
        "baseline",
    ),
    DescriptorSpec::longhand("visibility", O::Keyword(&["visible", "hidden", "collapse"]), "visible"),
    DescriptorSpec::longhand(
        "white-space",
        O::Keyword(&["normal", "pre", "nowrap", "pre-wrap", "pre-line"]),
        "normal",
    ),
    DescriptorSpec::longhand("width", O::UnitOrKeyword(AUTO), "auto"),
    DescriptorSpec::longhand("word-spacing", O::UnitOrKeyword(NORMAL), "normal"),
    DescriptorSpec::longhand("z-index", O::UnitOrKeyword(AUTO), "auto"),
];
