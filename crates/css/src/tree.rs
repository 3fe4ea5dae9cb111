//! The stylesheet tree shared by the parser, the optimizer and the serializer.

/// Browser-targeting declaration variants. Each kind is its own override
/// namespace: `_width` never shadows `width` and vice versa.
#[derive(Debug, Clone, PartialEq, Eq, Default, Hash)]
pub enum Hack {
    #[default]
    None,
    /// `_property: value`
    Underscore,
    /// `*property: value`
    Star,
    /// `property: value\9` and friends; holds the suffix without the backslash.
    IeSuffix(String),
}

/// A single `name: value` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    /// Whitespace-separated value tokens. Top-level `,` and `/` are tokens of
    /// their own; functions are single tokens with normalized whitespace.
    pub value: Vec<String>,
    pub important: bool,
    pub hack: Hack,
}

impl Declaration {
    pub fn new(name: &str, value: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            value: value.iter().map(|v| v.to_string()).collect(),
            important: false,
            hack: Hack::None,
        }
    }

    pub fn important(mut self) -> Self {
        self.important = true;
        self
    }
}

/// Something inside a declaration block that is not a declaration, such as
/// a nested rule (`&:hover{...}`) or a nested at-rule. Kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedBlock {
    /// Number of declarations that precede it in the block.
    pub position: usize,
    pub text: String,
}

/// A style rule: selectors and the declarations they receive.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Rule {
    pub selectors: Vec<String>,
    pub declarations: Vec<Declaration>,
    pub nested: Vec<NestedBlock>,
}

/// A node of the stylesheet tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Rule(Rule),
    /// Nested at-rule such as `@media`, `@supports` or `@keyframes`.
    Block { prelude: String, children: Vec<Node> },
    /// At-rule whose block holds declarations (`@font-face`, `@page`).
    AtRuleBlock { prelude: String, declarations: Vec<Declaration> },
    /// Statement at-rule (`@import`, `@charset`) or an unknown at-rule kept
    /// verbatim.
    AtRule(String),
    /// A `/*! ... */` comment, kept verbatim.
    Comment(String),
}

impl Node {
    /// Empty rule bodies, empty selector lists and empty blocks are all
    /// equivalent to the node being absent. An empty `@layer` block is not:
    /// it fixes the order of its layer.
    pub fn is_empty(&self) -> bool {
        match self {
            Node::Rule(rule) => {
                rule.selectors.is_empty() || (rule.declarations.is_empty() && rule.nested.is_empty())
            }
            Node::Block { prelude, .. } if is_layer(prelude) => false,
            Node::Block { children, .. } => children.iter().all(Node::is_empty),
            Node::AtRuleBlock { declarations, .. } => declarations.is_empty(),
            Node::AtRule(_) | Node::Comment(_) => false,
        }
    }

    pub fn as_rule(&self) -> Option<&Rule> {
        match self {
            Node::Rule(rule) => Some(rule),
            _ => None,
        }
    }

    pub fn as_rule_mut(&mut self) -> Option<&mut Rule> {
        match self {
            Node::Rule(rule) => Some(rule),
            _ => None,
        }
    }
}

/// `@layer name{...}` or `@layer name;`.
pub fn is_layer(prelude: &str) -> bool {
    prelude
        .get(..6)
        .is_some_and(|head| head.eq_ignore_ascii_case("@layer"))
        && prelude[6..]
            .chars()
            .next()
            .is_none_or(|c| c.is_whitespace() || c == ';')
}

/// A parsed stylesheet.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Stylesheet {
    pub nodes: Vec<Node>,
}
