pub mod token;
pub mod tree;
pub mod selector;
pub mod color;
pub mod parser;
pub mod serializer;

pub use token::{CssTokenizer, Token, TokenKind};
pub use tree::{Declaration, Hack, NestedBlock, Node, Rule, Stylesheet, is_layer};
pub use selector::{
    Combinator, SimpleSelector, CompoundSelector, ComplexSelector,
    AttrOp, Specificity, compute_specificity, specificity_of, parse_selector_list,
};
pub use color::{CssColor, shortest_color};
pub use parser::{parse_stylesheet, parse_declaration_list};
pub use serializer::{
    serialize_body, serialize_declaration, serialize_nodes, serialize_rule, serialize_rule_body,
    serialize_stylesheet, serialize_value,
};
