//! Minified serialization of the stylesheet tree.

use crate::tree::{Declaration, Hack, Node, Rule, Stylesheet};

/// Join value tokens with single spaces, except around `,` and `/`.
pub fn serialize_value(value: &[String]) -> String {
    let mut out = String::new();
    let mut previous: Option<&str> = None;
    for token in value {
        let tight = matches!(token.as_str(), "," | "/") || matches!(previous, Some("," | "/"));
        if previous.is_some() && !tight {
            out.push(' ');
        }
        out.push_str(token);
        previous = Some(token);
    }
    out
}

/// `name:value`, with hacks and `!important` re-applied.
pub fn serialize_declaration(declaration: &Declaration) -> String {
    let mut out = String::new();
    match &declaration.hack {
        Hack::Underscore => out.push('_'),
        Hack::Star => out.push('*'),
        Hack::None | Hack::IeSuffix(_) => {}
    }
    out.push_str(&declaration.name);
    out.push(':');
    out.push_str(&serialize_value(&declaration.value));
    if let Hack::IeSuffix(suffix) = &declaration.hack {
        out.push('\\');
        out.push_str(suffix);
    }
    if declaration.important {
        out.push_str("!important");
    }
    out
}

/// Declarations joined with `;`, no trailing semicolon.
pub fn serialize_body(declarations: &[Declaration]) -> String {
    declarations
        .iter()
        .map(serialize_declaration)
        .collect::<Vec<_>>()
        .join(";")
}

/// Declarations and nested blocks in source order. A declaration is
/// followed by `;` unless it ends the body.
pub fn serialize_rule_body(rule: &Rule) -> String {
    if rule.nested.is_empty() {
        return serialize_body(&rule.declarations);
    }
    let mut out = String::new();
    let mut nested = rule.nested.iter().peekable();
    let mut after_declaration = false;
    for (at, declaration) in rule.declarations.iter().enumerate() {
        while let Some(block) = nested.next_if(|block| block.position <= at) {
            if after_declaration {
                out.push(';');
            }
            out.push_str(&block.text);
            after_declaration = false;
        }
        if after_declaration {
            out.push(';');
        }
        out.push_str(&serialize_declaration(declaration));
        after_declaration = true;
    }
    for block in nested {
        if after_declaration {
            out.push(';');
        }
        out.push_str(&block.text);
        after_declaration = false;
    }
    out
}

pub fn serialize_rule(rule: &Rule) -> String {
    format!(
        "{}{{{}}}",
        rule.selectors.join(","),
        serialize_rule_body(rule)
    )
}

pub fn serialize_nodes(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        match node {
            Node::Rule(rule) => out.push_str(&serialize_rule(rule)),
            Node::Block { prelude, children } => {
                out.push_str(prelude);
                out.push('{');
                out.push_str(&serialize_nodes(children));
                out.push('}');
            }
            Node::AtRuleBlock {
                prelude,
                declarations,
            } => {
                out.push_str(prelude);
                out.push('{');
                out.push_str(&serialize_body(declarations));
                out.push('}');
            }
            Node::AtRule(text) => {
                out.push_str(text);
                if !text.ends_with('}') {
                    out.push(';');
                }
            }
            Node::Comment(text) => out.push_str(text),
        }
    }
    out
}

pub fn serialize_stylesheet(sheet: &Stylesheet) -> String {
    serialize_nodes(&sheet.nodes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_declaration_list, parse_stylesheet};
    use pretty_assertions::assert_eq;

    fn roundtrip(input: &str) -> String {
        serialize_stylesheet(&parse_stylesheet(input))
    }

    #[test]
    fn test_value_spacing() {
        let value: Vec<String> = ["12px", "/", "1.5", "Arial", ",", "sans-serif"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(serialize_value(&value), "12px/1.5 Arial,sans-serif");
    }

    #[test]
    fn test_declaration_hacks_and_importance() {
        let decls = parse_declaration_list("*zoom:1;_height:1px;color:red\\9;top:0 !important");
        let out: Vec<String> = decls.iter().map(serialize_declaration).collect();
        assert_eq!(out, vec!["*zoom:1", "_height:1px", "color:red\\9", "top:0!important"]);
    }

    #[test]
    fn test_stylesheet_roundtrip() {
        assert_eq!(
            roundtrip("a , b { color : red ; margin : 0 auto ; }\n@media screen { p { top : 0 } }"),
            "a,b{color:red;margin:0 auto}@media screen{p{top:0}}"
        );
    }

    #[test]
    fn test_at_rules_and_comments() {
        assert_eq!(
            roundtrip("@charset \"utf-8\";/*! license */@font-face { font-family : x }@unknown x{y}"),
            "@charset \"utf-8\";/*! license */@font-face{font-family:x}@unknown x{y}"
        );
    }

    #[test]
    fn test_nested_blocks_keep_their_place() {
        assert_eq!(
            roundtrip("a { color : red ; &:hover { color: blue } margin : 0 ; b{top:0} }"),
            "a{color:red;&:hover { color: blue }margin:0;b{top:0}}"
        );
        assert_eq!(roundtrip("a{&:hover{color:red}}"), "a{&:hover{color:red}}");
    }

    #[test]
    fn test_empty_custom_property() {
        assert_eq!(roundtrip("a{--x:;color:red}"), "a{--x:;color:red}");
        assert_eq!(roundtrip("a{--x: }"), "a{--x:}");
    }

    #[test]
    fn test_serialized_output_reparses_identically() {
        let input = "a>b:hover,c{background:url(x.png) 0 0/cover no-repeat,red;font:12px/1 a,b}";
        let once = roundtrip(input);
        assert_eq!(roundtrip(&once), once);
    }
}
