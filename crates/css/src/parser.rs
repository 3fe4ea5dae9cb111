//! Stylesheet parser producing the tree in [`crate::tree`].
//!
//! Error recovery follows CSS Syntax: an invalid declaration is skipped up to
//! the next `;`, an invalid rule up to its closing `}`. Nothing is rejected.

use crate::token::{CssTokenizer, Token, TokenKind};
use crate::tree::{Declaration, Hack, NestedBlock, Node, Rule, Stylesheet};

/// Parse a complete CSS stylesheet from a string.
pub fn parse_stylesheet(input: &str) -> Stylesheet {
    let tokens = CssTokenizer::new(input).tokenize_all();
    let mut parser = Parser::new(input, &tokens);
    Stylesheet {
        nodes: parser.parse_rules(false),
    }
}

/// Parse the inside of a declaration block, e.g. `color:red;margin:0`.
pub fn parse_declaration_list(input: &str) -> Vec<Declaration> {
    let tokens = CssTokenizer::new(input).tokenize_all();
    let mut parser = Parser::new(input, &tokens);
    parser.parse_declaration_block().0
}

/// At-rules whose block contains rules.
fn is_nested_block(name: &str) -> bool {
    matches!(
        name,
        "media" | "supports" | "document" | "-moz-document" | "layer" | "container"
    ) || name.ends_with("keyframes")
}

/// At-rules whose block contains declarations.
fn is_declaration_block(name: &str) -> bool {
    matches!(
        name,
        "font-face" | "page" | "viewport" | "-ms-viewport" | "counter-style"
    )
}

struct Parser<'a> {
    src: &'a str,
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str, tokens: &'a [Token]) -> Self {
        Self { src, tokens, pos: 0 }
    }

    fn peek(&self) -> Option<TokenKind> {
        self.tokens.get(self.pos).map(|t| t.kind)
    }

    fn text(&self, index: usize) -> &'a str {
        self.tokens[index].text(self.src)
    }

    /// Parse rules until end of input, or until the `}` closing a nested
    /// block when `nested` is set.
    fn parse_rules(&mut self, nested: bool) -> Vec<Node> {
        let mut nodes = Vec::new();

        loop {
            match self.peek() {
                None => break,
                Some(TokenKind::Whitespace)
                | Some(TokenKind::CDO)
                | Some(TokenKind::CDC)
                | Some(TokenKind::Semicolon) => self.pos += 1,
                Some(TokenKind::Comment) => {
                    let text = self.text(self.pos);
                    if text.starts_with("/*!") {
                        nodes.push(Node::Comment(text.to_string()));
                    }
                    self.pos += 1;
                }
                Some(TokenKind::RBrace) => {
                    self.pos += 1;
                    if nested {
                        break;
                    }
                }
                Some(TokenKind::AtKeyword) => {
                    if let Some(node) = self.parse_at_rule() {
                        nodes.push(node);
                    }
                }
                Some(_) => {
                    if let Some(rule) = self.parse_qualified_rule() {
                        nodes.push(Node::Rule(rule));
                    }
                }
            }
        }

        nodes
    }

    /// Advance over a prelude up to (not including) a top-level `{`, `;` or
    /// `}`. Returns the token range of the prelude.
    fn collect_prelude(&mut self) -> (usize, usize) {
        let start = self.pos;
        let mut depth = 0usize;
        while let Some(kind) = self.peek() {
            match kind {
                TokenKind::LParen | TokenKind::LBracket | TokenKind::Function => depth += 1,
                TokenKind::RParen | TokenKind::RBracket => depth = depth.saturating_sub(1),
                TokenKind::LBrace | TokenKind::Semicolon | TokenKind::RBrace if depth == 0 => break,
                _ => {}
            }
            self.pos += 1;
        }
        (start, self.pos)
    }

    fn parse_at_rule(&mut self) -> Option<Node> {
        let at_start = self.tokens[self.pos].span.start;
        let name = self.text(self.pos)[1..].to_ascii_lowercase();
        self.pos += 1;

        let (start, end) = self.collect_prelude();
        let prelude = compact(self.src, &self.tokens[start..end], Compaction::Prelude);
        let head = if prelude.is_empty() {
            format!("@{name}")
        } else {
            format!("@{name} {prelude}")
        };

        match self.peek() {
            Some(TokenKind::LBrace) => {
                self.pos += 1;
                if is_nested_block(&name) {
                    Some(Node::Block {
                        prelude: head,
                        children: self.parse_rules(true),
                    })
                } else if is_declaration_block(&name) {
                    let (declarations, nested) = self.parse_declaration_block();
                    if nested.is_empty() {
                        Some(Node::AtRuleBlock {
                            prelude: head,
                            declarations,
                        })
                    } else {
                        let at_end = self.tokens[self.pos - 1].span.end;
                        Some(Node::AtRule(self.src[at_start..at_end].to_string()))
                    }
                } else {
                    self.skip_block();
                    let at_end = self.tokens[self.pos - 1].span.end;
                    Some(Node::AtRule(self.src[at_start..at_end].to_string()))
                }
            }
            Some(TokenKind::Semicolon) => {
                self.pos += 1;
                Some(Node::AtRule(head))
            }
            _ => Some(Node::AtRule(head)),
        }
    }

    /// Skip a block whose `{` has already been consumed.
    fn skip_block(&mut self) {
        let mut depth = 1usize;
        while let Some(kind) = self.peek() {
            self.pos += 1;
            match kind {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => {
                    depth -= 1;
                    if depth == 0 {
                        return;
                    }
                }
                _ => {}
            }
        }
    }

    fn parse_qualified_rule(&mut self) -> Option<Rule> {
        let (start, end) = self.collect_prelude();
        match self.peek() {
            Some(TokenKind::LBrace) => {
                self.pos += 1;
                let (declarations, nested) = self.parse_declaration_block();
                Some(Rule {
                    selectors: self.split_selectors(start, end),
                    declarations,
                    nested,
                })
            }
            Some(TokenKind::Semicolon) => {
                self.pos += 1;
                None
            }
            _ => None,
        }
    }

    fn split_selectors(&self, start: usize, end: usize) -> Vec<String> {
        let mut selectors = Vec::new();
        let mut depth = 0usize;
        let mut from = start;
        for i in start..=end {
            let at_comma = i < end && self.tokens[i].kind == TokenKind::Comma && depth == 0;
            if i == end || at_comma {
                let selector = compact(self.src, &self.tokens[from..i], Compaction::Selector);
                if !selector.is_empty() {
                    selectors.push(selector);
                }
                from = i + 1;
                continue;
            }
            match self.tokens[i].kind {
                TokenKind::LParen | TokenKind::LBracket | TokenKind::Function => depth += 1,
                TokenKind::RParen | TokenKind::RBracket => depth = depth.saturating_sub(1),
                _ => {}
            }
        }
        selectors
    }

    /// Parse declarations up to and including the closing `}` (or end of
    /// input). Items that open a `{}` block of their own, other than custom
    /// properties, are nested rules and come back verbatim.
    fn parse_declaration_block(&mut self) -> (Vec<Declaration>, Vec<NestedBlock>) {
        let mut declarations = Vec::new();
        let mut nested = Vec::new();

        loop {
            match self.peek() {
                None => break,
                Some(TokenKind::RBrace) => {
                    self.pos += 1;
                    break;
                }
                Some(TokenKind::Whitespace)
                | Some(TokenKind::Semicolon)
                | Some(TokenKind::Comment) => self.pos += 1,
                Some(_) => {
                    let start = self.pos;
                    if self.consume_item() {
                        let span = self.tokens[start].span.start..self.tokens[self.pos - 1].span.end;
                        nested.push(NestedBlock {
                            position: declarations.len(),
                            text: self.src[span].to_string(),
                        });
                        continue;
                    }
                    let end = self.pos;
                    if self.peek() == Some(TokenKind::Semicolon) {
                        self.pos += 1;
                    }
                    if let Some(declaration) = parse_declaration(self.src, &self.tokens[start..end]) {
                        declarations.push(declaration);
                    }
                }
            }
        }

        (declarations, nested)
    }

    /// Advance over one item of a declaration block. Stops before a
    /// top-level `;` or `}`, or right after the `}` closing a nested block.
    /// Returns whether the item was a nested block.
    fn consume_item(&mut self) -> bool {
        let custom = self.text(self.pos).starts_with("--");
        let mut depth = 0usize;
        let mut block = false;
        while let Some(kind) = self.peek() {
            match kind {
                TokenKind::LBrace if depth == 0 && !custom => {
                    block = true;
                    depth += 1;
                }
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace | TokenKind::Function => {
                    depth += 1
                }
                TokenKind::RParen | TokenKind::RBracket => depth = depth.saturating_sub(1),
                TokenKind::RBrace if depth > 0 => {
                    depth -= 1;
                    if block && depth == 0 {
                        self.pos += 1;
                        return true;
                    }
                }
                TokenKind::Semicolon | TokenKind::RBrace if depth == 0 => return false,
                _ => {}
            }
            self.pos += 1;
        }
        block
    }
}

fn is_trivia(kind: TokenKind) -> bool {
    matches!(kind, TokenKind::Whitespace | TokenKind::Comment)
}

/// Parse a single `name: value` declaration from its tokens (without the
/// terminating `;`).
fn parse_declaration(src: &str, tokens: &[Token]) -> Option<Declaration> {
    let mut i = 0;
    while i < tokens.len() && is_trivia(tokens[i].kind) {
        i += 1;
    }

    let mut hack = Hack::None;
    if tokens.get(i)?.kind == TokenKind::Delim('*') {
        hack = Hack::Star;
        i += 1;
    }

    let name_token = tokens.get(i)?;
    if name_token.kind != TokenKind::Ident {
        return None;
    }
    let mut name = name_token.text(src);
    if hack == Hack::None && name.len() > 1 && name.starts_with('_') {
        hack = Hack::Underscore;
        name = &name[1..];
    }
    let name = if name.starts_with("--") {
        name.to_string()
    } else {
        name.to_ascii_lowercase()
    };
    i += 1;

    while i < tokens.len() && is_trivia(tokens[i].kind) {
        i += 1;
    }
    if tokens.get(i)?.kind != TokenKind::Colon {
        return None;
    }
    i += 1;

    let (value_tokens, important) = check_important(src, &tokens[i..]);
    let value_tokens = trim_trivia(value_tokens);
    // An empty custom property is valid and differs from an unset one.
    let custom = name.starts_with("--");
    if value_tokens.is_empty() && !custom {
        return None;
    }

    let mut value = match (custom, value_tokens.first(), value_tokens.last()) {
        (true, Some(first), Some(last)) => vec![src[first.span.start..last.span.end].to_string()],
        (true, _, _) => Vec::new(),
        (false, _, _) => build_value(src, value_tokens),
    };

    if let Some(suffix) = take_ie_suffix(&mut value) {
        hack = Hack::IeSuffix(suffix);
    }
    if value.is_empty() && !custom {
        return None;
    }

    Some(Declaration {
        name,
        value,
        important,
        hack,
    })
}

/// Split a trailing `!important` off a value.
fn check_important<'t>(src: &str, tokens: &'t [Token]) -> (&'t [Token], bool) {
    let trimmed = trim_trivia(tokens);
    let Some(last) = trimmed.last() else {
        return (tokens, false);
    };
    if last.kind != TokenKind::Ident || !last.text(src).eq_ignore_ascii_case("important") {
        return (tokens, false);
    }
    let before = trim_trivia(&trimmed[..trimmed.len() - 1]);
    match before.last() {
        Some(bang) if bang.kind == TokenKind::Delim('!') => (&before[..before.len() - 1], true),
        _ => (tokens, false),
    }
}

fn trim_trivia(tokens: &[Token]) -> &[Token] {
    let start = tokens
        .iter()
        .position(|t| !is_trivia(t.kind))
        .unwrap_or(tokens.len());
    let end = tokens
        .iter()
        .rposition(|t| !is_trivia(t.kind))
        .map_or(start, |p| p + 1);
    &tokens[start..end]
}

/// Strip a trailing `\9`-style hack from the last value token.
fn take_ie_suffix(value: &mut Vec<String>) -> Option<String> {
    let last = value.last_mut()?;
    let slash = last.rfind('\\')?;
    let suffix = &last[slash + 1..];
    if suffix.is_empty() || suffix.len() > 2 || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let suffix = suffix.to_string();
    last.truncate(slash);
    if last.is_empty() {
        value.pop();
    }
    Some(suffix)
}

/// Split value tokens into whitespace-separated components. Top-level `,`
/// and `/` become their own components.
fn build_value(src: &str, tokens: &[Token]) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut i = 0;

    let flush = |current: &mut String, out: &mut Vec<String>| {
        if !current.is_empty() {
            out.push(std::mem::take(current));
        }
    };

    while i < tokens.len() {
        match tokens[i].kind {
            TokenKind::Whitespace | TokenKind::Comment => flush(&mut current, &mut out),
            TokenKind::Comma => {
                flush(&mut current, &mut out);
                out.push(",".to_string());
            }
            TokenKind::Delim('/') => {
                flush(&mut current, &mut out);
                out.push("/".to_string());
            }
            TokenKind::Function | TokenKind::LParen | TokenKind::LBracket => {
                let end = matching_close(tokens, i);
                current.push_str(&compact(src, &tokens[i..end], Compaction::Value));
                i = end;
                continue;
            }
            _ => current.push_str(tokens[i].text(src)),
        }
        i += 1;
    }
    flush(&mut current, &mut out);
    out
}

/// Index one past the token closing the group opened at `open`.
fn matching_close(tokens: &[Token], open: usize) -> usize {
    let mut depth = 0usize;
    for (offset, token) in tokens[open..].iter().enumerate() {
        match token.kind {
            TokenKind::Function | TokenKind::LParen | TokenKind::LBracket => depth += 1,
            TokenKind::RParen | TokenKind::RBracket => {
                depth -= 1;
                if depth == 0 {
                    return open + offset + 1;
                }
            }
            _ => {}
        }
    }
    tokens.len()
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Compaction {
    Selector,
    Prelude,
    Value,
}

/// Re-join tokens with minimal whitespace. Whitespace is only dropped where
/// the mode guarantees it is insignificant.
fn compact(src: &str, tokens: &[Token], mode: Compaction) -> String {
    let tight_after = |kind: TokenKind| match kind {
        TokenKind::LParen | TokenKind::Function | TokenKind::Comma => true,
        TokenKind::Colon => mode != Compaction::Value,
        TokenKind::LBracket | TokenKind::Delim('>' | '+' | '~' | '=') => mode == Compaction::Selector,
        _ => false,
    };
    let tight_before = |kind: TokenKind| match kind {
        TokenKind::RParen | TokenKind::Comma => true,
        TokenKind::Colon => mode == Compaction::Prelude,
        TokenKind::RBracket | TokenKind::Delim('>' | '+' | '~' | '=') => mode == Compaction::Selector,
        _ => false,
    };

    let mut out = String::new();
    let mut last: Option<TokenKind> = None;
    let mut pending_space = false;
    for token in tokens {
        if is_trivia(token.kind) {
            pending_space = true;
            continue;
        }
        if pending_space {
            if let Some(prev) = last {
                if !tight_after(prev) && !tight_before(token.kind) {
                    out.push(' ');
                }
            }
        }
        pending_space = false;
        out.push_str(token.text(src));
        last = Some(token.kind);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(node: &Node) -> &Rule {
        node.as_rule().expect("expected a rule")
    }

    #[test]
    fn test_parse_simple_stylesheet() {
        let sheet = parse_stylesheet("p { color: red; margin: 0 auto }");
        assert_eq!(sheet.nodes.len(), 1);
        let rule = rule(&sheet.nodes[0]);
        assert_eq!(rule.selectors, vec!["p"]);
        assert_eq!(rule.declarations[0], Declaration::new("color", &["red"]));
        assert_eq!(rule.declarations[1], Declaration::new("margin", &["0", "auto"]));
    }

    #[test]
    fn test_selectors_are_compacted_and_split() {
        let sheet = parse_stylesheet("ul  >  li ,  a:hover,div   p,[ type = x ]{x:y}");
        assert_eq!(
            rule(&sheet.nodes[0]).selectors,
            vec!["ul>li", "a:hover", "div p", "[type=x]"]
        );
    }

    #[test]
    fn test_comma_inside_pseudo_does_not_split() {
        let sheet = parse_stylesheet(":is(a, b) c{x:y}");
        assert_eq!(rule(&sheet.nodes[0]).selectors, vec![":is(a,b) c"]);
    }

    #[test]
    fn test_value_tokens() {
        let decls = parse_declaration_list(
            "font: 12px / 1.5 Arial , sans-serif; color: rgba( 0 , 0 , 0 , .5 ); width: calc(1px + 2px)",
        );
        assert_eq!(
            decls[0].value,
            vec!["12px", "/", "1.5", "Arial", ",", "sans-serif"]
        );
        assert_eq!(decls[1].value, vec!["rgba(0,0,0,.5)"]);
        assert_eq!(decls[2].value, vec!["calc(1px + 2px)"]);
    }

    #[test]
    fn test_important_detection() {
        let decls = parse_declaration_list("color: red ! IMPORTANT; margin:0!important; x: important");
        assert!(decls[0].important);
        assert_eq!(decls[0].value, vec!["red"]);
        assert!(decls[1].important);
        assert!(!decls[2].important);
        assert_eq!(decls[2].value, vec!["important"]);
    }

    #[test]
    fn test_hacks() {
        let decls = parse_declaration_list("*zoom:1;_height:1px;color:red\\9;width:1px \\9");
        assert_eq!(decls[0].hack, Hack::Star);
        assert_eq!(decls[0].name, "zoom");
        assert_eq!(decls[1].hack, Hack::Underscore);
        assert_eq!(decls[1].name, "height");
        assert_eq!(decls[2].hack, Hack::IeSuffix("9".into()));
        assert_eq!(decls[2].value, vec!["red"]);
        assert_eq!(decls[3].hack, Hack::IeSuffix("9".into()));
        assert_eq!(decls[3].value, vec!["1px"]);
    }

    #[test]
    fn test_invalid_declarations_are_skipped() {
        let decls = parse_declaration_list("color;: red;margin:;padding:0;{x};top:1px");
        let names: Vec<&str> = decls.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["padding", "top"]);
    }

    #[test]
    fn test_brace_items_become_nested_blocks() {
        let sheet = parse_stylesheet("a{color;{x};top:1px}");
        let rule = rule(&sheet.nodes[0]);
        assert_eq!(rule.declarations, vec![Declaration::new("top", &["1px"])]);
        assert_eq!(
            rule.nested,
            vec![NestedBlock {
                position: 0,
                text: "{x}".into()
            }]
        );
    }

    #[test]
    fn test_nested_rules() {
        let sheet = parse_stylesheet("a{color:red;&:hover { color:blue; top:0 } b{x:y}margin:0;@media print{c{d:e}}}");
        let rule = rule(&sheet.nodes[0]);
        let names: Vec<&str> = rule.declarations.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["color", "margin"]);
        let nested: Vec<(usize, &str)> = rule
            .nested
            .iter()
            .map(|block| (block.position, block.text.as_str()))
            .collect();
        assert_eq!(
            nested,
            vec![
                (1, "&:hover { color:blue; top:0 }"),
                (1, "b{x:y}"),
                (2, "@media print{c{d:e}}"),
            ]
        );
        assert_eq!(sheet.nodes.len(), 1);
    }

    #[test]
    fn test_nested_rule_in_declaration_at_rule_is_kept_verbatim() {
        let sheet = parse_stylesheet("@page :first { margin: 0; @top-left { content: 'x' } }b{top:0}");
        assert_eq!(
            sheet.nodes[0],
            Node::AtRule("@page :first { margin: 0; @top-left { content: 'x' } }".into())
        );
        assert_eq!(sheet.nodes.len(), 2);
    }

    #[test]
    fn test_empty_custom_property() {
        let decls = parse_declaration_list("--x:;--y: !important;color:");
        assert_eq!(decls.len(), 2);
        assert_eq!(decls[0].name, "--x");
        assert!(decls[0].value.is_empty());
        assert_eq!(decls[1].name, "--y");
        assert!(decls[1].value.is_empty());
        assert!(decls[1].important);
    }

    #[test]
    fn test_custom_property_kept_verbatim() {
        let decls = parse_declaration_list("--Main-Color:  { a: b }  ;--x:1px 2px");
        assert_eq!(decls[0].name, "--Main-Color");
        assert_eq!(decls[0].value, vec!["{ a: b }"]);
        assert_eq!(decls[1].value, vec!["1px 2px"]);
    }

    #[test]
    fn test_parse_media_block() {
        let sheet = parse_stylesheet("@media screen and (max-width : 100px){a{color:red}}b{top:0}");
        assert_eq!(sheet.nodes.len(), 2);
        match &sheet.nodes[0] {
            Node::Block { prelude, children } => {
                assert_eq!(prelude, "@media screen and (max-width:100px)");
                assert_eq!(children.len(), 1);
            }
            other => panic!("unexpected node {other:?}"),
        }
    }

    #[test]
    fn test_at_rule_kinds() {
        let sheet = parse_stylesheet(
            "@charset \"utf-8\";@import url(a.css) screen;@font-face{font-family:x;src:url(x.woff)}\
             @keyframes spin{from{top:0}to{top:1px}}@unknown foo{bar}",
        );
        assert_eq!(sheet.nodes[0], Node::AtRule("@charset \"utf-8\"".into()));
        assert_eq!(sheet.nodes[1], Node::AtRule("@import url(a.css) screen".into()));
        assert!(matches!(&sheet.nodes[2], Node::AtRuleBlock { declarations, .. } if declarations.len() == 2));
        assert!(matches!(&sheet.nodes[3], Node::Block { children, .. } if children.len() == 2));
        assert_eq!(sheet.nodes[4], Node::AtRule("@unknown foo{bar}".into()));
    }

    #[test]
    fn test_comments() {
        let sheet = parse_stylesheet("/* dropped */a{/* x */color:red}/*! kept */");
        assert_eq!(sheet.nodes.len(), 2);
        assert_eq!(sheet.nodes[1], Node::Comment("/*! kept */".into()));
        assert_eq!(rule(&sheet.nodes[0]).declarations.len(), 1);
    }

    #[test]
    fn test_stray_braces_and_empty_input() {
        assert!(parse_stylesheet("").nodes.is_empty());
        let sheet = parse_stylesheet("} a{color:red}");
        assert_eq!(sheet.nodes.len(), 1);
    }

    #[test]
    fn test_unclosed_rule_keeps_declarations() {
        let sheet = parse_stylesheet("a{color:red");
        assert_eq!(rule(&sheet.nodes[0]).declarations.len(), 1);
    }
}
