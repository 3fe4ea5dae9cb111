//! Structural selector analysis: compound/complex selectors and specificity.
//!
//! The optimizer never matches selectors against a document; it only needs to
//! know what a selector can possibly target (its subject compound) and how
//! strongly it binds (its specificity).

use crate::token::{CssTokenizer, Token, TokenKind};

/// Combinator between compound selectors in a complex selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Combinator {
    /// Whitespace: ancestor descendant
    Descendant,
    /// `>`: parent > child
    Child,
    /// `+`: prev + next
    NextSibling,
    /// `~`: prev ~ subsequent
    SubsequentSibling,
}

/// Attribute selector operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrOp {
    /// `[attr]`
    Exists,
    /// `[attr=val]`
    Eq,
    /// `[attr~=val]`
    Includes,
    /// `[attr|=val]`
    DashMatch,
    /// `[attr^=val]`
    Prefix,
    /// `[attr$=val]`
    Suffix,
    /// `[attr*=val]`
    Substring,
}

/// A single simple selector component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelector {
    /// Type selector, e.g. `div`, `p`. Stored lowercase.
    Type(String),
    /// Universal selector `*`.
    Universal,
    /// ID selector `#foo`.
    Id(String),
    /// Class selector `.bar`.
    Class(String),
    /// Attribute selector `[name op value]`.
    Attribute {
        name: String,
        op: AttrOp,
        value: Option<String>,
    },
    /// `:name` or `:name(argument)`. The name is stored lowercase, the
    /// argument verbatim.
    PseudoClass {
        name: String,
        argument: Option<String>,
    },
    /// `::name`, or one of the legacy single-colon pseudo-elements
    /// (`:before`, `:after`, `:first-line`, `:first-letter`).
    PseudoElement { name: String, double_colon: bool },
}

/// A compound selector is a sequence of simple selectors
/// without any combinator between them (e.g. `div.foo#bar`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompoundSelector {
    pub simples: Vec<SimpleSelector>,
}

impl CompoundSelector {
    /// The type selector, if any.
    pub fn type_name(&self) -> Option<&str> {
        self.simples.iter().find_map(|s| match s {
            SimpleSelector::Type(name) => Some(name.as_str()),
            _ => None,
        })
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.simples.iter().filter_map(|s| match s {
            SimpleSelector::Id(id) => Some(id.as_str()),
            _ => None,
        })
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.simples.iter().filter_map(|s| match s {
            SimpleSelector::Class(class) => Some(class.as_str()),
            _ => None,
        })
    }

    pub fn pseudo_element(&self) -> Option<&str> {
        self.simples.iter().find_map(|s| match s {
            SimpleSelector::PseudoElement { name, .. } => Some(name.as_str()),
            _ => None,
        })
    }
}

/// A complex selector is a chain of compound selectors separated by combinators.
/// Stored right-to-left: `parts[0]` is the rightmost (subject) compound
/// selector.
///
/// Each element is `(compound_selector, optional_combinator_to_the_left)`.
/// The last element's combinator is always `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    pub parts: Vec<(CompoundSelector, Option<Combinator>)>,
}

impl ComplexSelector {
    /// The compound selector naming the elements this selector targets.
    pub fn subject(&self) -> Option<&CompoundSelector> {
        self.parts.first().map(|(compound, _)| compound)
    }
}

/// CSS specificity as a triple `(a, b, c)`:
///   - `a`: count of ID selectors
///   - `b`: count of class selectors, attribute selectors, and pseudo-classes
///   - `c`: count of type selectors and pseudo-elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Specificity {
    pub a: u32,
    pub b: u32,
    pub c: u32,
}

impl Specificity {
    pub fn new(a: u32, b: u32, c: u32) -> Self {
        Self { a, b, c }
    }

    pub fn zero() -> Self {
        Self { a: 0, b: 0, c: 0 }
    }

    /// Add two specificities component-wise.
    pub fn add(self, other: Specificity) -> Specificity {
        Specificity {
            a: self.a + other.a,
            b: self.b + other.b,
            c: self.c + other.c,
        }
    }
}

impl PartialOrd for Specificity {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Specificity {
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        self.a
            .cmp(&other.a)
            .then(self.b.cmp(&other.b))
            .then(self.c.cmp(&other.c))
    }
}

/// Compute the specificity of a complex selector.
pub fn compute_specificity(selector: &ComplexSelector) -> Specificity {
    selector
        .parts
        .iter()
        .fold(Specificity::zero(), |spec, (compound, _)| {
            spec.add(compound_specificity(compound))
        })
}

/// Specificity of a selector list given as text: the highest of its members.
pub fn specificity_of(selector: &str) -> Specificity {
    parse_selector_list(selector)
        .iter()
        .map(compute_specificity)
        .max()
        .unwrap_or_else(Specificity::zero)
}

fn compound_specificity(compound: &CompoundSelector) -> Specificity {
    compound
        .simples
        .iter()
        .fold(Specificity::zero(), |spec, simple| spec.add(simple_specificity(simple)))
}

fn simple_specificity(simple: &SimpleSelector) -> Specificity {
    match simple {
        SimpleSelector::Id(_) => Specificity::new(1, 0, 0),
        SimpleSelector::Class(_) | SimpleSelector::Attribute { .. } => Specificity::new(0, 1, 0),
        SimpleSelector::PseudoClass { name, argument } => match (name.as_str(), argument) {
            // Matches-any pseudo-classes take the specificity of their most
            // specific argument; `:where()` contributes nothing.
            ("not" | "is" | "matches" | "has" | "-webkit-any" | "-moz-any", Some(arg)) => {
                specificity_of(arg)
            }
            ("where", _) => Specificity::zero(),
            _ => Specificity::new(0, 1, 0),
        },
        SimpleSelector::Type(_) | SimpleSelector::PseudoElement { .. } => Specificity::new(0, 0, 1),
        SimpleSelector::Universal => Specificity::zero(),
    }
}

/// Parse a selector list from a CSS selector string.
/// Returns a vector of complex selectors separated by commas.
pub fn parse_selector_list(input: &str) -> Vec<ComplexSelector> {
    let tokens: Vec<Token> = CssTokenizer::new(input)
        .tokenize_all()
        .into_iter()
        .filter(|t| t.kind != TokenKind::Comment)
        .collect();
    parse_selector_list_from_tokens(input, &tokens)
}

/// Parse a selector list from a slice of tokens over `src`.
pub fn parse_selector_list_from_tokens(src: &str, tokens: &[Token]) -> Vec<ComplexSelector> {
    let cursor = Cursor { src, tokens };
    let mut selectors = Vec::new();
    let mut pos = cursor.skip_whitespace(0);

    while pos < tokens.len() {
        let (selector, new_pos) = parse_complex_selector(&cursor, pos);
        if !selector.parts.is_empty() {
            selectors.push(selector);
        }
        pos = cursor.skip_whitespace(new_pos);

        // Skip comma separator
        if cursor.kind(pos) == Some(TokenKind::Comma) {
            pos = cursor.skip_whitespace(pos + 1);
        } else {
            break;
        }
    }

    selectors
}

struct Cursor<'a> {
    src: &'a str,
    tokens: &'a [Token],
}

impl<'a> Cursor<'a> {
    fn kind(&self, pos: usize) -> Option<TokenKind> {
        self.tokens.get(pos).map(|t| t.kind)
    }

    fn text(&self, pos: usize) -> &'a str {
        self.tokens[pos].text(self.src)
    }

    fn skip_whitespace(&self, mut pos: usize) -> usize {
        while self.kind(pos) == Some(TokenKind::Whitespace) {
            pos += 1;
        }
        pos
    }

    /// Position just past the `)` matching an already-consumed opener.
    fn skip_to_matching_rparen(&self, mut pos: usize) -> usize {
        let mut depth = 1;
        while let Some(kind) = self.kind(pos) {
            match kind {
                TokenKind::LParen | TokenKind::Function => depth += 1,
                TokenKind::RParen => depth -= 1,
                _ => {}
            }
            pos += 1;
            if depth == 0 {
                break;
            }
        }
        pos
    }
}

/// Parse a single complex selector from tokens starting at `start`.
/// Returns the parsed selector and the position after it.
fn parse_complex_selector(cursor: &Cursor, start: usize) -> (ComplexSelector, usize) {
    let mut parts_ltr: Vec<(CompoundSelector, Option<Combinator>)> = Vec::new();

    let (compound, mut pos) = parse_compound_selector(cursor, start);
    if compound.simples.is_empty() {
        return (ComplexSelector { parts: Vec::new() }, pos);
    }
    parts_ltr.push((compound, None));

    loop {
        let after_ws = cursor.skip_whitespace(pos);
        let had_whitespace = after_ws > pos;
        pos = after_ws;

        let combinator = match cursor.kind(pos) {
            None => break,
            Some(TokenKind::Delim('>')) => Combinator::Child,
            Some(TokenKind::Delim('+')) => Combinator::NextSibling,
            Some(TokenKind::Delim('~')) => Combinator::SubsequentSibling,
            Some(_) if had_whitespace => Combinator::Descendant,
            Some(_) => break,
        };
        if combinator != Combinator::Descendant {
            pos = cursor.skip_whitespace(pos + 1);
        }

        let (compound, new_pos) = parse_compound_selector(cursor, pos);
        if compound.simples.is_empty() {
            break;
        }
        parts_ltr.push((compound, Some(combinator)));
        pos = new_pos;
    }

    // Each LTR element's combinator links it to the previous element, so
    // reversing yields the right-to-left form directly.
    parts_ltr.reverse();

    (ComplexSelector { parts: parts_ltr }, pos)
}

fn is_legacy_pseudo_element(name: &str) -> bool {
    matches!(name, "before" | "after" | "first-line" | "first-letter")
}

/// Parse a compound selector (sequence of simple selectors without combinators).
fn parse_compound_selector(cursor: &Cursor, start: usize) -> (CompoundSelector, usize) {
    let mut simples = Vec::new();
    let mut pos = start;

    while let Some(kind) = cursor.kind(pos) {
        match kind {
            TokenKind::Ident if simples.is_empty() => {
                simples.push(SimpleSelector::Type(cursor.text(pos).to_ascii_lowercase()));
                pos += 1;
            }
            TokenKind::Delim('*') if simples.is_empty() => {
                simples.push(SimpleSelector::Universal);
                pos += 1;
            }
            TokenKind::Hash => {
                simples.push(SimpleSelector::Id(cursor.text(pos)[1..].to_string()));
                pos += 1;
            }
            TokenKind::Delim('.') if cursor.kind(pos + 1) == Some(TokenKind::Ident) => {
                simples.push(SimpleSelector::Class(cursor.text(pos + 1).to_string()));
                pos += 2;
            }
            TokenKind::LBracket => {
                let (attr_sel, new_pos) = parse_attribute_selector(cursor, pos);
                if let Some(sel) = attr_sel {
                    simples.push(sel);
                }
                pos = new_pos;
            }
            TokenKind::Colon => {
                let double_colon = cursor.kind(pos + 1) == Some(TokenKind::Colon);
                pos += if double_colon { 2 } else { 1 };
                match cursor.kind(pos) {
                    Some(TokenKind::Ident) => {
                        let name = cursor.text(pos).to_ascii_lowercase();
                        pos += 1;
                        if double_colon || is_legacy_pseudo_element(&name) {
                            simples.push(SimpleSelector::PseudoElement { name, double_colon });
                        } else {
                            simples.push(SimpleSelector::PseudoClass { name, argument: None });
                        }
                    }
                    Some(TokenKind::Function) => {
                        let text = cursor.text(pos);
                        let name = text[..text.len() - 1].to_ascii_lowercase();
                        let arg_start = pos + 1;
                        pos = cursor.skip_to_matching_rparen(arg_start);
                        let arg_end = if cursor.kind(pos - 1) == Some(TokenKind::RParen) {
                            pos - 1
                        } else {
                            pos
                        };
                        let argument = if arg_start < arg_end {
                            let span = cursor.tokens[arg_start].span.start..cursor.tokens[arg_end - 1].span.end;
                            cursor.src[span].trim().to_string()
                        } else {
                            String::new()
                        };
                        if double_colon {
                            simples.push(SimpleSelector::PseudoElement { name, double_colon });
                        } else {
                            simples.push(SimpleSelector::PseudoClass {
                                name,
                                argument: Some(argument),
                            });
                        }
                    }
                    _ => break,
                }
            }
            _ => break,
        }
    }

    (CompoundSelector { simples }, pos)
}

/// Parse an attribute selector `[name op? value?]`.
fn parse_attribute_selector(cursor: &Cursor, start: usize) -> (Option<SimpleSelector>, usize) {
    let mut pos = cursor.skip_whitespace(start + 1);
    let skip_to_rbracket = |mut pos: usize| {
        while let Some(kind) = cursor.kind(pos) {
            pos += 1;
            if kind == TokenKind::RBracket {
                break;
            }
        }
        pos
    };

    if cursor.kind(pos) != Some(TokenKind::Ident) {
        return (None, skip_to_rbracket(pos));
    }
    let name = cursor.text(pos).to_string();
    pos = cursor.skip_whitespace(pos + 1);

    if cursor.kind(pos) == Some(TokenKind::RBracket) {
        return (
            Some(SimpleSelector::Attribute {
                name,
                op: AttrOp::Exists,
                value: None,
            }),
            pos + 1,
        );
    }

    let followed_by_eq = cursor.kind(pos + 1) == Some(TokenKind::Delim('='));
    let (op, width) = match cursor.kind(pos) {
        Some(TokenKind::Delim('=')) => (AttrOp::Eq, 1),
        Some(TokenKind::Delim('~')) if followed_by_eq => (AttrOp::Includes, 2),
        Some(TokenKind::Delim('|')) if followed_by_eq => (AttrOp::DashMatch, 2),
        Some(TokenKind::Delim('^')) if followed_by_eq => (AttrOp::Prefix, 2),
        Some(TokenKind::Delim('$')) if followed_by_eq => (AttrOp::Suffix, 2),
        Some(TokenKind::Delim('*')) if followed_by_eq => (AttrOp::Substring, 2),
        _ => return (None, skip_to_rbracket(pos)),
    };
    pos = cursor.skip_whitespace(pos + width);

    let value = match cursor.kind(pos) {
        Some(TokenKind::Ident) => Some(cursor.text(pos).to_string()),
        Some(TokenKind::String) => {
            let quoted = cursor.text(pos);
            Some(quoted[1..quoted.len().saturating_sub(1).max(1)].to_string())
        }
        _ => None,
    };

    (Some(SimpleSelector::Attribute { name, op, value }), skip_to_rbracket(pos))
}
