//! CSS tokenizer per CSS Syntax Level 3.
//!
//! Unlike a tokenizer feeding a style engine, a minifier must be able to
//! reproduce the source text of anything it does not rewrite, so every token
//! carries the byte span it was read from instead of a decoded payload.

use std::ops::Range;

/// CSS token kinds per CSS Syntax Level 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    Function,
    AtKeyword,
    Hash,
    String,
    Url,
    Number,
    Percentage,
    Dimension,
    Whitespace,
    /// `/* ... */`, kept so special `/*! ... */` comments survive.
    Comment,
    Colon,
    Semicolon,
    Comma,
    LBracket,
    RBracket,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Delim(char),
    /// `<!--`
    CDO,
    /// `-->`
    CDC,
}

/// A token and the byte range of the source it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Range<usize>,
}

impl Token {
    /// The verbatim source text of this token.
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.span.clone()]
    }
}

/// A tokenizer that splits an input string into span-carrying `Token`s.
pub struct CssTokenizer<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> CssTokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
        }
    }

    /// Tokenize the entire input.
    pub fn tokenize_all(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        while let Some(tok) = self.next_token() {
            tokens.push(tok);
        }
        tokens
    }

    /// Consume and return the next token, or `None` at end of input.
    pub fn next_token(&mut self) -> Option<Token> {
        if self.pos >= self.bytes.len() {
            return None;
        }
        let start = self.pos;
        let kind = self.consume_token();
        Some(Token {
            kind,
            span: start..self.pos,
        })
    }

    fn consume_token(&mut self) -> TokenKind {
        let ch = self.peek_char();

        if ch == '/' && self.peek_byte(1) == Some(b'*') {
            self.consume_comment();
            return TokenKind::Comment;
        }

        if is_whitespace(ch) {
            while self.pos < self.bytes.len() && is_whitespace(self.peek_char()) {
                self.pos += 1;
            }
            return TokenKind::Whitespace;
        }

        if ch == '"' || ch == '\'' {
            self.consume_string(ch);
            return TokenKind::String;
        }

        if ch == '#' {
            self.pos += 1;
            if self.pos < self.bytes.len()
                && (is_name_char(self.peek_char()) || self.starts_valid_escape_at(self.pos))
            {
                self.consume_name();
                return TokenKind::Hash;
            }
            return TokenKind::Delim('#');
        }

        if ch == '+' || ch == '-' {
            if self.starts_number_at(self.pos) {
                return self.consume_numeric();
            }
            if ch == '-' && self.input[self.pos..].starts_with("-->") {
                self.pos += 3;
                return TokenKind::CDC;
            }
            if self.would_start_ident_at(self.pos) {
                return self.consume_ident_like();
            }
            self.pos += 1;
            return TokenKind::Delim(ch);
        }

        if ch == '.' {
            if self.starts_number_at(self.pos) {
                return self.consume_numeric();
            }
            self.pos += 1;
            return TokenKind::Delim('.');
        }

        if ch.is_ascii_digit() {
            return self.consume_numeric();
        }

        if ch == '@' {
            self.pos += 1;
            if self.would_start_ident_at(self.pos) {
                self.consume_name();
                return TokenKind::AtKeyword;
            }
            return TokenKind::Delim('@');
        }

        if ch == '<' && self.input[self.pos..].starts_with("<!--") {
            self.pos += 4;
            return TokenKind::CDO;
        }

        if is_name_start_char(ch) || (ch == '\\' && self.starts_valid_escape_at(self.pos)) {
            return self.consume_ident_like();
        }

        self.pos += ch.len_utf8();
        match ch {
            ':' => TokenKind::Colon,
            ';' => TokenKind::Semicolon,
            ',' => TokenKind::Comma,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            _ => TokenKind::Delim(ch),
        }
    }

    // --- Helper methods ---

    fn peek_char(&self) -> char {
        self.input[self.pos..].chars().next().unwrap_or('\0')
    }

    fn peek_byte(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn consume_comment(&mut self) {
        self.pos += 2;
        match self.input[self.pos..].find("*/") {
            Some(end) => self.pos += end + 2,
            None => self.pos = self.bytes.len(),
        }
    }

    fn consume_string(&mut self, quote: char) {
        self.pos += 1;
        while self.pos < self.bytes.len() {
            let ch = self.peek_char();
            self.pos += ch.len_utf8();
            if ch == quote {
                return;
            }
            if ch == '\\' {
                if self.pos < self.bytes.len() {
                    self.pos += self.peek_char().len_utf8();
                }
            } else if ch == '\n' {
                // Unescaped newline ends the (bad) string.
                return;
            }
        }
    }

    fn consume_escape(&mut self) {
        // Caller guarantees `\` followed by a non-newline.
        self.pos += 1;
        let ch = self.peek_char();
        if ch.is_ascii_hexdigit() {
            let mut count = 0;
            while count < 6 && self.pos < self.bytes.len() && self.peek_char().is_ascii_hexdigit() {
                self.pos += 1;
                count += 1;
            }
            if self.pos < self.bytes.len() && is_whitespace(self.peek_char()) {
                self.pos += 1;
            }
        } else {
            self.pos += ch.len_utf8();
        }
    }

    fn starts_valid_escape_at(&self, at: usize) -> bool {
        self.bytes.get(at) == Some(&b'\\')
            && self.bytes.get(at + 1).is_some_and(|b| *b != b'\n')
    }

    fn would_start_ident_at(&self, start: usize) -> bool {
        let Some(ch) = self.input.get(start..).and_then(|s| s.chars().next()) else {
            return false;
        };
        if is_name_start_char(ch) {
            return true;
        }
        match ch {
            '-' => match self.bytes.get(start + 1) {
                Some(b'-') => true,
                Some(b'\\') => self.starts_valid_escape_at(start + 1),
                Some(_) => self.input[start + 1..]
                    .chars()
                    .next()
                    .is_some_and(is_name_start_char),
                None => false,
            },
            '\\' => self.starts_valid_escape_at(start),
            _ => false,
        }
    }

    fn starts_number_at(&self, start: usize) -> bool {
        let digit_at = |i: usize| self.bytes.get(i).is_some_and(u8::is_ascii_digit);
        match self.bytes.get(start) {
            Some(b) if b.is_ascii_digit() => true,
            Some(b'+') | Some(b'-') => {
                digit_at(start + 1) || (self.bytes.get(start + 1) == Some(&b'.') && digit_at(start + 2))
            }
            Some(b'.') => digit_at(start + 1),
            _ => false,
        }
    }

    fn consume_name(&mut self) {
        while self.pos < self.bytes.len() {
            let ch = self.peek_char();
            if is_name_char(ch) {
                self.pos += ch.len_utf8();
            } else if self.starts_valid_escape_at(self.pos) {
                self.consume_escape();
            } else {
                break;
            }
        }
    }

    fn consume_digits(&mut self) {
        while self.peek_byte(0).is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
    }

    fn consume_numeric(&mut self) -> TokenKind {
        if matches!(self.peek_byte(0), Some(b'+') | Some(b'-')) {
            self.pos += 1;
        }
        self.consume_digits();
        if self.peek_byte(0) == Some(b'.') && self.peek_byte(1).is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
            self.consume_digits();
        }
        if matches!(self.peek_byte(0), Some(b'e') | Some(b'E')) {
            let exp_digits = match self.peek_byte(1) {
                Some(b) if b.is_ascii_digit() => Some(1),
                Some(b'+') | Some(b'-') if self.peek_byte(2).is_some_and(|b| b.is_ascii_digit()) => Some(2),
                _ => None,
            };
            if let Some(skip) = exp_digits {
                self.pos += skip;
                self.consume_digits();
            }
        }

        if self.would_start_ident_at(self.pos) {
            self.consume_name();
            return TokenKind::Dimension;
        }
        if self.peek_byte(0) == Some(b'%') {
            self.pos += 1;
            return TokenKind::Percentage;
        }
        TokenKind::Number
    }

    fn consume_ident_like(&mut self) -> TokenKind {
        let name_start = self.pos;
        self.consume_name();
        if self.peek_byte(0) != Some(b'(') {
            return TokenKind::Ident;
        }
        let is_url = self.input[name_start..self.pos].eq_ignore_ascii_case("url");
        self.pos += 1;
        if is_url {
            return self.consume_url();
        }
        TokenKind::Function
    }

    fn consume_url(&mut self) -> TokenKind {
        let mut probe = self.pos;
        while self.input[probe..].chars().next().is_some_and(is_whitespace) {
            probe += 1;
        }
        // url("...") is an ordinary function whose argument is a string.
        if matches!(self.bytes.get(probe), Some(b'"') | Some(b'\'')) {
            return TokenKind::Function;
        }
        while self.pos < self.bytes.len() {
            let ch = self.peek_char();
            if ch == ')' {
                self.pos += 1;
                break;
            }
            if self.starts_valid_escape_at(self.pos) {
                self.consume_escape();
            } else {
                self.pos += ch.len_utf8();
            }
        }
        TokenKind::Url
    }
}

fn is_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r' | '\x0C')
}

fn is_name_start_char(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_' || !ch.is_ascii()
}

fn is_name_char(ch: char) -> bool {
    is_name_start_char(ch) || ch.is_ascii_digit() || ch == '-'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        CssTokenizer::new(input)
            .tokenize_all()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    fn texts(input: &str) -> Vec<&str> {
        CssTokenizer::new(input)
            .tokenize_all()
            .iter()
            .map(|t| t.text(input))
            .collect()
    }

    #[test]
    fn test_basic_rule() {
        assert_eq!(
            kinds("a{color:red}"),
            vec![
                TokenKind::Ident,
                TokenKind::LBrace,
                TokenKind::Ident,
                TokenKind::Colon,
                TokenKind::Ident,
                TokenKind::RBrace,
            ]
        );
    }

    #[test]
    fn test_numeric_spans_are_verbatim() {
        let input = "1.50px 50% -.5 1e3";
        assert_eq!(texts(input), vec!["1.50px", " ", "50%", " ", "-.5", " ", "1e3"]);
        assert_eq!(
            kinds(input),
            vec![
                TokenKind::Dimension,
                TokenKind::Whitespace,
                TokenKind::Percentage,
                TokenKind::Whitespace,
                TokenKind::Number,
                TokenKind::Whitespace,
                TokenKind::Number,
            ]
        );
    }

    #[test]
    fn test_strings_keep_quotes_and_escapes() {
        let input = r#""a\"b" 'c'"#;
        assert_eq!(texts(input), vec![r#""a\"b""#, " ", "'c'"]);
    }

    #[test]
    fn test_comments_are_tokens() {
        let input = "a/*x*/b/*! keep */";
        assert_eq!(texts(input), vec!["a", "/*x*/", "b", "/*! keep */"]);
    }

    #[test]
    fn test_unquoted_url_is_single_token() {
        let input = "url(a b.png) url('q.png')";
        let tokens = CssTokenizer::new(input).tokenize_all();
        assert_eq!(tokens[0].kind, TokenKind::Url);
        assert_eq!(tokens[2].kind, TokenKind::Function);
    }

    #[test]
    fn test_hash_at_and_hacks() {
        assert_eq!(
            kinds("#fff @media *zoom _height"),
            vec![
                TokenKind::Hash,
                TokenKind::Whitespace,
                TokenKind::AtKeyword,
                TokenKind::Whitespace,
                TokenKind::Delim('*'),
                TokenKind::Ident,
                TokenKind::Whitespace,
                TokenKind::Ident,
            ]
        );
    }

    #[test]
    fn test_escaped_ident() {
        let input = r"\31 0px";
        let tokens = CssTokenizer::new(input).tokenize_all();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Ident);
    }

    #[test]
    fn test_cdo_cdc() {
        assert_eq!(
            kinds("<!-- -->"),
            vec![TokenKind::CDO, TokenKind::Whitespace, TokenKind::CDC]
        );
    }
}
