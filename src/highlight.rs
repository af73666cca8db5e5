use lazy_static::lazy_static;
use regex::Regex;
use std::fmt::Write;

use crate::lint::{PYTHON_BUILTINS, PYTHON_KEYWORDS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Plain,
    Keyword,
    Builtin,
    Identifier,
    String,
    StringEscape,
    Comment,
    Number,
    Operator,
    Bracket,
    ClassName,
    FunctionName,
    Decorator,
}

impl TokenKind {
    pub fn scope(self) -> &'static str {
        match self {
            TokenKind::Plain => "",
            TokenKind::Keyword => "keyword",
            TokenKind::Builtin => "support.function",
            TokenKind::Identifier => "identifier",
            TokenKind::String => "string",
            TokenKind::StringEscape => "string.escape",
            TokenKind::Comment => "comment",
            TokenKind::Number => "number",
            TokenKind::Operator => "operator",
            TokenKind::Bracket => "delimiter.bracket",
            TokenKind::ClassName => "type.class",
            TokenKind::FunctionName => "type.function",
            TokenKind::Decorator => "meta.decorator",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Root,
    Triple(&'static str),
    Double,
    Single,
}

lazy_static! {
    static ref DECORATOR: Regex = Regex::new(r"^([ \t]*)(@[A-Za-z_]\w*)").unwrap();
    static ref DEFINITION: Regex =
        Regex::new(r"^([ \t]*)(class|def)(\s+)([A-Za-z_]\w*)").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"^[ \t\r]+").unwrap();
    static ref COMMENT: Regex = Regex::new(r"^#.*").unwrap();
    static ref NUMBER: Regex = Regex::new(concat!(
        r"^(?:\d+\.\d+(?:[eE][+\-]?\d+)?j?",
        r"|\d+[eE][+\-]?\d+j?",
        r"|0[xX][0-9a-fA-F]+j?",
        r"|0[bB][01]+j?",
        r"|0[oO]?[0-7]+j?",
        r"|\d+j?)"
    ))
    .unwrap();
    static ref IDENT: Regex = Regex::new(r"^[A-Za-z_]\w*").unwrap();
    static ref OPERATOR: Regex = Regex::new(r"^[+\-*/%=&|<>!~^@]+").unwrap();
    static ref BRACKET: Regex = Regex::new(r"^[()\[\]{}]").unwrap();
}

struct Lexer {
    tokens: Vec<Token>,
    state: State,
}

impl Lexer {
    fn push(&mut self, kind: TokenKind, start: usize, end: usize) {
        if start == end {
            return;
        }
        if let Some(last) = self.tokens.last_mut() {
            if last.kind == kind && last.end == start {
                last.end = end;
                return;
            }
        }
        self.tokens.push(Token { kind, start, end });
    }

    fn line(&mut self, line: &str, base: usize) {
        let mut pos = 0;

        if self.state == State::Root {
            if let Some(caps) = DEFINITION.captures(line) {
                let name_kind = if &caps[2] == "class" {
                    TokenKind::ClassName
                } else {
                    TokenKind::FunctionName
                };
                for (group, kind) in [
                    (1, TokenKind::Plain),
                    (2, TokenKind::Keyword),
                    (3, TokenKind::Plain),
                    (4, name_kind),
                ] {
                    if let Some(m) = caps.get(group) {
                        self.push(kind, base + m.start(), base + m.end());
                    }
                }
                pos = caps.get(0).map_or(0, |m| m.end());
            } else if let Some(caps) = DECORATOR.captures(line) {
                if let (Some(ws), Some(name)) = (caps.get(1), caps.get(2)) {
                    self.push(TokenKind::Plain, base + ws.start(), base + ws.end());
                    self.push(TokenKind::Decorator, base + name.start(), base + name.end());
                    pos = name.end();
                }
            }
        }

        while pos < line.len() {
            let rest = &line[pos..];
            let (kind, len) = match self.state {
                State::Root => self.root(rest),
                State::Triple(delim) => {
                    if rest.starts_with(delim) {
                        self.state = State::Root;
                        (TokenKind::String, delim.len())
                    } else {
                        (TokenKind::String, first_char_len(rest))
                    }
                }
                State::Double => self.quoted(rest, '"'),
                State::Single => self.quoted(rest, '\''),
            };
            self.push(kind, base + pos, base + pos + len);
            pos += len;
        }
    }

    fn root(&mut self, rest: &str) -> (TokenKind, usize) {
        if let Some(m) = WHITESPACE.find(rest) {
            return (TokenKind::Plain, m.end());
        }
        if let Some(m) = COMMENT.find(rest) {
            return (TokenKind::Comment, m.end());
        }
        for delim in ["'''", "\"\"\""] {
            if rest.starts_with(delim) {
                self.state = State::Triple(delim);
                return (TokenKind::String, delim.len());
            }
        }
        if rest.starts_with('"') {
            self.state = State::Double;
            return (TokenKind::String, 1);
        }
        if rest.starts_with('\'') {
            self.state = State::Single;
            return (TokenKind::String, 1);
        }
        if let Some(m) = NUMBER.find(rest) {
            return (TokenKind::Number, m.end());
        }
        if let Some(m) = IDENT.find(rest) {
            let word = m.as_str();
            let kind = if PYTHON_KEYWORDS.contains(&word) {
                TokenKind::Keyword
            } else if PYTHON_BUILTINS.contains(&word) {
                TokenKind::Builtin
            } else {
                TokenKind::Identifier
            };
            return (kind, m.end());
        }
        if let Some(m) = OPERATOR.find(rest) {
            return (TokenKind::Operator, m.end());
        }
        if let Some(m) = BRACKET.find(rest) {
            return (TokenKind::Bracket, m.end());
        }
        (TokenKind::Plain, first_char_len(rest))
    }

    fn quoted(&mut self, rest: &str, quote: char) -> (TokenKind, usize) {
        let mut chars = rest.chars();
        match chars.next() {
            Some('\\') => match chars.next() {
                Some(escaped) => (TokenKind::StringEscape, 1 + escaped.len_utf8()),
                None => (TokenKind::String, 1),
            },
            Some(c) if c == quote => {
                self.state = State::Root;
                (TokenKind::String, 1)
            }
            Some(c) => (TokenKind::String, c.len_utf8()),
            None => (TokenKind::String, 0),
        }
    }
}

fn first_char_len(s: &str) -> usize {
    s.chars().next().map_or(1, char::len_utf8)
}

/// Split `source` into coloured spans covering every byte.
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut lexer = Lexer {
        tokens: Vec::new(),
        state: State::Root,
    };

    let mut base = 0;
    for line in source.split('\n') {
        lexer.line(line, base);
        base += line.len();
        if base < source.len() {
            lexer.push(TokenKind::Plain, base, base + 1);
            base += 1;
        }
    }
    lexer.tokens
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Style {
    pub foreground: Option<&'static str>,
    pub bold: bool,
    pub italic: bool,
}

impl Style {
    const fn fg(hex: &'static str) -> Self {
        Self {
            foreground: Some(hex),
            bold: false,
            italic: false,
        }
    }

    const fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    const fn italic(mut self) -> Self {
        self.italic = true;
        self
    }
}

#[derive(Debug, Clone)]
pub struct Theme {
    pub name: &'static str,
    pub background: &'static str,
    pub line_number: &'static str,
    pub cursor: &'static str,
    pub indent_guide: &'static str,
    rules: Vec<(&'static str, Style)>,
}

impl Theme {
    pub fn dark_plus() -> Self {
        Self {
            name: "vscode-dark-plus",
            background: "1E1E1E",
            line_number: "858585",
            cursor: "FFFFFF",
            indent_guide: "404040",
            rules: vec![
                ("keyword", Style::fg("569CD6").bold()),
                ("support.function", Style::fg("4EC9B0")),
                ("string", Style::fg("CE9178")),
                ("comment", Style::fg("6A9955").italic()),
                ("number", Style::fg("B5CEA8")),
                ("operator", Style::fg("D4D4D4")),
                ("identifier", Style::fg("9CDCFE")),
                ("type.class", Style::fg("4EC9B0").bold()),
                ("type.function", Style::fg("DCDCAA").bold()),
                ("meta.decorator", Style::fg("C586C0")),
                ("delimiter.bracket", Style::fg("DCDCAA")),
            ],
        }
    }

    // `string.escape` falls back to `string`
    pub fn style(&self, kind: TokenKind) -> Style {
        let scope = kind.scope();
        self.rules
            .iter()
            .filter(|(rule, _)| {
                !scope.is_empty()
                    && (scope == *rule
                        || (scope.starts_with(rule) && scope[rule.len()..].starts_with('.')))
            })
            .max_by_key(|(rule, _)| rule.len())
            .map(|(_, style)| *style)
            .unwrap_or_default()
    }
}

fn rgb(hex: &str) -> Option<(u8, u8, u8)> {
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

/// Source with 24-bit ANSI colour escapes, for terminal display.
pub fn render_ansi(source: &str, theme: &Theme) -> String {
    let mut out = String::with_capacity(source.len() * 2);
    for token in tokenize(source) {
        let text = token.text(source);
        let style = theme.style(token.kind);

        let mut codes = Vec::new();
        if style.bold {
            codes.push("1".to_string());
        }
        if style.italic {
            codes.push("3".to_string());
        }
        if let Some((r, g, b)) = style.foreground.and_then(rgb) {
            codes.push(format!("38;2;{};{};{}", r, g, b));
        }

        if codes.is_empty() {
            out.push_str(text);
        } else {
            let _ = write!(out, "\x1b[{}m{}\x1b[0m", codes.join(";"), text);
        }
    }
    out
}
