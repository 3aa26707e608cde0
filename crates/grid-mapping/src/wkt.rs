//! Minimal WKT (OGC 01-009 and ISO 19162) tree parser.
//!
//! Only the syntax is handled here: the input is turned into a tree of
//! keyword nodes holding quoted strings, numbers, bare enumerations and
//! nested nodes. Interpreting the tree as a CRS lives in [`crate::geodesy`].
//!
//! Both `[ ]` and `( )` delimiters are accepted, and a quote inside a
//! quoted string is written as two quotes (`"Lambert ""93"""`).

use std::fmt;

/// A single value inside a WKT node.
#[derive(Debug, Clone, PartialEq)]
pub enum WktValue {
    /// Nested keyword node, e.g. `SPHEROID["WGS 84",6378137,298.257223563]`.
    Node(WktNode),
    /// Quoted string.
    Text(String),
    /// Numeric literal.
    Number(f64),
    /// Bare enumeration such as `NORTH` or `EAST`.
    Keyword(String),
}

/// A keyword node and its ordered values.
#[derive(Debug, Clone, PartialEq)]
pub struct WktNode {
    pub keyword: String,
    pub values: Vec<WktValue>,
}

impl WktNode {
    /// Whether the node keyword equals any of `keywords` (case-insensitive).
    pub fn is_any(&self, keywords: &[&str]) -> bool {
        keywords.iter().any(|k| self.keyword.eq_ignore_ascii_case(k))
    }

    /// Direct child nodes, in order.
    pub fn nodes(&self) -> impl Iterator<Item = &WktNode> {
        self.values.iter().filter_map(|v| match v {
            WktValue::Node(node) => Some(node),
            _ => None,
        })
    }

    /// First direct child whose keyword matches one of `keywords`.
    pub fn child(&self, keywords: &[&str]) -> Option<&WktNode> {
        self.nodes().find(|n| n.is_any(keywords))
    }

    /// All direct children whose keyword matches one of `keywords`.
    pub fn children(&self, keywords: &[&str]) -> Vec<&WktNode> {
        self.nodes().filter(|n| n.is_any(keywords)).collect()
    }

    /// Depth-first search for the first descendant matching one of `keywords`.
    pub fn find(&self, keywords: &[&str]) -> Option<&WktNode> {
        for node in self.nodes() {
            if node.is_any(keywords) {
                return Some(node);
            }
            if let Some(found) = node.find(keywords) {
                return Some(found);
            }
        }
        None
    }

    /// The `index`-th quoted string value.
    pub fn text(&self, index: usize) -> Option<&str> {
        self.values
            .iter()
            .filter_map(|v| match v {
                WktValue::Text(s) => Some(s.as_str()),
                _ => None,
            })
            .nth(index)
    }

    /// The `index`-th numeric value.
    pub fn number(&self, index: usize) -> Option<f64> {
        self.values
            .iter()
            .filter_map(|v| match v {
                WktValue::Number(n) => Some(*n),
                _ => None,
            })
            .nth(index)
    }
}

/// A syntax error with the byte offset where it was detected.
#[derive(Debug, Clone, PartialEq)]
pub struct WktSyntaxError {
    pub offset: usize,
    pub message: String,
}

impl fmt::Display for WktSyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at offset {}", self.message, self.offset)
    }
}

impl std::error::Error for WktSyntaxError {}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Text(String),
    Number(f64),
    Open(char),
    Close(char),
    Comma,
}

/// Parse a WKT string into its root node.
pub fn parse(input: &str) -> Result<WktNode, WktSyntaxError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser { tokens, pos: 0 };

    let root = match parser.next() {
        Some((offset, Token::Ident(keyword))) => parser.node(keyword, offset)?,
        Some((offset, _)) => return Err(error(offset, "expected a keyword")),
        None => return Err(error(0, "empty WKT")),
    };

    if let Some((offset, _)) = parser.peek() {
        return Err(error(offset, "unexpected trailing content"));
    }
    Ok(root)
}

fn error(offset: usize, message: impl Into<String>) -> WktSyntaxError {
    WktSyntaxError {
        offset,
        message: message.into(),
    }
}

fn tokenize(input: &str) -> Result<Vec<(usize, Token)>, WktSyntaxError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(offset, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '[' | '(' => {
                chars.next();
                tokens.push((offset, Token::Open(c)));
            }
            ']' | ')' => {
                chars.next();
                tokens.push((offset, Token::Close(c)));
            }
            ',' => {
                chars.next();
                tokens.push((offset, Token::Comma));
            }
            '"' => {
                chars.next();
                let mut text = String::new();
                loop {
                    match chars.next() {
                        Some((_, '"')) => {
                            // A doubled quote is an escaped quote.
                            if matches!(chars.peek(), Some((_, '"'))) {
                                chars.next();
                                text.push('"');
                            } else {
                                break;
                            }
                        }
                        Some((_, ch)) => text.push(ch),
                        None => return Err(error(offset, "unterminated string")),
                    }
                }
                tokens.push((offset, Token::Text(text)));
            }
            c if c == '-' || c == '+' || c == '.' || c.is_ascii_digit() => {
                let mut literal = String::new();
                while let Some(&(_, ch)) = chars.peek() {
                    let exponent_sign =
                        (ch == '-' || ch == '+') && matches!(literal.chars().last(), Some('e' | 'E'));
                    if ch.is_ascii_digit() || ch == '.' || ch == 'e' || ch == 'E' || exponent_sign
                        || (literal.is_empty() && (ch == '-' || ch == '+'))
                    {
                        literal.push(ch);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| error(offset, format!("invalid number '{literal}'")))?;
                tokens.push((offset, Token::Number(value)));
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut ident = String::new();
                while let Some(&(_, ch)) = chars.peek() {
                    if ch.is_alphanumeric() || ch == '_' {
                        ident.push(ch);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push((offset, Token::Ident(ident)));
            }
            other => return Err(error(offset, format!("unexpected character '{other}'"))),
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<(usize, Token)>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<(usize, &Token)> {
        self.tokens.get(self.pos).map(|(o, t)| (*o, t))
    }

    fn next(&mut self) -> Option<(usize, Token)> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    /// Parse the bracketed body of a node whose keyword was just consumed.
    fn node(&mut self, keyword: String, offset: usize) -> Result<WktNode, WktSyntaxError> {
        let close = match self.next() {
            Some((_, Token::Open('['))) => ']',
            Some((_, Token::Open(_))) => ')',
            _ => return Err(error(offset, format!("expected '[' after {keyword}"))),
        };

        let mut values = Vec::new();
        if let Some((_, Token::Close(c))) = self.peek() {
            let c = *c;
            self.pos += 1;
            return if c == close {
                Ok(WktNode { keyword, values })
            } else {
                Err(error(offset, format!("mismatched delimiter closing {keyword}")))
            };
        }

        loop {
            values.push(self.value()?);
            match self.next() {
                Some((_, Token::Comma)) => continue,
                Some((at, Token::Close(c))) => {
                    if c != close {
                        return Err(error(at, format!("mismatched delimiter closing {keyword}")));
                    }
                    break;
                }
                Some((at, _)) => return Err(error(at, "expected ',' or closing delimiter")),
                None => return Err(error(offset, format!("unterminated {keyword}"))),
            }
        }

        Ok(WktNode { keyword, values })
    }

    fn value(&mut self) -> Result<WktValue, WktSyntaxError> {
        match self.next() {
            Some((offset, Token::Ident(ident))) => {
                if matches!(self.peek(), Some((_, Token::Open(_)))) {
                    Ok(WktValue::Node(self.node(ident, offset)?))
                } else {
                    Ok(WktValue::Keyword(ident))
                }
            }
            Some((_, Token::Text(text))) => Ok(WktValue::Text(text)),
            Some((_, Token::Number(n))) => Ok(WktValue::Number(n)),
            Some((offset, _)) => Err(error(offset, "expected a value")),
            None => Err(error(self.tokens.last().map_or(0, |(o, _)| *o), "unexpected end of WKT")),
        }
    }
}
