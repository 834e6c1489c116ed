// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use std::fmt;

use crate::errors::ParseError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    Ident(String),
    Str(String),
    Int(i64),
    Float(f64),
    OpenBracket,
    CloseBracket,
    OpenParen,
    CloseParen,
    Comma,
    Pipe,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ident(name) => write!(f, "name '{}'", name),
            Self::Str(s) => write!(f, "string {:?}", s),
            Self::Int(i) => write!(f, "integer {}", i),
            Self::Float(x) => write!(f, "number {}", x),
            Self::OpenBracket => f.write_str("'['"),
            Self::CloseBracket => f.write_str("']'"),
            Self::OpenParen => f.write_str("'('"),
            Self::CloseParen => f.write_str("')'"),
            Self::Comma => f.write_str("','"),
            Self::Pipe => f.write_str("'|'"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub offset: usize,
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}

pub(crate) fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(offset, c)) = chars.peek() {
        let single = match c {
            '[' => Some(TokenKind::OpenBracket),
            ']' => Some(TokenKind::CloseBracket),
            '(' => Some(TokenKind::OpenParen),
            ')' => Some(TokenKind::CloseParen),
            ',' => Some(TokenKind::Comma),
            '|' => Some(TokenKind::Pipe),
            _ => None,
        };
        if let Some(kind) = single {
            chars.next();
            tokens.push(Token { kind, offset });
            continue;
        }

        if c.is_whitespace() {
            chars.next();
        } else if c == '"' || c == '\'' {
            chars.next();
            tokens.push(Token {
                kind: TokenKind::Str(read_string(&mut chars, c, offset)?),
                offset,
            });
        } else if c.is_ascii_digit() || c == '-' {
            let mut text = String::new();
            text.push(c);
            chars.next();
            while let Some(&(_, d)) = chars.peek() {
                if d.is_ascii_digit() || d == '.' || d == '_' || d == 'e' || d == 'E' {
                    text.push(d);
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push(Token {
                kind: read_number(&text, offset)?,
                offset,
            });
        } else if is_ident_start(c) {
            let mut name = String::new();
            while let Some(&(_, d)) = chars.peek() {
                if is_ident_continue(d) {
                    name.push(d);
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push(Token {
                kind: TokenKind::Ident(name),
                offset,
            });
        } else {
            return Err(ParseError::UnexpectedChar { ch: c, offset });
        }
    }

    Ok(tokens)
}

fn read_string(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    quote: char,
    offset: usize,
) -> Result<String, ParseError> {
    let mut out = String::new();
    loop {
        let Some((_, c)) = chars.next() else {
            return Err(ParseError::UnterminatedString { offset });
        };
        if c == quote {
            return Ok(out);
        }
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some((_, escaped)) = chars.next() else {
            return Err(ParseError::UnterminatedString { offset });
        };
        match escaped {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            '0' => out.push('\0'),
            'u' => out.push(read_unicode_escape(chars, offset)?),
            other => out.push(other),
        }
    }
}

// `\u{XXXX}` as produced by `{:?}` formatting.
fn read_unicode_escape(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    offset: usize,
) -> Result<char, ParseError> {
    match chars.next() {
        Some((_, '{')) => {}
        Some((at, ch)) => return Err(ParseError::UnexpectedChar { ch, offset: at }),
        None => return Err(ParseError::UnterminatedString { offset }),
    }
    let mut hex = String::new();
    loop {
        match chars.next() {
            Some((_, '}')) => break,
            Some((_, d)) => hex.push(d),
            None => return Err(ParseError::UnterminatedString { offset }),
        }
    }
    u32::from_str_radix(&hex, 16)
        .ok()
        .and_then(char::from_u32)
        .ok_or(ParseError::InvalidNumber { text: hex, offset })
}

fn read_number(text: &str, offset: usize) -> Result<TokenKind, ParseError> {
    let cleaned: String = text.chars().filter(|c| *c != '_').collect();
    let invalid = || ParseError::InvalidNumber {
        text: text.to_string(),
        offset,
    };
    if cleaned.contains(['.', 'e', 'E']) {
        cleaned
            .parse::<f64>()
            .map(TokenKind::Float)
            .map_err(|_| invalid())
    } else {
        cleaned
            .parse::<i64>()
            .map(TokenKind::Int)
            .map_err(|_| invalid())
    }
}
