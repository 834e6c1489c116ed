// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Recursive-descent parser for annotation text.
//!
//! ```text
//! union   := primary ('|' primary)*
//! primary := NAME ['[' [union (',' union)* [',']] ']']
//!          | STRING | INT | FLOAT | True | False
//!          | '(' union ')'
//! ```

use super::tokenize::{tokenize, Token, TokenKind};
use super::{Annotation, Constant};
use crate::errors::ParseError;

pub(crate) fn parse(input: &str) -> Result<Annotation, ParseError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser::new(tokens);
    let annotation = parser.parse_union()?;
    if let Some(token) = parser.current() {
        return Err(ParseError::UnexpectedToken {
            found: token.kind.to_string(),
            offset: token.offset,
            expected: "end of annotation",
        });
    }
    Ok(annotation)
}

struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn consume_if(&mut self, kind: &TokenKind) -> bool {
        match self.current() {
            Some(token) if &token.kind == kind => {
                self.position += 1;
                true
            }
            _ => false,
        }
    }

    fn expect(&mut self, kind: &TokenKind, expected: &'static str) -> Result<(), ParseError> {
        if self.consume_if(kind) {
            return Ok(());
        }
        Err(self.unexpected(expected))
    }

    fn unexpected(&self, expected: &'static str) -> ParseError {
        match self.current() {
            Some(token) => ParseError::UnexpectedToken {
                found: token.kind.to_string(),
                offset: token.offset,
                expected,
            },
            None => ParseError::UnexpectedEnd { expected },
        }
    }

    fn parse_union(&mut self) -> Result<Annotation, ParseError> {
        let mut options = Vec::new();
        push_flat(&mut options, self.parse_primary()?);
        while self.consume_if(&TokenKind::Pipe) {
            push_flat(&mut options, self.parse_primary()?);
        }
        if options.len() == 1 {
            return Ok(options.remove(0));
        }
        Ok(Annotation::Union(options))
    }

    fn parse_primary(&mut self) -> Result<Annotation, ParseError> {
        let Some(token) = self.advance() else {
            return Err(ParseError::UnexpectedEnd {
                expected: "type annotation",
            });
        };
        match token.kind {
            TokenKind::Ident(name) => match name.as_str() {
                "True" | "true" => Ok(Annotation::Constant(Constant::Bool(true))),
                "False" | "false" => Ok(Annotation::Constant(Constant::Bool(false))),
                _ if self.consume_if(&TokenKind::OpenBracket) => {
                    let args = self.parse_args()?;
                    Ok(Annotation::Generic { name, args })
                }
                _ => Ok(Annotation::Name(name)),
            },
            TokenKind::Str(s) => Ok(Annotation::Constant(Constant::Str(s))),
            TokenKind::Int(i) => Ok(Annotation::Constant(Constant::Int(i))),
            TokenKind::Float(x) => Ok(Annotation::Constant(Constant::Float(x))),
            TokenKind::OpenParen => {
                let inner = self.parse_union()?;
                self.expect(&TokenKind::CloseParen, "')'")?;
                Ok(inner)
            }
            other => Err(ParseError::UnexpectedToken {
                found: other.to_string(),
                offset: token.offset,
                expected: "type annotation",
            }),
        }
    }

    fn parse_args(&mut self) -> Result<Vec<Annotation>, ParseError> {
        let mut args = Vec::new();
        if self.consume_if(&TokenKind::CloseBracket) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_union()?);
            if self.consume_if(&TokenKind::Comma) {
                if self.consume_if(&TokenKind::CloseBracket) {
                    return Ok(args);
                }
                continue;
            }
            self.expect(&TokenKind::CloseBracket, "',' or ']'")?;
            return Ok(args);
        }
    }
}

/// Nested unions are spliced into their parent.
pub(super) fn push_flat(options: &mut Vec<Annotation>, annotation: Annotation) {
    match annotation {
        Annotation::Union(inner) => options.extend(inner),
        other => options.push(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(n: &str) -> Annotation {
        Annotation::Name(n.to_string())
    }

    #[test]
    fn test_parse_bare_name() {
        assert_eq!(parse("int"), Ok(name("int")));
    }

    #[test]
    fn test_parse_nested_generic() {
        assert_eq!(
            parse("dict[str, list[int]]"),
            Ok(Annotation::Generic {
                name: "dict".into(),
                args: vec![
                    name("str"),
                    Annotation::Generic {
                        name: "list".into(),
                        args: vec![name("int")],
                    },
                ],
            })
        );
    }

    #[test]
    fn test_parse_union_flattens_parentheses() {
        assert_eq!(
            parse("int | (str | float)"),
            Ok(Annotation::Union(vec![name("int"), name("str"), name("float")]))
        );
    }

    #[test]
    fn test_parse_trailing_comma_and_empty_args() {
        assert_eq!(
            parse("tuple[int,]"),
            Ok(Annotation::Generic {
                name: "tuple".into(),
                args: vec![name("int")],
            })
        );
        assert_eq!(
            parse("tuple[]"),
            Ok(Annotation::Generic {
                name: "tuple".into(),
                args: vec![],
            })
        );
    }

    #[test]
    fn test_parse_constants() {
        assert_eq!(
            parse("Literal['a', 2, True]"),
            Ok(Annotation::Generic {
                name: "Literal".into(),
                args: vec![
                    Annotation::Constant(Constant::Str("a".into())),
                    Annotation::Constant(Constant::Int(2)),
                    Annotation::Constant(Constant::Bool(true)),
                ],
            })
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            parse("list[int"),
            Err(ParseError::UnexpectedEnd {
                expected: "',' or ']'"
            })
        );
        assert_eq!(
            parse(""),
            Err(ParseError::UnexpectedEnd {
                expected: "type annotation"
            })
        );
        assert!(matches!(
            parse("int str"),
            Err(ParseError::UnexpectedToken {
                offset: 4,
                expected: "end of annotation",
                ..
            })
        ));
        assert!(matches!(
            parse("int | ]"),
            Err(ParseError::UnexpectedToken { offset: 6, .. })
        ));
    }
}
