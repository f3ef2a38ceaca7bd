use std::{fmt, iter::Peekable, vec};

use logos::Logos;

use crate::{
    config::{self, Attribute, Block, Label, Value},
    error::{DecodeError, LineIndex, Position},
};

mod string;

/// Deepest nesting of blocks and lists accepted before giving up.
const MAX_DEPTH: usize = 64;

#[derive(Default, Clone, PartialEq, Debug)]
pub(crate) enum LexError {
    #[default]
    UnexpectedCharacter,
    InvalidEscape(String),
}

#[derive(Logos, PartialEq, Debug)]
#[logos(error = LexError)]
#[logos(skip(r"[ \t\r\n\f]+|#[^\n]*|//[^\n]*|/\*([^*]|\*+[^*/])*\*+/", allow_greedy = true))]
pub(crate) enum Token<'a> {
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("=")]
    Equals,
    #[token(",")]
    Comma,
    #[token("true", |_| true)]
    #[token("false", |_| false)]
    Bool(bool),
    #[regex(r"-?[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?")]
    Number(&'a str),
    #[regex(r"[A-Za-z_][A-Za-z0-9_\-]*")]
    Identifier(&'a str),
    #[regex(r#""([^"\\\n]|\\.)*""#, string::unescape)]
    String(String),
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::LBrace => f.write_str("`{`"),
            Token::RBrace => f.write_str("`}`"),
            Token::LBracket => f.write_str("`[`"),
            Token::RBracket => f.write_str("`]`"),
            Token::Equals => f.write_str("`=`"),
            Token::Comma => f.write_str("`,`"),
            Token::Bool(value) => write!(f, "`{value}`"),
            Token::Number(value) => write!(f, "number `{value}`"),
            Token::Identifier(value) => write!(f, "identifier `{value}`"),
            Token::String(value) => write!(f, "string {value:?}"),
        }
    }
}

/// Parse `source` into a generic block tree. Attributes and blocks are kept in
/// source order; no schema is applied here.
pub fn parse(source: &str) -> Result<config::Body, DecodeError> {
    let lines = LineIndex::new(source);

    let tokens = Token::lexer(source)
        .spanned()
        .map(|(token, span)| {
            let position = lines.position(span.start);
            match token {
                Ok(token) => Ok((token, position)),
                Err(err) => Err(lex_error(err, &source[span.start..], position)),
            }
        })
        .collect::<Result<Vec<_>, _>>()?;
    log::trace!("Lexed {} token(s)", tokens.len());

    let mut parser = Parser {
        tokens: tokens.into_iter().peekable(),
        end: lines.end(),
        depth: 0,
    };
    parser.parse_body(None)
}

/// `rest` is the source from the start of the failed token onwards.
fn lex_error(err: LexError, rest: &str, position: Position) -> DecodeError {
    let message = match err {
        LexError::InvalidEscape(escape) => format!("Invalid escape sequence `{escape}` in string"),
        LexError::UnexpectedCharacter if rest.starts_with('"') => {
            "Unterminated string".to_owned()
        }
        LexError::UnexpectedCharacter if rest.starts_with("/*") => {
            "Unterminated comment".to_owned()
        }
        LexError::UnexpectedCharacter => format!(
            "Unexpected character `{}`",
            rest.chars().next().map(String::from).unwrap_or_default()
        ),
    };
    DecodeError::syntax(position, message)
}

struct Parser<'a> {
    tokens: Peekable<vec::IntoIter<(Token<'a>, Position)>>,
    end: Position,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn enter(&mut self, opened_at: Position) -> Result<(), DecodeError> {
        if self.depth == MAX_DEPTH {
            return Err(DecodeError::syntax(
                opened_at,
                format!("Nesting deeper than {MAX_DEPTH} levels"),
            ));
        }
        self.depth += 1;
        Ok(())
    }

    /// `opened_at` is the position of the `{` this body belongs to, `None` for the document.
    fn parse_body(&mut self, opened_at: Option<Position>) -> Result<config::Body, DecodeError> {
        let mut body = config::Body::default();

        loop {
            let Some((token, position)) = self.tokens.next() else {
                return match opened_at {
                    Some(opened_at) => Err(DecodeError::syntax(
                        self.end,
                        format!("Expected `}}` to close the block opened at {opened_at}"),
                    )),
                    None => Ok(body),
                };
            };

            match token {
                Token::RBrace if opened_at.is_some() => return Ok(body),
                Token::Identifier(name) => match self.tokens.peek() {
                    Some((Token::Equals, _)) => {
                        self.tokens.next();
                        if body.attributes.contains_key(name) {
                            return Err(DecodeError::syntax(
                                position,
                                format!("Duplicate attribute `{name}`"),
                            ));
                        }
                        let (value, value_position) = self.parse_value()?;
                        body.attributes.insert(
                            name.to_owned(),
                            Attribute {
                                value,
                                position,
                                value_position,
                            },
                        );
                    }
                    Some((Token::String(_) | Token::LBrace, _)) => {
                        let block = self.parse_block(name, position)?;
                        body.blocks.push(block);
                    }
                    Some((other, other_position)) => {
                        return Err(DecodeError::syntax(
                            *other_position,
                            format!("Expected `=` or a block after `{name}`, found {other}"),
                        ));
                    }
                    None => {
                        return Err(DecodeError::syntax(
                            self.end,
                            format!("Expected `=` or a block after `{name}`, found end of input"),
                        ));
                    }
                },
                other => {
                    return Err(DecodeError::syntax(
                        position,
                        format!("Expected an attribute or a block, found {other}"),
                    ));
                }
            }
        }
    }

    fn parse_block(&mut self, ty: &str, position: Position) -> Result<Block, DecodeError> {
        let mut labels = Vec::new();

        loop {
            match self.tokens.next() {
                Some((Token::String(value), label_position)) => labels.push(Label {
                    value,
                    position: label_position,
                }),
                Some((Token::LBrace, opened_at)) => {
                    self.enter(opened_at)?;
                    let body = self.parse_body(Some(opened_at))?;
                    self.depth -= 1;
                    return Ok(Block {
                        ty: ty.to_owned(),
                        labels,
                        body,
                        position,
                    });
                }
                Some((other, other_position)) => {
                    return Err(DecodeError::syntax(
                        other_position,
                        format!("Expected a label or `{{` after `{ty}`, found {other}"),
                    ));
                }
                None => {
                    return Err(DecodeError::syntax(
                        self.end,
                        format!("Expected a label or `{{` after `{ty}`, found end of input"),
                    ));
                }
            }
        }
    }

    fn parse_value(&mut self) -> Result<(Value, Position), DecodeError> {
        let Some((token, position)) = self.tokens.next() else {
            return Err(DecodeError::syntax(
                self.end,
                "Expected a value, found end of input",
            ));
        };

        let value = match token {
            Token::String(value) => Value::String(value),
            Token::Number(value) => Value::Number(value.to_owned()),
            Token::Bool(value) => Value::Bool(value),
            Token::Identifier(value) => Value::Identifier(value.to_owned()),
            Token::LBracket => {
                self.enter(position)?;
                let items = self.parse_list(position)?;
                self.depth -= 1;
                Value::List(items)
            }
            other => {
                return Err(DecodeError::syntax(
                    position,
                    format!("Expected a value, found {other}"),
                ));
            }
        };

        Ok((value, position))
    }

    fn parse_list(&mut self, opened_at: Position) -> Result<Vec<Value>, DecodeError> {
        let mut items = Vec::new();

        loop {
            if let Some((Token::RBracket, _)) = self.tokens.peek() {
                self.tokens.next();
                return Ok(items);
            }

            let (item, _) = self.parse_value()?;
            items.push(item);

            match self.tokens.next() {
                Some((Token::Comma, _)) => {}
                Some((Token::RBracket, _)) => return Ok(items),
                Some((other, position)) => {
                    return Err(DecodeError::syntax(
                        position,
                        format!("Expected `,` or `]` in the list opened at {opened_at}, found {other}"),
                    ));
                }
                None => {
                    return Err(DecodeError::syntax(
                        self.end,
                        format!("Expected `]` to close the list opened at {opened_at}"),
                    ));
                }
            }
        }
    }
}
