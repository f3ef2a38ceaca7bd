//! Generic block tree produced by the block parser, before any schema is applied.

use std::fmt;

use indexmap::IndexMap;

use crate::error::Position;

#[derive(Debug, Default)]
pub struct Body {
    pub attributes: IndexMap<String, Attribute>,
    pub blocks: Vec<Block>,
}

#[derive(Debug)]
pub struct Block {
    pub ty: String,
    pub labels: Vec<Label>,
    pub body: Body,
    pub position: Position,
}

#[derive(Debug)]
pub struct Label {
    pub value: String,
    pub position: Position,
}

#[derive(Debug)]
pub struct Attribute {
    pub value: Value,
    /// Position of the attribute name.
    pub position: Position,
    pub value_position: Position,
}

#[derive(PartialEq, Debug)]
pub enum Value {
    String(String),
    Number(String),
    Bool(bool),
    Identifier(String),
    List(Vec<Value>),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::String(_) => ValueKind::String,
            Value::Number(_) => ValueKind::Number,
            Value::Bool(_) => ValueKind::Bool,
            Value::Identifier(_) => ValueKind::Identifier,
            Value::List(_) => ValueKind::List,
        }
    }
}

/// The type of an attribute value as written in the source.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ValueKind {
    String,
    Number,
    Bool,
    Identifier,
    List,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValueKind::String => "string",
            ValueKind::Number => "number",
            ValueKind::Bool => "bool",
            ValueKind::Identifier => "identifier",
            ValueKind::List => "list",
        })
    }
}
