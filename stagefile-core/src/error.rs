use std::{fmt, io, path::PathBuf};

use thiserror::Error;

use crate::config::ValueKind;

/// A line/column location in the decoded source, both 1-based.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

/// Maps byte offsets of one source text to line/column positions.
pub(crate) struct LineIndex<'a> {
    source: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    pub fn new(source: &'a str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(idx, _)| idx + 1))
            .collect();
        Self {
            source,
            line_starts,
        }
    }

    /// Columns count characters, not bytes. `offset` must sit on a char boundary.
    pub fn position(&self, offset: usize) -> Position {
        let offset = offset.min(self.source.len());
        let line = self.line_starts.partition_point(|&start| start <= offset);
        let line_start = self.line_starts[line - 1];
        Position {
            line,
            column: self.source[line_start..offset].chars().count() + 1,
        }
    }

    pub fn end(&self) -> Position {
        self.position(self.source.len())
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Could not read config file {}", .path.display())]
    FileUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Syntax error at {position}: {message}")]
    MalformedSyntax { position: Position, message: String },

    #[error("`{block}` block at {position} is missing required attribute `{attribute}`")]
    MissingRequiredAttribute {
        position: Position,
        block: &'static str,
        attribute: &'static str,
    },

    #[error("Attribute `{attribute}` at {position} must be a string, got {found}")]
    UnexpectedAttributeType {
        position: Position,
        attribute: String,
        found: ValueKind,
    },
}

impl DecodeError {
    pub(crate) fn syntax(position: Position, message: impl Into<String>) -> Self {
        Self::MalformedSyntax {
            position,
            message: message.into(),
        }
    }

    /// Where in the source the error was detected, if it came from the text itself.
    pub fn position(&self) -> Option<Position> {
        match self {
            Self::FileUnreadable { .. } => None,
            Self::MalformedSyntax { position, .. }
            | Self::MissingRequiredAttribute { position, .. }
            | Self::UnexpectedAttributeType { position, .. } => Some(*position),
        }
    }
}
