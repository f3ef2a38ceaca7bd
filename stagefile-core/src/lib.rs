mod config;
pub mod error;
pub mod model;
mod service;

use std::{fs, path::Path, str::FromStr};

use log::debug;

pub use config::ValueKind;
pub use error::{DecodeError, Position};
pub use model::{Pipeline, Stage, Task};
pub use service::encoder::encode;

/// Read the config file at `path` and decode it into a [`Pipeline`].
///
/// The file is read once and must be UTF-8; anything that prevents reading it
/// (missing file, permissions, a directory, invalid UTF-8) is reported as
/// [`DecodeError::FileUnreadable`].
pub fn decode<P: AsRef<Path>>(path: P) -> Result<Pipeline, DecodeError> {
    let path = path.as_ref();
    debug!("Reading pipeline config {}", path.display());

    let source = fs::read_to_string(path).map_err(|source| DecodeError::FileUnreadable {
        path: path.to_owned(),
        source,
    })?;

    decode_str(&source)
}

/// Decode config source text into a [`Pipeline`]. Nothing is returned on failure,
/// even if some stages were valid.
pub fn decode_str(source: &str) -> Result<Pipeline, DecodeError> {
    let document = service::block_parser::parse(source)?;
    Pipeline::try_from(document)
}

impl FromStr for Pipeline {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_str(s)
    }
}
