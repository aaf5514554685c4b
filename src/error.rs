//! Error type for a conversion run

use crate::cli::args::ArgError;
use crate::config::ConfigError;
use crate::format::FormatTag;
use crate::mapping::MappingError;
use std::path::PathBuf;
use thiserror::Error;

/// Everything that can stop a conversion
///
/// None of these are retried; the binary reports the message and exits
/// with a non-zero status.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error(transparent)]
    Arg(#[from] ArgError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read mappings from {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: MappingError,
    },

    #[error("failed to open archive {}: {source}", path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("path {} doesn't match the directory rule of {tag}", path.display())]
    DirectoryRule { path: PathBuf, tag: FormatTag },

    #[error("unsupported mapping format: {0}")]
    UnsupportedFormat(String),

    #[error("unknown format for mappings.tiny in {}", .0.display())]
    UnknownEmbeddedFormat(PathBuf),

    #[error("required entry not found in {}: {entry}", path.display())]
    EntryNotFound { path: PathBuf, entry: &'static str },

    #[error("failed to download {url}: {message}")]
    Download { url: String, message: String },
}

impl ConvertError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConvertError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn read(path: impl Into<PathBuf>, source: impl Into<MappingError>) -> Self {
        ConvertError::Read {
            path: path.into(),
            source: source.into(),
        }
    }
}
