//! Mapping table model, format readers and the tiny writer sink

pub mod enigma;
pub mod proguard;
pub mod tiny_v1;
pub mod tiny_v2;
pub mod tree;
pub mod writer;

pub use tree::{ArgMapping, ClassMapping, MappingTree, MemberMapping, MethodMapping};
pub use writer::{OutputFormat, TinyWriter};

use crate::error::ConvertError;
use thiserror::Error;

/// Fallback source namespace for formats without a header
pub const NS_SOURCE_FALLBACK: &str = "source";
/// Fallback target namespace for formats without a header
pub const NS_TARGET_FALLBACK: &str = "target";

/// Errors produced while decoding a mapping file
#[derive(Debug, Error)]
pub enum MappingError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to walk mapping directory: {0}")]
    Walk(#[from] ignore::Error),

    #[error("failed to read mapping archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("{format} line {line}: {message}")]
    Parse {
        format: &'static str,
        line: usize,
        message: String,
    },
}

impl MappingError {
    pub(crate) fn parse(format: &'static str, line: usize, message: impl Into<String>) -> Self {
        MappingError::Parse {
            format,
            line,
            message: message.into(),
        }
    }
}

/// Namespace names used by formats that do not declare their own
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespaces {
    pub source: String,
    pub target: String,
}

impl Default for Namespaces {
    fn default() -> Self {
        Namespaces {
            source: NS_SOURCE_FALLBACK.to_string(),
            target: NS_TARGET_FALLBACK.to_string(),
        }
    }
}

/// Destination for a decoded mapping table
pub trait MappingSink {
    fn accept(&mut self, tree: MappingTree) -> Result<(), ConvertError>;
}

/// Collects every accepted table in memory
impl MappingSink for Vec<MappingTree> {
    fn accept(&mut self, tree: MappingTree) -> Result<(), ConvertError> {
        self.push(tree);
        Ok(())
    }
}
