#![forbid(unsafe_code)]

//! Format dispatch
//!
//! [`resolve`] turns a format tag and an input path into a deferred
//! [`Transform`]. Shape checks and plain-text sniffing happen while
//! resolving; archive inputs are scanned entry by entry only when the transform runs.

use super::detect::{self, SniffedFormat};
use super::tag::FormatTag;
use crate::error::ConvertError;
use crate::mapping::{MappingSink, MappingTree, Namespaces, enigma, proguard, tiny_v1, tiny_v2};
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::{Path, PathBuf};
use tracing::debug;
use zip::read::read_zipfile_from_stream;

/// Archive entry that marks a zip as carrying a tiny mapping
pub const EMBEDDED_TINY: &str = "mappings/mappings.tiny";

type TransformFn = dyn FnOnce(&mut dyn MappingSink) -> Result<(), ConvertError>;

/// A resolved, single-use conversion: reads the input and hands the table to a sink
pub struct Transform(Box<TransformFn>);

impl Transform {
    fn new(f: impl FnOnce(&mut dyn MappingSink) -> Result<(), ConvertError> + 'static) -> Self {
        Transform(Box::new(f))
    }

    pub fn run(self, sink: &mut dyn MappingSink) -> Result<(), ConvertError> {
        (self.0)(sink)
    }
}

/// What to do when an archive lacks [`EMBEDDED_TINY`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MissingEntry {
    Fail,
    FallBackToEnigma,
}

/// Resolves the transform for `input` under `tag`
///
/// Every tag except [`FormatTag::Autodetect`] first checks the directory
/// rule, so a mismatched path fails before anything is read.
pub fn resolve(
    tag: FormatTag,
    input: &Path,
    namespaces: &Namespaces,
) -> Result<Transform, ConvertError> {
    check_directory_rule(tag, input)?;

    let path = input.to_path_buf();
    let namespaces = namespaces.clone();
    let transform = match tag {
        FormatTag::Tiny1 => Transform::new(move |sink| {
            let tree = tiny_v1::read(open_text(&path)?).map_err(|e| ConvertError::read(&path, e))?;
            sink.accept(tree)
        }),
        FormatTag::Tiny2 => Transform::new(move |sink| {
            let tree = tiny_v2::read(open_text(&path)?).map_err(|e| ConvertError::read(&path, e))?;
            sink.accept(tree)
        }),
        FormatTag::ProGuard => Transform::new(move |sink| {
            let tree = proguard::read(open_text(&path)?, &namespaces)
                .map_err(|e| ConvertError::read(&path, e))?;
            sink.accept(tree)
        }),
        FormatTag::Enigma => Transform::new(move |sink| {
            let tree = enigma::read_directory(&path, &namespaces)
                .map_err(|e| ConvertError::read(&path, e))?;
            sink.accept(tree)
        }),
        FormatTag::EnigmaZip => Transform::new(move |sink| read_enigma_archive(&path, &namespaces, sink)),
        FormatTag::TinyZip => return detect(path, namespaces, MissingEntry::Fail),
        FormatTag::Autodetect => return detect(path, namespaces, MissingEntry::FallBackToEnigma),
    };
    Ok(transform)
}

fn check_directory_rule(tag: FormatTag, path: &Path) -> Result<(), ConvertError> {
    if tag == FormatTag::Autodetect || path.is_dir() == tag.expects_directory() {
        return Ok(());
    }
    Err(ConvertError::DirectoryRule {
        path: path.to_path_buf(),
        tag,
    })
}

fn open_text(path: &Path) -> Result<BufReader<File>, ConvertError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|e| ConvertError::io(path, e))
}

/// Shared body of autodetection and the tiny-zip tag
fn detect(
    path: PathBuf,
    namespaces: Namespaces,
    missing: MissingEntry,
) -> Result<Transform, ConvertError> {
    if path.is_dir() {
        debug!(path = %path.display(), "input is a directory, reading as enigma");
        return resolve(FormatTag::Enigma, &path, &namespaces);
    }

    if detect::is_zip(&path).map_err(|e| ConvertError::io(&path, e))? {
        debug!(path = %path.display(), "input is a zip archive");
        return Ok(scan_archive(path, namespaces, missing));
    }

    let sniffed = detect::sniff_file(&path).map_err(|e| ConvertError::io(&path, e))?;
    debug!(path = %path.display(), format = %sniffed, "sniffed plain mapping file");
    let tag = match sniffed {
        SniffedFormat::Tiny1 => FormatTag::Tiny1,
        SniffedFormat::Tiny2 => FormatTag::Tiny2,
        SniffedFormat::ProGuard => FormatTag::ProGuard,
        other => return Err(ConvertError::UnsupportedFormat(other.to_string())),
    };
    resolve(tag, &path, &namespaces)
}

fn scan_archive(path: PathBuf, namespaces: Namespaces, missing: MissingEntry) -> Transform {
    Transform::new(move |sink| match read_embedded_tiny(&path)? {
        Some(tree) => sink.accept(tree),
        None if missing == MissingEntry::Fail => Err(ConvertError::EntryNotFound {
            path,
            entry: EMBEDDED_TINY,
        }),
        None => {
            debug!(path = %path.display(), "no {EMBEDDED_TINY}, reading archive as enigma");
            read_enigma_archive(&path, &namespaces, sink)
        }
    })
}

/// Scans the archive for [`EMBEDDED_TINY`] and reads it if present
///
/// Entries are read in order from their local headers, so an archive whose
/// central directory is damaged or missing is still searched. The first three
/// bytes pick the tiny version and are chained back in front of the entry, so
/// the reader still sees the whole stream.
fn read_embedded_tiny(path: &Path) -> Result<Option<MappingTree>, ConvertError> {
    let archive_err = |source: zip::result::ZipError| ConvertError::Archive {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(|e| ConvertError::io(path, e))?;
    let mut stream = BufReader::new(file);

    while let Some(mut entry) = read_zipfile_from_stream(&mut stream).map_err(archive_err)? {
        if entry.name() != EMBEDDED_TINY {
            continue;
        }
        debug!(path = %path.display(), "found {EMBEDDED_TINY}");

        let mut head = Vec::with_capacity(3);
        entry
            .by_ref()
            .take(3)
            .read_to_end(&mut head)
            .map_err(|e| ConvertError::read(path, e))?;
        let version = match head.as_slice() {
            b"v1\t" => SniffedFormat::Tiny1,
            b"tin" => SniffedFormat::Tiny2,
            _ => return Err(ConvertError::UnknownEmbeddedFormat(path.to_path_buf())),
        };

        let reader = BufReader::new(Cursor::new(head).chain(entry));
        let tree = if version == SniffedFormat::Tiny1 {
            tiny_v1::read(reader)
        } else {
            tiny_v2::read(reader)
        };
        return tree.map(Some).map_err(|e| ConvertError::read(path, e));
    }

    Ok(None)
}

fn read_enigma_archive(
    path: &Path,
    namespaces: &Namespaces,
    sink: &mut dyn MappingSink,
) -> Result<(), ConvertError> {
    let tree = enigma::read_archive(path, namespaces).map_err(|e| ConvertError::read(path, e))?;
    sink.accept(tree)
}
