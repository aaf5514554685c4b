#![forbid(unsafe_code)]

//! Content detection: zip signature check and plain-text format sniffing

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

/// Local file header signature that starts every zip archive
pub const ZIP_SIGNATURE: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// Leading bytes handed to [`sniff`] for plain-text inputs
pub const SNIFF_WINDOW: u64 = 4096;

static PROGUARD_CLASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\S+ -> \S+:$").expect("valid proguard regex"));

/// Format recognized from the start of a plain-text mapping file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SniffedFormat {
    Tiny1,
    Tiny2,
    ProGuard,
    /// A single enigma file, only readable as part of a directory or archive
    Enigma,
    Unknown,
}

impl fmt::Display for SniffedFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SniffedFormat::Tiny1 => "tiny v1",
            SniffedFormat::Tiny2 => "tiny v2",
            SniffedFormat::ProGuard => "proguard",
            SniffedFormat::Enigma => "enigma file",
            SniffedFormat::Unknown => "unknown",
        })
    }
}

/// Whether the file starts with the zip signature
///
/// Exactly the first four bytes are read; a shorter file is not a zip.
pub fn is_zip(path: &Path) -> io::Result<bool> {
    let mut head = Vec::with_capacity(ZIP_SIGNATURE.len());
    File::open(path)?
        .take(ZIP_SIGNATURE.len() as u64)
        .read_to_end(&mut head)?;
    Ok(head == ZIP_SIGNATURE)
}

/// Classifies the leading window of a text mapping file
pub fn sniff(window: &str) -> SniffedFormat {
    if window.starts_with("v1\t") {
        return SniffedFormat::Tiny1;
    }
    if window.starts_with("tiny\t2\t") {
        return SniffedFormat::Tiny2;
    }
    if window.starts_with("CLASS ") || window.starts_with("CLASS\t") {
        return SniffedFormat::Enigma;
    }

    let first = window
        .lines()
        .map(str::trim_end)
        .find(|l| !l.trim().is_empty() && !l.starts_with('#'));
    match first {
        Some(line) if PROGUARD_CLASS.is_match(line) => SniffedFormat::ProGuard,
        _ => SniffedFormat::Unknown,
    }
}

/// Reads the first [`SNIFF_WINDOW`] bytes of a file and sniffs them
pub fn sniff_file(path: &Path) -> io::Result<SniffedFormat> {
    let mut window = Vec::new();
    File::open(path)?.take(SNIFF_WINDOW).read_to_end(&mut window)?;
    Ok(sniff(&String::from_utf8_lossy(&window)))
}
