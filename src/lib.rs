#![forbid(unsafe_code)]

//! Mapping2Tiny: convert obfuscation mappings to the tiny format
//!
//! Reads tiny v1, tiny v2, ProGuard and Enigma mappings (plain files,
//! directories, zip archives or downloaded URLs), detecting the format when
//! asked, and writes the table back out as tiny v1 or tiny v2.

pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod format;
pub mod mapping;
pub mod output;

pub use error::ConvertError;
