//! Source format selection: tag registry, content detection and dispatch

pub mod detect;
pub mod dispatch;
pub mod tag;

pub use detect::{SniffedFormat, ZIP_SIGNATURE, is_zip, sniff, sniff_file};
pub use dispatch::{EMBEDDED_TINY, Transform, resolve};
pub use tag::FormatTag;
