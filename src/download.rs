#![forbid(unsafe_code)]

//! Fetching `--download` inputs into a temporary file
//!
//! `http` and `https` URLs go through a blocking `reqwest` client; `file`
//! URLs are copied locally. The returned [`NamedTempFile`] deletes itself on
//! drop, so callers keep it alive for as long as the path is read.

use crate::error::ConvertError;
use reqwest::Url;
use std::fs::File;
use std::io;
use tempfile::NamedTempFile;
use tracing::debug;

/// Downloads `input` into a fresh temporary file
pub fn fetch(input: &str) -> Result<NamedTempFile, ConvertError> {
    let fail = |message: String| ConvertError::Download {
        url: input.to_string(),
        message,
    };

    let url = Url::parse(input).map_err(|e| fail(e.to_string()))?;
    let mut file = tempfile::Builder::new()
        .prefix("mapping2tiny-")
        .suffix(".tmp")
        .tempfile()
        .map_err(|e| fail(e.to_string()))?;

    let bytes = match url.scheme() {
        "file" => {
            let path = url
                .to_file_path()
                .map_err(|()| fail("not a local file path".to_string()))?;
            let mut source = File::open(&path).map_err(|e| fail(e.to_string()))?;
            io::copy(&mut source, file.as_file_mut()).map_err(|e| fail(e.to_string()))?
        }
        "http" | "https" => {
            let mut response = reqwest::blocking::get(url)
                .and_then(|r| r.error_for_status())
                .map_err(|e| fail(e.to_string()))?;
            response
                .copy_to(file.as_file_mut())
                .map_err(|e| fail(e.to_string()))?
        }
        other => return Err(fail(format!("unsupported scheme {other}"))),
    };

    debug!(url = input, bytes, path = %file.path().display(), "downloaded input");
    Ok(file)
}
