#![forbid(unsafe_code)]

//! Parsing of the optional `mapping2tiny.toml` defaults file
//!
//! ```toml
//! default_source_name = "official"
//! default_target_name = "named"
//! output_format = "tiny1"
//! color = "never"
//! ```
//!
//! Every key is optional. Command-line options take precedence.

use crate::mapping::{Namespaces, OutputFormat};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File looked up in the working directory when no explicit path is given
pub const CONFIG_FILE_NAME: &str = "mapping2tiny.toml";

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "MAPPING2TINY_CONFIG";

/// Errors that can occur when loading the configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// When to colorize diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorOption {
    #[default]
    Auto,
    Always,
    Never,
}

impl From<ColorOption> for termcolor::ColorChoice {
    fn from(value: ColorOption) -> Self {
        match value {
            ColorOption::Auto => termcolor::ColorChoice::Auto,
            ColorOption::Always => termcolor::ColorChoice::Always,
            ColorOption::Never => termcolor::ColorChoice::Never,
        }
    }
}

/// Defaults applied before command-line options
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub default_source_name: Option<String>,
    pub default_target_name: Option<String>,
    pub output_format: Option<OutputFormat>,
    #[serde(default)]
    pub color: ColorOption,
}

impl Config {
    /// Parses a config from TOML text
    pub fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads a config file from an explicit path
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }

    /// Loads the config named by `explicit`, else `mapping2tiny.toml` in
    /// `dir` if it exists, else the built-in defaults
    pub fn discover(explicit: Option<PathBuf>, dir: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(&path);
        }
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    /// Namespace defaults with the built-in fallbacks filled in
    pub fn namespaces(&self) -> Namespaces {
        let fallback = Namespaces::default();
        Namespaces {
            source: self
                .default_source_name
                .clone()
                .unwrap_or(fallback.source),
            target: self
                .default_target_name
                .clone()
                .unwrap_or(fallback.target),
        }
    }
}
