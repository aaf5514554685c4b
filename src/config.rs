//! Configuration file parsing

pub mod mapping2tiny_toml;

pub use mapping2tiny_toml::{CONFIG_ENV, CONFIG_FILE_NAME, ColorOption, Config, ConfigError};
