//! CLI argument parsing and command dispatch

pub mod args;
pub mod command;

// Re-export types for convenient access
pub use args::{ArgError, ArgKind, ArgList, ArgToken, OptionCursor, UnixTable};
pub use command::{Command, Invocation, UNIX_TABLE, help, parse_invocation, resolve_command, run};
