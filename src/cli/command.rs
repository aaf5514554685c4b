#![forbid(unsafe_code)]

//! Command parsing and the conversion driver
//!
//! [`parse_invocation`] folds the option cursor into an [`Invocation`],
//! rejecting repeated options and the absence of an input or output. No file
//! is touched until [`run`].

use super::args::{ArgError, ArgList, OptionCursor, UnixTable};
use crate::config::{Config, ConfigError};
use crate::download;
use crate::error::ConvertError;
use crate::format::{self, FormatTag};
use crate::mapping::{Namespaces, OutputFormat, TinyWriter};
use std::path::PathBuf;
use std::sync::LazyLock;
use tracing::info;

/// Short flags understood by the command
pub static UNIX_TABLE: LazyLock<UnixTable> = LazyLock::new(|| {
    UnixTable::new(&[
        ('h', "help"),
        ('f', "from"),
        ('1', "tiny1"),
        ('2', "tiny2"),
        ('c', "default-source-name"),
        ('e', "default-target-name"),
        ('w', "download"),
        ('o', "output"),
    ])
});

/// What the command line asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Convert(Invocation),
}

/// A fully validated conversion request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub from: FormatTag,
    pub output_format: OutputFormat,
    pub namespaces: Namespaces,
    pub download: bool,
    /// Input path, or a URL when `download` is set
    pub input: String,
    pub output: PathBuf,
}

/// Usage text printed for `--help` or an empty command line
pub fn help() -> String {
    let ids = FormatTag::ALL
        .iter()
        .map(|tag| tag.id())
        .collect::<Vec<_>>()
        .join("|");
    format!(
        "Usage: mapping2tiny [OPTIONS] -o <OUTPUT> <INPUT>\n\
         \n\
         Converts a mapping file, directory, archive or URL into tiny v1 or v2.\n\
         \n\
         Options:\n  \
         -h, --help                        Print this help\n  \
         -f, --from <{ids}>\n                                    \
         Source format (default: autodetect)\n  \
         -1, --tiny1                       Write tiny v1\n  \
         -2, --tiny2                       Write tiny v2 (default)\n  \
         -c, --default-source-name <NAME>  Source namespace for formats without one\n  \
         -e, --default-target-name <NAME>  Target namespace for formats without one\n  \
         -w, --download                    Treat INPUT as a URL and fetch it first\n  \
         -o, --output <OUTPUT>             Output file\n"
    )
}

/// Stores `value` in `slot`, failing if the option was already given
fn set_once<T>(slot: &mut Option<T>, value: T, description: &'static str) -> Result<(), ArgError> {
    if slot.is_some() {
        return Err(ArgError::Duplicated(description));
    }
    *slot = Some(value);
    Ok(())
}

/// Takes the value of `--name`, naming the flag if the arguments ran out
fn option_value(cursor: &mut OptionCursor<'_>, name: &str) -> Result<String, ArgError> {
    cursor.next_positional().map_err(|e| match e {
        ArgError::MissingValue(_) => ArgError::MissingValue(format!("--{name}")),
        other => other,
    })
}

/// Parses raw arguments (without the program name) into a [`Command`]
///
/// `defaults` supplies values for options that are not given. Help wins as
/// soon as it is reached; options after it are not validated. Only an empty
/// command line means help; arguments that are all blank do not.
pub fn parse_invocation<I, S>(args: I, defaults: &Config) -> Result<Command, ArgError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let raw: Vec<S> = args.into_iter().collect();
    if raw.is_empty() {
        return Ok(Command::Help);
    }
    let list = ArgList::lex(raw);

    let mut from = None;
    let mut output_format = None;
    let mut source_name = None;
    let mut target_name = None;
    let mut download = None;
    let mut input = None;
    let mut output = None;

    let mut cursor = list.cursor(&UNIX_TABLE);
    while let Some(token) = cursor.next() {
        let token = token?;
        if token.is_normal() {
            set_once(&mut input, token.text().to_string(), "input")?;
            continue;
        }

        let name = token.text();
        match name {
            "help" => return Ok(Command::Help),
            "from" => {
                let id = option_value(&mut cursor, name)?;
                set_once(&mut from, FormatTag::by_id(&id), "source mapping")?;
            }
            "tiny1" => set_once(&mut output_format, OutputFormat::Tiny1, "output format")?,
            "tiny2" => set_once(&mut output_format, OutputFormat::Tiny2, "output format")?,
            "default-source-name" => {
                let value = option_value(&mut cursor, name)?;
                set_once(&mut source_name, value, "default source name")?;
            }
            "default-target-name" => {
                let value = option_value(&mut cursor, name)?;
                set_once(&mut target_name, value, "default target name")?;
            }
            "download" => set_once(&mut download, (), "download toggle")?,
            "output" => {
                let value = option_value(&mut cursor, name)?;
                set_once(&mut output, PathBuf::from(value), "output path")?;
            }
            _ => return Err(ArgError::UnknownOption(token.to_string())),
        }
    }

    let fallback = defaults.namespaces();
    let input = input.ok_or(ArgError::Missing("input"))?;
    let output = output.ok_or(ArgError::Missing("output"))?;

    Ok(Command::Convert(Invocation {
        from: from.unwrap_or(FormatTag::Autodetect),
        output_format: output_format
            .or(defaults.output_format)
            .unwrap_or_default(),
        namespaces: Namespaces {
            source: source_name.unwrap_or(fallback.source),
            target: target_name.unwrap_or(fallback.target),
        },
        download: download.is_some(),
        input,
        output,
    }))
}

/// Parses `args` against a configuration that may have failed to load
///
/// A broken config file does not get in the way of help. It is reported only
/// once the command line asks for a conversion.
pub fn resolve_command<I, S>(
    args: I,
    config: Result<Config, ConfigError>,
) -> Result<Command, ConvertError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let defaults = config.as_ref().cloned().unwrap_or_default();
    let command = parse_invocation(args, &defaults)?;
    if let Command::Convert(_) = command {
        config?;
    }
    Ok(command)
}

/// Executes a conversion: fetch, resolve, read and write
///
/// The output file is replaced only after the whole table was read.
pub fn run(invocation: &Invocation) -> Result<(), ConvertError> {
    info!(
        input = %invocation.input,
        from = %invocation.from,
        output = %invocation.output.display(),
        format = %invocation.output_format,
        "starting conversion"
    );

    // The temp file must outlive the transform.
    let downloaded;
    let input = if invocation.download {
        downloaded = download::fetch(&invocation.input)?;
        downloaded.path().to_path_buf()
    } else {
        PathBuf::from(&invocation.input)
    };

    let transform = format::resolve(invocation.from, &input, &invocation.namespaces)?;
    let mut writer = TinyWriter::new(&invocation.output, invocation.output_format);
    transform.run(&mut writer)?;

    info!(output = %invocation.output.display(), "conversion finished");
    Ok(())
}
