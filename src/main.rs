#![forbid(unsafe_code)]

use mapping2tiny::cli::{self, Command};
use mapping2tiny::config::{CONFIG_ENV, ColorOption, Config};
use mapping2tiny::output::HumanReporter;
use std::env;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use termcolor::ColorChoice;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter
const LOG_ENV: &str = "MAPPING2TINY_LOG";

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let explicit = env::var_os(CONFIG_ENV).map(PathBuf::from);
    let config = Config::discover(explicit, &cwd);
    let color = config.as_ref().map(|c| c.color).unwrap_or_default();
    let reporter = HumanReporter::new(color_choice(color));

    let args = env::args_os()
        .skip(1)
        .map(|arg| arg.to_string_lossy().into_owned());
    let command = match cli::resolve_command(args, config) {
        Ok(command) => command,
        Err(e) => return fail(&reporter, &e),
    };

    match command {
        Command::Help => {
            // a closed stdout is not worth failing over
            let _ = reporter.write_help_to_stdout(&cli::help());
            ExitCode::SUCCESS
        }
        Command::Convert(invocation) => match cli::run(&invocation) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => fail(&reporter, &e),
        },
    }
}

/// `auto` colors only when stderr is a terminal
fn color_choice(option: ColorOption) -> ColorChoice {
    match option {
        ColorOption::Auto if !std::io::stderr().is_terminal() => ColorChoice::Never,
        other => other.into(),
    }
}

fn fail(reporter: &HumanReporter, err: &dyn std::error::Error) -> ExitCode {
    if reporter.write_error_to_stderr(err).is_err() {
        eprintln!("error: {err}");
    }
    ExitCode::FAILURE
}
