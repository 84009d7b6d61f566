use std::ffi::OsString;
use std::iter;
use std::path::PathBuf;

use clap::error::{ContextKind, ErrorKind};
use clap::{ArgAction, Parser};

use crate::config::{LaunchConfig, Runtime};
use crate::error::LaunchError;

const POSITIONAL_COUNT: usize = 4;

/// Option grammar for everything after the four positionals.
#[derive(Debug, Parser)]
#[command(name = "start-container", disable_version_flag = true)]
struct Cli {
    /// Force the Docker container engine (default)
    #[arg(short, long, action = ArgAction::Count)]
    docker: u8,

    /// Force the Podman container engine
    #[arg(short, long, action = ArgAction::Count)]
    podman: u8,

    /// Run without a TTY and record the container id in out_dir
    #[arg(short = 'n', long = "non-interactive", action = ArgAction::Count)]
    non_interactive: u8,

    /// Mount this kernel source directory at /src
    #[arg(
        short = 'k',
        long = "kernel-src",
        value_name = "kernel_src_dir",
        allow_hyphen_values = true
    )]
    kernel_src: Vec<OsString>,

    /// Pass an environment variable to the container
    #[arg(short, long, value_name = "VAR", allow_hyphen_values = true)]
    env: Vec<String>,

    /// Verbose output
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Command to run in the container instead of bash
    #[arg(last = true)]
    command: Vec<String>,
}

/// Result of a successful parse.
#[derive(Debug)]
pub enum Parsed {
    Help,
    Launch(LaunchConfig),
}

/// Parse the full argument vector, program name included.
///
/// The first four arguments are taken verbatim as positionals, even when
/// they start with `-`; only the rest is scanned for options.
pub fn parse<I, T>(args: I) -> Result<Parsed, LaunchError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let mut args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    if args.len() < POSITIONAL_COUNT + 1 {
        return Err(LaunchError::Usage);
    }

    let options = args.split_off(POSITIONAL_COUNT + 1);
    let [prog, fuzzer_name, compiler, fuzzer_src_dir, out_dir]: [OsString; POSITIONAL_COUNT + 1] =
        args.try_into().map_err(|_| LaunchError::Usage)?;

    check_runtime_conflict(&options)?;

    let cli = match Cli::try_parse_from(iter::once(prog).chain(options)) {
        Ok(cli) => cli,
        Err(err) => return map_clap_error(&err),
    };

    let runtime = match (cli.docker, cli.podman) {
        (0, 0) => None,
        (1, 0) => Some(Runtime::Docker),
        (0, 1) => Some(Runtime::Podman),
        _ => return Err(LaunchError::ConflictingRuntime),
    };

    // Names end up in the image reference, which must be valid UTF-8.
    let fuzzer_name = fuzzer_name.into_string().map_err(|_| LaunchError::Usage)?;
    let compiler = compiler.into_string().map_err(|_| LaunchError::Usage)?;

    let mut cfg = LaunchConfig::new(fuzzer_name, compiler, fuzzer_src_dir, out_dir);
    cfg.runtime = runtime;
    cfg.interactive = cli.non_interactive == 0;
    cfg.kernel_src_dir = cli
        .kernel_src
        .into_iter()
        .next_back()
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from);
    cfg.env_vars = cli.env;
    cfg.verbosity = cli.verbose;
    cfg.command = cli.command;

    Ok(Parsed::Launch(cfg))
}

/// Walk the options left to right and fail at the second engine selection.
///
/// Stops at `--`, at help, and at anything it does not recognise, so those
/// keep their own outcome when they come first.
fn check_runtime_conflict(options: &[OsString]) -> Result<(), LaunchError> {
    let mut selected = 0;
    let mut tokens = options.iter();

    while let Some(token) = tokens.next() {
        match token.to_str() {
            Some("-d" | "--docker" | "-p" | "--podman") => {
                selected += 1;
                if selected > 1 {
                    return Err(LaunchError::ConflictingRuntime);
                }
            }
            Some("-k" | "--kernel-src" | "-e" | "--env") => {
                tokens.next();
            }
            Some("-n" | "--non-interactive" | "-v" | "--verbose") => {}
            Some(token) if has_attached_value(token) => {}
            _ => break,
        }
    }

    Ok(())
}

fn has_attached_value(token: &str) -> bool {
    token.starts_with("--kernel-src=")
        || token.starts_with("--env=")
        || (token.len() > 2 && (token.starts_with("-k") || token.starts_with("-e")))
}

fn map_clap_error(err: &clap::Error) -> Result<Parsed, LaunchError> {
    let offending = || {
        err.get(ContextKind::InvalidArg)
            .map(|v| v.to_string())
            .unwrap_or_default()
    };

    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
            Ok(Parsed::Help)
        }
        ErrorKind::InvalidValue => Err(LaunchError::MissingArgument {
            option: offending(),
        }),
        ErrorKind::UnknownArgument => Err(LaunchError::UnknownOption {
            option: offending(),
        }),
        _ => Err(LaunchError::Usage),
    }
}

/// Usage block printed for `-h` and for parse errors.
pub fn usage(prog: &str) -> String {
    let pad = " ".repeat(prog.len() + 8);
    format!(
        "usage: {prog} fuzzer_name compiler fuzzer_src_dir out_dir\n\
         {pad}[-h] [-d | -p] [-n] [-k kernel_src_dir] [-e VAR]... [-v] [-- cmd with args]\n\
         \n\
         Start a container with the build environment for a fuzzer.\n\
         \n\
         positional arguments:\n\
         \x20 fuzzer_name            fuzzer name, part of the image tag\n\
         \x20 compiler               compiler, e.g. gcc-13 or clang-17, part of the image tag\n\
         \x20 fuzzer_src_dir         fuzzer source directory, mounted at /fuzzer_src\n\
         \x20 out_dir                build output directory, mounted at /out\n\
         \n\
         options:\n\
         \x20 -h, --help             print this help and exit\n\
         \x20 -d, --docker           force to use the Docker container engine (default)\n\
         \x20 -p, --podman           force to use the Podman container engine\n\
         \x20 -n, --non-interactive  run without a TTY, write the container id to out_dir/container.id\n\
         \x20 -k, --kernel-src DIR   kernel source directory, mounted at /src\n\
         \x20 -e, --env VAR          environment variable for the container, may repeat\n\
         \x20 -v, --verbose          print debug output\n\
         \x20 -- cmd with args       command to run in the container (default: bash)\n"
    )
}
