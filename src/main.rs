use std::ffi::OsString;
use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;

use fuzzer_build_container::cli::{self, Parsed};
use fuzzer_build_container::config::LaunchConfig;
use fuzzer_build_container::engine::CommandProbe;
use fuzzer_build_container::error::LaunchError;
use fuzzer_build_container::{launch, logging};

const DEFAULT_PROG: &str = "start-container";

fn main() -> ExitCode {
    let args: Vec<OsString> = std::env::args_os().collect();
    let prog = program_name(&args);

    let cfg = match cli::parse(args) {
        Ok(Parsed::Launch(cfg)) => cfg,
        Ok(Parsed::Help) => {
            print!("{}", cli::usage(&prog));
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            eprintln!("[-] ERROR: {err}");
            if err.shows_usage() {
                print!("{}", cli::usage(&prog));
            }
            return ExitCode::from(err.exit_code());
        }
    };

    if let Err(err) = logging::init(cfg.verbosity) {
        eprintln!("[-] ERROR: failed to set up logging: {err:#}");
        return ExitCode::FAILURE;
    }

    match run(cfg) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("[-] ERROR: {err:#}");
            let code = err
                .downcast_ref::<LaunchError>()
                .map_or(1, LaunchError::exit_code);
            ExitCode::from(code)
        }
    }
}

fn run(cfg: LaunchConfig) -> Result<ExitCode> {
    tracing::debug!("parsed arguments: {cfg:?}");
    let cfg = launch::finalize(cfg, &CommandProbe::new())?;
    launch::execute(&cfg)
}

/// Name the binary was invoked as, for the usage text.
fn program_name(args: &[OsString]) -> String {
    args.first()
        .and_then(|arg0| Path::new(arg0).file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_PROG.to_string())
}
