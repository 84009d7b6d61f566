use std::process::{ExitCode, ExitStatus};

use anyhow::Result;
use tracing::debug;

use super::types::ContainerCommand;
use crate::error::LaunchError;

/// Hand the terminal over to the container engine.
///
/// On Unix the current process image is replaced, so this only returns on
/// failure and the engine's exit status becomes ours. Elsewhere the engine is
/// spawned and waited on, and its exit code is returned unchanged.
pub fn hand_off(cmd: &ContainerCommand) -> Result<ExitCode> {
    debug!("handing off to {}", cmd.display());

    #[cfg(unix)]
    {
        use std::io::Write;
        use std::os::unix::process::CommandExt;

        // Buffered output would be lost with the process image.
        let _ = std::io::stdout().flush();
        let source = cmd.to_command().exec();
        Err(LaunchError::Exec {
            program: cmd.program.clone(),
            source,
        }
        .into())
    }

    #[cfg(not(unix))]
    {
        let status = cmd
            .to_command()
            .status()
            .map_err(|source| LaunchError::Exec {
                program: cmd.program.clone(),
                source,
            })?;
        Ok(ExitCode::from(exit_code_of(status)))
    }
}

/// Exit code to forward for a finished child.
///
/// A child killed by a signal maps to `128 + signo`, like a shell reports it.
pub fn exit_code_of(status: ExitStatus) -> u8 {
    if let Some(code) = status.code() {
        return (code & 0xff) as u8;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;

        if let Some(signal) = status.signal() {
            return (128 + signal).clamp(0, 255) as u8;
        }
    }

    1
}
