use std::ffi::OsString;
use std::io::ErrorKind;
use std::process::Command;

use anyhow::{Context, Result};
use tracing::debug;

use crate::config::Runtime;
use crate::error::LaunchError;

const PERMISSION_DENIED: &str = "permission denied";

/// Runs the engine's "list running containers" subcommand.
pub trait RuntimeProbe {
    /// Combined stdout and stderr of `<runtime> ps`. A non-zero exit status
    /// is not an error.
    fn list_running(&self, runtime: Runtime) -> Result<String>;
}

/// Probe that actually spawns the engine binary found on `PATH`.
#[derive(Debug, Default, Clone)]
pub struct CommandProbe {
    search_path: Option<OsString>,
}

impl CommandProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look the engine up in `search_path` instead of the inherited `PATH`.
    pub fn with_search_path(search_path: impl Into<OsString>) -> Self {
        Self {
            search_path: Some(search_path.into()),
        }
    }
}

impl RuntimeProbe for CommandProbe {
    fn list_running(&self, runtime: Runtime) -> Result<String> {
        let mut cmd = Command::new(runtime.as_str());
        cmd.arg("ps");
        if let Some(path) = &self.search_path {
            cmd.env("PATH", path);
        }

        let output = match cmd.output() {
            Ok(output) => output,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(LaunchError::RuntimeNotInstalled {
                    runtime: runtime.as_str().to_string(),
                }
                .into());
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to invoke `{runtime} ps`"));
            }
        };

        debug!("`{runtime} ps` exited with {}", output.status);

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(text)
    }
}

/// Whether probe output shows the engine socket is not accessible to us.
pub fn needs_sudo(probe_output: &str) -> bool {
    probe_output
        .to_ascii_lowercase()
        .contains(PERMISSION_DENIED)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_denied_any_case() {
        assert!(needs_sudo(
            "permission denied while trying to connect to the Docker daemon socket"
        ));
        assert!(needs_sudo("Got PERMISSION DENIED"));
        assert!(needs_sudo("error: Permission Denied\n"));
    }

    #[test]
    fn other_output_does_not_need_sudo() {
        assert!(!needs_sudo(""));
        assert!(!needs_sudo("CONTAINER ID   IMAGE   COMMAND"));
        assert!(!needs_sudo("Cannot connect to the Docker daemon. Is it running?"));
        assert!(!needs_sudo("permission\ndenied"));
    }

    #[cfg(unix)]
    fn fake_engine(name: &str, body: &str) -> tempfile::TempDir {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let path = dir.path().join(name);
        std::fs::write(&path, body).expect("failed to write fake engine");
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .expect("chmod failed");
        dir
    }

    #[cfg(unix)]
    #[test]
    fn command_probe_combines_output_and_ignores_exit_status() {
        let dir = fake_engine(
            "docker",
            "#!/bin/sh\n\
             [ \"$1\" = ps ] || exit 2\n\
             echo \"CONTAINER ID\"\n\
             echo \"Got permission denied while trying to connect\" >&2\n\
             exit 1\n",
        );

        let output = CommandProbe::with_search_path(dir.path())
            .list_running(Runtime::Docker)
            .expect("probe should run");
        assert!(output.contains("CONTAINER ID"));
        assert!(output.contains("permission denied"));
        assert!(needs_sudo(&output));
    }

    #[cfg(unix)]
    #[test]
    fn command_probe_runs_the_selected_runtime() {
        let dir = fake_engine("podman", "#!/bin/sh\necho \"podman $1\"\n");

        let output = CommandProbe::with_search_path(dir.path())
            .list_running(Runtime::Podman)
            .expect("probe should run");
        assert_eq!(output, "podman ps\n");
        assert!(!needs_sudo(&output));
    }

    #[cfg(unix)]
    #[test]
    fn missing_runtime_is_not_installed() {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let err = CommandProbe::with_search_path(dir.path())
            .list_running(Runtime::Docker)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LaunchError>(),
            Some(LaunchError::RuntimeNotInstalled { runtime }) if runtime == "docker"
        ));
    }
}
