pub mod commands;

use std::process::ExitCode;

use anyhow::Result;
use tracing::{debug, info};

use crate::config::{LaunchConfig, Runtime};
use crate::engine::{self, RuntimeProbe};

pub use commands::{build_invocation, summary};

/// Resolve the runtime and decide whether sudo is needed.
///
/// Probes `<runtime> ps` once; "permission denied" in its output is the only
/// reason to use sudo.
pub fn finalize(mut cfg: LaunchConfig, probe: &impl RuntimeProbe) -> Result<LaunchConfig> {
    let runtime = match cfg.runtime {
        Some(runtime) => {
            info!(
                "[+] Force to use the {} container engine",
                runtime.display_name()
            );
            runtime
        }
        None => {
            info!("[+] Docker container engine is chosen (default)");
            Runtime::Docker
        }
    };
    cfg.runtime = Some(runtime);

    if runtime == Runtime::Podman {
        info!(
            "[!] INFO: Working with Podman containers belonging to \"{}\" (UID {})",
            engine::current_user(),
            engine::current_uid()
        );
    }

    let output = probe.list_running(runtime)?;
    debug!("`{runtime} ps` output:\n{}", output.trim_end());

    cfg.use_sudo = engine::needs_sudo(&output);
    if cfg.use_sudo {
        info!(
            "[!] INFO: We need \"sudo\" for working with {} containers",
            runtime.display_name()
        );
    }

    Ok(cfg)
}

/// Print the launch plan and hand over to the container engine.
pub fn execute(cfg: &LaunchConfig) -> Result<ExitCode> {
    for line in summary(cfg) {
        info!("{line}");
    }

    let invocation = build_invocation(cfg);
    debug!("invocation: {}", invocation.display());
    engine::hand_off(&invocation)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    struct FakeProbe {
        output: &'static str,
        seen: RefCell<Vec<Runtime>>,
    }

    impl FakeProbe {
        fn new(output: &'static str) -> Self {
            Self {
                output,
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl RuntimeProbe for FakeProbe {
        fn list_running(&self, runtime: Runtime) -> Result<String> {
            self.seen.borrow_mut().push(runtime);
            Ok(self.output.to_string())
        }
    }

    fn config() -> LaunchConfig {
        LaunchConfig::new("foo", "clang-15", "/src/foo", "/tmp/out")
    }

    #[test]
    fn unset_runtime_defaults_to_docker_and_probes_it() {
        let probe = FakeProbe::new("CONTAINER ID   IMAGE");
        let cfg = finalize(config(), &probe).unwrap();
        assert_eq!(cfg.runtime, Some(Runtime::Docker));
        assert!(!cfg.use_sudo);
        assert_eq!(*probe.seen.borrow(), [Runtime::Docker]);
    }

    #[test]
    fn explicit_podman_is_probed() {
        let probe = FakeProbe::new("");
        let mut cfg = config();
        cfg.runtime = Some(Runtime::Podman);
        let cfg = finalize(cfg, &probe).unwrap();
        assert_eq!(cfg.runtime, Some(Runtime::Podman));
        assert_eq!(*probe.seen.borrow(), [Runtime::Podman]);
    }

    #[test]
    fn permission_denied_turns_on_sudo() {
        let probe = FakeProbe::new(
            "Got Permission Denied while trying to connect to the Docker daemon socket",
        );
        let cfg = finalize(config(), &probe).unwrap();
        assert!(cfg.use_sudo);
        assert_eq!(build_invocation(&cfg).program, "sudo");
    }

    #[test]
    fn other_probe_failures_do_not_use_sudo() {
        let probe =
            FakeProbe::new("Cannot connect to the Docker daemon. Is the docker daemon running?");
        let cfg = finalize(config(), &probe).unwrap();
        assert!(!cfg.use_sudo);
        assert_eq!(build_invocation(&cfg).program, "docker");
    }

    #[test]
    fn probe_error_is_propagated() {
        struct Missing;
        impl RuntimeProbe for Missing {
            fn list_running(&self, runtime: Runtime) -> Result<String> {
                Err(crate::error::LaunchError::RuntimeNotInstalled {
                    runtime: runtime.to_string(),
                }
                .into())
            }
        }

        let err = finalize(config(), &Missing).unwrap_err();
        assert!(err.to_string().contains("not installed"));
    }
}
