use std::ffi::OsString;

use crate::config::LaunchConfig;
use crate::engine::ContainerCommand;

const SUDO: &str = "sudo";

/// Build the full `<runtime> run ...` invocation for a finalized config.
///
/// Argument order: env flags, TTY flags, cidfile, engine extras, pull policy,
/// auto-remove, mounts, image, then the trailing command.
pub fn build_invocation(cfg: &LaunchConfig) -> ContainerCommand {
    let runtime = cfg.runtime();

    let mut args: Vec<OsString> = Vec::new();
    if cfg.use_sudo {
        args.push(runtime.as_str().into());
    }
    args.push("run".into());

    for var in &cfg.env_vars {
        args.push("-e".into());
        args.push(var.into());
    }

    if cfg.interactive {
        args.push("-it".into());
    }

    if let Some(cid_file) = cfg.container_id_file() {
        args.push("--cidfile".into());
        args.push(cid_file.into_os_string());
    }

    args.extend(runtime.extra_run_args().iter().map(OsString::from));

    // The image is built locally beforehand; never reach for a registry.
    args.push("--pull=never".into());
    args.push("--rm".into());

    for mount in cfg.mounts() {
        args.push("-v".into());
        args.push(mount.volume_arg());
    }

    args.push(cfg.image_tag().into());
    args.extend(cfg.command.iter().map(OsString::from));

    let program = if cfg.use_sudo { SUDO } else { runtime.as_str() };
    ContainerCommand {
        program: program.to_string(),
        args,
    }
}

/// Human-readable description of what is about to run.
pub fn summary(cfg: &LaunchConfig) -> Vec<String> {
    let mut lines = vec![format!("Starting a container from the image {}", cfg.image_tag())];

    if !cfg.env_vars.is_empty() {
        let env: Vec<String> = cfg.env_vars.iter().map(|v| format!("-e {v}")).collect();
        lines.push(format!("Container environment: {}", env.join(" ")));
    }

    if cfg.interactive {
        lines.push("Run the container interactively".to_string());
    }

    for mount in cfg.mounts() {
        let label = match mount.target {
            "/fuzzer_src" => "fuzzer source",
            "/src" => "kernel source",
            _ => "output",
        };
        lines.push(format!(
            "Mount {label} directory \"{}\" at \"{}\"",
            mount.host.display(),
            mount.target
        ));
    }

    if cfg.command.is_empty() {
        lines.push("Run \"bash\"".to_string());
    } else {
        lines.push(format!("Run \"{}\"", shell_words::join(&cfg.command)));
    }

    lines
}
