use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;

/// Repository part of every fuzzer build image reference.
pub const IMAGE_REPOSITORY: &str = "fuzzer-build-container";

const CONTAINER_ID_FILE: &str = "container.id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Runtime {
    Docker,
    Podman,
}

impl Runtime {
    /// Executable name looked up on `PATH`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Runtime::Docker => "docker",
            Runtime::Podman => "podman",
        }
    }

    /// Human-readable engine name for log lines.
    pub fn display_name(&self) -> &'static str {
        match self {
            Runtime::Docker => "Docker",
            Runtime::Podman => "Podman",
        }
    }

    /// Engine-specific arguments added to `run`.
    ///
    /// Rootless Podman maps the invoking user into the container so files
    /// written to the output directory keep the host owner.
    pub fn extra_run_args(&self) -> &'static [&'static str] {
        match self {
            Runtime::Docker => &[],
            Runtime::Podman => &["--userns=keep-id"],
        }
    }
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bind mount from a host directory into the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mount {
    pub host: PathBuf,
    pub target: &'static str,
}

impl Mount {
    pub fn new(host: impl Into<PathBuf>, target: &'static str) -> Self {
        Self {
            host: host.into(),
            target,
        }
    }

    /// `-v` value with the SELinux relabel suffix. The host path is kept byte for byte.
    pub fn volume_arg(&self) -> OsString {
        let mut arg = self.host.clone().into_os_string();
        arg.push(format!(":{}:Z", self.target));
        arg
    }
}

/// Everything needed to start one build container.
///
/// Filled by [`crate::cli::parse`], completed by [`crate::launch::finalize`]
/// and consumed by [`crate::launch::execute`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchConfig {
    pub fuzzer_name: String,
    pub compiler: String,
    pub fuzzer_src_dir: PathBuf,
    pub out_dir: PathBuf,
    pub kernel_src_dir: Option<PathBuf>,
    /// Raw `KEY=VAL` values, one `-e` each, in command-line order.
    pub env_vars: Vec<String>,
    pub interactive: bool,
    /// `None` until finalized; an unset runtime means Docker.
    pub runtime: Option<Runtime>,
    pub use_sudo: bool,
    /// Number of `-v` flags seen.
    pub verbosity: u8,
    pub command: Vec<String>,
}

impl LaunchConfig {
    pub fn new(
        fuzzer_name: impl Into<String>,
        compiler: impl Into<String>,
        fuzzer_src_dir: impl Into<PathBuf>,
        out_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            fuzzer_name: fuzzer_name.into(),
            compiler: compiler.into(),
            fuzzer_src_dir: fuzzer_src_dir.into(),
            out_dir: out_dir.into(),
            kernel_src_dir: None,
            env_vars: Vec::new(),
            interactive: true,
            runtime: None,
            use_sudo: false,
            verbosity: 0,
            command: Vec::new(),
        }
    }

    pub fn image_tag(&self) -> String {
        format!("{IMAGE_REPOSITORY}:{}-{}", self.fuzzer_name, self.compiler)
    }

    pub fn runtime(&self) -> Runtime {
        self.runtime.unwrap_or(Runtime::Docker)
    }

    /// Where the engine records the container id; only for non-interactive runs.
    pub fn container_id_file(&self) -> Option<PathBuf> {
        (!self.interactive).then(|| self.out_dir.join(CONTAINER_ID_FILE))
    }

    /// Planned mounts in the order they are passed to the engine.
    pub fn mounts(&self) -> Vec<Mount> {
        let mut mounts = vec![Mount::new(&self.fuzzer_src_dir, "/fuzzer_src")];
        if let Some(kernel) = &self.kernel_src_dir {
            mounts.push(Mount::new(kernel, "/src"));
        }
        mounts.push(Mount::new(&self.out_dir, "/out"));
        mounts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> LaunchConfig {
        LaunchConfig::new("syzkaller", "gcc-13", "/work/fuzzer", "/work/out")
    }

    #[test]
    fn image_tag_joins_name_and_compiler() {
        assert_eq!(
            config().image_tag(),
            "fuzzer-build-container:syzkaller-gcc-13"
        );
    }

    #[test]
    fn unset_runtime_means_docker() {
        let cfg = config();
        assert_eq!(cfg.runtime, None);
        assert_eq!(cfg.runtime(), Runtime::Docker);
    }

    #[test]
    fn podman_keeps_user_namespace() {
        assert_eq!(Runtime::Podman.extra_run_args(), &["--userns=keep-id"]);
        assert!(Runtime::Docker.extra_run_args().is_empty());
    }

    #[test]
    fn container_id_file_only_when_non_interactive() {
        let mut cfg = config();
        assert_eq!(cfg.container_id_file(), None);
        cfg.interactive = false;
        assert_eq!(
            cfg.container_id_file(),
            Some(PathBuf::from("/work/out/container.id"))
        );
    }

    #[test]
    fn mounts_include_kernel_only_when_set() {
        let mut cfg = config();
        let targets: Vec<_> = cfg.mounts().iter().map(|m| m.target).collect();
        assert_eq!(targets, ["/fuzzer_src", "/out"]);

        cfg.kernel_src_dir = Some("/kernel".into());
        let args: Vec<_> = cfg.mounts().iter().map(Mount::volume_arg).collect();
        assert_eq!(
            args,
            [
                "/work/fuzzer:/fuzzer_src:Z",
                "/kernel:/src:Z",
                "/work/out:/out:Z"
            ]
        );
    }
}
