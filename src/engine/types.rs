use std::ffi::OsString;
use std::process::Command;

/// A fully assembled engine invocation: `program` followed by `args`.
///
/// When sudo is required, `program` is `sudo` and the runtime name is the
/// first argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerCommand {
    pub program: String,
    pub args: Vec<OsString>,
}

impl ContainerCommand {
    /// Program and arguments as a single vector.
    pub fn argv(&self) -> Vec<OsString> {
        let mut argv = Vec::with_capacity(self.args.len() + 1);
        argv.push(OsString::from(&self.program));
        argv.extend(self.args.iter().cloned());
        argv
    }

    /// Shell-quoted rendering for logs. Non-UTF-8 bytes are shown lossily.
    pub fn display(&self) -> String {
        shell_words::join(self.argv().iter().map(|arg| arg.to_string_lossy()))
    }

    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}
