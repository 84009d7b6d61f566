use thiserror::Error;

/// Every way the launcher can fail before the container engine takes over.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("not enough arguments")]
    Usage,

    #[error("multiple container engines specified")]
    ConflictingRuntime,

    #[error("option {option} requires an argument")]
    MissingArgument { option: String },

    #[error("unknown option {option}")]
    UnknownOption { option: String },

    #[error("the container runtime \"{runtime}\" is not installed")]
    RuntimeNotInstalled { runtime: String },

    #[error("failed to execute \"{program}\"")]
    Exec {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

impl LaunchError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> u8 {
        1
    }

    /// Whether the usage text should follow the error message.
    pub fn shows_usage(&self) -> bool {
        matches!(
            self,
            LaunchError::Usage
                | LaunchError::MissingArgument { .. }
                | LaunchError::UnknownOption { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_errors_print_usage() {
        assert!(LaunchError::Usage.shows_usage());
        assert!(
            LaunchError::UnknownOption {
                option: "-x".into()
            }
            .shows_usage()
        );
        assert!(!LaunchError::ConflictingRuntime.shows_usage());
    }

    #[test]
    fn all_errors_exit_with_one() {
        let err = LaunchError::Exec {
            program: "docker".into(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert_eq!(err.exit_code(), 1);
        assert_eq!(LaunchError::ConflictingRuntime.exit_code(), 1);
    }
}
