//! CLI-specific error types and exit code mapping

use pkgscan_core::error::PkgscanError;
use pkgscan_sca_client::ScaClientError;

/// CLI-specific error type.
///
/// The `exit_code()` method maps errors to process exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from pkgscan-core.
    #[error("{0}")]
    Core(#[from] PkgscanError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                 |
    /// |------|-------------------------|
    /// | 0    | Success                 |
    /// | 1    | General / command error |
    /// | 2    | Configuration error     |
    /// | 10   | IO error                |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Core(PkgscanError::Config(_)) => 2,
            Self::Io(_) | Self::Core(PkgscanError::Io(_)) => 10,
            Self::JsonSerialize(_) | Self::Command(_) | Self::Core(_) => 1,
        }
    }
}

impl From<ScaClientError> for CliError {
    fn from(e: ScaClientError) -> Self {
        match e {
            ScaClientError::Config { field, reason } => Self::Config(format!("{field}: {reason}")),
            ScaClientError::Io { path, source } => {
                Self::Io(std::io::Error::new(source.kind(), format!("{path}: {source}")))
            }
            other => Self::Command(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkgscan_core::error::{ConfigError, ScaError};

    #[test]
    fn test_exit_code_config_error() {
        let err = CliError::Config("test error".to_owned());
        assert_eq!(err.exit_code(), 2, "config error should return exit code 2");
    }

    #[test]
    fn test_exit_code_core_config_error() {
        let err = CliError::Core(PkgscanError::Config(ConfigError::ParseFailed {
            reason: "bad toml".to_owned(),
        }));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_exit_code_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        assert_eq!(CliError::Io(io_err).exit_code(), 10);
    }

    #[test]
    fn test_exit_code_command_error() {
        let err = CliError::Command("test error".to_owned());
        assert_eq!(err.exit_code(), 1, "command error should return exit code 1");
    }

    #[test]
    fn test_exit_code_core_sca_error() {
        let err = CliError::Core(PkgscanError::Sca(ScaError::Transport("down".to_owned())));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_from_sca_config_error() {
        let err: CliError = ScaClientError::Config {
            field: "max_workers".to_owned(),
            reason: "too many".to_owned(),
        }
        .into();
        assert!(matches!(err, CliError::Config(_)));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_from_sca_io_error_keeps_kind() {
        let err: CliError = ScaClientError::Io {
            path: "/missing".to_owned(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        }
        .into();
        match err {
            CliError::Io(e) => {
                assert_eq!(e.kind(), std::io::ErrorKind::NotFound);
                assert!(e.to_string().contains("/missing"));
            }
            _ => panic!("expected Io error variant"),
        }
    }

    #[test]
    fn test_from_sca_other_error_is_command() {
        let err: CliError = ScaClientError::Decode("bad gzip".to_owned()).into();
        assert!(matches!(err, CliError::Command(_)));
    }

    #[test]
    fn test_error_display_config() {
        let err = CliError::Config("invalid TOML syntax".to_owned());
        let display_str = err.to_string();
        assert!(display_str.contains("configuration error"));
        assert!(display_str.contains("invalid TOML syntax"));
    }
}
