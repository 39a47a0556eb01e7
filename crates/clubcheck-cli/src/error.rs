//! Error types for the CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// One or more scenarios failed
    #[error("Scenario run failed: {message}")]
    ScenarioFailure {
        /// Error message
        message: String,
    },

    /// Nothing matched the selection
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Error message
        message: String,
    },

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// clubcheck library error
    #[error("{0}")]
    Club(#[from] clubcheck::ClubError),
}

impl CliError {
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn scenario_failure(message: impl Into<String>) -> Self {
        Self::ScenarioFailure {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error() {
        let err = CliError::config("bad config");
        assert!(err.to_string().contains("Configuration"));
        assert!(err.to_string().contains("bad config"));
    }

    #[test]
    fn test_scenario_failure_error() {
        let err = CliError::scenario_failure("2 scenario(s) failed");
        assert!(err.to_string().contains("2 scenario(s) failed"));
    }

    #[test]
    fn test_club_error_from() {
        let err: CliError = clubcheck::ClubError::config("EXPLICIT_WAIT is not a number").into();
        assert!(err.to_string().contains("EXPLICIT_WAIT"));
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let cli_err: CliError = io_err.into();
        assert!(cli_err.to_string().contains("I/O"));
    }
}
