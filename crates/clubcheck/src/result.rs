//! Result and error types for clubcheck.

use thiserror::Error;

/// Result type for clubcheck operations
pub type ClubResult<T> = Result<T, ClubError>;

/// Errors that can occur while driving the storefront
#[derive(Debug, Error)]
pub enum ClubError {
    /// A bounded wait elapsed before its condition held
    #[error("Timed out after {ms}ms waiting for {condition}")]
    Timeout {
        /// Condition that was polled (locator, URL fragment, dialog)
        condition: String,
        /// Bound that elapsed, in milliseconds
        ms: u64,
    },

    /// An indexed interactive element does not exist
    #[error("{action}: no target at index {index} ({available} available)")]
    ActionUnavailable {
        /// Action that was attempted
        action: String,
        /// Requested index
        index: usize,
        /// Number of targets currently on the page
        available: usize,
    },

    /// Neither an in-page modal nor a native dialog appeared
    #[error("No confirmation surface found for {action}")]
    ConfirmationUnresolved {
        /// Action awaiting confirmation
        action: String,
    },

    /// Element handle no longer resolves to a node
    #[error("Stale element: {locator} [{index}]")]
    StaleElement {
        /// Locator the handle was resolved from
        locator: String,
        /// Index of the handle within the match list
        index: usize,
    },

    /// Session command failed
    #[error("Session error: {message}")]
    Session {
        /// Error message
        message: String,
    },

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Payment method outside `cod | banking | momo`
    #[error("Unknown payment method: {method}")]
    UnknownPaymentMethod {
        /// Method that was requested
        method: String,
    },

    /// Scenario assertion failed
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Error message
        message: String,
    },

    /// Scenario precondition not met; the scenario is skipped
    #[error("Precondition not met: {reason}")]
    PreconditionUnmet {
        /// Why the scenario cannot run
        reason: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl ClubError {
    /// Create a session error
    #[must_use]
    pub fn session(message: impl Into<String>) -> Self {
        Self::Session {
            message: message.into(),
        }
    }

    /// Create an assertion failure
    #[must_use]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            message: message.into(),
        }
    }

    /// Create a skipped-precondition error
    #[must_use]
    pub fn precondition(reason: impl Into<String>) -> Self {
        Self::PreconditionUnmet {
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether this is a bounded-wait timeout
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Whether a poll may keep going after this error.
    ///
    /// Stale handles and failed session commands are expected while the
    /// DOM is being rebuilt; everything else ends the wait.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::StaleElement { .. } | Self::Session { .. })
    }
}
