//! Result and error types for Locus.

use thiserror::Error;

/// Result type for Locus operations
pub type LocusResult<T> = Result<T, LocusError>;

/// Errors that can occur in Locus
#[derive(Debug, Error)]
pub enum LocusError {
    /// A selector list was built from zero selectors
    #[error("Selector list must contain at least one selector")]
    EmptySelectorList,

    /// A role selector names a role no engine can query
    #[error("Unsupported accessible role: {role}")]
    UnsupportedRole {
        /// Role name as written in the selector
        role: String,
    },

    /// The engine rejected a query before it ran (malformed CSS, XPath, ...)
    #[error("Invalid selector {selector}: {message}")]
    InvalidSelector {
        /// Selector description
        selector: String,
        /// Error message
        message: String,
    },

    /// A page object was asked for a name it never declared
    #[error("Page '{page}' has no selector named '{name}'")]
    UnknownSelector {
        /// Page name
        page: String,
        /// Logical element name
        name: String,
    },

    /// An action found no element for its handle
    #[error("No element matches {selector}")]
    ElementNotFound {
        /// Handle description
        selector: String,
    },

    /// The element exists but cannot take the requested action
    #[error("Element {selector} is not actionable: {message}")]
    NotActionable {
        /// Handle description
        selector: String,
        /// Error message
        message: String,
    },

    /// Operation timed out
    #[error("Timed out after {ms}ms waiting for {what}")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
        /// What was being waited for
        what: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    NavigationError {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunchError {
        /// Error message
        message: String,
    },

    /// Error raised by the automation engine itself
    #[error("Engine error: {message}")]
    Engine {
        /// Error message
        message: String,
    },

    /// Fixture error (setup/teardown failed)
    #[error("Fixture error: {message}")]
    FixtureError {
        /// Error message
        message: String,
    },

    /// Configuration error
    #[error("Invalid configuration: {message}")]
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

impl LocusError {
    /// Shorthand for an engine-native failure
    pub fn engine(message: impl Into<String>) -> Self {
        Self::Engine {
            message: message.into(),
        }
    }

    /// Whether this error means "nothing matched" rather than a broken query
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::ElementNotFound { .. } | Self::Timeout { .. })
    }
}
