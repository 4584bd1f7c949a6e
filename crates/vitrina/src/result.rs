//! Result and error types for Vitrina.

use thiserror::Error;

/// Result type for Vitrina operations
pub type VitrinaResult<T> = Result<T, VitrinaError>;

/// Errors that can occur in Vitrina
#[derive(Debug, Error)]
pub enum VitrinaError {
    /// A page object was constructed against the wrong page
    #[error("Expected page '{expected}' but the session is at {url}")]
    PageMismatch {
        /// Identity the page object expected
        expected: String,
        /// URL the session was actually on
        url: String,
    },

    /// A bounded wait elapsed without the condition holding
    #[error("Timed out after {ms}ms waiting for {waiting_for}")]
    Timeout {
        /// Timeout bound in milliseconds
        ms: u64,
        /// Description of what was waited for
        waiting_for: String,
    },

    /// A scoped lookup found no element
    #[error("No element found for {selector}")]
    ElementNotFound {
        /// Selector that failed to match
        selector: String,
    },

    /// A strict single-element lookup matched more than one element
    #[error("Selector {selector} matched {count} elements, expected exactly one")]
    AmbiguousSelector {
        /// Selector that over-matched
        selector: String,
        /// Number of concurrent matches
        count: usize,
    },

    /// An element handle no longer resolves to a live DOM node
    #[error("Element '{id}' is no longer attached to the page")]
    StaleElement {
        /// Backend id of the dead handle
        id: String,
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

    /// Script execution error
    #[error("Script execution failed: {message}")]
    Script {
        /// Error message
        message: String,
    },

    /// Input simulation error
    #[error("Input simulation failed: {message}")]
    Input {
        /// Error message
        message: String,
    },

    /// Session-level driver error
    #[error("Session error: {message}")]
    Session {
        /// Error message
        message: String,
    },

    /// Fixture error (setup/teardown failed)
    #[error("Fixture error: {message}")]
    Fixture {
        /// Error message
        message: String,
    },

    /// Configuration error
    #[error("Config error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
