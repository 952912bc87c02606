//! Error types for the VERDANT dashboard client.
//!
//! All fallible operations in the workspace return `DashboardResult<T>`.
//! Variants carry enough context to produce a useful log line on their own.

use thiserror::Error;

/// The unified error type for the VERDANT dashboard client.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// The request never produced a response (connection refused, timeout, DNS).
    #[error("transport error calling {endpoint}: {reason}")]
    Transport { endpoint: String, reason: String },

    /// The response body was not the JSON shape the endpoint promises.
    #[error("malformed response from {endpoint}: {reason}")]
    Decode { endpoint: String, reason: String },

    /// The backend answered with an `{"error": "..."}` payload.
    #[error("backend reported an error from {endpoint}: {reason}")]
    Api { endpoint: String, reason: String },

    /// A selection named a country outside the supported list.
    #[error("unsupported country '{country}'")]
    UnknownCountry { country: String },

    /// A selection tried to pick an option that cannot be chosen.
    #[error("invalid selection: {reason}")]
    InvalidSelection { reason: String },

    /// A required configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    Config { reason: String },

    /// The chart backend refused to build a chart.
    #[error("failed to render chart '{canvas}': {reason}")]
    Render { canvas: String, reason: String },
}

/// Convenience alias used throughout the VERDANT crates.
pub type DashboardResult<T> = Result<T, DashboardError>;
