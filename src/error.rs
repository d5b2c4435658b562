//! Central error types for the Terra operator
//!
//! Uses `thiserror` for ergonomic, type-safe error handling with
//! automatic `Display` and `Error` trait implementations.

use thiserror::Error;

/// Central error type for the Terra operator
#[derive(Error, Debug)]
pub enum Error {
    /// Kubernetes API error from kube-rs
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// The controller owner reference for a child object could not be built
    #[error("Owner reference error: {0}")]
    OwnerReferenceError(String),

    /// Operator configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Tracing pipeline setup error
    #[error("Telemetry error: {0}")]
    TelemetryError(String),
}

/// Result type alias for operator operations
pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// Check if this error type should trigger a fast retry
    ///
    /// API errors are transient (network, conflicts, throttling). Owner reference
    /// errors recur until the Validator itself changes.
    pub fn is_retriable(&self) -> bool {
        matches!(self, Error::KubeError(_))
    }

    /// Check if this error is an API 404
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::KubeError(kube::Error::Api(e)) if e.code == 404)
    }

    /// Short, stable name of the error variant for metrics labels
    pub fn kind(&self) -> &'static str {
        match self {
            Error::KubeError(_) => "kube",
            Error::SerializationError(_) => "serialization",
            Error::OwnerReferenceError(_) => "owner_reference",
            Error::ConfigError(_) => "config",
            Error::TelemetryError(_) => "telemetry",
        }
    }
}
