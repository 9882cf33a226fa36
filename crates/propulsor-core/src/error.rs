//! Shared error types across propulsor crates.

use thiserror::Error;

/// Shared result type.
pub type Result<T> = std::result::Result<T, MeasureError>;

/// Setup and configuration errors.
///
/// These never describe a failure of the measured call itself; the
/// interceptor hands those back untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeasureError {
    #[error("no measure registered for {group}.{method} or its group")]
    MissingDescriptor { group: String, method: String },
    #[error("bad config: {0}")]
    BadConfig(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl MeasureError {
    /// Stable code for logs and assertions.
    pub fn code(&self) -> &'static str {
        match self {
            MeasureError::MissingDescriptor { .. } => "MISSING_DESCRIPTOR",
            MeasureError::BadConfig(_) => "BAD_CONFIG",
            MeasureError::UnsupportedVersion => "UNSUPPORTED_VERSION",
            MeasureError::Internal(_) => "INTERNAL",
        }
    }
}

/// Failures raised by a Metrics Facility.
///
/// Always recoverable from the interceptor's point of view: it logs them and
/// moves on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetricsError {
    #[error("invalid metric name: {0:?}")]
    InvalidName(String),
    #[error("metrics backend: {0}")]
    Backend(String),
}
