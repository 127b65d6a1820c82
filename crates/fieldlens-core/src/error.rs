//! Error types for the Fieldlens identification pipeline.
//!
//! Identification failures are recovered at the client/normalizer boundary
//! and surface as `IdentifyError` — a closed taxonomy the UI layer can match
//! on. No raw provider or transport errors cross that boundary.

use thiserror::Error;

/// Top-level error type for Fieldlens operations.
#[derive(Error, Debug)]
pub enum FieldlensError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Identification pipeline errors
    #[error("Identification error: {0}")]
    Identify(#[from] IdentifyError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Classified identification failures.
///
/// Every failure mode of the provider call and response normalization maps
/// into exactly one of these variants. The original provider message is
/// preserved where available for diagnostics.
#[derive(Error, Debug)]
pub enum IdentifyError {
    /// Missing or rejected credentials (HTTP 401/403, missing API key)
    #[error("Authentication failed: {message}")]
    Unauthenticated { message: String },

    /// Provider quota or rate limit exhausted (HTTP 429, quota messages)
    #[error("Quota exceeded: {message}")]
    QuotaExceeded { message: String },

    /// The provider did not respond within the deadline
    #[error("Identification timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// The request itself was malformed (bad image payload, rejected input)
    #[error("Invalid request: {message}")]
    InvalidArgument { message: String },

    /// The model's output could not be decoded into an identification
    #[error("Failed to parse model response: {message}")]
    ParseFailure { message: String },

    /// Catch-all; preserves the original message for diagnostics
    #[error("Identification failed: {message}")]
    Unknown { message: String },
}

impl IdentifyError {
    /// Whether a retry of the same request could plausibly succeed.
    ///
    /// Timeouts and unknown failures are worth retrying. Auth, quota, and
    /// invalid-argument failures will fail identically; parse failures need
    /// a fresh generation, which callers get by retrying the whole flow
    /// deliberately rather than automatically.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Unknown { .. })
    }
}

/// Convenience type alias for Fieldlens results.
pub type Result<T> = std::result::Result<T, FieldlensError>;

/// Convenience type alias for identification results.
pub type IdentifyResult<T> = std::result::Result<T, IdentifyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_is_retryable() {
        let err = IdentifyError::Timeout { timeout_ms: 30_000 };
        assert!(err.is_retryable());
    }

    #[test]
    fn test_unknown_is_retryable() {
        let err = IdentifyError::Unknown {
            message: "connection reset".to_string(),
        };
        assert!(err.is_retryable());
    }

    #[test]
    fn test_auth_and_quota_not_retryable() {
        let auth = IdentifyError::Unauthenticated {
            message: "bad key".to_string(),
        };
        let quota = IdentifyError::QuotaExceeded {
            message: "out of free uses".to_string(),
        };
        assert!(!auth.is_retryable());
        assert!(!quota.is_retryable());
    }

    #[test]
    fn test_parse_failure_not_retryable() {
        let err = IdentifyError::ParseFailure {
            message: "not JSON".to_string(),
        };
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_display_preserves_message() {
        let err = IdentifyError::Unknown {
            message: "provider exploded".to_string(),
        };
        assert!(err.to_string().contains("provider exploded"));
    }
}
