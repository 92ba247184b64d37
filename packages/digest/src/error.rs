//! Error handling for digest sessions

use thiserror::Error;

/// Failures reported by a [`HashCore`](crate::hash_core::HashCore) implementation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// The core could not allocate or initialize a context
    #[error("Context initialization error: {0}")]
    Context(String),

    /// The core rejected input data
    #[error("Feed error: {0}")]
    Feed(String),

    /// The core could not produce output bytes
    #[error("Output error: {0}")]
    Output(String),

    /// The core failed to release a context
    #[error("Release error: {0}")]
    Release(String),
}

/// Digest session errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DigestError {
    /// A construction argument has the wrong type
    #[error("{field} has the wrong type: expected {expected}, got {found}")]
    TypeMismatch {
        /// Name of the offending argument
        field: &'static str,
        /// Type the argument must have
        expected: &'static str,
        /// Type that was supplied
        found: &'static str,
    },

    /// The requested output length is outside `1..MAX_OUTPUT_LENGTH`
    #[error("Output length {value} out of range (must be at least 1 and below {max})", max = crate::MAX_OUTPUT_LENGTH)]
    OutOfRange {
        /// Requested output length
        value: i128,
    },

    /// The raw key does not have the core's key length
    #[error("Key length mismatched: expected {expected} bytes, got {actual}")]
    LengthMismatch {
        /// Key length required by the core
        expected: usize,
        /// Length of the supplied key
        actual: usize,
    },

    /// Both a key and a key seed were supplied
    #[error("Both key and key_seed available at the same time; please pick only one")]
    ConflictingMode,

    /// The hash core failed
    #[error("Hash core error: {0}")]
    Core(#[from] CoreError),

    /// A previous core failure left the session unusable
    #[error("Digest session is poisoned by an earlier hash core failure")]
    Poisoned,

    /// The session's context was already released
    #[error("Digest context already released")]
    Released,

    /// The finalized output did not match the expected value
    #[error("Digest verification failed")]
    VerificationFailed,

    /// An async computation was started outside a tokio runtime
    #[error("No tokio runtime available for async digest computation")]
    RuntimeUnavailable,

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DigestError {
    /// Create an internal error
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether the error was raised while validating construction parameters
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::TypeMismatch { .. }
                | Self::OutOfRange { .. }
                | Self::LengthMismatch { .. }
                | Self::ConflictingMode
        )
    }
}

/// Result type for digest operations
pub type Result<T> = std::result::Result<T, DigestError>;
