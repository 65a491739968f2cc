//! Error types for pyq-vector.

use thiserror::Error;

/// Result type for pyq-vector operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in pyq-vector operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Dimension mismatch between a vector and the index.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimensions.
        expected: usize,
        /// Actual dimensions provided.
        actual: usize,
    },

    /// The number of vectors and payloads handed to `append` differ.
    #[error("Arity mismatch: {vectors} vectors for {payloads} chunks")]
    ArityMismatch {
        /// Number of vectors supplied.
        vectors: usize,
        /// Number of payloads supplied.
        payloads: usize,
    },

    /// Invalid vector (e.g., contains NaN or infinity).
    #[error("Invalid vector: {0}")]
    InvalidVector(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),
}
