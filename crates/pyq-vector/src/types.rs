//! Core types for pyq-vector.

use serde::{Deserialize, Serialize};

/// A single nearest-neighbour result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit<T> {
    /// Insertion position of the matched entry.
    pub position: usize,
    /// The payload stored alongside the matched vector.
    pub payload: T,
    /// Squared Euclidean distance to the query (lower is closer).
    pub distance: f32,
}

/// Point-in-time statistics for an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    /// Number of stored vectors (equal to the number of stored payloads).
    pub count: usize,
    /// Fixed dimensionality of every stored vector.
    pub dimensions: usize,
    /// Approximate bytes held by the vector store.
    pub memory_bytes: usize,
}
