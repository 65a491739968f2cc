//! Flat exact nearest-neighbour index.
//!
//! Vectors are stored contiguously in one `Vec<f32>` (row-major, `dimensions`
//! floats per entry) next to a parallel `Vec<T>` of payloads. Position `i` in
//! one store always corresponds to position `i` in the other; both live behind
//! a single lock so no reader can see one without the other.

use crate::distance::{is_finite, squared_euclidean};
use crate::error::{Error, Result};
use crate::types::{IndexStats, SearchHit};
use parking_lot::RwLock;
use std::cmp::Ordering;
use tracing::{debug, instrument};

/// In-memory vector index with a paired payload store.
///
/// # Thread Safety
///
/// `append` and `clear` take the write lock for their whole batch, so an
/// append is applied atomically. `search` and the other readers take the read
/// lock and may run concurrently with each other.
pub struct VectorIndex<T> {
    dimensions: usize,
    inner: RwLock<Inner<T>>,
}

struct Inner<T> {
    vectors: Vec<f32>,
    payloads: Vec<T>,
}

impl<T> Inner<T> {
    fn len(&self) -> usize {
        self.payloads.len()
    }
}

impl<T: Clone> VectorIndex<T> {
    /// Create an empty index for vectors of `dimensions` components.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if `dimensions` is zero.
    pub fn new(dimensions: usize) -> Result<Self> {
        if dimensions == 0 {
            return Err(Error::Configuration(
                "index dimensions must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            dimensions,
            inner: RwLock::new(Inner {
                vectors: Vec::new(),
                payloads: Vec::new(),
            }),
        })
    }

    /// Fixed dimensionality of this index.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append `vectors[i]` paired with `payloads[i]` for every `i`.
    ///
    /// The batch is validated in full before the lock is taken; on error
    /// nothing is stored. Returns the index length after the append.
    ///
    /// # Errors
    ///
    /// - [`Error::ArityMismatch`] if the two sequences differ in length.
    /// - [`Error::DimensionMismatch`] if any vector has the wrong length.
    /// - [`Error::InvalidVector`] if any vector contains NaN or infinity.
    #[instrument(skip_all, fields(batch = vectors.len()))]
    pub fn append(&self, vectors: Vec<Vec<f32>>, payloads: Vec<T>) -> Result<usize> {
        if vectors.len() != payloads.len() {
            return Err(Error::ArityMismatch {
                vectors: vectors.len(),
                payloads: payloads.len(),
            });
        }

        for vector in &vectors {
            self.check_vector(vector)?;
        }

        let mut inner = self.inner.write();
        inner.vectors.reserve(vectors.len() * self.dimensions);
        for vector in &vectors {
            inner.vectors.extend_from_slice(vector);
        }
        inner.payloads.extend(payloads);

        let len = inner.len();
        debug!(len, "Appended batch");
        Ok(len)
    }

    /// Exact k-nearest-neighbour search by squared Euclidean distance.
    ///
    /// Returns at most `min(k, len)` hits sorted ascending by distance. Equal
    /// distances keep insertion order. An empty index yields an empty result.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] or [`Error::InvalidVector`] for a
    /// malformed query.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit<T>>> {
        self.check_vector(query)?;

        let inner = self.inner.read();
        let len = inner.len();
        if k == 0 || len == 0 {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(usize, f32)> = inner
            .vectors
            .chunks_exact(self.dimensions)
            .enumerate()
            .map(|(position, stored)| (position, squared_euclidean(query, stored)))
            .collect();

        let k = k.min(len);
        if k < scored.len() {
            scored.select_nth_unstable_by(k - 1, rank);
            scored.truncate(k);
        }
        scored.sort_by(rank);

        Ok(scored
            .into_iter()
            .map(|(position, distance)| SearchHit {
                position,
                payload: inner.payloads[position].clone(),
                distance,
            })
            .collect())
    }

    /// Get the vector and payload stored at `position`.
    pub fn get(&self, position: usize) -> Option<(Vec<f32>, T)> {
        let inner = self.inner.read();
        let payload = inner.payloads.get(position)?.clone();
        let start = position * self.dimensions;
        let vector = inner.vectors[start..start + self.dimensions].to_vec();
        Some((vector, payload))
    }

    /// Snapshot of every payload in insertion order.
    pub fn payloads(&self) -> Vec<T> {
        self.inner.read().payloads.clone()
    }

    /// Run `f` over the payloads, in insertion order, under the read lock.
    ///
    /// Nothing is cloned. Appends wait until `f` returns, so keep it short.
    pub fn with_payloads<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        f(&self.inner.read().payloads)
    }

    /// Remove every entry. Returns how many entries were dropped.
    pub fn clear(&self) -> usize {
        let mut inner = self.inner.write();
        let removed = inner.len();
        inner.vectors.clear();
        inner.payloads.clear();
        removed
    }

    /// Get index statistics.
    pub fn stats(&self) -> IndexStats {
        let inner = self.inner.read();
        IndexStats {
            count: inner.len(),
            dimensions: self.dimensions,
            memory_bytes: inner.vectors.capacity() * std::mem::size_of::<f32>(),
        }
    }

    fn check_vector(&self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dimensions {
            return Err(Error::DimensionMismatch {
                expected: self.dimensions,
                actual: vector.len(),
            });
        }
        if !is_finite(vector) {
            return Err(Error::InvalidVector(
                "vector contains NaN or infinite components".to_string(),
            ));
        }
        Ok(())
    }
}

/// Ascending distance, then ascending insertion position.
fn rank(a: &(usize, f32), b: &(usize, f32)) -> Ordering {
    a.1.total_cmp(&b.1).then(a.0.cmp(&b.0))
}
