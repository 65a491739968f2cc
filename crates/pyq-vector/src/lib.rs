//! # pyq-vector
//!
//! An in-memory, exact nearest-neighbour index that keeps each embedding vector
//! paired with the chunk it was computed from.
//!
//! ## Features
//!
//! - **Exact search**: brute-force scan by squared Euclidean (L2) distance
//! - **Paired storage**: insertion position is the join key between vectors and payloads
//! - **Thread-Safe**: atomic batch appends under a writer lock, concurrent readers
//! - **Fixed dimensionality**: every vector is checked against the index dimension
//!
//! ## Quick Start
//!
//! ```rust
//! use pyq_vector::VectorIndex;
//!
//! let index = VectorIndex::new(3).unwrap();
//! index
//!     .append(
//!         vec![vec![0.0, 0.0, 0.0], vec![1.0, 1.0, 1.0]],
//!         vec!["origin".to_string(), "ones".to_string()],
//!     )
//!     .unwrap();
//!
//! let hits = index.search(&[0.9, 0.9, 0.9], 1).unwrap();
//! assert_eq!(hits[0].payload, "ones");
//! ```
//!
//! There is no persistence and no approximate structure: the index is sized
//! for small corpora held for the lifetime of one process.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod distance;
pub mod error;
pub mod index;
pub mod types;

pub use error::{Error, Result};
pub use index::VectorIndex;
pub use types::{IndexStats, SearchHit};
