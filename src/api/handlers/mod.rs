//! API request handlers.
//!
//! This module contains all HTTP request handlers organized by functionality.

/// Configuration reload handler.
pub mod config;
/// Liveness handler.
pub mod health;
/// Index statistics and reset handlers.
pub mod index;
/// Upload and ask handlers.
pub mod rag;
