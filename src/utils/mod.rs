//! Configuration loading and shared helpers.

/// TOML configuration (`pyq.toml`) and its hot-swappable manager.
pub mod toml_config;
