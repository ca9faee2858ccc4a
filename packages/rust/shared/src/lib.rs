//! Shared types, error model, and configuration for Draftmill.
//!
//! This crate is the foundation depended on by all other Draftmill crates.
//! It provides:
//! - [`DraftmillError`] — the unified error type
//! - Domain types ([`Topic`], [`Catalog`], [`SelectionRecord`], [`SelectionState`], [`RunId`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, GeneratorConfig, config_dir, config_file_path, init_config,
    load_config, load_config_from,
};
pub use error::{DraftmillError, Result};
pub use types::{
    CURRENT_STATE_VERSION, Catalog, RunId, SelectionRecord, SelectionState, Topic,
};
