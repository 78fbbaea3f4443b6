//! Shared types, error model, and configuration for seenlist.
//!
//! This crate is the foundation depended on by all other seenlist crates.
//! It provides:
//! - [`SeenlistError`] — the unified error type
//! - Domain types ([`ResolvedEntry`], [`RadarrMovie`], [`SearchResult`])
//! - Configuration ([`AppConfig`], [`PipelineConfig`], [`TmdbConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, OutputConfig, PipelineConfig, PipelineSection, SourceConfig, TmdbConfig,
    TmdbSection, config_dir, config_file_path, init_config, load_config, load_config_from,
    resolve_api_key,
};
pub use error::{Result, SeenlistError};
pub use types::{PipelineOutcome, RadarrMovie, ResolvedEntry, SearchResult, WikiEntry};
