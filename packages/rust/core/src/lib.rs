//! Core pipeline orchestration for seenlist.
//!
//! This crate ties together wiki scraping, TMDB resolution, and list
//! assembly into the end-to-end `generate` workflow.

pub mod batch;
pub mod list;
pub mod pipeline;

pub use batch::{BatchProgress, ConcurrentPipeline, TitleOutcome};
pub use list::{build_list, parse_list, persist, to_json, write_list};
pub use pipeline::{
    GenerateConfig, GenerateResult, ProgressReporter, SilentProgress, generate, scrape_titles,
};
