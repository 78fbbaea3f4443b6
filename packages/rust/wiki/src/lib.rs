//! Wiki scraping: fetching the source page and extracting movie titles.
//!
//! This crate provides:
//! - [`fetch`] — HTTP fetch of the wiki page
//! - [`filter`] — the [`TitleFilter`] rule set
//! - [`extract`] — italic-title extraction over a parsed document

pub mod extract;
pub mod fetch;
pub mod filter;

pub use extract::{extract_entries, extract_titles, extract_titles_from_html};
pub use fetch::{build_client, fetch_document};
pub use filter::{TitleFilter, is_movie_title};
