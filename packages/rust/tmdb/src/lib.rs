//! TMDB lookups: the API client and the title resolver built on it.
//!
//! - [`SearchApi`] — the two operations resolution needs, implemented by [`TmdbClient`]
//! - [`MetadataResolver`] — search with split-title fallback, IMDb id, poster URL, genres
//! - [`genres`] — TMDB's static genre id table

pub mod client;
pub mod genres;
pub mod resolver;

pub use client::{SearchApi, TmdbClient};
pub use genres::{genre_name, genre_names};
pub use resolver::MetadataResolver;
